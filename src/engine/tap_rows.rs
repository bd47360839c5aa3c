// ==========================================
// 变压器试验记录 - 分接行生成器
// ==========================================
// 职责: 根据分接范围 N 生成有序分接行 (+N … 0 … -N)
// 说明: 纯函数，仅作为 data 的视图顺序，不修改任何数据
// ==========================================

use crate::domain::{TapRowId, MAX_TAP_RANGE};

/// 中性档标签
pub const NOMINAL_LABEL: &str = "0 (Nominal)";

/// 分接行（视图）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapRow {
    pub id: TapRowId,
    pub label: String,
    /// 分接位置（+N..-N）
    pub position: i32,
}

pub struct TapRowGenerator;

impl TapRowGenerator {
    /// 生成分接行
    ///
    /// # 规则
    /// - 顺序: +N, +N-1, …, +1, 0 (Nominal), -1, …, -N
    /// - 行数 = 2N+1
    /// - N 超过上限时按上限截断
    pub fn generate(tap_range: u8) -> Vec<TapRow> {
        let n = i32::from(tap_range.min(MAX_TAP_RANGE));
        (-n..=n)
            .rev()
            .map(|position| TapRow {
                id: TapRowId::for_position(position),
                label: Self::label_for(position),
                position,
            })
            .collect()
    }

    fn label_for(position: i32) -> String {
        match position {
            0 => NOMINAL_LABEL.to_string(),
            p if p > 0 => format!("+{}", p),
            p => p.to_string(),
        }
    }
}
