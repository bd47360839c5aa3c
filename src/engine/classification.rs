// ==========================================
// 变压器试验记录 - 合格判定规则
// ==========================================
// 职责: 将派生值/原始值映射为 合格 / 不合格 / 无数据
// 红线: 阈值为行业标准固定值，不可由用户配置
// 红线: 边界按下表严格执行
//   - 变比偏差 |x| <= 0.5 合格
//   - tan δ    x <  0.5 合格（= 0.5 不合格）
//   - PI       x >  1.0 合格（= 1.0 不合格）
// ==========================================

use crate::engine::numeric::{is_blank, parse_value, PLACEHOLDER};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 变比偏差限值 (%)
pub const TTR_DEVIATION_LIMIT: f64 = 0.5;

/// tan δ 限值 (%)
pub const TG_DELTA_LIMIT: f64 = 0.5;

/// 极化指数下限（不含）
pub const PI_MIN: f64 = 1.0;

/// PI 可接受标签（导出原样使用）
pub const PI_ACCEPTABLE: &str = "ACEPTABLE";

/// PI 不可接受标签（导出原样使用）
pub const PI_NOT_ACCEPTABLE: &str = "NO ACEPTABLE";

// ==========================================
// 判定状态 (Measurement Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasurementStatus {
    Pass,    // 合格
    Fail,    // 不合格
    Neutral, // 无数据
}

impl fmt::Display for MeasurementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementStatus::Pass => write!(f, "PASS"),
            MeasurementStatus::Fail => write!(f, "FAIL"),
            MeasurementStatus::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// 判定结果（状态 + 显示标签）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub status: MeasurementStatus,
    pub label: &'static str,
}

impl Classification {
    const fn generic(status: MeasurementStatus) -> Self {
        let label = match status {
            MeasurementStatus::Pass => "OK",
            MeasurementStatus::Fail => "FUERA DE TOLERANCIA",
            MeasurementStatus::Neutral => PLACEHOLDER,
        };
        Self { status, label }
    }

    pub fn is_pass(&self) -> bool {
        self.status == MeasurementStatus::Pass
    }

    pub fn is_fail(&self) -> bool {
        self.status == MeasurementStatus::Fail
    }
}

/// 变比偏差判定
///
/// # 规则
/// - None → 无数据
/// - |x| <= 0.5 → 合格
/// - |x| >  0.5 → 不合格
pub fn classify_ttr_deviation(deviation: Option<f64>) -> Classification {
    let status = match deviation {
        None => MeasurementStatus::Neutral,
        Some(x) if x.abs() <= TTR_DEVIATION_LIMIT => MeasurementStatus::Pass,
        Some(_) => MeasurementStatus::Fail,
    };
    Classification::generic(status)
}

/// tan δ 判定（基于原始字段）
///
/// # 规则
/// - 字段为空 → 无数据
/// - 非空但无法解析 → 无数据（降级显示，不判不合格）
/// - x < 0.5 → 合格，x >= 0.5 → 不合格
pub fn classify_tg_delta(tg_percent: &str) -> Classification {
    if is_blank(tg_percent) {
        return Classification::generic(MeasurementStatus::Neutral);
    }
    let status = match parse_value(tg_percent) {
        Some(x) if x < TG_DELTA_LIMIT => MeasurementStatus::Pass,
        Some(_) => MeasurementStatus::Fail,
        None => MeasurementStatus::Neutral,
    };
    Classification::generic(status)
}

/// 极化指数判定
///
/// # 规则
/// - None → 无数据（标签 "-"）
/// - x > 1.0 → ACEPTABLE
/// - x <= 1.0 → NO ACEPTABLE
pub fn classify_polarization_index(pi: Option<f64>) -> Classification {
    match pi {
        None => Classification::generic(MeasurementStatus::Neutral),
        Some(x) if x > PI_MIN => Classification {
            status: MeasurementStatus::Pass,
            label: PI_ACCEPTABLE,
        },
        Some(_) => Classification {
            status: MeasurementStatus::Fail,
            label: PI_NOT_ACCEPTABLE,
        },
    }
}
