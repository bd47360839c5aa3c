// ==========================================
// 变压器试验记录 - 领域类型定义
// ==========================================
// 职责: 行标识、枚举选择项、字段标识
// 说明: 所有数值字段以逗号小数文本存储，此处不涉及数值
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 分接位置行标识 (Tap Row Id)
// ==========================================
// 由分接位置确定性派生: pos-<k> / neutral / neg-<k>
// 红线: 不允许随机生成，否则分接范围变化后数据无法找回
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TapRowId(String);

impl TapRowId {
    /// 中性点 (0 档) 行标识
    pub const NEUTRAL: &'static str = "neutral";

    /// 根据分接位置生成行标识
    ///
    /// # 规则
    /// - position > 0 → `pos-<k>`
    /// - position = 0 → `neutral`
    /// - position < 0 → `neg-<k>`
    pub fn for_position(position: i32) -> Self {
        match position {
            p if p > 0 => TapRowId(format!("pos-{}", p)),
            0 => TapRowId(Self::NEUTRAL.to_string()),
            p => TapRowId(format!("neg-{}", p.unsigned_abs())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TapRowId {
    fn from(value: &str) -> Self {
        TapRowId(value.to_string())
    }
}

impl fmt::Display for TapRowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// 表格行标识 (Row Id)
// ==========================================
// TG Delta / 绝缘电阻行使用，创建时分配一次，永不复用
// 新 id 只由 RowIdGenerator 分配；`From<&str>` 用于引用已有 id（如界面回传、测试）
// 反序列化经 serde(transparent) 直接恢复
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(String);

impl RowId {
    /// crate 内部构造（RowIdGenerator 分配新 id 时使用）
    pub(crate) fn new(raw: String) -> Self {
        RowId(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RowId {
    fn from(value: &str) -> Self {
        RowId(value.to_string())
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// TG Delta 测量模式 (Test Mode)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TgMode {
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "UST")]
    Ust,
    #[serde(rename = "GST g")]
    GstGuard,
    #[serde(rename = "GST-GND")]
    GstGround,
}

impl TgMode {
    /// 显示/导出标签
    pub fn label(&self) -> &'static str {
        match self {
            TgMode::Unset => "",
            TgMode::Ust => "UST",
            TgMode::GstGuard => "GST g",
            TgMode::GstGround => "GST-GND",
        }
    }

    /// 从标签解析（未知标签返回 None）
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "" => Some(TgMode::Unset),
            "UST" => Some(TgMode::Ust),
            "GST g" => Some(TgMode::GstGuard),
            "GST-GND" => Some(TgMode::GstGround),
            _ => None,
        }
    }
}

impl fmt::Display for TgMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 注入绕组 (Injection Winding)
// ==========================================
// AT: 高压 / MT: 中压 / BT: 低压
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Injection {
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "AT")]
    At,
    #[serde(rename = "MT")]
    Mt,
    #[serde(rename = "BT")]
    Bt,
}

impl Injection {
    pub fn label(&self) -> &'static str {
        match self {
            Injection::Unset => "",
            Injection::At => "AT",
            Injection::Mt => "MT",
            Injection::Bt => "BT",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "" => Some(Injection::Unset),
            "AT" => Some(Injection::At),
            "MT" => Some(Injection::Mt),
            "BT" => Some(Injection::Bt),
            _ => None,
        }
    }
}

impl fmt::Display for Injection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

// ==========================================
// 字段标识
// ==========================================

/// 表头字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    ManufacturingNumber,
    SerialNumber,
    Client,
    Date,
}

/// 绕组电阻设置字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResistanceSetting {
    MeasuredTemp,
    RefTemp,
    Conn1Name,
    Conn2Name,
    Conn3Name,
}

impl ResistanceSetting {
    /// 温度为数值字段，写入前需做逗号小数规范化
    pub fn is_numeric(&self) -> bool {
        matches!(self, ResistanceSetting::MeasuredTemp | ResistanceSetting::RefTemp)
    }
}

/// 分接行字段（变比 + 绕组电阻），全部为数值字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapField {
    RatioPercent,
    RatedRatio,
    PhaseA,
    PhaseB,
    PhaseC,
    ResConn1Meas,
    ResConn2Meas,
    ResConn3Meas,
}

/// TG Delta 行字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TgDeltaField {
    Mode,
    Injection,
    Measurement,
    Guard,
    TestVoltage,
    TgPercent,
    Capacitance,
}

impl TgDeltaField {
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TgDeltaField::TestVoltage | TgDeltaField::TgPercent | TgDeltaField::Capacitance
        )
    }
}

/// 绝缘电阻定时读数（GΩ）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimedReading {
    Val30s,
    Val1m,
    Val2m,
    Val3m,
    Val4m,
    Val5m,
    Val6m,
    Val7m,
    Val8m,
    Val9m,
    Val10m,
}

impl TimedReading {
    /// 全部读数，按时间顺序
    pub const ALL: [TimedReading; 11] = [
        TimedReading::Val30s,
        TimedReading::Val1m,
        TimedReading::Val2m,
        TimedReading::Val3m,
        TimedReading::Val4m,
        TimedReading::Val5m,
        TimedReading::Val6m,
        TimedReading::Val7m,
        TimedReading::Val8m,
        TimedReading::Val9m,
        TimedReading::Val10m,
    ];

    /// 导出列标题
    pub fn label(&self) -> &'static str {
        match self {
            TimedReading::Val30s => "30 s",
            TimedReading::Val1m => "1 min",
            TimedReading::Val2m => "2 min",
            TimedReading::Val3m => "3 min",
            TimedReading::Val4m => "4 min",
            TimedReading::Val5m => "5 min",
            TimedReading::Val6m => "6 min",
            TimedReading::Val7m => "7 min",
            TimedReading::Val8m => "8 min",
            TimedReading::Val9m => "9 min",
            TimedReading::Val10m => "10 min",
        }
    }
}

/// 绝缘电阻行字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsulationField {
    Injection,
    Measurement,
    Guard,
    Reading(TimedReading),
}

// ==========================================
// 删除确认 (Removal Confirmation)
// ==========================================
// 删除行/项目为不可逆操作，调用方必须显式确认
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
}

impl Confirmation {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Confirmation::Confirmed)
    }
}
