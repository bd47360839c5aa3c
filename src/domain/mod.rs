// ==========================================
// 变压器试验记录 - 领域层
// ==========================================
// 职责: 项目聚合与字段类型
// 红线: 领域层不含计算规则，计算见 engine
// ==========================================

pub mod project;
pub mod types;

// 重导出核心类型
pub use project::{
    HeaderInfo, InsulationRow, Project, ResistanceSettings, TapRowData, TgDeltaRow,
    MAX_TAP_RANGE,
};
pub use types::{
    Confirmation, HeaderField, Injection, InsulationField, ResistanceSetting, RowId, TapField,
    TapRowId, TgDeltaField, TgMode, TimedReading,
};
