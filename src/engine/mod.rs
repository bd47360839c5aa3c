// ==========================================
// 变压器试验记录 - 引擎层
// ==========================================
// 职责: 数值格式、分接行生成、派生计算、合格判定
// 红线: Engine 全部为纯函数，不做 I/O，不持有状态
// 红线: 界面显示与导出共用同一套函数，计算结果不得分叉
// ==========================================

pub mod classification;
pub mod derivation;
pub mod numeric;
pub mod tap_rows;

// 重导出核心引擎
pub use classification::{
    classify_polarization_index, classify_tg_delta, classify_ttr_deviation, Classification,
    MeasurementStatus,
};
pub use derivation::{
    deviation_percent, dielectric_absorption_ratio, polarization_index, resistance_corrected,
};
pub use tap_rows::{TapRow, TapRowGenerator};
