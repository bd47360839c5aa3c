// ==========================================
// 变压器试验记录 - 导出层
// ==========================================
// 职责: 将项目快照展平为与渲染器无关的表格结构
// 说明: 表格文件 / PDF 渲染器为外部协作方；CSV 渲染器随库提供
// ==========================================

pub mod error;
pub mod mapper;
pub mod model;
pub mod renderer;

pub use error::{ExportError, ExportResult};
pub use mapper::{ExportMapper, SHEET_INSULATION, SHEET_RESISTANCE, SHEET_TG_DELTA, SHEET_TTR};
pub use model::{ExportSheet, ExportWorkbook};
pub use renderer::{CsvRenderer, ExportRenderer};
