// ==========================================
// 变压器试验记录 - 应用层
// ==========================================
// 职责: 组装数据库、配置与 API，供可执行文件及界面层使用
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState};
