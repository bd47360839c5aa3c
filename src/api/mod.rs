// ==========================================
// 变压器试验记录 - API 层
// ==========================================
// 职责: 提供项目生命周期与导出接口,供界面层调用
// ==========================================

pub mod error;
pub mod project_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use project_api::{ProjectApi, ProjectSession};
