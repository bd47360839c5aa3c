// ==========================================
// 变压器试验记录 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供项目快照存取与订阅接口，屏蔽数据库细节
// 约束: 所有查询使用参数化
// ==========================================

pub mod error;
pub mod project_repo;
pub mod sqlite_project_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use project_repo::ProjectRepository;
pub use sqlite_project_repo::SqliteProjectRepository;
