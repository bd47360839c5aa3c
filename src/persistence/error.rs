// ==========================================
// 变压器试验记录 - 持久化错误类型
// ==========================================
// 说明: 写入失败只作为"未保存"的瞬时状态上报，控制器保持可重试
// 工具: thiserror 派生宏
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("项目保存失败 (project_id={project_id}): {source}")]
    CommitFailed {
        project_id: String,
        source: RepositoryError,
    },

    #[error("项目订阅失败 (owner_id={owner_id}): {source}")]
    SubscriptionFailed {
        owner_id: String,
        source: RepositoryError,
    },
}

/// Result 类型别名
pub type PersistenceResult<T> = Result<T, PersistenceError>;
