// ==========================================
// 变压器试验记录 - 项目仓储 Trait
// ==========================================
// 职责: 定义项目快照的键值存取与变更订阅接口（不包含实现）
// 红线: Repository 不含业务规则，只做快照整体替换（last-write-wins）
// ==========================================

use crate::domain::Project;
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;
use futures::stream::BoxStream;

// ==========================================
// ProjectRepository Trait
// ==========================================
// 用途: 项目快照存取
// 实现者: SqliteProjectRepository（使用 rusqlite）
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// 写入完整快照（存在则整体替换）
    async fn put(&self, snapshot: &Project) -> RepositoryResult<()>;

    /// 删除项目
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 项目不存在
    async fn delete(&self, project_id: &str) -> RepositoryResult<bool>;

    /// 按 ID 读取快照
    async fn get(&self, project_id: &str) -> RepositoryResult<Option<Project>>;

    /// 读取某用户范围下的全部项目（顺序不保证）
    async fn list_by_owner(&self, owner_id: &str) -> RepositoryResult<Vec<Project>>;

    /// 订阅某用户范围的项目列表
    ///
    /// # 说明
    /// - 订阅后立即推送一次当前列表
    /// - 此后该用户范围内每次 put/delete 推送一次完整列表
    /// - 列表顺序不保证，由调用方重新排序
    fn subscribe(&self, owner_id: &str) -> BoxStream<'static, RepositoryResult<Vec<Project>>>;
}
