// ==========================================
// 变压器试验记录 - 项目仓储 SQLite 实现
// ==========================================
// 职责: 快照以 JSON 文本整体存储于 project 表
// 通知: tokio broadcast 广播变更的 owner_id，订阅流据此重新加载
// ==========================================

use crate::db::{configure_sqlite_connection, ensure_schema, open_sqlite_connection};
use crate::domain::Project;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::project_repo::ProjectRepository;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;

/// 变更广播缓冲
const CHANGE_CHANNEL_CAPACITY: usize = 64;

// ==========================================
// SqliteProjectRepository
// ==========================================
#[derive(Clone)]
pub struct SqliteProjectRepository {
    conn: Arc<Mutex<Connection>>,
    changes: broadcast::Sender<String>,
}

impl SqliteProjectRepository {
    /// 创建新的 Repository 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        ensure_schema(&conn)?;
        Ok(Self::with_connection(Arc::new(Mutex::new(conn))))
    }

    /// 从已有连接创建（共享连接）
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA 与建表（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| RepositoryError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
            ensure_schema(&guard)?;
        }
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Arc<Mutex<Connection>>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self { conn, changes }
    }

    fn lock(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn notify(&self, owner_id: &str) {
        // 无订阅者时 send 返回 Err，属正常情况
        let _ = self.changes.send(owner_id.to_string());
    }

    fn decode(project_id: &str, raw: &str) -> RepositoryResult<Project> {
        serde_json::from_str(raw).map_err(|e| RepositoryError::CorruptSnapshot {
            project_id: project_id.to_string(),
            message: e.to_string(),
        })
    }

    /// 同步加载某用户的全部项目；损坏快照跳过并记录日志
    fn load_owner(&self, owner_id: &str) -> RepositoryResult<Vec<Project>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT project_id, snapshot_json FROM project WHERE owner_id = ?1 ORDER BY project_id",
        )?;
        let rows = stmt.query_map(params![owner_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut projects = Vec::new();
        for row in rows {
            let (project_id, raw) = row?;
            match Self::decode(&project_id, &raw) {
                Ok(project) => projects.push(project),
                Err(e) => tracing::error!("跳过损坏的项目快照: {}", e),
            }
        }
        Ok(projects)
    }
}

#[async_trait]
impl ProjectRepository for SqliteProjectRepository {
    async fn put(&self, snapshot: &Project) -> RepositoryResult<()> {
        let json = serde_json::to_string(snapshot)?;
        {
            let conn = self.lock()?;
            conn.execute(
                r#"
                INSERT INTO project (project_id, owner_id, last_modified, snapshot_json)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(project_id) DO UPDATE SET
                    owner_id = excluded.owner_id,
                    last_modified = excluded.last_modified,
                    snapshot_json = excluded.snapshot_json
                "#,
                params![
                    snapshot.id,
                    snapshot.owner_id,
                    snapshot.last_modified.to_rfc3339(),
                    json,
                ],
            )?;
        }
        tracing::debug!("项目快照已写入: project_id={}", snapshot.id);
        self.notify(&snapshot.owner_id);
        Ok(())
    }

    async fn delete(&self, project_id: &str) -> RepositoryResult<bool> {
        let owner = {
            let conn = self.lock()?;
            let owner: Option<String> = conn
                .query_row(
                    "SELECT owner_id FROM project WHERE project_id = ?1",
                    params![project_id],
                    |row| row.get(0),
                )
                .optional()?;
            if owner.is_some() {
                conn.execute("DELETE FROM project WHERE project_id = ?1", params![project_id])?;
            }
            owner
        };

        match owner {
            Some(owner_id) => {
                tracing::info!("项目已删除: project_id={}", project_id);
                self.notify(&owner_id);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn get(&self, project_id: &str) -> RepositoryResult<Option<Project>> {
        let raw: Option<String> = {
            let conn = self.lock()?;
            conn.query_row(
                "SELECT snapshot_json FROM project WHERE project_id = ?1",
                params![project_id],
                |row| row.get(0),
            )
            .optional()?
        };
        raw.map(|raw| Self::decode(project_id, &raw)).transpose()
    }

    async fn list_by_owner(&self, owner_id: &str) -> RepositoryResult<Vec<Project>> {
        self.load_owner(owner_id)
    }

    fn subscribe(&self, owner_id: &str) -> BoxStream<'static, RepositoryResult<Vec<Project>>> {
        let repo = self.clone();
        let owner = owner_id.to_string();
        let receiver = self.changes.subscribe();

        stream::unfold(
            (repo, owner, receiver, true),
            |(repo, owner, mut receiver, first)| async move {
                if !first {
                    loop {
                        match receiver.recv().await {
                            Ok(changed) if changed == owner => break,
                            Ok(_) => continue,
                            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                                tracing::warn!("订阅落后 {} 条变更，重新加载完整列表", skipped);
                                break;
                            }
                            Err(broadcast::error::RecvError::Closed) => return None,
                        }
                    }
                }
                let listing = repo.load_owner(&owner);
                Some((listing, (repo, owner, receiver, false)))
            },
        )
        .boxed()
    }
}
