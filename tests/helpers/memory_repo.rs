// ==========================================
// 内存项目仓储（测试用）
// ==========================================
// 功能: 写入计数、失败注入、写入延迟、在途写入并发度统计
// ==========================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use transformer_test_sheet::domain::Project;
use transformer_test_sheet::repository::{ProjectRepository, RepositoryError, RepositoryResult};

pub struct MemoryProjectRepository {
    projects: Mutex<HashMap<String, Project>>,
    writes: Mutex<Vec<Project>>,
    failures_remaining: AtomicUsize,
    put_delay: Mutex<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Default for MemoryProjectRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProjectRepository {
    pub fn new() -> Self {
        Self {
            projects: Mutex::new(HashMap::new()),
            writes: Mutex::new(Vec::new()),
            failures_remaining: AtomicUsize::new(0),
            put_delay: Mutex::new(Duration::ZERO),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// 直接写入初始数据（不计入写入次数）
    pub fn seed(&self, project: Project) {
        self.projects
            .lock()
            .unwrap()
            .insert(project.id.clone(), project);
    }

    /// 接下来 n 次 put 失败
    pub fn fail_next(&self, n: usize) {
        self.failures_remaining.store(n, Ordering::SeqCst);
    }

    /// 每次 put 的模拟耗时
    pub fn set_put_delay(&self, delay: Duration) {
        *self.put_delay.lock().unwrap() = delay;
    }

    /// 成功写入次数
    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn writes(&self) -> Vec<Project> {
        self.writes.lock().unwrap().clone()
    }

    pub fn last_write(&self) -> Option<Project> {
        self.writes.lock().unwrap().last().cloned()
    }

    /// 观察到的最大在途写入数
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn load_owner(&self, owner_id: &str) -> Vec<Project> {
        self.projects
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.owner_id == owner_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ProjectRepository for MemoryProjectRepository {
    async fn put(&self, snapshot: &Project) -> RepositoryResult<()> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = *self.put_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let fail = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if fail {
            return Err(RepositoryError::DatabaseConnectionError(
                "injected failure".to_string(),
            ));
        }

        self.projects
            .lock()
            .unwrap()
            .insert(snapshot.id.clone(), snapshot.clone());
        self.writes.lock().unwrap().push(snapshot.clone());
        Ok(())
    }

    async fn delete(&self, project_id: &str) -> RepositoryResult<bool> {
        Ok(self.projects.lock().unwrap().remove(project_id).is_some())
    }

    async fn get(&self, project_id: &str) -> RepositoryResult<Option<Project>> {
        Ok(self.projects.lock().unwrap().get(project_id).cloned())
    }

    async fn list_by_owner(&self, owner_id: &str) -> RepositoryResult<Vec<Project>> {
        Ok(self.load_owner(owner_id))
    }

    fn subscribe(&self, owner_id: &str) -> BoxStream<'static, RepositoryResult<Vec<Project>>> {
        // 内存仓储只推送订阅时刻的列表
        let listing = self.load_owner(owner_id);
        stream::once(async move { Ok(listing) }).boxed()
    }
}
