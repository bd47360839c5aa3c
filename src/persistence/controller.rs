// ==========================================
// 变压器试验记录 - 持久化控制器（防抖提交状态机）
// ==========================================
// 状态: Idle → PendingCommit → Committing → Idle
// 红线: 每个静默期恰好一次写入；同一项目任意时刻至多一个写入在途
// 红线: 不丢弃任何编辑（项目被删除时除外）；写入失败不进入终止态，可由下一次编辑或 retry 重试
// ==========================================

use crate::domain::Project;
use crate::editor::events::{ProjectChangeEvent, ProjectChangePublisher};
use crate::persistence::error::PersistenceError;
use crate::repository::ProjectRepository;
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;

/// 默认静默期
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(1000);

// ==========================================
// 提交阶段 / 保存状态
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitPhase {
    /// 无待提交变更
    Idle,
    /// 有待提交变更，等待静默期结束
    PendingCommit,
    /// 写入在途
    Committing,
}

impl CommitPhase {
    pub fn as_str(&self) -> &str {
        match self {
            CommitPhase::Idle => "IDLE",
            CommitPhase::PendingCommit => "PENDING_COMMIT",
            CommitPhase::Committing => "COMMITTING",
        }
    }
}

/// 对外可观察的保存状态（仅供界面展示）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveStatus {
    pub phase: CommitPhase,
    /// 正在保存（计时中或写入在途）
    pub saving: bool,
    /// 最近一次写入失败原因；成功写入后清空
    pub last_error: Option<String>,
}

impl SaveStatus {
    fn idle() -> Self {
        Self {
            phase: CommitPhase::Idle,
            saving: false,
            last_error: None,
        }
    }
}

// ==========================================
// 内部状态
// ==========================================

struct ControllerState {
    phase: CommitPhase,
    /// 最近一次变更快照
    latest: Option<Arc<Project>>,
    /// 最近一次成功写入的快照（已打 lastModified 标记）
    last_committed: Option<Arc<Project>>,
    timer: Option<JoinHandle<()>>,
    /// 计时器代数，用于识别被取代的计时器
    generation: u64,
    /// 写入在途期间到达的变更
    dirty_while_committing: bool,
    last_error: Option<String>,
    commit_count: u64,
    /// 项目已删除：不再接受变更，不再写入
    discarded: bool,
}

struct ControllerInner {
    project_id: String,
    repo: Arc<dyn ProjectRepository>,
    quiet_period: Duration,
    state: Mutex<ControllerState>,
    status: watch::Sender<SaveStatus>,
    commit_done: Notify,
}

// ==========================================
// PersistenceController
// ==========================================
#[derive(Clone)]
pub struct PersistenceController {
    inner: Arc<ControllerInner>,
}

impl PersistenceController {
    /// 创建控制器
    ///
    /// # 参数
    /// - project_id: 所管理的项目（只接受该项目的变更）
    /// - repo: 外部仓储
    /// - quiet_period: 静默期
    pub fn new(
        project_id: impl Into<String>,
        repo: Arc<dyn ProjectRepository>,
        quiet_period: Duration,
    ) -> Self {
        let (status, _) = watch::channel(SaveStatus::idle());
        Self {
            inner: Arc::new(ControllerInner {
                project_id: project_id.into(),
                repo,
                quiet_period,
                state: Mutex::new(ControllerState {
                    phase: CommitPhase::Idle,
                    latest: None,
                    last_committed: None,
                    timer: None,
                    generation: 0,
                    dirty_while_committing: false,
                    last_error: None,
                    commit_count: 0,
                    discarded: false,
                }),
                status,
                commit_done: Notify::new(),
            }),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.inner.project_id
    }

    pub fn phase(&self) -> CommitPhase {
        self.state().phase
    }

    pub fn is_saving(&self) -> bool {
        self.inner.status.borrow().saving
    }

    /// 订阅保存状态
    pub fn subscribe_status(&self) -> watch::Receiver<SaveStatus> {
        self.inner.status.subscribe()
    }

    /// 成功写入次数
    pub fn commit_count(&self) -> u64 {
        self.state().commit_count
    }

    pub fn last_committed(&self) -> Option<Arc<Project>> {
        self.state().last_committed.clone()
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        // 锁内不执行可能 panic 的逻辑，中毒时沿用内部状态
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_status(&self, st: &ControllerState) {
        let saving = match st.phase {
            CommitPhase::Idle => false,
            CommitPhase::PendingCommit => st.timer.is_some(),
            CommitPhase::Committing => true,
        };
        self.inner.status.send_replace(SaveStatus {
            phase: st.phase,
            saving,
            last_error: st.last_error.clone(),
        });
    }

    // ==========================================
    // 调度
    // ==========================================

    /// 登记一次变更（立即返回，不等待 I/O）
    ///
    /// # 规则
    /// - Idle / PendingCommit → PendingCommit，并重启静默期计时器
    /// - Committing → 标记脏，写入完成后进入新一轮 PendingCommit
    pub fn schedule(&self, snapshot: Arc<Project>) {
        if snapshot.id != self.inner.project_id {
            tracing::warn!(
                "忽略其他项目的变更: expected={}, actual={}",
                self.inner.project_id,
                snapshot.id
            );
            return;
        }

        let mut st = self.state();
        if st.discarded {
            tracing::debug!("项目已丢弃，忽略变更: project_id={}", self.inner.project_id);
            return;
        }
        st.latest = Some(snapshot);
        match st.phase {
            CommitPhase::Committing => {
                st.dirty_while_committing = true;
                tracing::debug!("写入在途，变更排队: project_id={}", self.inner.project_id);
            }
            CommitPhase::Idle | CommitPhase::PendingCommit => {
                st.phase = CommitPhase::PendingCommit;
                self.arm_timer(&mut st);
            }
        }
        self.publish_status(&st);
    }

    /// 写入失败后手动重试：重新启动静默期计时器
    pub fn retry(&self) {
        let mut st = self.state();
        if st.phase == CommitPhase::PendingCommit && st.timer.is_none() {
            tracing::info!("重试保存: project_id={}", self.inner.project_id);
            self.arm_timer(&mut st);
            self.publish_status(&st);
        }
    }

    /// (重新)启动计时器；旧计时器被取消
    fn arm_timer(&self, st: &mut ControllerState) {
        if let Some(timer) = st.timer.take() {
            timer.abort();
        }
        st.generation += 1;
        let generation = st.generation;

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!(
                    "无 tokio 运行时，变更保持待提交（需 flush）: project_id={}",
                    self.inner.project_id
                );
                return;
            }
        };

        let controller = self.clone();
        let quiet_period = self.inner.quiet_period;
        st.timer = Some(handle.spawn(async move {
            tokio::time::sleep(quiet_period).await;
            controller.on_quiet_period_elapsed(generation).await;
        }));
        tracing::debug!(
            "静默期计时器已启动: project_id={}, generation={}",
            self.inner.project_id,
            generation
        );
    }

    async fn on_quiet_period_elapsed(&self, generation: u64) {
        let snapshot = {
            let mut st = self.state();
            if st.generation != generation || st.phase != CommitPhase::PendingCommit {
                return;
            }
            // 计时器句柄在此之后不再可被 abort，写入不会被中途取消
            st.timer = None;
            match self.begin_commit(&mut st) {
                Some(snapshot) => snapshot,
                None => return,
            }
        };
        // 失败已记录于状态并上报日志
        let _ = self.commit(snapshot).await;
    }

    /// 进入 Committing，返回已打时间戳的快照
    fn begin_commit(&self, st: &mut ControllerState) -> Option<Arc<Project>> {
        let latest = match st.latest.clone() {
            Some(latest) if !st.discarded => latest,
            _ => {
                st.phase = CommitPhase::Idle;
                self.publish_status(st);
                return None;
            }
        };
        st.phase = CommitPhase::Committing;
        st.dirty_while_committing = false;
        self.publish_status(st);

        let mut stamped = (*latest).clone();
        stamped.last_modified = Utc::now();
        Some(Arc::new(stamped))
    }

    /// 执行一次写入并完成状态转换
    async fn commit(&self, snapshot: Arc<Project>) -> Result<(), PersistenceError> {
        let result = self.inner.repo.put(&snapshot).await;

        let outcome = {
            let mut st = self.state();
            let outcome = match result {
                Ok(()) => {
                    st.commit_count += 1;
                    st.last_error = None;
                    st.last_committed = Some(Arc::clone(&snapshot));
                    tracing::info!(
                        "项目已保存: project_id={}, last_modified={}",
                        snapshot.id,
                        snapshot.last_modified.to_rfc3339()
                    );
                    if st.dirty_while_committing {
                        st.phase = CommitPhase::PendingCommit;
                    } else {
                        st.phase = CommitPhase::Idle;
                    }
                    Ok(())
                }
                Err(source) => {
                    let err = PersistenceError::CommitFailed {
                        project_id: snapshot.id.clone(),
                        source,
                    };
                    tracing::error!("{}", err);
                    st.last_error = Some(err.to_string());
                    st.phase = CommitPhase::PendingCommit;
                    Err(err)
                }
            };

            if st.discarded {
                st.phase = CommitPhase::Idle;
            } else if st.dirty_while_committing {
                st.dirty_while_committing = false;
                self.arm_timer(&mut st);
            }
            self.publish_status(&st);
            outcome
        };

        self.inner.commit_done.notify_waiters();
        outcome
    }

    /// 立即提交待提交的变更（关闭会话时调用）
    ///
    /// # 规则
    /// - Idle → 直接返回
    /// - PendingCommit → 取消计时器并立即写入
    /// - Committing → 等待在途写入结束后重新判断
    pub async fn flush(&self) -> Result<(), PersistenceError> {
        loop {
            let notified = self.inner.commit_done.notified();
            let snapshot = {
                let mut st = self.state();
                match st.phase {
                    CommitPhase::Idle => return Ok(()),
                    CommitPhase::Committing => None,
                    CommitPhase::PendingCommit => {
                        if let Some(timer) = st.timer.take() {
                            timer.abort();
                        }
                        st.generation += 1;
                        match self.begin_commit(&mut st) {
                            Some(snapshot) => Some(snapshot),
                            None => return Ok(()),
                        }
                    }
                }
            };

            match snapshot {
                Some(snapshot) => self.commit(snapshot).await?,
                None => notified.await,
            }
        }
    }

    /// 丢弃控制器（项目被删除时调用）
    ///
    /// # 规则
    /// - 取消计时器并清空待提交快照，此后的变更一律忽略
    /// - 写入在途时等待其结束，返回后不会再有任何写入
    pub async fn discard(&self) {
        loop {
            let notified = self.inner.commit_done.notified();
            {
                let mut st = self.state();
                st.discarded = true;
                if let Some(timer) = st.timer.take() {
                    timer.abort();
                }
                st.generation += 1;
                st.latest = None;
                st.dirty_while_committing = false;
                if st.phase != CommitPhase::Committing {
                    st.phase = CommitPhase::Idle;
                    self.publish_status(&st);
                    tracing::info!("持久化控制器已丢弃: project_id={}", self.inner.project_id);
                    return;
                }
            }
            notified.await;
        }
    }

    pub fn is_discarded(&self) -> bool {
        self.state().discarded
    }
}

impl ProjectChangePublisher for PersistenceController {
    fn publish(&self, event: ProjectChangeEvent) {
        tracing::debug!(
            "收到变更: project_id={}, kind={}",
            event.project_id(),
            event.kind.as_str()
        );
        self.schedule(event.snapshot);
    }
}
