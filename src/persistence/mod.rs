// ==========================================
// 变压器试验记录 - 持久化层
// ==========================================
// 职责: 防抖提交状态机，将编辑后的快照写入外部仓储
// 说明: 变更 API 不等待写入（fire-and-forget），唯一异步边界为计时器与仓储调用
// ==========================================

pub mod controller;
pub mod error;

pub use controller::{CommitPhase, PersistenceController, SaveStatus, DEFAULT_QUIET_PERIOD};
pub use error::{PersistenceError, PersistenceResult};
