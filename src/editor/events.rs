// ==========================================
// 变压器试验记录 - 编辑事件发布
// ==========================================
// 职责: 定义项目变更发布 trait，实现依赖倒置
// 说明: 编辑层定义 trait，持久化层实现（PersistenceController）
// ==========================================

use crate::domain::Project;
use std::sync::Arc;

// ==========================================
// 变更事件类型
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectChangeKind {
    TapRangeChanged,
    HeaderChanged,
    ResistanceSettingChanged,
    TapFieldChanged,
    TgDeltaRowAdded,
    TgDeltaRowRemoved,
    TgDeltaFieldChanged,
    InsulationRowAdded,
    InsulationRowRemoved,
    InsulationFieldChanged,
}

impl ProjectChangeKind {
    pub fn as_str(&self) -> &str {
        match self {
            ProjectChangeKind::TapRangeChanged => "TapRangeChanged",
            ProjectChangeKind::HeaderChanged => "HeaderChanged",
            ProjectChangeKind::ResistanceSettingChanged => "ResistanceSettingChanged",
            ProjectChangeKind::TapFieldChanged => "TapFieldChanged",
            ProjectChangeKind::TgDeltaRowAdded => "TgDeltaRowAdded",
            ProjectChangeKind::TgDeltaRowRemoved => "TgDeltaRowRemoved",
            ProjectChangeKind::TgDeltaFieldChanged => "TgDeltaFieldChanged",
            ProjectChangeKind::InsulationRowAdded => "InsulationRowAdded",
            ProjectChangeKind::InsulationRowRemoved => "InsulationRowRemoved",
            ProjectChangeKind::InsulationFieldChanged => "InsulationFieldChanged",
        }
    }
}

/// 项目变更事件，携带变更后的完整快照
#[derive(Debug, Clone)]
pub struct ProjectChangeEvent {
    pub kind: ProjectChangeKind,
    pub snapshot: Arc<Project>,
}

impl ProjectChangeEvent {
    pub fn new(kind: ProjectChangeKind, snapshot: Arc<Project>) -> Self {
        Self { kind, snapshot }
    }

    pub fn project_id(&self) -> &str {
        &self.snapshot.id
    }
}

// ==========================================
// 事件发布 Trait
// ==========================================

/// 项目变更发布者
///
/// 发布必须立即返回（不等待 I/O）；写入由实现方异步调度
pub trait ProjectChangePublisher: Send + Sync {
    fn publish(&self, event: ProjectChangeEvent);
}

/// 空操作发布者（单元测试或只读会话）
#[derive(Debug, Clone, Default)]
pub struct NoOpChangePublisher;

impl ProjectChangePublisher for NoOpChangePublisher {
    fn publish(&self, event: ProjectChangeEvent) {
        tracing::debug!(
            "NoOpChangePublisher: 跳过变更发布 - project_id={}, kind={}",
            event.project_id(),
            event.kind.as_str()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_carries_project_id() {
        let project = Arc::new(Project::new("P001".to_string(), "o".to_string(), 0, "75"));
        let event = ProjectChangeEvent::new(ProjectChangeKind::HeaderChanged, project);
        assert_eq!(event.project_id(), "P001");
        assert_eq!(event.kind.as_str(), "HeaderChanged");
    }

    #[test]
    fn test_noop_publisher() {
        let project = Arc::new(Project::new("P001".to_string(), "o".to_string(), 0, "75"));
        NoOpChangePublisher.publish(ProjectChangeEvent::new(
            ProjectChangeKind::TapRangeChanged,
            project,
        ));
    }
}
