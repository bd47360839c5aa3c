// ==========================================
// 变压器试验记录 - 项目列表视图
// ==========================================
// 职责: 接收仓储订阅推送的完整列表，按 lastModified 倒序排列
// 规则: 每次推送即为新的真值；唯一例外是当前打开编辑的项目，
//       其本地快照优先（本地编辑可能尚未提交）
// ==========================================

use crate::domain::Project;
use std::sync::Arc;

#[derive(Debug, Default)]
pub struct ProjectListView {
    projects: Vec<Arc<Project>>,
    open: Option<Arc<Project>>,
}

impl ProjectListView {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前列表（lastModified 倒序）
    pub fn projects(&self) -> &[Arc<Project>] {
        &self.projects
    }

    pub fn open_project_id(&self) -> Option<&str> {
        self.open.as_ref().map(|p| p.id.as_str())
    }

    /// 应用一次订阅推送
    ///
    /// # 规则
    /// - 推送列表整体替换本地列表
    /// - 打开中的项目若在推送中出现，以本地快照替代；
    ///   推送的 lastModified 更新时沿用推送值（本地快照不含提交时间戳）
    /// - 打开中的项目若不在推送中（已被删除），不再显示
    pub fn apply_delivery(&mut self, delivered: Vec<Project>) {
        let mut projects: Vec<Arc<Project>> = Vec::with_capacity(delivered.len());
        for project in delivered {
            match self.open.take() {
                Some(local) if local.id == project.id => {
                    let merged = with_newer_stamp(local, &project);
                    projects.push(Arc::clone(&merged));
                    self.open = Some(merged);
                }
                other => {
                    self.open = other;
                    projects.push(Arc::new(project));
                }
            }
        }
        Self::sort(&mut projects);
        tracing::debug!("项目列表已刷新: count={}", projects.len());
        self.projects = projects;
    }

    /// 标记某项目为打开编辑（并以本地快照乐观更新列表）
    pub fn set_open(&mut self, snapshot: Arc<Project>) {
        self.upsert_local(Arc::clone(&snapshot));
        self.open = Some(snapshot);
    }

    /// 打开中项目的本地快照更新（保留已知的较新 lastModified）
    pub fn update_open(&mut self, snapshot: Arc<Project>) {
        let current = match &self.open {
            Some(current) if current.id == snapshot.id => Arc::clone(current),
            _ => return,
        };
        self.set_open(with_newer_stamp(snapshot, &current));
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    /// 乐观插入（如新建项目，在仓储推送到达之前显示）
    pub fn upsert_local(&mut self, snapshot: Arc<Project>) {
        match self.projects.iter_mut().find(|p| p.id == snapshot.id) {
            Some(slot) => *slot = snapshot,
            None => self.projects.push(snapshot),
        }
        Self::sort(&mut self.projects);
    }

    /// 乐观删除
    pub fn remove_local(&mut self, project_id: &str) {
        self.projects.retain(|p| p.id != project_id);
        if self.open_project_id() == Some(project_id) {
            self.open = None;
        }
    }

    fn sort(projects: &mut [Arc<Project>]) {
        projects.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
    }
}

/// 以 `snapshot` 的内容为准，lastModified 取两者中较新者
fn with_newer_stamp(snapshot: Arc<Project>, other: &Project) -> Arc<Project> {
    if other.last_modified <= snapshot.last_modified {
        return snapshot;
    }
    let mut merged = (*snapshot).clone();
    merged.last_modified = other.last_modified;
    Arc::new(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn project(id: &str, minutes_ago: i64) -> Project {
        let mut p = Project::new(id.to_string(), "o".to_string(), 0, "75");
        p.last_modified = Utc::now() - Duration::minutes(minutes_ago);
        p
    }

    fn ids(view: &ProjectListView) -> Vec<&str> {
        view.projects().iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn test_delivery_sorted_desc() {
        let mut view = ProjectListView::new();
        view.apply_delivery(vec![project("a", 30), project("b", 5), project("c", 60)]);
        assert_eq!(ids(&view), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_delivery_supersedes_local_view() {
        let mut view = ProjectListView::new();
        view.upsert_local(Arc::new(project("local-only", 0)));
        view.apply_delivery(vec![project("a", 10)]);
        assert_eq!(ids(&view), vec!["a"]);
    }

    #[test]
    fn test_open_project_keeps_local_snapshot() {
        let mut view = ProjectListView::new();
        let mut local = project("a", 0);
        local.header_info.client = "local edit".to_string();
        view.set_open(Arc::new(local));

        let mut remote = project("a", 50);
        remote.header_info.client = "stale".to_string();
        view.apply_delivery(vec![remote, project("b", 10)]);

        assert_eq!(ids(&view), vec!["a", "b"]);
        assert_eq!(view.projects()[0].header_info.client, "local edit");
    }

    #[test]
    fn test_open_project_takes_newer_delivered_stamp() {
        let mut view = ProjectListView::new();
        let mut local = project("a", 60);
        local.header_info.client = "local edit".to_string();
        view.set_open(Arc::new(local));

        // 本地编辑已提交，推送带回提交时的时间戳
        let committed = project("a", 1);
        let committed_at = committed.last_modified;
        view.apply_delivery(vec![project("b", 30), committed]);

        assert_eq!(ids(&view), vec!["a", "b"]);
        assert_eq!(view.projects()[0].last_modified, committed_at);
        assert_eq!(view.projects()[0].header_info.client, "local edit");

        // 后续本地编辑不回退时间戳
        let mut next = project("a", 60);
        next.header_info.client = "second edit".to_string();
        view.update_open(Arc::new(next));
        assert_eq!(ids(&view), vec!["a", "b"]);
        assert_eq!(view.projects()[0].last_modified, committed_at);
        assert_eq!(view.projects()[0].header_info.client, "second edit");
    }

    #[test]
    fn test_remove_local_closes_open() {
        let mut view = ProjectListView::new();
        view.set_open(Arc::new(project("a", 0)));
        view.remove_local("a");
        assert!(view.projects().is_empty());
        assert_eq!(view.open_project_id(), None);
    }
}
