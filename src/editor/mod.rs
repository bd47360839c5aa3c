// ==========================================
// 变压器试验记录 - 编辑层
// ==========================================
// 职责: 单项目编辑模型、行 ID 分配、项目列表视图
// 说明: 变更同步执行，持久化通过 ProjectChangePublisher 解耦
// ==========================================

pub mod events;
pub mod id_generator;
pub mod project_list;
pub mod project_model;

pub use events::{
    NoOpChangePublisher, ProjectChangeEvent, ProjectChangeKind, ProjectChangePublisher,
};
pub use id_generator::RowIdGenerator;
pub use project_list::ProjectListView;
pub use project_model::ProjectModel;
