// ==========================================
// 变压器试验记录 - 核心库
// ==========================================
// 职责: 验收试验记录表的状态模型、计算规则、自动保存与导出映射
// 技术栈: Rust + tokio + SQLite
// 分层: domain → engine → editor → persistence → repository → export → api
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 项目快照与字段类型
pub mod domain;

// 引擎层 - 数值解析、分接行、派生值、判定
pub mod engine;

// 编辑层 - 字段级变更与项目列表
pub mod editor;

// 持久化层 - 防抖提交状态机
pub mod persistence;

// 数据仓储层 - 数据访问
pub mod repository;

// 导出层 - 表格映射与渲染
pub mod export;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    Confirmation, HeaderField, Injection, InsulationField, InsulationRow, Project,
    ResistanceSetting, RowId, TapField, TapRowData, TapRowId, TgDeltaField, TgDeltaRow, TgMode,
    TimedReading,
};

// 引擎
pub use engine::{Classification, MeasurementStatus, TapRow, TapRowGenerator};

// 编辑 / 持久化
pub use editor::{ProjectListView, ProjectModel};
pub use persistence::{CommitPhase, PersistenceController, SaveStatus};

// API
pub use api::{ApiError, ApiResult, ProjectApi, ProjectSession};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "变压器试验记录";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
