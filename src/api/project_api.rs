// ==========================================
// 变压器试验记录 - 项目 API
// ==========================================
// 职责: 项目生命周期（创建、打开、删除、列表订阅）与导出入口
// 说明: 打开项目时将编辑模型与持久化控制器接线，编辑即自动保存
// ==========================================

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::stream::{BoxStream, StreamExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::config::SheetConfig;
use crate::domain::{Confirmation, Project};
use crate::editor::{ProjectChangePublisher, ProjectModel};
use crate::export::{CsvRenderer, ExportMapper, ExportRenderer, ExportWorkbook};
use crate::persistence::{PersistenceController, PersistenceError, PersistenceResult};
use crate::repository::ProjectRepository;

// ==========================================
// ProjectSession - 打开中的项目
// ==========================================

/// 一个打开编辑的项目：编辑模型 + 其专属持久化控制器
pub struct ProjectSession {
    pub model: ProjectModel,
    pub persistence: PersistenceController,
}

impl ProjectSession {
    pub fn project_id(&self) -> &str {
        self.model.project_id()
    }

    /// 关闭会话：立即提交尚未写入的变更
    pub async fn close(self) -> PersistenceResult<()> {
        debug!("关闭项目会话: project_id={}", self.project_id());
        self.persistence.flush().await
    }
}

// ==========================================
// ProjectApi
// ==========================================
pub struct ProjectApi {
    repo: Arc<dyn ProjectRepository>,
    config: SheetConfig,
    renderer: CsvRenderer,
    /// 已打开项目的持久化控制器（删除项目时需先丢弃；同一项目可被多次打开）
    open: Mutex<HashMap<String, Vec<PersistenceController>>>,
}

impl ProjectApi {
    /// 创建新的ProjectApi实例
    ///
    /// # 参数
    /// - repo: 项目仓储
    /// - config: 新项目默认值与防抖静默期
    pub fn new(repo: Arc<dyn ProjectRepository>, config: SheetConfig) -> Self {
        Self {
            repo,
            config,
            renderer: CsvRenderer::default(),
            open: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    fn open_controllers(&self) -> MutexGuard<'_, HashMap<String, Vec<PersistenceController>>> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ==========================================
    // 生命周期
    // ==========================================

    /// 创建空项目并立即写入仓储
    ///
    /// # 参数
    /// - owner_id: 用户范围（不能为空）
    pub async fn create_project(&self, owner_id: &str) -> ApiResult<Project> {
        let owner_id = owner_id.trim();
        if owner_id.is_empty() {
            return Err(ApiError::InvalidInput("用户范围不能为空".to_string()));
        }

        let project = Project::new(
            Uuid::new_v4().to_string(),
            owner_id.to_string(),
            self.config.default_tap_range,
            &self.config.default_ref_temp,
        );
        self.repo.put(&project).await?;

        info!(
            "项目已创建: project_id={}, owner_id={}, tap_range={}",
            project.id, project.owner_id, project.tap_range
        );
        Ok(project)
    }

    /// 读取单个项目
    pub async fn get_project(&self, project_id: &str) -> ApiResult<Project> {
        self.repo
            .get(project_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Project(id={})不存在", project_id)))
    }

    /// 打开项目进行编辑
    ///
    /// # 返回
    /// - ProjectSession: 编辑模型的每次有效变更都会调度一次防抖写入
    pub async fn open_project(&self, project_id: &str) -> ApiResult<ProjectSession> {
        let project = self.get_project(project_id).await?;
        let persistence = PersistenceController::new(
            project.id.clone(),
            Arc::clone(&self.repo),
            self.config.debounce,
        );
        let publisher: Arc<dyn ProjectChangePublisher> = Arc::new(persistence.clone());
        let model = ProjectModel::new(project, publisher);
        self.open_controllers()
            .entry(model.project_id().to_string())
            .or_default()
            .push(persistence.clone());

        info!("项目已打开: project_id={}", project_id);
        Ok(ProjectSession { model, persistence })
    }

    /// 删除项目（需用户确认）
    ///
    /// # 返回
    /// - Ok(true): 已删除
    /// - Ok(false): 项目不存在
    /// - Err(NotConfirmed): 用户未确认，不做任何操作
    ///
    /// 项目若已打开，先丢弃其持久化控制器，待提交的写入不会在删除后重新写回
    pub async fn delete_project(
        &self,
        project_id: &str,
        confirmation: Confirmation,
    ) -> ApiResult<bool> {
        if !confirmation.is_confirmed() {
            debug!("删除未确认，忽略: project_id={}", project_id);
            return Err(ApiError::NotConfirmed(format!(
                "删除项目 project_id={}",
                project_id
            )));
        }

        let controllers = self.open_controllers().remove(project_id).unwrap_or_default();
        for controller in controllers {
            controller.discard().await;
        }

        let deleted = self.repo.delete(project_id).await?;
        if !deleted {
            warn!("删除的项目不存在: project_id={}", project_id);
        }
        Ok(deleted)
    }

    // ==========================================
    // 列表
    // ==========================================

    /// 某用户的项目列表（lastModified 倒序）
    pub async fn list_projects(&self, owner_id: &str) -> ApiResult<Vec<Project>> {
        let mut projects = self.repo.list_by_owner(owner_id).await?;
        projects.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
        Ok(projects)
    }

    /// 订阅某用户的项目列表（每次推送为完整列表，顺序由调用方整理）
    pub fn watch_projects(
        &self,
        owner_id: &str,
    ) -> BoxStream<'static, PersistenceResult<Vec<Project>>> {
        let owner = owner_id.to_string();
        self.repo
            .subscribe(owner_id)
            .map(move |delivery| {
                delivery.map_err(|source| PersistenceError::SubscriptionFailed {
                    owner_id: owner.clone(),
                    source,
                })
            })
            .boxed()
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 生成与渲染器无关的导出工作簿
    pub fn export_workbook(&self, project: &Project) -> ExportWorkbook {
        ExportMapper::map(project)
    }

    /// 导出为 CSV 文件（每张表一个文件）
    pub fn render_csv(&self, project: &Project, output_dir: &Path) -> ApiResult<Vec<PathBuf>> {
        let workbook = self.export_workbook(project);
        Ok(self.renderer.render(&workbook, output_dir)?)
    }
}
