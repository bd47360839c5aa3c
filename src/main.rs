// ==========================================
// 变压器试验记录 - 主入口
// ==========================================
// 职责: 初始化日志、打开数据库，列出某用户范围下的项目
// 环境变量:
//   TEST_SHEET_DB         数据库路径（缺省为用户数据目录）
//   TEST_SHEET_OWNER      用户范围（缺省 local）
//   TEST_SHEET_LOG_FORMAT json 时输出 JSON 行日志
// ==========================================

use anyhow::anyhow;
use transformer_test_sheet::app::{get_default_db_path, AppState};
use transformer_test_sheet::engine::TapRowGenerator;
use transformer_test_sheet::logging;

const OWNER_ENV: &str = "TEST_SHEET_OWNER";
const DEFAULT_OWNER: &str = "local";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match std::env::var("TEST_SHEET_LOG_FORMAT").as_deref() {
        Ok("json") => logging::init_json(),
        _ => logging::init(),
    }

    tracing::info!("==================================================");
    tracing::info!("{} v{}", transformer_test_sheet::APP_NAME, transformer_test_sheet::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path).map_err(|e| anyhow!(e))?;

    let owner = std::env::var(OWNER_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OWNER.to_string());

    let projects = state.project_api.list_projects(&owner).await?;
    tracing::info!("用户范围 {} 共有 {} 个项目", owner, projects.len());
    for project in &projects {
        tracing::info!(
            "  {} | 序列号={} | 客户={} | 分接行={} | TG行={} | 绝缘行={} | 最后修改={}",
            project.id,
            project.header_info.serial_number,
            project.header_info.client,
            TapRowGenerator::generate(project.tap_range).len(),
            project.tg_delta_data.len(),
            project.insulation_data.len(),
            project.last_modified.to_rfc3339()
        );
    }

    Ok(())
}
