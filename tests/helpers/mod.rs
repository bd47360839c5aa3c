// ==========================================
// 测试辅助模块
// ==========================================
// 职责: 临时数据库、内存仓储、测试项目构造
// ==========================================

#![allow(dead_code)]

pub mod memory_repo;

use std::error::Error;
use tempfile::NamedTempFile;
use transformer_test_sheet::domain::Project;
use transformer_test_sheet::logging;

pub use memory_repo::MemoryProjectRepository;

/// 初始化测试日志（debug 级别，输出随测试捕获；重复调用无副作用）
pub fn init_logging() {
    logging::init_test();
}

/// 创建临时测试数据库路径
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    init_logging();
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是有效 UTF-8")?
        .to_string();
    Ok((temp_file, db_path))
}

/// 构造测试项目
pub fn test_project(id: &str, owner: &str) -> Project {
    Project::new(id.to_string(), owner.to_string(), 2, "75")
}
