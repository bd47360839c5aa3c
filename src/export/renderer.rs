// ==========================================
// 变压器试验记录 - 导出渲染器
// ==========================================
// 职责: 渲染器接口 + CSV 渲染实现
// 说明: 表格文件 / 分页文档渲染器为外部协作方，实现同一 trait 即可接入
// ==========================================

use crate::export::error::{ExportError, ExportResult};
use crate::export::model::{ExportSheet, ExportWorkbook};
use csv::WriterBuilder;
use std::fs::File;
use std::path::{Path, PathBuf};

// ==========================================
// ExportRenderer Trait
// ==========================================
pub trait ExportRenderer: Send + Sync {
    /// 将工作簿渲染到输出目录
    ///
    /// # 返回
    /// - Ok(Vec<PathBuf>): 生成的文件列表
    fn render(&self, workbook: &ExportWorkbook, output_dir: &Path) -> ExportResult<Vec<PathBuf>>;
}

// ==========================================
// CsvRenderer - 每张表一个 CSV 文件
// ==========================================
// 文件名: <file_stem>_<sheet title>.csv
#[derive(Debug, Clone)]
pub struct CsvRenderer {
    delimiter: u8,
}

impl Default for CsvRenderer {
    /// 逗号小数环境下以分号分隔
    fn default() -> Self {
        Self { delimiter: b';' }
    }
}

impl CsvRenderer {
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    fn write_sheet(&self, sheet: &ExportSheet, path: &Path) -> ExportResult<()> {
        let file = File::create(path)?;
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .flexible(false)
            .from_writer(file);

        writer.write_record(&sheet.header)?;
        for row in &sheet.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl ExportRenderer for CsvRenderer {
    fn render(&self, workbook: &ExportWorkbook, output_dir: &Path) -> ExportResult<Vec<PathBuf>> {
        if !output_dir.is_dir() {
            return Err(ExportError::OutputDirNotFound(
                output_dir.display().to_string(),
            ));
        }

        let mut written = Vec::with_capacity(workbook.sheets.len());
        for sheet in &workbook.sheets {
            let name = format!("{}_{}.csv", workbook.file_stem, sheet.title.replace(' ', "_"));
            let path = output_dir.join(name);
            self.write_sheet(sheet, &path)?;
            tracing::debug!("导出表已写入: {}", path.display());
            written.push(path);
        }

        tracing::info!(
            "CSV 导出完成: file_stem={}, sheets={}",
            workbook.file_stem,
            written.len()
        );
        Ok(written)
    }
}
