// ==========================================
// 变压器试验记录 - 导出模型
// ==========================================
// 职责: 与渲染器无关的表格结构（有序行 × 有序单元格）
// 使用者: 表格文件渲染器 / 分页文档渲染器（外部协作方）
// ==========================================

use serde::Serialize;

/// 序列号缺失时的文件名占位
pub const SERIAL_FALLBACK: &str = "SN";

/// 单张导出表
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSheet {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportSheet {
    pub fn new(title: &str, header: Vec<String>) -> Self {
        Self {
            title: title.to_string(),
            header,
            rows: Vec::new(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }
}

/// 导出工作簿
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportWorkbook {
    /// 文件名主干: Ensayo_<serialNumber|SN>
    pub file_stem: String,
    /// 表头信息（标签, 值），供分页文档渲染
    pub header_block: Vec<(String, String)>,
    /// 固定顺序: TTR, Resistencia, TG Delta, Aislación
    pub sheets: Vec<ExportSheet>,
}

impl ExportWorkbook {
    /// 完整文件名
    pub fn file_name(&self, ext: &str) -> String {
        format!("{}.{}", self.file_stem, ext.trim_start_matches('.'))
    }

    pub fn sheet(&self, title: &str) -> Option<&ExportSheet> {
        self.sheets.iter().find(|s| s.title == title)
    }
}

/// 文件名中不允许出现的字符
const FORBIDDEN_FILE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// 文件名主干
///
/// # 规则
/// - 序列号非空 → Ensayo_<serialNumber>
/// - 否则 → Ensayo_SN
/// - 路径分隔符、保留字符与控制字符替换为 `_`，去掉开头的 `.`，
///   结果始终是单个文件名分量
pub fn file_stem(serial_number: &str) -> String {
    let sanitized: String = serial_number
        .trim()
        .chars()
        .map(|c| {
            if FORBIDDEN_FILE_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let serial = sanitized.trim_start_matches('.');
    if serial.is_empty() {
        format!("Ensayo_{}", SERIAL_FALLBACK)
    } else {
        format!("Ensayo_{}", serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        let wb = ExportWorkbook {
            file_stem: file_stem("T-1234"),
            header_block: Vec::new(),
            sheets: Vec::new(),
        };
        assert_eq!(wb.file_name("xlsx"), "Ensayo_T-1234.xlsx");
        assert_eq!(wb.file_name(".pdf"), "Ensayo_T-1234.pdf");
    }

    #[test]
    fn test_file_stem_fallback() {
        assert_eq!(file_stem(""), "Ensayo_SN");
        assert_eq!(file_stem("   "), "Ensayo_SN");
        assert_eq!(file_stem("..."), "Ensayo_SN");
    }

    #[test]
    fn test_file_stem_strips_path_components() {
        assert_eq!(file_stem("A/B"), "Ensayo_A_B");
        assert_eq!(file_stem("C:\\tmp\\x"), "Ensayo_C__tmp_x");
        assert_eq!(file_stem("a*b?c\"d<e>f|g"), "Ensayo_a_b_c_d_e_f_g");
        assert_eq!(file_stem("T-1\n2"), "Ensayo_T-1_2");

        let stem = file_stem("../../x");
        assert_eq!(stem, "Ensayo__.._x");
        assert!(!stem.contains('/'));
        assert!(!stem.contains('\\'));
    }
}
