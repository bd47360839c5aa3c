// ==========================================
// 变压器试验记录 - 导出映射器
// ==========================================
// 职责: 项目快照 + 派生值 → 四张固定表
// 红线: 只调用 engine 的派生/判定函数，不自行计算，保证导出与界面一致
// 红线: 表名、列顺序为固定契约
//   TTR         → 分接, 变比%, 额定变比, 3×(相测量值, 偏差%)
//   Resistencia → 分接, 3×(测量温度下电阻, 参考温度修正电阻)
//   TG Delta    → 模式, 注入, 测量, 保护, 试验电压, tg%, 电容
//   Aislación   → 注入, 测量, 保护, 11 个定时读数, DAR, PI, IP 判定
// ==========================================

use crate::domain::{Project, TimedReading};
use crate::engine::classification::classify_polarization_index;
use crate::engine::derivation::{
    deviation_percent, dielectric_absorption_ratio, polarization_index, resistance_corrected,
};
use crate::engine::numeric::{format_default, PLACEHOLDER};
use crate::engine::tap_rows::TapRowGenerator;
use crate::export::model::{file_stem, ExportSheet, ExportWorkbook};

pub const SHEET_TTR: &str = "TTR";
pub const SHEET_RESISTANCE: &str = "Resistencia";
pub const SHEET_TG_DELTA: &str = "TG Delta";
pub const SHEET_INSULATION: &str = "Aislación";

const PHASE_NAMES: [&str; 3] = ["A", "B", "C"];

pub struct ExportMapper;

impl ExportMapper {
    /// 生成完整工作簿
    pub fn map(project: &Project) -> ExportWorkbook {
        ExportWorkbook {
            file_stem: file_stem(&project.header_info.serial_number),
            header_block: Self::header_block(project),
            sheets: vec![
                Self::ttr_sheet(project),
                Self::resistance_sheet(project),
                Self::tg_delta_sheet(project),
                Self::insulation_sheet(project),
            ],
        }
    }

    fn header_block(project: &Project) -> Vec<(String, String)> {
        let h = &project.header_info;
        [
            ("N° de fabricación", &h.manufacturing_number),
            ("N° de serie", &h.serial_number),
            ("Cliente", &h.client),
            ("Fecha", &h.date),
        ]
        .into_iter()
        .map(|(label, value)| (label.to_string(), value.clone()))
        .collect()
    }

    // ==========================================
    // TTR - 变比
    // ==========================================
    pub fn ttr_sheet(project: &Project) -> ExportSheet {
        let mut header = vec![
            "Tap".to_string(),
            "Relación %".to_string(),
            "Relación nominal".to_string(),
        ];
        for phase in PHASE_NAMES {
            header.push(format!("Fase {}", phase));
            header.push(format!("Desv. {} (%)", phase));
        }

        let mut sheet = ExportSheet::new(SHEET_TTR, header);
        for tap in TapRowGenerator::generate(project.tap_range) {
            let data = project.tap_data(&tap.id);
            let mut row = vec![tap.label, data.ratio_percent.clone(), data.rated_ratio.clone()];
            for measured in data.phases() {
                row.push(measured.to_string());
                row.push(format_default(deviation_percent(measured, &data.rated_ratio)));
            }
            sheet.rows.push(row);
        }
        sheet
    }

    // ==========================================
    // Resistencia - 绕组电阻
    // ==========================================
    pub fn resistance_sheet(project: &Project) -> ExportSheet {
        let settings = &project.resistance_settings;
        let measured_temp = Self::or_placeholder(&settings.measured_temp);
        let ref_temp = Self::or_placeholder(&settings.ref_temp);

        let mut header = vec!["Tap".to_string()];
        for name in settings.connection_names() {
            header.push(format!("{} med. ({} °C)", name, measured_temp));
            header.push(format!("{} corr. ({} °C)", name, ref_temp));
        }

        let mut sheet = ExportSheet::new(SHEET_RESISTANCE, header);
        for tap in TapRowGenerator::generate(project.tap_range) {
            let data = project.tap_data(&tap.id);
            let mut row = vec![tap.label];
            for measured in data.resistances() {
                row.push(measured.to_string());
                row.push(format_default(resistance_corrected(
                    measured,
                    &settings.measured_temp,
                    &settings.ref_temp,
                )));
            }
            sheet.rows.push(row);
        }
        sheet
    }

    // ==========================================
    // TG Delta - 介损
    // ==========================================
    pub fn tg_delta_sheet(project: &Project) -> ExportSheet {
        let header = [
            "Modo",
            "Inyección",
            "Medición",
            "Guarda",
            "Tensión de ensayo (kV)",
            "Tg δ (%)",
            "Capacitancia (pF)",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let mut sheet = ExportSheet::new(SHEET_TG_DELTA, header);
        sheet.rows = project
            .tg_delta_data
            .iter()
            .map(|row| {
                vec![
                    row.mode.label().to_string(),
                    row.injection.label().to_string(),
                    row.measurement.clone(),
                    row.guard.clone(),
                    row.test_voltage.clone(),
                    row.tg_percent.clone(),
                    row.capacitance.clone(),
                ]
            })
            .collect();
        sheet
    }

    // ==========================================
    // Aislación - 绝缘电阻
    // ==========================================
    pub fn insulation_sheet(project: &Project) -> ExportSheet {
        let mut header: Vec<String> = ["Inyección", "Medición", "Guarda"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        header.extend(TimedReading::ALL.iter().map(|r| r.label().to_string()));
        header.extend(["DAR", "PI", "Estado IP"].iter().map(|s| s.to_string()));

        let mut sheet = ExportSheet::new(SHEET_INSULATION, header);
        sheet.rows = project
            .insulation_data
            .iter()
            .map(|row| {
                let mut cells = vec![
                    row.injection.label().to_string(),
                    row.measurement.clone(),
                    row.guard.clone(),
                ];
                cells.extend(TimedReading::ALL.iter().map(|r| row.reading(*r).to_string()));

                let dar = dielectric_absorption_ratio(&row.val_1m, &row.val_30s);
                let pi = polarization_index(&row.val_10m, &row.val_1m);
                cells.push(format_default(dar));
                cells.push(format_default(pi));
                cells.push(classify_polarization_index(pi).label.to_string());
                cells
            })
            .collect();
        sheet
    }

    fn or_placeholder(text: &str) -> &str {
        if text.trim().is_empty() {
            PLACEHOLDER
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{InsulationRow, RowId, TapRowData, TapRowId, TgDeltaRow, TgMode};

    fn sample_project() -> Project {
        let mut project = Project::new("P1".to_string(), "o".to_string(), 1, "75");
        project.resistance_settings.measured_temp = "20".to_string();
        project.data.insert(
            TapRowId::for_position(0),
            TapRowData {
                rated_ratio: "100".to_string(),
                phase_a: "100,5".to_string(),
                phase_b: "101".to_string(),
                res_conn1_meas: "10".to_string(),
                ..TapRowData::default()
            },
        );
        project
    }

    #[test]
    fn test_sheet_titles_and_order() {
        let wb = ExportMapper::map(&sample_project());
        let titles: Vec<&str> = wb.sheets.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["TTR", "Resistencia", "TG Delta", "Aislación"]);
        assert_eq!(wb.file_name("xlsx"), "Ensayo_SN.xlsx");
    }

    #[test]
    fn test_ttr_sheet_values() {
        let sheet = ExportMapper::ttr_sheet(&sample_project());
        assert_eq!(sheet.column_count(), 9);
        assert_eq!(sheet.rows.len(), 3);

        let nominal = &sheet.rows[1];
        assert_eq!(nominal[0], "0 (Nominal)");
        assert_eq!(nominal[2], "100");
        assert_eq!(nominal[3], "100,5");
        assert_eq!(nominal[4], "0,500");
        assert_eq!(nominal[6], "1,000");
        // 相 C 未测量
        assert_eq!(nominal[7], "");
        assert_eq!(nominal[8], "-");

        // 未编辑的分接行
        assert_eq!(sheet.rows[0][0], "+1");
        assert_eq!(sheet.rows[0][4], "-");
    }

    #[test]
    fn test_resistance_sheet_values() {
        let sheet = ExportMapper::resistance_sheet(&sample_project());
        assert_eq!(sheet.header[1], "H1-H2 med. (20 °C)");
        assert_eq!(sheet.header[2], "H1-H2 corr. (75 °C)");
        assert_eq!(sheet.column_count(), 7);

        let nominal = &sheet.rows[1];
        assert_eq!(nominal[1], "10");
        assert_eq!(nominal[2], "12,157");
        assert_eq!(nominal[4], "-");
    }

    #[test]
    fn test_tg_delta_sheet_follows_collection_order() {
        let mut project = sample_project();
        for (i, id) in ["x", "y", "z"].iter().enumerate() {
            let mut row = TgDeltaRow::empty(RowId::from(*id));
            row.measurement = format!("M{}", i);
            row.mode = TgMode::Ust;
            project.tg_delta_data.push(row);
        }
        project.tg_delta_data.remove(1);

        let sheet = ExportMapper::tg_delta_sheet(&project);
        assert_eq!(sheet.column_count(), 7);
        assert_eq!(sheet.rows.len(), 2);
        assert_eq!(sheet.rows[0][2], "M0");
        assert_eq!(sheet.rows[1][2], "M2");
        assert_eq!(sheet.rows[0][0], "UST");
    }

    #[test]
    fn test_insulation_sheet_indices() {
        let mut project = sample_project();
        let mut row = InsulationRow::empty(RowId::from("r1"));
        row.val_30s = "1".to_string();
        row.val_1m = "2".to_string();
        row.val_10m = "5".to_string();
        project.insulation_data.push(row);
        project.insulation_data.push(InsulationRow::empty(RowId::from("r2")));

        let sheet = ExportMapper::insulation_sheet(&project);
        assert_eq!(sheet.column_count(), 17);
        assert_eq!(sheet.header[3], "30 s");
        assert_eq!(sheet.header[13], "10 min");

        let first = &sheet.rows[0];
        assert_eq!(first[14], "2,000");
        assert_eq!(first[15], "2,500");
        assert_eq!(first[16], "ACEPTABLE");

        let empty = &sheet.rows[1];
        assert_eq!(empty[14], "-");
        assert_eq!(empty[15], "-");
        assert_eq!(empty[16], "-");
    }

    #[test]
    fn test_header_block() {
        let mut project = sample_project();
        project.header_info.serial_number = "T-99".to_string();
        let wb = ExportMapper::map(&project);
        assert_eq!(wb.file_stem, "Ensayo_T-99");
        assert_eq!(wb.header_block[1], ("N° de serie".to_string(), "T-99".to_string()));
    }
}
