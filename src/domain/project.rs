// ==========================================
// 变压器试验记录 - 项目聚合 (Project)
// ==========================================
// 职责: 单个试验项目的完整快照（表头、设置、四张测量表）
// 红线: 行标识一经分配不可变更；内容可变，身份不可变
// ==========================================

use crate::domain::types::{
    HeaderField, Injection, InsulationField, ResistanceSetting, RowId, TapField, TapRowId,
    TgDeltaField, TgMode, TimedReading,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 分接范围上限（±16 档）
pub const MAX_TAP_RANGE: u8 = 16;

// ==========================================
// Project - 项目快照
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// 项目 ID（创建后不可变）
    pub id: String,
    /// 所属用户范围（订阅按此过滤）
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
    /// 每次提交写入时刷新
    pub last_modified: DateTime<Utc>,
    /// 分接范围 N，行数 = 2N+1
    pub tap_range: u8,
    #[serde(default)]
    pub header_info: HeaderInfo,
    #[serde(default)]
    pub resistance_settings: ResistanceSettings,
    /// 分接行数据，缺省键 ≡ 全部字段为空
    #[serde(default)]
    pub data: BTreeMap<TapRowId, TapRowData>,
    #[serde(default)]
    pub tg_delta_data: Vec<TgDeltaRow>,
    #[serde(default)]
    pub insulation_data: Vec<InsulationRow>,
}

impl Project {
    /// 创建空项目
    pub fn new(id: String, owner_id: String, tap_range: u8, ref_temp: &str) -> Self {
        let now = Utc::now();
        Self {
            id,
            owner_id,
            created_at: now,
            last_modified: now,
            tap_range: tap_range.min(MAX_TAP_RANGE),
            header_info: HeaderInfo::default(),
            resistance_settings: ResistanceSettings {
                ref_temp: ref_temp.to_string(),
                ..ResistanceSettings::default()
            },
            data: BTreeMap::new(),
            tg_delta_data: Vec::new(),
            insulation_data: Vec::new(),
        }
    }

    /// 读取分接行数据（缺省时返回空行）
    pub fn tap_data(&self, row_id: &TapRowId) -> TapRowData {
        self.data.get(row_id).cloned().unwrap_or_default()
    }

    pub fn tg_delta_row(&self, id: &RowId) -> Option<&TgDeltaRow> {
        self.tg_delta_data.iter().find(|row| &row.id == id)
    }

    pub fn insulation_row(&self, id: &RowId) -> Option<&InsulationRow> {
        self.insulation_data.iter().find(|row| &row.id == id)
    }
}

// ==========================================
// HeaderInfo - 表头信息
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderInfo {
    pub manufacturing_number: String,
    pub serial_number: String,
    pub client: String,
    pub date: String,
}

impl HeaderInfo {
    pub fn get(&self, field: HeaderField) -> &str {
        match field {
            HeaderField::ManufacturingNumber => &self.manufacturing_number,
            HeaderField::SerialNumber => &self.serial_number,
            HeaderField::Client => &self.client,
            HeaderField::Date => &self.date,
        }
    }

    pub fn slot_mut(&mut self, field: HeaderField) -> &mut String {
        match field {
            HeaderField::ManufacturingNumber => &mut self.manufacturing_number,
            HeaderField::SerialNumber => &mut self.serial_number,
            HeaderField::Client => &mut self.client,
            HeaderField::Date => &mut self.date,
        }
    }
}

// ==========================================
// ResistanceSettings - 绕组电阻设置
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResistanceSettings {
    /// 测量温度 (°C)，逗号小数文本
    pub measured_temp: String,
    /// 参考温度 (°C)，逗号小数文本
    pub ref_temp: String,
    pub conn1_name: String,
    pub conn2_name: String,
    pub conn3_name: String,
}

impl Default for ResistanceSettings {
    fn default() -> Self {
        Self {
            measured_temp: String::new(),
            ref_temp: "75".to_string(),
            conn1_name: "H1-H2".to_string(),
            conn2_name: "H2-H3".to_string(),
            conn3_name: "H3-H1".to_string(),
        }
    }
}

impl ResistanceSettings {
    pub fn get(&self, field: ResistanceSetting) -> &str {
        match field {
            ResistanceSetting::MeasuredTemp => &self.measured_temp,
            ResistanceSetting::RefTemp => &self.ref_temp,
            ResistanceSetting::Conn1Name => &self.conn1_name,
            ResistanceSetting::Conn2Name => &self.conn2_name,
            ResistanceSetting::Conn3Name => &self.conn3_name,
        }
    }

    pub fn slot_mut(&mut self, field: ResistanceSetting) -> &mut String {
        match field {
            ResistanceSetting::MeasuredTemp => &mut self.measured_temp,
            ResistanceSetting::RefTemp => &mut self.ref_temp,
            ResistanceSetting::Conn1Name => &mut self.conn1_name,
            ResistanceSetting::Conn2Name => &mut self.conn2_name,
            ResistanceSetting::Conn3Name => &mut self.conn3_name,
        }
    }

    /// 三个连接名称（作为导出列标题复用）
    pub fn connection_names(&self) -> [&str; 3] {
        [&self.conn1_name, &self.conn2_name, &self.conn3_name]
    }
}

// ==========================================
// TapRowData - 分接行数据
// ==========================================
// 空文本 ≡ 未测量
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TapRowData {
    pub ratio_percent: String,
    pub rated_ratio: String,
    pub phase_a: String,
    pub phase_b: String,
    pub phase_c: String,
    pub res_conn1_meas: String,
    pub res_conn2_meas: String,
    pub res_conn3_meas: String,
}

impl TapRowData {
    pub fn get(&self, field: TapField) -> &str {
        match field {
            TapField::RatioPercent => &self.ratio_percent,
            TapField::RatedRatio => &self.rated_ratio,
            TapField::PhaseA => &self.phase_a,
            TapField::PhaseB => &self.phase_b,
            TapField::PhaseC => &self.phase_c,
            TapField::ResConn1Meas => &self.res_conn1_meas,
            TapField::ResConn2Meas => &self.res_conn2_meas,
            TapField::ResConn3Meas => &self.res_conn3_meas,
        }
    }

    pub fn slot_mut(&mut self, field: TapField) -> &mut String {
        match field {
            TapField::RatioPercent => &mut self.ratio_percent,
            TapField::RatedRatio => &mut self.rated_ratio,
            TapField::PhaseA => &mut self.phase_a,
            TapField::PhaseB => &mut self.phase_b,
            TapField::PhaseC => &mut self.phase_c,
            TapField::ResConn1Meas => &mut self.res_conn1_meas,
            TapField::ResConn2Meas => &mut self.res_conn2_meas,
            TapField::ResConn3Meas => &mut self.res_conn3_meas,
        }
    }

    /// 三相测量值
    pub fn phases(&self) -> [&str; 3] {
        [&self.phase_a, &self.phase_b, &self.phase_c]
    }

    /// 三个连接的电阻测量值
    pub fn resistances(&self) -> [&str; 3] {
        [&self.res_conn1_meas, &self.res_conn2_meas, &self.res_conn3_meas]
    }
}

// ==========================================
// TgDeltaRow - 介损 (tan δ) 测量行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TgDeltaRow {
    pub id: RowId,
    #[serde(default)]
    pub mode: TgMode,
    #[serde(default)]
    pub injection: Injection,
    #[serde(default)]
    pub measurement: String,
    #[serde(default)]
    pub guard: String,
    #[serde(default)]
    pub test_voltage: String,
    #[serde(default)]
    pub tg_percent: String,
    #[serde(default)]
    pub capacitance: String,
}

impl TgDeltaRow {
    pub fn empty(id: RowId) -> Self {
        Self {
            id,
            mode: TgMode::Unset,
            injection: Injection::Unset,
            measurement: String::new(),
            guard: String::new(),
            test_voltage: String::new(),
            tg_percent: String::new(),
            capacitance: String::new(),
        }
    }

    /// 文本字段槽位（枚举字段返回 None）
    pub fn text_slot_mut(&mut self, field: TgDeltaField) -> Option<&mut String> {
        match field {
            TgDeltaField::Measurement => Some(&mut self.measurement),
            TgDeltaField::Guard => Some(&mut self.guard),
            TgDeltaField::TestVoltage => Some(&mut self.test_voltage),
            TgDeltaField::TgPercent => Some(&mut self.tg_percent),
            TgDeltaField::Capacitance => Some(&mut self.capacitance),
            TgDeltaField::Mode | TgDeltaField::Injection => None,
        }
    }
}

// ==========================================
// InsulationRow - 绝缘电阻测量行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsulationRow {
    pub id: RowId,
    #[serde(default)]
    pub injection: Injection,
    #[serde(default)]
    pub measurement: String,
    #[serde(default)]
    pub guard: String,
    #[serde(default)]
    pub val_30s: String,
    #[serde(default)]
    pub val_1m: String,
    #[serde(default)]
    pub val_2m: String,
    #[serde(default)]
    pub val_3m: String,
    #[serde(default)]
    pub val_4m: String,
    #[serde(default)]
    pub val_5m: String,
    #[serde(default)]
    pub val_6m: String,
    #[serde(default)]
    pub val_7m: String,
    #[serde(default)]
    pub val_8m: String,
    #[serde(default)]
    pub val_9m: String,
    #[serde(default)]
    pub val_10m: String,
}

impl InsulationRow {
    pub fn empty(id: RowId) -> Self {
        Self {
            id,
            injection: Injection::Unset,
            measurement: String::new(),
            guard: String::new(),
            val_30s: String::new(),
            val_1m: String::new(),
            val_2m: String::new(),
            val_3m: String::new(),
            val_4m: String::new(),
            val_5m: String::new(),
            val_6m: String::new(),
            val_7m: String::new(),
            val_8m: String::new(),
            val_9m: String::new(),
            val_10m: String::new(),
        }
    }

    pub fn reading(&self, reading: TimedReading) -> &str {
        match reading {
            TimedReading::Val30s => &self.val_30s,
            TimedReading::Val1m => &self.val_1m,
            TimedReading::Val2m => &self.val_2m,
            TimedReading::Val3m => &self.val_3m,
            TimedReading::Val4m => &self.val_4m,
            TimedReading::Val5m => &self.val_5m,
            TimedReading::Val6m => &self.val_6m,
            TimedReading::Val7m => &self.val_7m,
            TimedReading::Val8m => &self.val_8m,
            TimedReading::Val9m => &self.val_9m,
            TimedReading::Val10m => &self.val_10m,
        }
    }

    fn reading_mut(&mut self, reading: TimedReading) -> &mut String {
        match reading {
            TimedReading::Val30s => &mut self.val_30s,
            TimedReading::Val1m => &mut self.val_1m,
            TimedReading::Val2m => &mut self.val_2m,
            TimedReading::Val3m => &mut self.val_3m,
            TimedReading::Val4m => &mut self.val_4m,
            TimedReading::Val5m => &mut self.val_5m,
            TimedReading::Val6m => &mut self.val_6m,
            TimedReading::Val7m => &mut self.val_7m,
            TimedReading::Val8m => &mut self.val_8m,
            TimedReading::Val9m => &mut self.val_9m,
            TimedReading::Val10m => &mut self.val_10m,
        }
    }

    /// 文本字段槽位（注入绕组返回 None）
    pub fn text_slot_mut(&mut self, field: InsulationField) -> Option<&mut String> {
        match field {
            InsulationField::Measurement => Some(&mut self.measurement),
            InsulationField::Guard => Some(&mut self.guard),
            InsulationField::Reading(r) => Some(self.reading_mut(r)),
            InsulationField::Injection => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_field_names() {
        let mut project = Project::new("p1".to_string(), "owner".to_string(), 2, "75");
        project
            .data
            .insert(TapRowId::for_position(1), TapRowData::default());
        project.insulation_data.push(InsulationRow::empty(RowId::from("r1")));

        let json = serde_json::to_value(&project).unwrap();
        assert!(json.get("lastModified").is_some());
        assert!(json.get("tapRange").is_some());
        assert!(json["data"].get("pos-1").is_some());
        assert!(json["resistanceSettings"].get("conn1Name").is_some());
        assert!(json["insulationData"][0].get("val30s").is_some());
        assert!(json["insulationData"][0].get("val10m").is_some());
    }

    #[test]
    fn test_snapshot_deserialize_with_missing_tables() {
        let raw = r#"{
            "id": "p1",
            "ownerId": "o",
            "createdAt": "2025-01-01T00:00:00Z",
            "lastModified": "2025-01-02T00:00:00Z",
            "tapRange": 3
        }"#;
        let project: Project = serde_json::from_str(raw).unwrap();
        assert!(project.data.is_empty());
        assert!(project.tg_delta_data.is_empty());
        assert_eq!(project.resistance_settings.ref_temp, "75");
    }

    #[test]
    fn test_tap_data_absent_is_empty() {
        let project = Project::new("p1".to_string(), "o".to_string(), 1, "75");
        assert_eq!(project.tap_data(&TapRowId::for_position(1)), TapRowData::default());
    }

    #[test]
    fn test_new_clamps_tap_range() {
        let project = Project::new("p1".to_string(), "o".to_string(), 40, "75");
        assert_eq!(project.tap_range, MAX_TAP_RANGE);
    }
}
