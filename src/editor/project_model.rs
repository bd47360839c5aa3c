// ==========================================
// 变压器试验记录 - 项目编辑模型 (ProjectModel)
// ==========================================
// 职责: 字段级变更操作，每次变更产出新的不可变快照
// 红线: 快照之间不共享可变状态（Arc<Project> 只读，写时克隆）
// 红线: 公开 API 不提供删除分接行数据的途径，只允许字段级编辑
// 红线: 行 ID 不存在时视为 no-op，不报错（并发删除/编辑竞态）
// ==========================================

use crate::domain::{
    Confirmation, HeaderField, Injection, InsulationField, InsulationRow, Project,
    ResistanceSetting, RowId, TapField, TapRowId, TgDeltaField, TgDeltaRow, TgMode,
    MAX_TAP_RANGE,
};
use crate::editor::events::{ProjectChangeEvent, ProjectChangeKind, ProjectChangePublisher};
use crate::editor::id_generator::RowIdGenerator;
use crate::engine::numeric::to_decimal_comma;
use crate::engine::tap_rows::{TapRow, TapRowGenerator};
use std::sync::Arc;

pub struct ProjectModel {
    current: Arc<Project>,
    tap_rows: Vec<TapRow>,
    ids: RowIdGenerator,
    publisher: Arc<dyn ProjectChangePublisher>,
}

impl ProjectModel {
    /// 以已加载的快照创建编辑模型
    pub fn new(project: Project, publisher: Arc<dyn ProjectChangePublisher>) -> Self {
        let tap_rows = TapRowGenerator::generate(project.tap_range);
        let ids = RowIdGenerator::for_project(&project);
        Self {
            current: Arc::new(project),
            tap_rows,
            ids,
            publisher,
        }
    }

    /// 当前快照
    pub fn snapshot(&self) -> Arc<Project> {
        Arc::clone(&self.current)
    }

    pub fn project_id(&self) -> &str {
        &self.current.id
    }

    /// 当前分接行视图（+N … -N）
    pub fn tap_rows(&self) -> &[TapRow] {
        &self.tap_rows
    }

    // ==========================================
    // 内部: 写时克隆 + 发布
    // ==========================================

    /// 在克隆上应用变更；闭包返回 false 表示无变化（不发布）
    fn apply<F>(&mut self, kind: ProjectChangeKind, mutate: F) -> Arc<Project>
    where
        F: FnOnce(&mut Project) -> bool,
    {
        let mut next = (*self.current).clone();
        if !mutate(&mut next) {
            tracing::debug!(
                "变更无效果，跳过发布: project_id={}, kind={}",
                self.current.id,
                kind.as_str()
            );
            return self.snapshot();
        }

        self.current = Arc::new(next);
        self.publisher
            .publish(ProjectChangeEvent::new(kind, self.snapshot()));
        self.snapshot()
    }

    fn replace(slot: &mut String, value: String) -> bool {
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }

    // ==========================================
    // 分接范围 / 表头 / 电阻设置
    // ==========================================

    /// 设置分接范围
    ///
    /// # 规则
    /// - 超出上限按上限截断
    /// - 重新生成行视图，不触碰 data（范围外的数据保留为休眠数据）
    pub fn set_tap_range(&mut self, tap_range: u8) -> Arc<Project> {
        let tap_range = tap_range.min(MAX_TAP_RANGE);
        let snapshot = self.apply(ProjectChangeKind::TapRangeChanged, |p| {
            if p.tap_range == tap_range {
                return false;
            }
            p.tap_range = tap_range;
            true
        });
        self.tap_rows = TapRowGenerator::generate(snapshot.tap_range);
        snapshot
    }

    pub fn set_header_field(&mut self, field: HeaderField, value: &str) -> Arc<Project> {
        let value = value.to_string();
        self.apply(ProjectChangeKind::HeaderChanged, |p| {
            Self::replace(p.header_info.slot_mut(field), value)
        })
    }

    /// 设置电阻参数；温度字段写入前规范化为逗号小数
    pub fn set_resistance_setting(&mut self, field: ResistanceSetting, value: &str) -> Arc<Project> {
        let value = if field.is_numeric() {
            to_decimal_comma(value)
        } else {
            value.to_string()
        };
        self.apply(ProjectChangeKind::ResistanceSettingChanged, |p| {
            Self::replace(p.resistance_settings.slot_mut(field), value)
        })
    }

    // ==========================================
    // 分接行字段
    // ==========================================

    /// 写入 data[row_id][field]（数值字段规范化为逗号小数）
    ///
    /// 行不存在时创建；行 ID 不要求位于当前分接范围内
    pub fn set_tap_field(&mut self, row_id: &TapRowId, field: TapField, value: &str) -> Arc<Project> {
        let value = to_decimal_comma(value);
        let row_id = row_id.clone();
        self.apply(ProjectChangeKind::TapFieldChanged, move |p| {
            let row = p.data.entry(row_id).or_default();
            Self::replace(row.slot_mut(field), value)
        })
    }

    // ==========================================
    // TG Delta 表
    // ==========================================

    /// 追加空行，返回新快照与新行 ID
    pub fn add_tg_delta_row(&mut self) -> (Arc<Project>, RowId) {
        let id = self.ids.next_id(&self.current);
        let row = TgDeltaRow::empty(id.clone());
        let snapshot = self.apply(ProjectChangeKind::TgDeltaRowAdded, |p| {
            p.tg_delta_data.push(row);
            true
        });
        (snapshot, id)
    }

    /// 删除行（需调用方确认；不存在时 no-op）
    pub fn remove_tg_delta_row(&mut self, id: &RowId, confirmation: Confirmation) -> Arc<Project> {
        if !confirmation.is_confirmed() {
            tracing::debug!("删除未确认，忽略: tg_delta row={}", id);
            return self.snapshot();
        }
        self.apply(ProjectChangeKind::TgDeltaRowRemoved, |p| {
            let before = p.tg_delta_data.len();
            p.tg_delta_data.retain(|row| &row.id != id);
            let removed = p.tg_delta_data.len() != before;
            if !removed {
                tracing::warn!("TG Delta 行不存在: id={}", id);
            }
            removed
        })
    }

    /// 设置 TG Delta 字段
    ///
    /// # 规则
    /// - 数值字段（试验电压、tan δ、电容）规范化为逗号小数
    /// - 测量、保护为自由文本，原样存储
    /// - 模式、注入为枚举选择，未知标签忽略
    pub fn set_tg_delta_field(&mut self, id: &RowId, field: TgDeltaField, value: &str) -> Arc<Project> {
        self.apply(ProjectChangeKind::TgDeltaFieldChanged, |p| {
            let Some(row) = p.tg_delta_data.iter_mut().find(|row| &row.id == id) else {
                tracing::warn!("TG Delta 行不存在: id={}", id);
                return false;
            };
            match field {
                TgDeltaField::Mode => match TgMode::from_label(value) {
                    Some(mode) if mode != row.mode => {
                        row.mode = mode;
                        true
                    }
                    Some(_) => false,
                    None => {
                        tracing::warn!("未知测量模式: {}", value);
                        false
                    }
                },
                TgDeltaField::Injection => Self::set_injection(&mut row.injection, value),
                text_field => {
                    let stored = if text_field.is_numeric() {
                        to_decimal_comma(value)
                    } else {
                        value.to_string()
                    };
                    match row.text_slot_mut(text_field) {
                        Some(slot) => Self::replace(slot, stored),
                        None => false,
                    }
                }
            }
        })
    }

    // ==========================================
    // 绝缘电阻表
    // ==========================================

    pub fn add_insulation_row(&mut self) -> (Arc<Project>, RowId) {
        let id = self.ids.next_id(&self.current);
        let row = InsulationRow::empty(id.clone());
        let snapshot = self.apply(ProjectChangeKind::InsulationRowAdded, |p| {
            p.insulation_data.push(row);
            true
        });
        (snapshot, id)
    }

    pub fn remove_insulation_row(&mut self, id: &RowId, confirmation: Confirmation) -> Arc<Project> {
        if !confirmation.is_confirmed() {
            tracing::debug!("删除未确认，忽略: insulation row={}", id);
            return self.snapshot();
        }
        self.apply(ProjectChangeKind::InsulationRowRemoved, |p| {
            let before = p.insulation_data.len();
            p.insulation_data.retain(|row| &row.id != id);
            let removed = p.insulation_data.len() != before;
            if !removed {
                tracing::warn!("绝缘电阻行不存在: id={}", id);
            }
            removed
        })
    }

    /// 设置绝缘电阻字段（定时读数规范化为逗号小数）
    pub fn set_insulation_field(&mut self, id: &RowId, field: InsulationField, value: &str) -> Arc<Project> {
        self.apply(ProjectChangeKind::InsulationFieldChanged, |p| {
            let Some(row) = p.insulation_data.iter_mut().find(|row| &row.id == id) else {
                tracing::warn!("绝缘电阻行不存在: id={}", id);
                return false;
            };
            match field {
                InsulationField::Injection => Self::set_injection(&mut row.injection, value),
                text_field => {
                    let stored = match text_field {
                        InsulationField::Reading(_) => to_decimal_comma(value),
                        _ => value.to_string(),
                    };
                    match row.text_slot_mut(text_field) {
                        Some(slot) => Self::replace(slot, stored),
                        None => false,
                    }
                }
            }
        })
    }

    fn set_injection(slot: &mut Injection, value: &str) -> bool {
        match Injection::from_label(value) {
            Some(injection) if injection != *slot => {
                *slot = injection;
                true
            }
            Some(_) => false,
            None => {
                tracing::warn!("未知注入绕组: {}", value);
                false
            }
        }
    }
}
