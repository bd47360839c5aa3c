// ==========================================
// 变压器试验记录 - 行 ID 生成器
// ==========================================
// 职责: 为 TG Delta / 绝缘电阻新行分配唯一 ID
// 红线: ID 一经分配不复用（含已删除行），不从内容派生
// 实现: UUID v4 随机令牌 + 冲突检查（已发放集合 + 现存行集合）
// ==========================================

use crate::domain::{Project, RowId};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct RowIdGenerator {
    issued: HashSet<RowId>,
}

impl RowIdGenerator {
    /// 以项目中已存在的行 ID 初始化
    pub fn for_project(project: &Project) -> Self {
        let issued = project
            .tg_delta_data
            .iter()
            .map(|row| row.id.clone())
            .chain(project.insulation_data.iter().map(|row| row.id.clone()))
            .collect();
        Self { issued }
    }

    /// 生成新 ID
    ///
    /// # 规则
    /// - 与本会话已发放的任何 ID 不重复
    /// - 与项目中现存的任何行 ID 不重复
    pub fn next_id(&mut self, project: &Project) -> RowId {
        loop {
            let candidate = RowId::new(Uuid::new_v4().simple().to_string());
            let in_use = project.tg_delta_row(&candidate).is_some()
                || project.insulation_row(&candidate).is_some();
            if !in_use && self.issued.insert(candidate.clone()) {
                return candidate;
            }
            tracing::warn!("行 ID 冲突，重新生成: {}", candidate);
        }
    }

    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TgDeltaRow;

    #[test]
    fn test_ids_are_unique() {
        let project = Project::new("p".to_string(), "o".to_string(), 0, "75");
        let mut generator = RowIdGenerator::default();
        let ids: HashSet<RowId> = (0..500).map(|_| generator.next_id(&project)).collect();
        assert_eq!(ids.len(), 500);
        assert_eq!(generator.issued_count(), 500);
    }

    #[test]
    fn test_seeded_from_existing_rows() {
        let mut project = Project::new("p".to_string(), "o".to_string(), 0, "75");
        project.tg_delta_data.push(TgDeltaRow::empty(RowId::from("existing")));
        let generator = RowIdGenerator::for_project(&project);
        assert_eq!(generator.issued_count(), 1);
    }
}
