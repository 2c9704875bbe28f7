// ==========================================
// OSV 液舱管理系统 - 调驳计划状态机
// ==========================================
// 状态: EDITING (编辑槽) -> COMMITTED (计划列表)
// 红线: 载入编辑是移动不是复制, 步骤不会同时出现在两处
// 红线: 无舱或说明为空白的步骤拒绝提交, 编辑槽保持不变
// 红线: 计划列表每次变更整表持久化; 写入失败仅告警
// 红线: 跨泵系统步骤不阻断, 仅给出告警注记
// ==========================================

use crate::domain::transfer::{EditingStep, ExportedPlan, ExportedStep, TankSnapshot, TransferStep};
use crate::domain::vessel::Vessel;
use crate::domain::warning::{TankWarning, WarningKind};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::pump_system;
use crate::repository::transfer_plan_repo::TransferPlanRepository;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ==========================================
// TransferPlanner - 单船调驳计划会话
// ==========================================
pub struct TransferPlanner {
    repo: Arc<TransferPlanRepository>,
    vessel_id: Option<u32>,    // 当前船舶 (None = 未选择, 不持久化)
    steps: Vec<TransferStep>,  // 已提交步骤
    editing: EditingStep,      // 编辑槽
}

impl TransferPlanner {
    pub fn new(repo: Arc<TransferPlanRepository>) -> Self {
        Self {
            repo,
            vessel_id: None,
            steps: Vec::new(),
            editing: EditingStep::default(),
        }
    }

    pub fn vessel_id(&self) -> Option<u32> {
        self.vessel_id
    }

    pub fn steps(&self) -> &[TransferStep] {
        &self.steps
    }

    pub fn editing(&self) -> &EditingStep {
        &self.editing
    }

    // ==========================================
    // 会话 / 持久化
    // ==========================================

    /// 切换当前船舶: 清空编辑槽并载入该船计划
    pub fn select_vessel(&mut self, vessel_id: u32) {
        if self.vessel_id == Some(vessel_id) {
            return;
        }
        if !self.editing.is_blank() {
            warn!(
                from = ?self.vessel_id,
                to = vessel_id,
                "切换船舶, 编辑槽内容被丢弃"
            );
        }
        self.vessel_id = Some(vessel_id);
        self.editing = EditingStep::default();
        self.load();
    }

    /// 从存储重新载入当前船舶计划
    ///
    /// 读取失败时回退为空计划
    pub fn load(&mut self) {
        let Some(vessel_id) = self.vessel_id else {
            self.steps.clear();
            return;
        };
        self.steps = match self.repo.load(vessel_id) {
            Ok(steps) => steps,
            Err(e) => {
                warn!(vessel_id, error = %e, "调驳计划读取失败, 使用空计划");
                Vec::new()
            }
        };
        debug!(vessel_id, step_count = self.steps.len(), "调驳计划已载入");
    }

    /// 整表写入当前计划
    ///
    /// # 返回
    /// - true: 已写入
    /// - false: 未选择船舶或写入失败 (内存状态保留)
    pub fn save(&self) -> bool {
        let Some(vessel_id) = self.vessel_id else {
            return false;
        };
        match self.repo.save(vessel_id, &self.steps) {
            Ok(()) => true,
            Err(e) => {
                warn!(vessel_id, error = %e, "调驳计划写入失败, 仅保留内存状态");
                false
            }
        }
    }

    // ==========================================
    // 编辑槽
    // ==========================================

    /// 切换舱选择 (不检查泵系统/相容性)
    pub fn toggle_tank_selection(&mut self, tank_id: &str) -> bool {
        self.editing.toggle_tank(tank_id)
    }

    pub fn set_note(&mut self, note: &str) {
        self.editing.note = note.to_string();
    }

    /// 丢弃编辑槽, 不影响已提交步骤
    pub fn clear_editing(&mut self) {
        if self.editing.origin_index.is_some() {
            debug!(origin = ?self.editing.origin_index, "丢弃载入编辑的步骤");
        }
        self.editing = EditingStep::default();
    }

    // ==========================================
    // 步骤操作
    // ==========================================

    /// 提交步骤
    ///
    /// 编辑槽来自已提交步骤时插回原位置, 否则追加到末尾
    ///
    /// # 返回
    /// - `Ok(index)`: 新步骤在计划中的位置
    /// - `Err(EmptyTankSelection | BlankNote)`: 拒绝提交, 状态不变
    #[instrument(skip(self, tanks, note), fields(vessel_id = ?self.vessel_id, tank_count = tanks.len()))]
    pub fn commit_step(&mut self, tanks: Vec<String>, note: &str) -> EngineResult<usize> {
        if tanks.is_empty() {
            return Err(EngineError::EmptyTankSelection);
        }
        if note.trim().is_empty() {
            return Err(EngineError::BlankNote);
        }

        let mut unique: Vec<String> = Vec::with_capacity(tanks.len());
        for tank in tanks {
            if !unique.contains(&tank) {
                unique.push(tank);
            }
        }

        let index = match self.editing.origin_index {
            Some(origin) => origin.min(self.steps.len()),
            None => self.steps.len(),
        };
        self.steps.insert(index, TransferStep::new(unique, note));
        self.editing = EditingStep::default();
        self.save();

        info!(index, step_count = self.steps.len(), "调驳步骤已提交");
        Ok(index)
    }

    /// 提交编辑槽中的步骤
    pub fn commit_editing(&mut self) -> EngineResult<usize> {
        let tanks = self.editing.tanks.clone();
        let note = self.editing.note.clone();
        self.commit_step(tanks, &note)
    }

    /// 将已提交步骤移入编辑槽
    ///
    /// 编辑槽中已有一个载入的步骤时: 可提交则先放回原位, 否则丢弃
    pub fn edit_step(&mut self, index: usize) -> EngineResult<()> {
        let mut index = index;
        if index >= self.steps.len() {
            return Err(EngineError::StepIndexOutOfRange {
                index,
                len: self.steps.len(),
            });
        }

        if let Some(origin) = self.editing.origin_index {
            if self.editing.can_commit() {
                let origin = origin.min(self.steps.len());
                let pending = std::mem::take(&mut self.editing);
                self.steps
                    .insert(origin, TransferStep::new(pending.tanks, pending.note));
                if origin <= index {
                    index += 1;
                }
            } else {
                warn!(origin, "编辑中的步骤不完整, 已丢弃");
            }
        } else if !self.editing.is_blank() {
            warn!("未提交的编辑内容被载入的步骤覆盖");
        }

        let step = self.steps.remove(index);
        self.editing = EditingStep::from_step(step, index);
        self.save();

        debug!(index, step_count = self.steps.len(), "步骤已载入编辑槽");
        Ok(())
    }

    /// 永久删除步骤 (无撤销)
    pub fn delete_step(&mut self, index: usize) -> EngineResult<TransferStep> {
        if index >= self.steps.len() {
            return Err(EngineError::StepIndexOutOfRange {
                index,
                len: self.steps.len(),
            });
        }

        let removed = self.steps.remove(index);
        // 编辑槽的插回位置随之前移
        if let Some(origin) = self.editing.origin_index {
            if origin > index {
                self.editing.origin_index = Some(origin - 1);
            }
        }
        self.save();

        info!(index, step_count = self.steps.len(), "调驳步骤已删除");
        Ok(removed)
    }

    /// 清空计划与编辑槽
    pub fn reset_plan(&mut self) {
        self.steps.clear();
        self.editing = EditingStep::default();
        if let Some(vessel_id) = self.vessel_id {
            if let Err(e) = self.repo.clear(vessel_id) {
                warn!(vessel_id, error = %e, "调驳计划清除失败");
            }
        }
        info!(vessel_id = ?self.vessel_id, "调驳计划已重置");
    }

    // ==========================================
    // 只读
    // ==========================================

    /// 导出计划 (纯读取)
    ///
    /// 舱号解析为导出时刻的舱快照; 船上不存在的舱号跳过
    pub fn export_plan(&self, vessel: &Vessel, date: NaiveDate) -> ExportedPlan {
        let steps = self
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| ExportedStep {
                step_number: i + 1,
                tanks: step
                    .tanks
                    .iter()
                    .filter_map(|tank_id| match vessel.find_tank(tank_id) {
                        Some(tank) => Some(TankSnapshot::from(tank)),
                        None => {
                            warn!(vessel_id = vessel.id, tank_id = %tank_id, "导出时舱号不存在, 已跳过");
                            None
                        }
                    })
                    .collect(),
                instructions: step.note.clone(),
            })
            .collect();

        ExportedPlan {
            vessel: vessel.name.clone(),
            date,
            steps,
        }
    }

    /// 步骤涉及的泵系统
    pub fn pump_system_spread(&self, vessel: &Vessel, step: &TransferStep) -> BTreeSet<u32> {
        pump_system::pump_system_spread(vessel, &step.tanks)
    }

    /// 跨泵系统步骤告警
    pub fn step_warnings(&self, vessel: &Vessel) -> Vec<TankWarning> {
        self.steps
            .iter()
            .enumerate()
            .filter_map(|(i, step)| {
                let spread = self.pump_system_spread(vessel, step);
                if spread.len() <= 1 {
                    return None;
                }
                let labels: Vec<String> =
                    spread.iter().map(|id| pump_system::pump_system_label(*id)).collect();
                Some(TankWarning {
                    vessel_id: vessel.id,
                    tank_id: None,
                    kind: WarningKind::CrossPumpSystemStep,
                    message: format!("步骤 {} 跨泵系统: {}", i + 1, labels.join(", ")),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tank::{Tank, TankContents};
    use crate::domain::types::TankType;
    use crate::repository::error::{RepositoryError, RepositoryResult};
    use crate::repository::kv_store::{InMemoryKeyValueStore, KeyValueStore};

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn planner() -> (Arc<TransferPlanRepository>, TransferPlanner) {
        let repo = Arc::new(TransferPlanRepository::new(Arc::new(InMemoryKeyValueStore::new())));
        let mut planner = TransferPlanner::new(repo.clone());
        planner.select_vessel(1);
        (repo, planner)
    }

    /// 写入总是失败的存储
    struct ReadOnlyStore;

    impl KeyValueStore for ReadOnlyStore {
        fn get(&self, _key: &str) -> RepositoryResult<Option<String>> {
            Ok(None)
        }
        fn put(&self, key: &str, _value: &str) -> RepositoryResult<()> {
            Err(RepositoryError::StorageWriteError {
                key: key.to_string(),
                message: "quota exceeded".to_string(),
            })
        }
        fn remove(&self, _key: &str) -> RepositoryResult<()> {
            Ok(())
        }
        fn keys_with_prefix(&self, _prefix: &str) -> RepositoryResult<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_commit_rejects_invalid_steps() {
        let (_repo, mut planner) = planner();

        assert_eq!(
            planner.commit_step(vec![], "valid note"),
            Err(EngineError::EmptyTankSelection)
        );
        assert_eq!(planner.commit_step(ids(&["Tk 1S"]), "   "), Err(EngineError::BlankNote));
        assert!(planner.steps().is_empty());

        assert_eq!(planner.commit_step(ids(&["Tk 1S"]), "valid note"), Ok(0));
        assert_eq!(planner.steps().len(), 1);
    }

    #[test]
    fn test_rejected_commit_keeps_editing_slot() {
        let (_repo, mut planner) = planner();
        planner.toggle_tank_selection("Tk 1S");
        assert!(planner.commit_editing().is_err());
        assert!(planner.editing().is_selected("Tk 1S"));

        planner.set_note("Discharge to rig");
        assert_eq!(planner.commit_editing(), Ok(0));
        assert!(planner.editing().is_blank());
    }

    #[test]
    fn test_edit_round_trip_restores_plan() {
        let (_repo, mut planner) = planner();
        planner.commit_step(ids(&["Tk 1S"]), "first").unwrap();
        planner.commit_step(ids(&["Tk 2S", "Tk 2P"]), "second").unwrap();
        planner.commit_step(ids(&["Meth 1P"]), "third").unwrap();
        let before = planner.steps().to_vec();

        planner.edit_step(1).unwrap();
        assert_eq!(planner.steps().len(), 2);
        assert!(!planner.steps().iter().any(|s| s.note == "second"));

        let tanks = planner.editing().tanks.clone();
        let note = planner.editing().note.clone();
        planner.commit_step(tanks, &note).unwrap();
        assert_eq!(planner.steps(), before.as_slice());
    }

    #[test]
    fn test_edit_while_editing_puts_previous_back() {
        let (_repo, mut planner) = planner();
        planner.commit_step(ids(&["Tk 1S"]), "first").unwrap();
        planner.commit_step(ids(&["Tk 2S"]), "second").unwrap();
        planner.commit_step(ids(&["Tk 3S"]), "third").unwrap();
        let before = planner.steps().to_vec();

        planner.edit_step(0).unwrap();
        // "third" 现位于索引 1
        planner.edit_step(1).unwrap();
        assert_eq!(planner.editing().note, "third");
        assert_eq!(planner.steps()[0].note, "first");

        planner.commit_editing().unwrap();
        assert_eq!(planner.steps(), before.as_slice());
    }

    #[test]
    fn test_delete_and_out_of_range() {
        let (repo, mut planner) = planner();
        planner.commit_step(ids(&["Tk 1S"]), "first").unwrap();

        assert_eq!(
            planner.delete_step(3),
            Err(EngineError::StepIndexOutOfRange { index: 3, len: 1 })
        );
        assert!(planner.edit_step(1).is_err());

        let removed = planner.delete_step(0).unwrap();
        assert_eq!(removed.note, "first");
        assert!(repo.load(1).unwrap().is_empty());
    }

    #[test]
    fn test_reset_clears_plan_and_storage() {
        let (repo, mut planner) = planner();
        planner.commit_step(ids(&["Tk 1S"]), "first").unwrap();
        planner.toggle_tank_selection("Tk 2S");

        planner.reset_plan();
        assert!(planner.steps().is_empty());
        assert!(planner.editing().is_blank());
        assert!(repo.load(1).unwrap().is_empty());
    }

    #[test]
    fn test_plans_are_scoped_per_vessel() {
        let (repo, mut planner) = planner();
        planner.commit_step(ids(&["Tk 1S"]), "vessel one").unwrap();

        planner.select_vessel(2);
        assert!(planner.steps().is_empty());
        planner.commit_step(ids(&["Tk 1P"]), "vessel two").unwrap();

        planner.select_vessel(1);
        assert_eq!(planner.steps()[0].note, "vessel one");
        assert_eq!(repo.list_vessel_ids().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let repo = Arc::new(TransferPlanRepository::new(Arc::new(ReadOnlyStore)));
        let mut planner = TransferPlanner::new(repo);
        planner.select_vessel(1);

        assert!(planner.commit_step(ids(&["Tk 1S"]), "first").is_ok());
        assert_eq!(planner.steps().len(), 1);
        assert!(!planner.save());
    }

    #[test]
    fn test_export_and_cross_system_warning() {
        let (_repo, mut planner) = planner();
        let tank = |id: &str, tank_type, pump| Tank {
            id: id.to_string(),
            tank_type,
            capacity: 455.0,
            current_level: 400.0,
            contents: TankContents::fluid("Methanol"),
            pump_system_id: Some(pump),
            client: None,
            last_cleaning: None,
            history: None,
            pressure: 0.0,
        };
        let vessel = Vessel {
            id: 1,
            name: "M/V Pelican Island".to_string(),
            last_updated: NaiveDate::from_ymd_opt(2025, 5, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            fuel_onboard: 0.0,
            water_onboard: 0.0,
            best_candidate: false,
            tanks: vec![
                tank("Tk 1S", TankType::Liquid, 1),
                tank("Meth 1P", TankType::Methanol, 4),
            ],
        };
        planner.commit_step(ids(&["Meth 1P", "Ghost"]), "Top up").unwrap();
        planner.commit_step(ids(&["Tk 1S", "Meth 1P"]), "Cross").unwrap();

        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let exported = planner.export_plan(&vessel, date);
        assert_eq!(exported.steps.len(), 2);
        assert_eq!(exported.steps[0].step_number, 1);
        assert_eq!(exported.steps[0].tanks.len(), 1);
        assert_eq!(exported.steps[1].instructions, "Cross");
        assert_eq!(planner.steps().len(), 2);

        let warnings = planner.step_warnings(&vessel);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::CrossPumpSystemStep);
        assert!(warnings[0].tank_id.is_none());
    }
}
