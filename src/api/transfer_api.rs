// ==========================================
// OSV 液舱管理系统 - 调驳计划 API
// ==========================================
// 职责: 当前船舶的调驳计划会话 (编辑/提交/载入编辑/删除/重置/导出)
// 红线: 无效步骤拒绝提交, 编辑槽保持不变
// 红线: 跨泵系统步骤允许提交, 通过 warnings 提示
// 锁顺序: planner -> fleet
// ==========================================

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::transfer::{EditingStep, ExportedPlan, TransferStep};
use crate::domain::vessel::{FleetCatalog, Vessel};
use crate::domain::warning::TankWarning;
use crate::engine::TransferPlanner;
use crate::repository::action_log_repo::ActionLogRepository;

// ==========================================
// TransferPlanView - 计划视图
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferPlanView {
    pub vessel_id: u32,
    pub steps: Vec<TransferStep>,
    pub editing: EditingStep,
    pub can_commit: bool,           // UI 据此启用/禁用提交
    pub warnings: Vec<TankWarning>, // 跨泵系统步骤
}

/// 导出文件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedPlanFile {
    pub file_name: String,
    pub content: String,
}

// ==========================================
// TransferApi - 调驳计划 API
// ==========================================
pub struct TransferApi {
    fleet: Arc<Mutex<FleetCatalog>>,
    planner: Mutex<TransferPlanner>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl TransferApi {
    /// 创建新的 TransferApi 实例
    pub fn new(
        fleet: Arc<Mutex<FleetCatalog>>,
        planner: TransferPlanner,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            fleet,
            planner: Mutex::new(planner),
            action_log_repo,
        }
    }

    fn lock_planner(&self) -> ApiResult<MutexGuard<'_, TransferPlanner>> {
        self.planner
            .lock()
            .map_err(|e| ApiError::InternalError(format!("计划会话锁获取失败: {}", e)))
    }

    fn lock_fleet(&self) -> ApiResult<MutexGuard<'_, FleetCatalog>> {
        self.fleet
            .lock()
            .map_err(|e| ApiError::InternalError(format!("船队状态锁获取失败: {}", e)))
    }

    fn record(&self, log: ActionLog) {
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(action_type = %log.action_type, error = %e, "操作日志写入失败");
        }
    }

    fn active_vessel_id(planner: &TransferPlanner) -> ApiResult<u32> {
        planner
            .vessel_id()
            .ok_or_else(|| ApiError::InvalidInput("未选择船舶".to_string()))
    }

    /// 当前船舶快照
    fn active_vessel(&self, vessel_id: u32) -> ApiResult<Vessel> {
        self.lock_fleet()?
            .find_vessel(vessel_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("船舶(id={})不存在", vessel_id)))
    }

    fn build_view(&self, planner: &TransferPlanner) -> ApiResult<TransferPlanView> {
        let vessel_id = Self::active_vessel_id(planner)?;
        let vessel = self.active_vessel(vessel_id)?;
        Ok(TransferPlanView {
            vessel_id,
            steps: planner.steps().to_vec(),
            editing: planner.editing().clone(),
            can_commit: planner.editing().can_commit(),
            warnings: planner.step_warnings(&vessel),
        })
    }

    // ==========================================
    // 会话
    // ==========================================

    /// 切换当前船舶并载入其计划
    pub fn select_vessel(&self, vessel_id: u32) -> ApiResult<TransferPlanView> {
        let mut planner = self.lock_planner()?;
        self.active_vessel(vessel_id)?;
        planner.select_vessel(vessel_id);
        self.build_view(&planner)
    }

    pub fn plan_view(&self) -> ApiResult<TransferPlanView> {
        let planner = self.lock_planner()?;
        self.build_view(&planner)
    }

    // ==========================================
    // 编辑槽
    // ==========================================

    /// 切换舱选择
    ///
    /// # 返回
    /// - Ok(true): 切换后处于选中状态
    pub fn toggle_tank(&self, tank_id: &str) -> ApiResult<bool> {
        let mut planner = self.lock_planner()?;
        let vessel_id = Self::active_vessel_id(&planner)?;
        if !self.active_vessel(vessel_id)?.has_tank(tank_id) {
            return Err(ApiError::NotFound(format!("舱 {} 不存在", tank_id)));
        }
        Ok(planner.toggle_tank_selection(tank_id))
    }

    pub fn set_note(&self, note: &str) -> ApiResult<()> {
        let mut planner = self.lock_planner()?;
        Self::active_vessel_id(&planner)?;
        planner.set_note(note);
        Ok(())
    }

    pub fn clear_editing(&self) -> ApiResult<()> {
        self.lock_planner()?.clear_editing();
        Ok(())
    }

    // ==========================================
    // 步骤操作
    // ==========================================

    /// 提交步骤
    ///
    /// # 返回
    /// - Ok(index): 步骤在计划中的位置
    /// - Err(InvalidStep): 无舱或说明为空白
    /// - Err(CommandValidationError): 舱号不存在于当前船舶
    pub fn commit_step(&self, tanks: Vec<String>, note: &str) -> ApiResult<usize> {
        let mut planner = self.lock_planner()?;
        let vessel_id = Self::active_vessel_id(&planner)?;
        let vessel = self.active_vessel(vessel_id)?;

        let violations: Vec<ValidationViolation> = tanks
            .iter()
            .filter(|id| !vessel.has_tank(id))
            .map(|id| ValidationViolation {
                violation_type: "UNKNOWN_TANK".to_string(),
                target: format!("{}/{}", vessel_id, id),
                reason: format!("舱 {} 不存在于船舶 {}", id, vessel.name),
            })
            .collect();
        if !violations.is_empty() {
            return Err(ApiError::CommandValidationError {
                reason: format!("{}个舱号无效", violations.len()),
                violations,
            });
        }

        let index = planner.commit_step(tanks.clone(), note)?;
        self.record(
            ActionLog::new(ActionType::CommitStep, Some(vessel_id), None)
                .with_payload(json!({ "index": index, "tanks": tanks, "note": note })),
        );
        Ok(index)
    }

    /// 提交编辑槽
    pub fn commit_editing(&self) -> ApiResult<usize> {
        let (tanks, note) = {
            let planner = self.lock_planner()?;
            (planner.editing().tanks.clone(), planner.editing().note.clone())
        };
        self.commit_step(tanks, &note)
    }

    /// 将已提交步骤移入编辑槽
    pub fn edit_step(&self, index: usize) -> ApiResult<EditingStep> {
        let mut planner = self.lock_planner()?;
        let vessel_id = Self::active_vessel_id(&planner)?;
        planner.edit_step(index)?;
        self.record(
            ActionLog::new(ActionType::EditStep, Some(vessel_id), None)
                .with_payload(json!({ "index": index })),
        );
        Ok(planner.editing().clone())
    }

    /// 删除步骤 (无撤销)
    pub fn delete_step(&self, index: usize) -> ApiResult<TransferStep> {
        let mut planner = self.lock_planner()?;
        let vessel_id = Self::active_vessel_id(&planner)?;
        let removed = planner.delete_step(index)?;
        self.record(
            ActionLog::new(ActionType::DeleteStep, Some(vessel_id), None)
                .with_payload(json!({ "index": index, "tanks": removed.tanks, "note": removed.note })),
        );
        Ok(removed)
    }

    /// 清空当前船舶的计划与编辑槽
    pub fn reset_plan(&self) -> ApiResult<()> {
        let mut planner = self.lock_planner()?;
        let vessel_id = Self::active_vessel_id(&planner)?;
        planner.reset_plan();
        self.record(ActionLog::new(ActionType::ResetPlan, Some(vessel_id), None));
        Ok(())
    }

    /// 步骤涉及的泵系统编号 (升序)
    pub fn pump_system_spread(&self, index: usize) -> ApiResult<Vec<u32>> {
        let planner = self.lock_planner()?;
        let vessel_id = Self::active_vessel_id(&planner)?;
        let step = planner.steps().get(index).ok_or_else(|| {
            ApiError::NotFound(format!("调驳步骤 {} 不存在", index))
        })?;
        let vessel = self.active_vessel(vessel_id)?;
        Ok(planner.pump_system_spread(&vessel, step).into_iter().collect())
    }

    // ==========================================
    // 导出
    // ==========================================

    /// 导出计划 (纯读取, 舱快照取导出时刻状态)
    pub fn export_plan(&self, date: NaiveDate) -> ApiResult<ExportedPlan> {
        let planner = self.lock_planner()?;
        let vessel_id = Self::active_vessel_id(&planner)?;
        let vessel = self.active_vessel(vessel_id)?;
        let plan = planner.export_plan(&vessel, date);

        info!(vessel_id, steps = plan.steps.len(), "调驳计划已导出");
        self.record(
            ActionLog::new(ActionType::ExportPlan, Some(vessel_id), None)
                .with_payload(json!({ "date": date.to_string(), "steps": plan.steps.len() })),
        );
        Ok(plan)
    }

    /// 导出为 JSON 文件内容
    pub fn export_plan_file(&self, date: NaiveDate) -> ApiResult<ExportedPlanFile> {
        let plan = self.export_plan(date)?;
        let content = plan
            .to_json()
            .map_err(|e| ApiError::InternalError(format!("导出序列化失败: {}", e)))?;
        Ok(ExportedPlanFile {
            file_name: plan.file_name(),
            content,
        })
    }
}
