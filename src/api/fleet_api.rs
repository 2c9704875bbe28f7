// ==========================================
// OSV 液舱管理系统 - 船队 API
// ==========================================
// 职责:
// 1. 舱命令 (货物/液位/停用/客户) 与船舶标记
// 2. 相容舱查询、船舶排名、统计与告警
// 3. 灌装上限档位切换
// 红线: 舱状态只经由本接口修改; 每条命令校验后执行并记录 ActionLog
// 红线: 日志写入失败不回滚命令, 仅告警
// ==========================================

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::api::validator::TankCommandValidator;
use crate::config::{ConfigManager, PlannerConfigReader};
use crate::domain::action_log::{ActionLog, ActionType};
use crate::domain::capacity::{
    ClientBreakdown, ContentVolume, FleetKpi, PumpSystemCapacity, TankTypeBreakdown,
    VesselCapacityRollup,
};
use crate::domain::tank::{Tank, TankContents};
use crate::domain::types::{CompatibilityLevel, FillLimitMode, TankType};
use crate::domain::vessel::{FleetCatalog, Vessel};
use crate::domain::warning::TankWarning;
use crate::engine::{
    CapacityCalculator, CompatibilityEvaluator, CompatibilityMatrix, FleetStatistics,
    RankingCriterion, TankFilter, TankWarningScanner, VesselFilter, VesselRanker, VesselScore,
};
use crate::repository::action_log_repo::ActionLogRepository;

// ==========================================
// 视图对象
// ==========================================

/// 相容舱查询结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompatibleTankView {
    pub vessel_id: u32,
    pub vessel_name: String,
    pub tank_id: String,
    pub tank_type: TankType,
    pub contents: TankContents,
    pub current_level: f64,
    pub available_capacity: f64,
    pub level: CompatibilityLevel,
}

/// 排名结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselRankingView {
    pub rank: usize,
    pub vessel_id: u32,
    pub vessel_name: String,
    pub score: VesselScore,
}

// ==========================================
// FleetApi - 船队 API
// ==========================================
pub struct FleetApi {
    fleet: Arc<Mutex<FleetCatalog>>,
    matrix: Arc<CompatibilityMatrix>,
    config: Arc<ConfigManager>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl FleetApi {
    /// 创建新的 FleetApi 实例
    pub fn new(
        fleet: Arc<Mutex<FleetCatalog>>,
        matrix: Arc<CompatibilityMatrix>,
        config: Arc<ConfigManager>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            fleet,
            matrix,
            config,
            action_log_repo,
        }
    }

    fn lock_fleet(&self) -> ApiResult<MutexGuard<'_, FleetCatalog>> {
        self.fleet
            .lock()
            .map_err(|e| ApiError::InternalError(format!("船队状态锁获取失败: {}", e)))
    }

    fn calculator(&self) -> CapacityCalculator {
        CapacityCalculator::from_config(self.config.as_ref())
    }

    /// 记录操作日志 (失败仅告警)
    fn record(&self, log: ActionLog) {
        if let Err(e) = self.action_log_repo.insert(&log) {
            warn!(action_type = %log.action_type, error = %e, "操作日志写入失败");
        }
    }

    /// 校验并修改单舱, 成功后刷新船舶更新时间
    fn mutate_tank<F>(&self, vessel_id: u32, tank_id: &str, validate: F, apply: impl FnOnce(&mut Tank)) -> ApiResult<Tank>
    where
        F: FnOnce(&FleetCatalog, &Tank) -> ApiResult<()>,
    {
        let mut fleet = self.lock_fleet()?;
        {
            let tank = TankCommandValidator::require_tank(&fleet, vessel_id, tank_id)?;
            validate(&fleet, tank)?;
        }

        let vessel = fleet
            .find_vessel_mut(vessel_id)
            .ok_or_else(|| ApiError::NotFound(format!("船舶(id={})不存在", vessel_id)))?;
        vessel.last_updated = Utc::now().naive_utc();
        let tank = vessel
            .find_tank_mut(tank_id)
            .ok_or_else(|| ApiError::NotFound(format!("舱 {} 不存在", tank_id)))?;
        apply(tank);
        Ok(tank.clone())
    }

    // ==========================================
    // 舱命令
    // ==========================================

    /// 设置舱内货物
    ///
    /// 换装其他流体时原流体记入 history
    pub fn set_contents(&self, vessel_id: u32, tank_id: &str, contents: &str) -> ApiResult<Tank> {
        let new_contents = TankContents::fluid(contents);
        let tank = self.mutate_tank(
            vessel_id,
            tank_id,
            |fleet, tank| TankCommandValidator::validate_contents(fleet, vessel_id, tank, &new_contents),
            |tank| {
                if let Some(prev) = tank.contents.fluid_name() {
                    if tank.contents != new_contents {
                        tank.history = Some(prev.to_string());
                    }
                }
                tank.contents = new_contents.clone();
            },
        )?;

        info!(vessel_id, tank_id, contents = %tank.contents, "舱内货物已更新");
        self.record(
            ActionLog::new(ActionType::SetContents, Some(vessel_id), Some(tank_id))
                .with_payload(json!({ "contents": tank.contents.as_str() })),
        );
        Ok(tank)
    }

    /// 设置液位
    ///
    /// 液位归零时货物重置为 Empty, 原流体记入 history
    pub fn set_level(&self, vessel_id: u32, tank_id: &str, level: f64) -> ApiResult<Tank> {
        let tank = self.mutate_tank(
            vessel_id,
            tank_id,
            |_, tank| TankCommandValidator::validate_level(vessel_id, tank, level),
            |tank| {
                tank.current_level = level;
                if level == 0.0 {
                    if let Some(prev) = tank.contents.fluid_name() {
                        tank.history = Some(prev.to_string());
                        tank.contents = TankContents::Empty;
                    }
                }
            },
        )?;

        info!(vessel_id, tank_id, level, "舱液位已更新");
        self.record(
            ActionLog::new(ActionType::SetLevel, Some(vessel_id), Some(tank_id))
                .with_payload(json!({ "level": level, "contents": tank.contents.as_str() })),
        );
        Ok(tank)
    }

    /// 停用 / 恢复使用
    ///
    /// - 停用: 记住原流体
    /// - 恢复: 液位为 0 时为 Empty, 否则恢复原流体
    pub fn set_out_of_service(
        &self,
        vessel_id: u32,
        tank_id: &str,
        out_of_service: bool,
    ) -> ApiResult<Tank> {
        let tank = self.mutate_tank(
            vessel_id,
            tank_id,
            |_, _| Ok(()),
            |tank| {
                if out_of_service {
                    if let Some(prev) = tank.contents.fluid_name() {
                        tank.history = Some(prev.to_string());
                    }
                    tank.contents = TankContents::OutOfService;
                } else if tank.is_out_of_service() {
                    tank.contents = match (&tank.history, tank.current_level > 0.0) {
                        (Some(prev), true) => TankContents::fluid(prev),
                        _ => TankContents::Empty,
                    };
                }
            },
        )?;

        let action_type = if out_of_service {
            ActionType::SetOutOfService
        } else {
            ActionType::RestoreService
        };
        info!(vessel_id, tank_id, out_of_service, contents = %tank.contents, "舱服务状态已更新");
        self.record(
            ActionLog::new(action_type, Some(vessel_id), Some(tank_id))
                .with_payload(json!({ "contents": tank.contents.as_str() })),
        );
        Ok(tank)
    }

    /// 分配客户 (None = 取消分配)
    pub fn assign_client(&self, vessel_id: u32, tank_id: &str, client: Option<&str>) -> ApiResult<Tank> {
        let client = client.map(str::trim).filter(|c| !c.is_empty());
        let tank = self.mutate_tank(
            vessel_id,
            tank_id,
            |fleet, tank| TankCommandValidator::validate_client(fleet, vessel_id, tank, client),
            |tank| tank.client = client.map(str::to_string),
        )?;

        info!(vessel_id, tank_id, client = ?tank.client, "舱客户已分配");
        self.record(
            ActionLog::new(ActionType::AssignClient, Some(vessel_id), Some(tank_id))
                .with_payload(json!({ "client": tank.client })),
        );
        Ok(tank)
    }

    /// 标记/取消最佳候选
    pub fn set_best_candidate(&self, vessel_id: u32, best_candidate: bool) -> ApiResult<()> {
        {
            let mut fleet = self.lock_fleet()?;
            let vessel = fleet
                .find_vessel_mut(vessel_id)
                .ok_or_else(|| ApiError::NotFound(format!("船舶(id={})不存在", vessel_id)))?;
            vessel.best_candidate = best_candidate;
            vessel.last_updated = Utc::now().naive_utc();
        }

        info!(vessel_id, best_candidate, "最佳候选标记已更新");
        self.record(
            ActionLog::new(ActionType::SetBestCandidate, Some(vessel_id), None)
                .with_payload(json!({ "best_candidate": best_candidate })),
        );
        Ok(())
    }

    /// 刷新船舶更新时间
    pub fn touch_vessel(&self, vessel_id: u32) -> ApiResult<NaiveDateTime> {
        let now = Utc::now().naive_utc();
        {
            let mut fleet = self.lock_fleet()?;
            let vessel = fleet
                .find_vessel_mut(vessel_id)
                .ok_or_else(|| ApiError::NotFound(format!("船舶(id={})不存在", vessel_id)))?;
            vessel.last_updated = now;
        }
        self.record(ActionLog::new(ActionType::TouchVessel, Some(vessel_id), None));
        Ok(now)
    }

    // ==========================================
    // 灌装上限
    // ==========================================

    pub fn fill_limit(&self) -> f64 {
        self.config.get_fill_limit()
    }

    pub fn fill_limit_mode(&self) -> FillLimitMode {
        self.config.get_fill_limit_mode()
    }

    /// 切换灌装上限档位, 返回生效值
    pub fn set_fill_limit_mode(&self, mode: FillLimitMode) -> ApiResult<f64> {
        let value = self.config.set_fill_limit_mode(mode)?;
        self.record(
            ActionLog::new(ActionType::SetFillLimit, None, None)
                .with_payload(json!({ "mode": mode.to_string(), "fill_limit": value })),
        );
        Ok(value)
    }

    // ==========================================
    // 查询
    // ==========================================

    /// 船队快照
    pub fn vessels(&self) -> ApiResult<Vec<Vessel>> {
        Ok(self.lock_fleet()?.vessels.clone())
    }

    pub fn vessel(&self, vessel_id: u32) -> ApiResult<Vessel> {
        self.lock_fleet()?
            .find_vessel(vessel_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("船舶(id={})不存在", vessel_id)))
    }

    /// 候选流体可装载的舱型 (未知流体为空)
    pub fn classify_by_tank_type(&self, candidate_fluid: &str) -> ApiResult<Vec<TankType>> {
        let fleet = self.lock_fleet()?;
        let evaluator = CompatibilityEvaluator::new(&self.matrix, &fleet.fluids);
        Ok(evaluator.classify_by_tank_type(candidate_fluid).into_iter().collect())
    }

    /// 船队内候选流体的相容舱 (按等级降序)
    pub fn find_compatible_tanks(&self, candidate_fluid: &str) -> ApiResult<Vec<CompatibleTankView>> {
        let fleet = self.lock_fleet()?;
        let calculator = self.calculator();
        let evaluator = CompatibilityEvaluator::new(&self.matrix, &fleet.fluids);

        Ok(evaluator
            .find_compatible_tanks(&fleet.vessels, candidate_fluid)
            .into_iter()
            .map(|m| CompatibleTankView {
                vessel_id: m.vessel.id,
                vessel_name: m.vessel.name.clone(),
                tank_id: m.tank.id.clone(),
                tank_type: m.tank.tank_type,
                contents: m.tank.contents.clone(),
                current_level: m.tank.current_level,
                available_capacity: calculator.available_capacity(m.tank),
                level: m.level,
            })
            .collect())
    }

    /// 先筛选后排名
    pub fn rank_vessels(
        &self,
        criterion: RankingCriterion,
        candidate_fluid: Option<&str>,
        filters: &[VesselFilter],
    ) -> ApiResult<Vec<VesselRankingView>> {
        let fleet = self.lock_fleet()?;
        let ranker = VesselRanker::new(
            self.calculator(),
            CompatibilityEvaluator::new(&self.matrix, &fleet.fluids),
        )
        .with_candidate_fluid(candidate_fluid);

        Ok(ranker
            .filter_and_rank(&fleet.vessels, filters, criterion)
            .into_iter()
            .enumerate()
            .map(|(i, vessel)| VesselRankingView {
                rank: i + 1,
                vessel_id: vessel.id,
                vessel_name: vessel.name.clone(),
                score: ranker.score(vessel),
            })
            .collect())
    }

    /// 排名前 n 的船舶编号
    pub fn suggest_best_candidates(
        &self,
        criterion: RankingCriterion,
        candidate_fluid: Option<&str>,
        n: usize,
    ) -> ApiResult<Vec<u32>> {
        let fleet = self.lock_fleet()?;
        let ranker = VesselRanker::new(
            self.calculator(),
            CompatibilityEvaluator::new(&self.matrix, &fleet.fluids),
        )
        .with_candidate_fluid(candidate_fluid);
        Ok(ranker.suggest_best_candidates(&fleet.vessels, criterion, n))
    }

    /// 告警 (vessel_id 为 None 时扫描全船队)
    pub fn warnings(&self, vessel_id: Option<u32>) -> ApiResult<Vec<TankWarning>> {
        let fleet = self.lock_fleet()?;
        let scanner = TankWarningScanner::new(&fleet.fluids, self.fill_limit());
        match vessel_id {
            None => Ok(scanner.scan_fleet(&fleet.vessels)),
            Some(id) => fleet
                .find_vessel(id)
                .map(|v| scanner.scan_vessel(v))
                .ok_or_else(|| ApiError::NotFound(format!("船舶(id={})不存在", id))),
        }
    }

    /// 单船各泵系统容量
    pub fn pump_systems(&self, vessel_id: u32) -> ApiResult<Vec<PumpSystemCapacity>> {
        let fleet = self.lock_fleet()?;
        let vessel = fleet
            .find_vessel(vessel_id)
            .ok_or_else(|| ApiError::NotFound(format!("船舶(id={})不存在", vessel_id)))?;
        Ok(self.calculator().pump_system_capacities(vessel))
    }

    pub fn fleet_kpi(&self) -> ApiResult<FleetKpi> {
        let fleet = self.lock_fleet()?;
        Ok(FleetStatistics::new(self.calculator(), &fleet.fluids).fleet_kpi(&fleet.vessels))
    }

    pub fn vessel_rollup(&self, vessel_id: u32) -> ApiResult<VesselCapacityRollup> {
        let fleet = self.lock_fleet()?;
        let vessel = fleet
            .find_vessel(vessel_id)
            .ok_or_else(|| ApiError::NotFound(format!("船舶(id={})不存在", vessel_id)))?;
        Ok(FleetStatistics::new(self.calculator(), &fleet.fluids).vessel_rollup(vessel))
    }

    pub fn breakdown_by_tank_type(&self, filter: &TankFilter) -> ApiResult<Vec<TankTypeBreakdown>> {
        let fleet = self.lock_fleet()?;
        Ok(FleetStatistics::new(self.calculator(), &fleet.fluids)
            .breakdown_by_tank_type(&fleet.vessels, filter))
    }

    pub fn breakdown_by_client(&self, filter: &TankFilter) -> ApiResult<Vec<ClientBreakdown>> {
        let fleet = self.lock_fleet()?;
        Ok(FleetStatistics::new(self.calculator(), &fleet.fluids)
            .breakdown_by_client(&fleet.vessels, filter))
    }

    pub fn content_volumes(&self, filter: &TankFilter) -> ApiResult<Vec<ContentVolume>> {
        let fleet = self.lock_fleet()?;
        Ok(FleetStatistics::new(self.calculator(), &fleet.fluids)
            .content_volumes(&fleet.vessels, filter))
    }

    /// 最近的操作日志
    pub fn recent_actions(&self, limit: i64) -> ApiResult<Vec<ActionLog>> {
        Ok(self.action_log_repo.find_recent(limit)?)
    }

    /// 指定船舶的操作日志 (时间倒序)
    pub fn vessel_actions(&self, vessel_id: u32, limit: i64) -> ApiResult<Vec<ActionLog>> {
        Ok(self.action_log_repo.find_by_vessel(vessel_id, limit)?)
    }

    pub fn action_count(&self) -> ApiResult<i64> {
        Ok(self.action_log_repo.count()?)
    }
}
