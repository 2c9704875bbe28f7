// ==========================================
// OSV 液舱管理系统 - 船舶排名与筛选
// ==========================================
// 职责: 按准则对船舶排序, 按条件筛选, 给出候选船建议
// 排序链: 主准则 -> 最佳候选标记优先 -> 输入顺序 (稳定排序)
// 红线: 先筛选后排名; 排名不修改任何船舶状态
// ==========================================

use crate::domain::types::TankType;
use crate::domain::vessel::Vessel;
use crate::engine::capacity::CapacityCalculator;
use crate::engine::evaluator::CompatibilityEvaluator;
use crate::engine::pump_system::pump_system_count;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, instrument};

// ==========================================
// RankingCriterion - 排名准则
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RankingCriterion {
    AvailableCapacity,  // 可用容量降序
    PumpSystemCount,    // 泵系统数量降序
    Name,               // 船名升序
    BestCandidateFirst, // 最佳候选优先, 再按可用容量
}

impl RankingCriterion {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "AVAILABLE_CAPACITY" | "CAPACITY" => Some(RankingCriterion::AvailableCapacity),
            "PUMP_SYSTEM_COUNT" | "PUMPS" => Some(RankingCriterion::PumpSystemCount),
            "NAME" => Some(RankingCriterion::Name),
            "BEST_CANDIDATE_FIRST" | "BEST_CANDIDATE" => Some(RankingCriterion::BestCandidateFirst),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RankingCriterion::AvailableCapacity => "AVAILABLE_CAPACITY",
            RankingCriterion::PumpSystemCount => "PUMP_SYSTEM_COUNT",
            RankingCriterion::Name => "NAME",
            RankingCriterion::BestCandidateFirst => "BEST_CANDIDATE_FIRST",
        }
    }
}

impl fmt::Display for RankingCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// VesselFilter - 筛选条件 (多个条件取交集)
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum VesselFilter {
    HasCompatibleTank(String),   // 至少一个可立即使用的舱
    AvailableCapacityAbove(f64), // 可用容量 > 阈值
    BestCandidate,               // 已标记最佳候选
}

// ==========================================
// VesselScore - 排名用指标
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VesselScore {
    pub vessel_id: u32,
    pub available_capacity: f64,
    pub pump_system_count: usize,
    pub ready_tank_count: Option<usize>, // 仅在选定候选流体时计算
    pub best_candidate: bool,
}

// ==========================================
// VesselRanker
// ==========================================
pub struct VesselRanker<'a> {
    calculator: CapacityCalculator,
    evaluator: CompatibilityEvaluator<'a>,
    candidate_fluid: Option<String>,
}

impl<'a> VesselRanker<'a> {
    pub fn new(calculator: CapacityCalculator, evaluator: CompatibilityEvaluator<'a>) -> Self {
        Self {
            calculator,
            evaluator,
            candidate_fluid: None,
        }
    }

    /// 设定候选流体 (影响可用容量口径与可用舱计数)
    pub fn with_candidate_fluid(mut self, fluid: Option<&str>) -> Self {
        self.candidate_fluid = fluid
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        self
    }

    pub fn candidate_fluid(&self) -> Option<&str> {
        self.candidate_fluid.as_deref()
    }

    /// 计算单船排名指标
    ///
    /// 可用容量口径:
    /// - 未选流体: 非干散货舱
    /// - 已选流体: 该流体合法舱型的舱
    pub fn score(&self, vessel: &Vessel) -> VesselScore {
        let available_capacity = match &self.candidate_fluid {
            Some(fluid) => {
                let types: Vec<TankType> = self.evaluator.classify_by_tank_type(fluid).into_iter().collect();
                self.calculator
                    .summarize(vessel.tanks.iter().filter(|t| types.contains(&t.tank_type)))
                    .available_capacity
            }
            None => self.calculator.vessel_liquid_summary(vessel).available_capacity,
        };

        VesselScore {
            vessel_id: vessel.id,
            available_capacity,
            pump_system_count: pump_system_count(vessel),
            ready_tank_count: self
                .candidate_fluid
                .as_deref()
                .map(|fluid| self.evaluator.ready_tank_count(vessel, fluid)),
            best_candidate: vessel.best_candidate,
        }
    }

    // ==========================================
    // 筛选
    // ==========================================

    pub fn matches(&self, vessel: &Vessel, filter: &VesselFilter) -> bool {
        match filter {
            VesselFilter::HasCompatibleTank(fluid) => self.evaluator.has_compatible_tank(vessel, fluid),
            VesselFilter::AvailableCapacityAbove(threshold) => {
                self.score(vessel).available_capacity > *threshold
            }
            VesselFilter::BestCandidate => vessel.best_candidate,
        }
    }

    /// 筛选船舶 (保持输入顺序)
    pub fn filter_vessels<'v>(&self, vessels: &'v [Vessel], filters: &[VesselFilter]) -> Vec<&'v Vessel> {
        vessels
            .iter()
            .filter(|v| filters.iter().all(|f| self.matches(v, f)))
            .collect()
    }

    // ==========================================
    // 排名
    // ==========================================

    /// 船舶排名
    ///
    /// 选定候选流体时, 容量类准则先比较可立即使用的舱数量
    ///
    /// # 参数
    /// - `vessels`: 待排名船舶
    /// - `criterion`: 主准则
    #[instrument(skip(self, vessels), fields(vessel_count = vessels.len(), fluid = ?self.candidate_fluid))]
    pub fn rank_vessels<'v>(&self, vessels: &[&'v Vessel], criterion: RankingCriterion) -> Vec<&'v Vessel> {
        let mut scored: Vec<(&'v Vessel, VesselScore)> =
            vessels.iter().map(|v| (*v, self.score(v))).collect();

        // 最佳候选标记恒优先于主准则; sort_by 稳定, 全部相等时保持输入顺序
        scored.sort_by(|(va, a), (vb, b)| {
            b.best_candidate
                .cmp(&a.best_candidate)
                .then_with(|| Self::compare_by_criterion(va, a, vb, b, criterion))
        });

        debug!(criterion = %criterion, "船舶排名完成");
        scored.into_iter().map(|(v, _)| v).collect()
    }

    fn compare_by_criterion(
        va: &Vessel,
        a: &VesselScore,
        vb: &Vessel,
        b: &VesselScore,
        criterion: RankingCriterion,
    ) -> Ordering {
        let by_ready = || b.ready_tank_count.cmp(&a.ready_tank_count);
        let by_available = || b.available_capacity.total_cmp(&a.available_capacity);

        match criterion {
            RankingCriterion::AvailableCapacity => by_ready().then_with(by_available),
            RankingCriterion::PumpSystemCount => b.pump_system_count.cmp(&a.pump_system_count),
            RankingCriterion::Name => va.name.cmp(&vb.name),
            RankingCriterion::BestCandidateFirst => b
                .best_candidate
                .cmp(&a.best_candidate)
                .then_with(by_ready)
                .then_with(by_available),
        }
    }

    /// 先筛选后排名
    pub fn filter_and_rank<'v>(
        &self,
        vessels: &'v [Vessel],
        filters: &[VesselFilter],
        criterion: RankingCriterion,
    ) -> Vec<&'v Vessel> {
        let filtered = self.filter_vessels(vessels, filters);
        self.rank_vessels(&filtered, criterion)
    }

    /// 排名前 n 的船舶编号 (不修改最佳候选标记)
    pub fn suggest_best_candidates(
        &self,
        vessels: &[Vessel],
        criterion: RankingCriterion,
        n: usize,
    ) -> Vec<u32> {
        let all: Vec<&Vessel> = vessels.iter().collect();
        self.rank_vessels(&all, criterion)
            .into_iter()
            .take(n)
            .map(|v| v.id)
            .collect()
    }
}
