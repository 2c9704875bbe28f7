// ==========================================
// OSV 液舱管理系统 - 引擎层
// ==========================================
// 职责: 相容性判定、容量计算、泵系统分组、调驳计划、船舶排名、统计
// 红线: Engine 不拼 SQL, 持久化只经由仓储
// 红线: 数据形态差异一律给出回退值, 仅无效步骤提交向上报错
// ==========================================

pub mod capacity;
pub mod compatibility;
pub mod error;
pub mod evaluator;
pub mod kpi;
pub mod pump_system;
pub mod ranking;
pub mod transfer_planner;
pub mod warning_scan;

// 重导出核心引擎
pub use capacity::{CapacityCalculator, TankFilter, UNASSIGNED_CLIENT};
pub use compatibility::{
    classify_description, CompatibilityEntry, CompatibilityMatrix, MatrixBuildReport,
};
pub use error::{EngineError, EngineResult};
pub use evaluator::{CompatibilityEvaluator, TankMatch};
pub use kpi::FleetStatistics;
pub use pump_system::{
    group_by_pump_system, pump_system_count, pump_system_label, pump_system_spread,
    PumpSystemGrouping, METHANOL_PUMP_SYSTEM_ID, SLOP_PUMP_SYSTEM_ID,
};
pub use ranking::{RankingCriterion, VesselFilter, VesselRanker, VesselScore};
pub use transfer_planner::TransferPlanner;
pub use warning_scan::TankWarningScanner;
