// ==========================================
// OSV 液舱管理系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、容量约束接口
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod capacity;
pub mod fluid;
pub mod tank;
pub mod transfer;
pub mod types;
pub mod vessel;
pub mod warning;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use capacity::{
    CapacitySummary, ClientBreakdown, ContentVolume, FillLimitConstraint, FleetKpi,
    PumpSystemCapacity, TankTypeBreakdown, VesselCapacityRollup, VesselPerformance,
};
pub use fluid::{Fluid, FluidCatalog, FluidKey, EMPTY_CONTENTS, OUT_OF_SERVICE_CONTENTS};
pub use tank::{Tank, TankContents};
pub use transfer::{EditingStep, ExportedPlan, ExportedStep, TankSnapshot, TransferStep};
pub use types::{
    CompatibilityLevel, FillLimitMode, FluidCategory, FluidUnit, TankType,
};
pub use vessel::{Client, FleetCatalog, Vessel};
pub use warning::{TankWarning, WarningKind};
