// ==========================================
// OSV 液舱管理系统 - API 层
// ==========================================
// 职责: 对外的命令/查询接口, 串行化对引擎与船队状态的访问
// ==========================================

pub mod error;
pub mod fleet_api;
pub mod transfer_api;
pub mod validator;

// 重导出核心类型
pub use error::{ApiError, ApiResult, ValidationViolation};
pub use fleet_api::{CompatibleTankView, FleetApi, VesselRankingView};
pub use transfer_api::{ExportedPlanFile, TransferApi, TransferPlanView};
pub use validator::TankCommandValidator;
