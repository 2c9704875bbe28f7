// ==========================================
// OSV 液舱管理系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 决策支持系统 (操作员最终控制权)
// 范围: 流体相容性判定、舱容计算、泵系统分组、调驳计划、船舶排名
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 存储端口与持久化
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 船队目录与相容性表
pub mod importer;

// 配置层 - 操作员偏好
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 命令/查询接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    CompatibilityLevel, FillLimitMode, FluidCategory, FluidUnit, TankType,
};

// 领域实体
pub use domain::{
    ActionLog, ActionType, CapacitySummary, Client, ExportedPlan, FleetCatalog, FleetKpi, Fluid,
    FluidCatalog, Tank, TankContents, TankWarning, TransferStep, Vessel, WarningKind,
};

// 引擎
pub use engine::{
    CapacityCalculator, CompatibilityEvaluator, CompatibilityMatrix, FleetStatistics,
    RankingCriterion, TankWarningScanner, TransferPlanner, VesselFilter, VesselRanker,
};

// API
pub use api::{ApiError, ApiResult, FleetApi, TransferApi};

// 应用
pub use app::AppState;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "OSV 液舱管理系统";
