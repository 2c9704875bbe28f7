// ==========================================
// OSV 液舱管理系统 - 配置层
// ==========================================
// 职责: 操作员偏好 (灌装上限两档) 管理
// 存储: KeyValueStore 端口
// ==========================================

pub mod config_manager;
pub mod planner_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, defaults, ConfigManager};
pub use planner_config_trait::PlannerConfigReader;
