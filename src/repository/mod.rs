// ==========================================
// OSV 液舱管理系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 存储端口 + 持久化实现, 屏蔽数据库细节
// 约束: 所有查询使用参数化
// ==========================================

pub mod action_log_repo;
pub mod error;
pub mod kv_store;
pub mod transfer_plan_repo;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use kv_store::{InMemoryKeyValueStore, KeyValueStore, SqliteKeyValueStore};
pub use transfer_plan_repo::{TransferPlanRepository, TRANSFER_STEPS_KEY_PREFIX};
