// ==========================================
// OSV 液舱管理系统 - 操作日志数据仓储
// ==========================================
// 对齐: action_log 表 (db::init_schema)
// 红线: 所有舱命令与计划变更必须记录
// ==========================================

mod core;
mod queries;


pub use core::ActionLogRepository;
