// ==========================================
// OSV 液舱管理系统 - 应用层
// ==========================================
// 职责: 组装存储、主数据与 API, 供宿主程序持有
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
