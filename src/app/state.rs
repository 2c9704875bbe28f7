// ==========================================
// OSV 液舱管理系统 - 应用状态
// ==========================================
// 职责: 组装存储、主数据、配置与 API 实例
// 红线: 船队状态与计划会话各由一把 Mutex 串行化, 无并发写入
// ==========================================

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use rusqlite::Connection;

use crate::api::{FleetApi, TransferApi};
use crate::config::ConfigManager;
use crate::db;
use crate::domain::vessel::FleetCatalog;
use crate::engine::{CompatibilityMatrix, TransferPlanner};
use crate::importer::{default_compatibility_matrix, default_fleet_catalog};
use crate::repository::{
    ActionLogRepository, KeyValueStore, SqliteKeyValueStore, TransferPlanRepository,
};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "OSV_TANK_PLANNER_DB_PATH";

/// 应用状态
///
/// 持有全部 API 实例与共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 船队 API (舱命令/查询/统计)
    pub fleet_api: Arc<FleetApi>,

    /// 调驳计划 API
    pub transfer_api: Arc<TransferApi>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 操作日志仓储（用于审计追踪）
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl AppState {
    /// 使用内置船队目录与相容性表创建应用状态
    ///
    /// # 参数
    /// - db_path: 数据库文件路径 (":memory:" 为临时会话)
    pub fn new(db_path: &str) -> anyhow::Result<Self> {
        let fleet = default_fleet_catalog().context("内置船队目录加载失败")?;
        let (matrix, report) =
            default_compatibility_matrix(&fleet.fluids).context("内置相容性表加载失败")?;
        if !report.skipped_names.is_empty() {
            tracing::warn!(skipped = ?report.skipped_names, "相容性表中存在目录外的流体");
        }
        Self::with_catalog(db_path, fleet, matrix)
    }

    /// 使用给定主数据创建应用状态
    pub fn with_catalog(
        db_path: &str,
        fleet: FleetCatalog,
        matrix: CompatibilityMatrix,
    ) -> anyhow::Result<Self> {
        tracing::info!(db_path, vessels = fleet.vessels.len(), "初始化AppState");

        let conn: Connection = db::open_sqlite_connection(db_path)
            .with_context(|| format!("无法打开数据库: {}", db_path))?;
        db::init_schema(&conn).context("数据库表结构初始化失败")?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 存储与仓储
        // ==========================================
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(conn.clone()));
        let config_manager = Arc::new(ConfigManager::new(store.clone()));
        let plan_repo = Arc::new(TransferPlanRepository::new(store));
        let action_log_repo = Arc::new(ActionLogRepository::new(conn));

        // ==========================================
        // API
        // ==========================================
        let fleet = Arc::new(Mutex::new(fleet));
        let fleet_api = Arc::new(FleetApi::new(
            fleet.clone(),
            Arc::new(matrix),
            config_manager.clone(),
            action_log_repo.clone(),
        ));
        let transfer_api = Arc::new(TransferApi::new(
            fleet,
            TransferPlanner::new(plan_repo),
            action_log_repo.clone(),
        ));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path: db_path.to_string(),
            fleet_api,
            transfer_api,
            config_manager,
            action_log_repo,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先使用环境变量 OSV_TANK_PLANNER_DB_PATH, 否则放在用户数据目录
pub fn get_default_db_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./osv_tank_planner.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("osv-tank-planner");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("osv_tank_planner.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(!path.is_empty());
        assert!(path.ends_with(".db"));
    }

    #[test]
    fn test_in_memory_state() {
        let state = AppState::new(":memory:").unwrap();
        assert_eq!(state.fleet_api.vessels().unwrap().len(), 2);
        assert_eq!(state.fleet_api.fill_limit(), 0.8);
    }
}
