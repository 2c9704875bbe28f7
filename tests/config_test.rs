// ==========================================
// ConfigManager 集成测试
// ==========================================
// 存储: SQLite 键值表 (临时数据库)
// ==========================================

mod test_helpers;

use osv_tank_planner::config::{config_keys, ConfigManager, PlannerConfigReader};
use osv_tank_planner::repository::{KeyValueStore, SqliteKeyValueStore};
use osv_tank_planner::FillLimitMode;
use std::sync::Arc;
use test_helpers::{create_test_db, open_shared_connection};

fn config_manager(db_path: &str) -> ConfigManager {
    let conn = open_shared_connection(db_path).expect("Failed to open DB");
    let store: Arc<dyn KeyValueStore> = Arc::new(SqliteKeyValueStore::new(conn));
    ConfigManager::new(store)
}

#[test]
fn test_defaults_without_stored_values() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test DB");
    let config = config_manager(&db_path);

    assert_eq!(config.get_fill_limit(), 0.8);
    assert_eq!(config.get_fill_limit_mode(), FillLimitMode::Normal);
    assert_eq!(config.get_normal_fill_limit(), 0.8);
    assert_eq!(config.get_override_fill_limit(), 0.9);
}

#[test]
fn test_override_mode_persists_across_instances() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test DB");

    let value = config_manager(&db_path)
        .set_fill_limit_mode(FillLimitMode::Override)
        .expect("Failed to switch mode");
    assert_eq!(value, 0.9);

    let reopened = config_manager(&db_path);
    assert_eq!(reopened.get_fill_limit(), 0.9);
    assert_eq!(reopened.get_fill_limit_mode(), FillLimitMode::Override);

    reopened
        .set_fill_limit_mode(FillLimitMode::Normal)
        .expect("Failed to switch mode");
    assert_eq!(config_manager(&db_path).get_fill_limit(), 0.8);
}

#[test]
fn test_malformed_or_off_tier_value_falls_back() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test DB");
    let config = config_manager(&db_path);

    config
        .set_config_value(config_keys::FLEET_FILL_LIMIT, "not-a-number")
        .expect("Failed to write config");
    assert_eq!(config.get_fill_limit(), 0.8);

    config
        .set_config_value(config_keys::FLEET_FILL_LIMIT, "0.42")
        .expect("Failed to write config");
    assert_eq!(config.get_fill_limit(), 0.8);
    assert_eq!(config.get_fill_limit_mode(), FillLimitMode::Normal);
}

#[test]
fn test_custom_tiers_keep_current_mode() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test DB");
    let config = config_manager(&db_path);

    config
        .set_fill_limit_mode(FillLimitMode::Override)
        .expect("Failed to switch mode");
    config
        .set_fill_limit_tiers(0.85, 0.95)
        .expect("Failed to set tiers");

    assert_eq!(config.get_fill_limit_mode(), FillLimitMode::Override);
    assert_eq!(config.get_fill_limit(), 0.95);

    assert!(config.set_fill_limit_tiers(0.95, 0.85).is_err());
    assert!(config.set_fill_limit_tiers(0.0, 0.9).is_err());
    assert!(config.set_fill_limit_tiers(0.8, 1.2).is_err());
    assert_eq!(config.get_fill_limit(), 0.95);
}

#[test]
fn test_config_snapshot_lists_stored_values() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test DB");
    let config = config_manager(&db_path);

    config
        .set_fill_limit_mode(FillLimitMode::Override)
        .expect("Failed to switch mode");

    let snapshot = config.get_config_snapshot().expect("Failed to get snapshot");
    let parsed: serde_json::Value = serde_json::from_str(&snapshot).expect("Invalid JSON");
    assert_eq!(parsed[config_keys::FLEET_FILL_LIMIT], "0.9");
    assert!(parsed.get(config_keys::FILL_LIMIT_NORMAL).is_none());
}
