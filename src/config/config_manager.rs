// ==========================================
// OSV 液舱管理系统 - 配置管理器
// ==========================================
// 职责: 操作员偏好的加载、查询、写入
// 存储: 注入的 KeyValueStore (不依赖全局状态)
// ==========================================

use crate::config::planner_config_trait::PlannerConfigReader;
use crate::domain::types::FillLimitMode;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::kv_store::KeyValueStore;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// 灌装上限档位比较容差
const FILL_LIMIT_EPSILON: f64 = 1e-9;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    store: Arc<dyn KeyValueStore>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - store: 存储端口
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// 读取配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        self.store.get(key)
    }

    /// 读取浮点配置，缺失/格式错误/读取失败时回退默认值
    ///
    /// # 参数
    /// - key: 配置键
    /// - default: 默认值
    fn get_f64_or_default(&self, key: &str, default: f64) -> f64 {
        match self.get_config_value(key) {
            Ok(Some(raw)) => match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    warn!(key, value = %raw, "配置值格式错误, 使用默认值 {}", default);
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                warn!(key, error = %e, "配置读取失败, 使用默认值 {}", default);
                default
            }
        }
    }

    /// 写入配置值
    pub fn set_config_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        self.store.put(key, value)
    }

    /// 获取所有配置的快照（JSON格式）
    ///
    /// # 返回
    /// - Ok(String): 已设置配置项的JSON字符串
    ///
    /// # 用途
    /// - 审计/导出
    pub fn get_config_snapshot(&self) -> RepositoryResult<String> {
        let mut config_map: BTreeMap<&str, String> = BTreeMap::new();
        for key in config_keys::ALL {
            if let Some(value) = self.get_config_value(key)? {
                config_map.insert(key, value);
            }
        }
        Ok(serde_json::to_string(&json!(config_map))?)
    }

    // ===== 灌装上限 =====

    /// 切换灌装上限档位
    ///
    /// # 返回
    /// - Ok(f64): 切换后生效的灌装上限
    pub fn set_fill_limit_mode(&self, mode: FillLimitMode) -> RepositoryResult<f64> {
        let value = match mode {
            FillLimitMode::Normal => self.get_normal_fill_limit(),
            FillLimitMode::Override => self.get_override_fill_limit(),
        };
        self.set_config_value(config_keys::FLEET_FILL_LIMIT, &value.to_string())?;
        info!(mode = %mode, fill_limit = value, "灌装上限档位已切换");
        Ok(value)
    }

    /// 设置两档取值
    ///
    /// # 约束
    /// - 0 < normal <= override <= 1
    pub fn set_fill_limit_tiers(&self, normal: f64, override_value: f64) -> RepositoryResult<()> {
        if !(normal > 0.0 && normal <= override_value && override_value <= 1.0) {
            return Err(RepositoryError::ValidationError(format!(
                "灌装上限档位无效: normal={}, override={} (要求 0 < normal <= override <= 1)",
                normal, override_value
            )));
        }

        // 先记下当前档位, 写入新档位值后按原档位重新生效
        let mode = self.get_fill_limit_mode();
        self.set_config_value(config_keys::FILL_LIMIT_NORMAL, &normal.to_string())?;
        self.set_config_value(config_keys::FILL_LIMIT_OVERRIDE, &override_value.to_string())?;
        self.set_fill_limit_mode(mode)?;
        Ok(())
    }
}

impl PlannerConfigReader for ConfigManager {
    fn get_fill_limit(&self) -> f64 {
        let normal = self.get_normal_fill_limit();
        let override_value = self.get_override_fill_limit();
        let raw = self.get_f64_or_default(config_keys::FLEET_FILL_LIMIT, normal);

        if (raw - normal).abs() < FILL_LIMIT_EPSILON || (raw - override_value).abs() < FILL_LIMIT_EPSILON {
            raw
        } else {
            warn!(fill_limit = raw, "灌装上限不属于任何档位, 回退常规档 {}", normal);
            normal
        }
    }

    fn get_fill_limit_mode(&self) -> FillLimitMode {
        let override_value = self.get_override_fill_limit();
        let normal = self.get_normal_fill_limit();
        // 两档相同时视为常规档
        if (override_value - normal).abs() >= FILL_LIMIT_EPSILON
            && (self.get_fill_limit() - override_value).abs() < FILL_LIMIT_EPSILON
        {
            FillLimitMode::Override
        } else {
            FillLimitMode::Normal
        }
    }

    fn get_normal_fill_limit(&self) -> f64 {
        self.get_f64_or_default(config_keys::FILL_LIMIT_NORMAL, defaults::FILL_LIMIT_NORMAL)
    }

    fn get_override_fill_limit(&self) -> f64 {
        self.get_f64_or_default(config_keys::FILL_LIMIT_OVERRIDE, defaults::FILL_LIMIT_OVERRIDE)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 灌装上限
    pub const FLEET_FILL_LIMIT: &str = "fleet_fill_limit";
    pub const FILL_LIMIT_NORMAL: &str = "fill_limit_normal";
    pub const FILL_LIMIT_OVERRIDE: &str = "fill_limit_override";

    pub const ALL: [&str; 3] = [FLEET_FILL_LIMIT, FILL_LIMIT_NORMAL, FILL_LIMIT_OVERRIDE];
}

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const FILL_LIMIT_NORMAL: f64 = 0.8;
    pub const FILL_LIMIT_OVERRIDE: f64 = 0.9;
}
