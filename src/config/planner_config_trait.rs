// ==========================================
// OSV 液舱管理系统 - 规划配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// 红线: 读取失败一律回退默认值, 不向引擎抛错
// ==========================================

use crate::domain::types::FillLimitMode;

// ==========================================
// PlannerConfigReader Trait
// ==========================================
// 实现者: ConfigManager（经由 KeyValueStore 读取）
pub trait PlannerConfigReader: Send + Sync {
    /// 当前生效的灌装上限
    ///
    /// # 默认值
    /// - 常规档 (0.8)
    fn get_fill_limit(&self) -> f64;

    /// 当前灌装上限档位
    ///
    /// # 默认值
    /// - NORMAL
    fn get_fill_limit_mode(&self) -> FillLimitMode;

    /// 常规档取值
    ///
    /// # 默认值
    /// - 0.8
    fn get_normal_fill_limit(&self) -> f64;

    /// 超控档取值
    ///
    /// # 默认值
    /// - 0.9
    fn get_override_fill_limit(&self) -> f64;
}
