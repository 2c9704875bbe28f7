// ==========================================
// OSV 液舱管理系统 - 领域类型定义
// ==========================================
// 红线: 舱型、相容性等级均为封闭枚举,禁止运行期字符串比较
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 舱型 (Tank Type)
// ==========================================
// 决定该舱合法可装载的流体类别
// 序列化格式: SCREAMING_SNAKE_CASE, 兼容船队主数据中的 "DRY BULK" 写法
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TankType {
    Liquid,   // 液货舱 (泥浆/盐水)
    Methanol, // 甲醇舱
    Slop,     // 污液舱
    #[serde(alias = "DRY BULK")]
    DryBulk,  // 干散货舱
}

impl fmt::Display for TankType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl TankType {
    /// 全部舱型（固定顺序，用于报表分组）
    pub const ALL: [TankType; 4] = [
        TankType::Liquid,
        TankType::Methanol,
        TankType::Slop,
        TankType::DryBulk,
    ];

    /// 从字符串解析舱型
    ///
    /// 接受 "DRY BULK" / "DRY_BULK" / "dry-bulk" 等写法
    pub fn from_str(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .to_uppercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "LIQUID" => Some(TankType::Liquid),
            "METHANOL" => Some(TankType::Methanol),
            "SLOP" => Some(TankType::Slop),
            "DRY_BULK" => Some(TankType::DryBulk),
            _ => None,
        }
    }

    /// 转换为存储用字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            TankType::Liquid => "LIQUID",
            TankType::Methanol => "METHANOL",
            TankType::Slop => "SLOP",
            TankType::DryBulk => "DRY_BULK",
        }
    }

    /// 是否受灌装上限折减
    ///
    /// 干散货装载固体，不存在液舱的泵压/晃荡余量问题，按名义舱容计算
    pub fn is_fill_limited(&self) -> bool {
        !matches!(self, TankType::DryBulk)
    }

    /// 是否属于泵系统（干散货舱独立，不参与分组）
    pub fn has_pump_system(&self) -> bool {
        !matches!(self, TankType::DryBulk)
    }
}

// ==========================================
// 相容性等级 (Compatibility Level)
// ==========================================
// 红线: 三值等级,不是布尔值
// 顺序: Incompatible < NeedsCleaning < Compatible
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompatibilityLevel {
    Incompatible,  // 必须清舱后使用,或完全禁止
    NeedsCleaning, // 残液受限 (Residue <= 5 bbls)
    Compatible,    // 无需清舱
}

impl fmt::Display for CompatibilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompatibilityLevel::Incompatible => write!(f, "INCOMPATIBLE"),
            CompatibilityLevel::NeedsCleaning => write!(f, "NEEDS_CLEANING"),
            CompatibilityLevel::Compatible => write!(f, "COMPATIBLE"),
        }
    }
}

impl CompatibilityLevel {
    /// 展示用标签
    pub fn label(&self) -> &'static str {
        match self {
            CompatibilityLevel::Incompatible => "Incompatible",
            CompatibilityLevel::NeedsCleaning => "Needs Cleaning",
            CompatibilityLevel::Compatible => "Compatible",
        }
    }

    /// 是否可立即使用
    pub fn is_immediately_usable(&self) -> bool {
        matches!(self, CompatibilityLevel::Compatible)
    }
}

// ==========================================
// 流体类别 (Fluid Category)
// ==========================================
// 每种流体属于且仅属于一个类别, 类别决定合法舱型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FluidCategory {
    #[serde(rename = "SBM")]
    SyntheticBasedMud, // 合成基泥浆
    #[serde(rename = "WBM")]
    WaterBasedMud,     // 水基泥浆
    #[serde(rename = "BRINE")]
    Brine,             // 完井盐水
    #[serde(rename = "METHANOL")]
    Methanol,          // 甲醇类
    #[serde(rename = "WASTE")]
    Waste,             // 废液
    #[serde(rename = "DRY_BULK")]
    DryBulk,           // 干散货 (水泥/重晶石/膨润土)
}

impl fmt::Display for FluidCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FluidCategory::SyntheticBasedMud => write!(f, "SBM"),
            FluidCategory::WaterBasedMud => write!(f, "WBM"),
            FluidCategory::Brine => write!(f, "BRINE"),
            FluidCategory::Methanol => write!(f, "METHANOL"),
            FluidCategory::Waste => write!(f, "WASTE"),
            FluidCategory::DryBulk => write!(f, "DRY_BULK"),
        }
    }
}

impl FluidCategory {
    /// 从字符串解析流体类别（未知类别返回 None）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace(' ', "_").as_str() {
            "SBM" => Some(FluidCategory::SyntheticBasedMud),
            "WBM" => Some(FluidCategory::WaterBasedMud),
            "BRINE" => Some(FluidCategory::Brine),
            "METHANOL" => Some(FluidCategory::Methanol),
            "WASTE" | "SLOP" => Some(FluidCategory::Waste),
            "DRY_BULK" => Some(FluidCategory::DryBulk),
            _ => None,
        }
    }

    /// 该类别合法可装载的舱型
    pub fn allowed_tank_types(&self) -> &'static [TankType] {
        match self {
            FluidCategory::SyntheticBasedMud
            | FluidCategory::WaterBasedMud
            | FluidCategory::Brine => &[TankType::Liquid],
            FluidCategory::Methanol => &[TankType::Methanol],
            FluidCategory::Waste => &[TankType::Slop],
            FluidCategory::DryBulk => &[TankType::DryBulk],
        }
    }
}

// ==========================================
// 计量单位 (Display Unit)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FluidUnit {
    Bbl, // 桶
    Cf,  // 立方英尺
}

impl fmt::Display for FluidUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FluidUnit::Bbl => write!(f, "bbl"),
            FluidUnit::Cf => write!(f, "cf"),
        }
    }
}

// ==========================================
// 灌装上限档位 (Fill Limit Mode)
// ==========================================
// 两档: 常规作业 / 超控
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FillLimitMode {
    Normal,   // 常规作业 (默认 80%)
    Override, // 超控 (默认 90%)
}

impl fmt::Display for FillLimitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillLimitMode::Normal => write!(f, "NORMAL"),
            FillLimitMode::Override => write!(f, "OVERRIDE"),
        }
    }
}
