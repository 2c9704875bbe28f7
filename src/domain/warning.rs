// ==========================================
// OSV 液舱管理系统 - 告警注记
// ==========================================
// 红线: 告警仅为提示, 不阻断任何操作
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// WarningKind - 告警类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    Overfill,                // 超过灌装上限
    MethanolContentMismatch, // 甲醇舱装有非甲醇类流体
    SlopContentMismatch,     // 污液舱装有非废液
    CrossPumpSystemStep,     // 调驳步骤跨泵系统
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningKind::Overfill => "OVERFILL",
            WarningKind::MethanolContentMismatch => "METHANOL_CONTENT_MISMATCH",
            WarningKind::SlopContentMismatch => "SLOP_CONTENT_MISMATCH",
            WarningKind::CrossPumpSystemStep => "CROSS_PUMP_SYSTEM_STEP",
        }
    }
}

// ==========================================
// TankWarning - 舱/船告警
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TankWarning {
    pub vessel_id: u32,
    pub tank_id: Option<String>, // 步骤级告警无单舱
    pub kind: WarningKind,
    pub message: String,
}

impl TankWarning {
    pub fn for_tank(vessel_id: u32, tank_id: &str, kind: WarningKind, message: String) -> Self {
        Self {
            vessel_id,
            tank_id: Some(tank_id.to_string()),
            kind,
            message,
        }
    }
}
