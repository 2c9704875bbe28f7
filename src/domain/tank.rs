// ==========================================
// OSV 液舱管理系统 - 液舱领域模型
// ==========================================
// 红线: 0 <= current_level <= capacity
// 红线: 液舱只在加载船队数据时创建, 运行期不增不减
// ==========================================

use crate::domain::fluid::{FluidKey, EMPTY_CONTENTS, OUT_OF_SERVICE_CONTENTS};
use crate::domain::types::TankType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 未设置泵系统时的默认编号
pub const DEFAULT_PUMP_SYSTEM_ID: u32 = 0;

// ==========================================
// TankContents - 舱内货物
// ==========================================
// 序列化为单个字符串: "Empty" / "Out of Service" / 流体名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TankContents {
    Empty,         // 空舱
    OutOfService,  // 停用, 暂不参与分配
    Fluid(String), // 装有某流体
}

impl TankContents {
    pub fn fluid(name: &str) -> Self {
        TankContents::from(name.to_string())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, TankContents::Empty)
    }

    pub fn is_out_of_service(&self) -> bool {
        matches!(self, TankContents::OutOfService)
    }

    /// 装载的流体名（空舱/停用返回 None）
    pub fn fluid_name(&self) -> Option<&str> {
        match self {
            TankContents::Fluid(name) => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TankContents::Empty => EMPTY_CONTENTS,
            TankContents::OutOfService => OUT_OF_SERVICE_CONTENTS,
            TankContents::Fluid(name) => name.as_str(),
        }
    }
}

impl From<String> for TankContents {
    fn from(value: String) -> Self {
        let key = FluidKey::new(&value);
        if key.is_blank() || key == FluidKey::new(EMPTY_CONTENTS) {
            TankContents::Empty
        } else if key == FluidKey::new(OUT_OF_SERVICE_CONTENTS) {
            TankContents::OutOfService
        } else {
            TankContents::Fluid(value.trim().to_string())
        }
    }
}

impl From<TankContents> for String {
    fn from(value: TankContents) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for TankContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Tank - 液舱
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tank {
    // ===== 标识 =====
    pub id: String, // 舱号 (船内唯一, 如 "Tk 1S")
    #[serde(rename = "type")]
    pub tank_type: TankType, // 舱型

    // ===== 容量 =====
    pub capacity: f64,      // 名义舱容 (原生单位)
    pub current_level: f64, // 当前液位

    // ===== 货物与归属 =====
    pub contents: TankContents,
    pub pump_system_id: Option<u32>, // 泵系统编号 (干散货舱为 None)
    pub client: Option<String>,      // 客户 (None = 未分配)

    // ===== 溯源 =====
    pub last_cleaning: Option<NaiveDate>, // 最近清舱日期
    pub history: Option<String>,          // 上一次装载的流体
    pub pressure: f64,                    // 压力 (仅展示)
}

impl Tank {
    /// 生效的泵系统编号
    ///
    /// - 干散货舱: None (不属于任何泵系统)
    /// - 其他舱型: 未设置时默认为 0
    pub fn effective_pump_system_id(&self) -> Option<u32> {
        if self.tank_type.has_pump_system() {
            Some(self.pump_system_id.unwrap_or(DEFAULT_PUMP_SYSTEM_ID))
        } else {
            None
        }
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    pub fn is_out_of_service(&self) -> bool {
        self.contents.is_out_of_service()
    }

    /// 名义液位比例 (舱容为0时返回0)
    pub fn fill_ratio(&self) -> f64 {
        if self.capacity <= 0.0 {
            return 0.0;
        }
        self.current_level / self.capacity
    }
}
