// ==========================================
// OSV 液舱管理系统 - 容量领域模型
// ==========================================
// 红线: 可用容量下限为 0 (超灌是告警, 不是错误)
// 红线: 总容量为 0 时利用率为 0
// ==========================================

use crate::domain::tank::Tank;
use crate::domain::types::TankType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Trait: FillLimitConstraint
// ==========================================
// 用途: 单舱的灌装上限折减与超灌判断
pub trait FillLimitConstraint {
    /// 折减后的有效舱容
    fn effective_capacity(&self, fill_limit: f64) -> f64;

    /// 是否超过灌装上限
    fn is_overfilled(&self, fill_limit: f64) -> bool;

    /// 单舱剩余可用容量 (>= 0)
    fn available_capacity(&self, fill_limit: f64) -> f64;
}

impl FillLimitConstraint for Tank {
    /// 干散货舱不折减
    fn effective_capacity(&self, fill_limit: f64) -> f64 {
        if self.tank_type.is_fill_limited() {
            self.capacity * fill_limit
        } else {
            self.capacity
        }
    }

    /// current_level > capacity * fill_limit
    ///
    /// 干散货舱不受灌装上限约束, 恒不超灌
    fn is_overfilled(&self, fill_limit: f64) -> bool {
        self.tank_type.is_fill_limited() && self.current_level > self.capacity * fill_limit
    }

    fn available_capacity(&self, fill_limit: f64) -> f64 {
        (self.effective_capacity(fill_limit) - self.current_level).max(0.0)
    }
}

// ==========================================
// CapacitySummary - 容量汇总
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CapacitySummary {
    pub total_capacity: f64,     // 有效舱容合计
    pub used_capacity: f64,      // 液位合计
    pub available_capacity: f64, // max(0, total - used)
    pub utilization_percent: u32,
    pub tank_count: usize,
}

impl CapacitySummary {
    /// 由合计值构造（负可用量截断为 0, 零容量利用率为 0）
    pub fn from_totals(total_capacity: f64, used_capacity: f64, tank_count: usize) -> Self {
        let available_capacity = (total_capacity - used_capacity).max(0.0);
        let utilization_percent = if total_capacity > 0.0 {
            (used_capacity / total_capacity * 100.0).round().max(0.0) as u32
        } else {
            0
        };
        Self {
            total_capacity,
            used_capacity,
            available_capacity,
            utilization_percent,
            tank_count,
        }
    }
}

// ==========================================
// 分组汇总
// ==========================================

/// 泵系统容量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpSystemCapacity {
    pub pump_system_id: u32,
    pub label: String,
    pub tank_ids: Vec<String>,
    pub summary: CapacitySummary,
}

/// 按舱型分组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TankTypeBreakdown {
    pub tank_type: TankType,
    pub summary: CapacitySummary,
}

/// 按客户分组 ("Unassigned" 为未分配)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientBreakdown {
    pub client: String,
    pub summary: CapacitySummary,
}

/// 货物体量 (仅统计非空舱)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentVolume {
    pub contents: String,
    pub volume: f64,
    pub tank_count: usize,
}

/// 单船按货物类型汇总 (液货舱附带泵系统分组)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselCapacityRollup {
    pub vessel_id: u32,
    pub vessel_name: String,
    pub liquid: CapacitySummary,
    pub liquid_by_pump_system: Vec<PumpSystemCapacity>,
    pub methanol: CapacitySummary,
    pub slop: CapacitySummary,
    pub dry_bulk: CapacitySummary,
}

// ==========================================
// KPI
// ==========================================

/// 单船绩效
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselPerformance {
    pub vessel_id: u32,
    pub vessel_name: String,
    pub utilization_percent: u32,
    pub available_capacity: f64,
    pub warning_count: usize,
    pub empty_tanks: usize,
    pub total_tanks: usize,
    pub last_updated: NaiveDateTime,
    pub best_candidate: bool,
}

/// 船队 KPI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetKpi {
    pub vessel_count: usize,
    pub liquid: CapacitySummary,   // 液货/甲醇/污液
    pub dry_bulk: CapacitySummary, // 干散货
    pub average_utilization_percent: u32,
    pub total_warnings: usize,
    pub vessels: Vec<VesselPerformance>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tank::TankContents;

    fn tank(tank_type: TankType, capacity: f64, level: f64) -> Tank {
        Tank {
            id: "T".to_string(),
            tank_type,
            capacity,
            current_level: level,
            contents: TankContents::Empty,
            pump_system_id: None,
            client: None,
            last_cleaning: None,
            history: None,
            pressure: 0.0,
        }
    }

    #[test]
    fn test_fill_limit_derating() {
        let liquid = tank(TankType::Liquid, 1000.0, 0.0);
        let dry = tank(TankType::DryBulk, 1000.0, 0.0);
        assert_eq!(liquid.effective_capacity(0.8), 800.0);
        assert_eq!(dry.effective_capacity(0.8), 1000.0);
    }

    #[test]
    fn test_overfill_toggles_without_residual_state() {
        let mut t = tank(TankType::Liquid, 1000.0, 700.0);
        assert!(!t.is_overfilled(0.8));
        t.current_level = 850.0;
        assert!(t.is_overfilled(0.8));
        assert_eq!(t.available_capacity(0.8), 0.0);
        t.current_level = 700.0;
        assert!(!t.is_overfilled(0.8));
        assert_eq!(t.available_capacity(0.8), 100.0);
    }

    #[test]
    fn test_dry_bulk_never_overfilled() {
        let dry = tank(TankType::DryBulk, 1000.0, 900.0);
        assert!(!dry.is_overfilled(0.8));
        assert_eq!(dry.available_capacity(0.8), 100.0);
    }

    #[test]
    fn test_summary_zero_guard() {
        let summary = CapacitySummary::from_totals(0.0, 0.0, 0);
        assert_eq!(summary.utilization_percent, 0);
        assert_eq!(summary.available_capacity, 0.0);
    }

    #[test]
    fn test_summary_clamps_available() {
        let summary = CapacitySummary::from_totals(800.0, 900.0, 1);
        assert_eq!(summary.available_capacity, 0.0);
        assert_eq!(summary.utilization_percent, 113);
    }
}
