// ==========================================
// OSV 液舱管理系统 - 舱告警扫描
// ==========================================
// 职责: 扫描超灌与货物类型不符
// 红线: 告警只是注记, 不阻断任何操作
// 红线: 每次按当前液位/货物/灌装上限重新计算, 无残留状态
// ==========================================

use crate::domain::capacity::FillLimitConstraint;
use crate::domain::fluid::FluidCatalog;
use crate::domain::tank::Tank;
use crate::domain::types::{FluidCategory, TankType};
use crate::domain::vessel::Vessel;
use crate::domain::warning::{TankWarning, WarningKind};
use tracing::debug;

// ==========================================
// TankWarningScanner
// ==========================================
pub struct TankWarningScanner<'a> {
    fluids: &'a FluidCatalog,
    fill_limit: f64,
}

impl<'a> TankWarningScanner<'a> {
    pub fn new(fluids: &'a FluidCatalog, fill_limit: f64) -> Self {
        Self { fluids, fill_limit }
    }

    /// 单舱告警 (按舱型检查货物)
    pub fn scan_tank(&self, vessel_id: u32, tank: &Tank) -> Vec<TankWarning> {
        let mut warnings = Vec::new();

        if tank.is_overfilled(self.fill_limit) {
            warnings.push(TankWarning::for_tank(
                vessel_id,
                &tank.id,
                WarningKind::Overfill,
                format!(
                    "{} 液位 {} 超过灌装上限 {:.0}% ({:.1})",
                    tank.id,
                    tank.current_level,
                    self.fill_limit * 100.0,
                    tank.capacity * self.fill_limit
                ),
            ));
        }

        // 空舱/停用舱不做货物检查
        if let Some(fluid) = tank.contents.fluid_name() {
            let category = self.fluids.category_of(fluid);
            match tank.tank_type {
                TankType::Methanol if category != Some(FluidCategory::Methanol) => {
                    warnings.push(TankWarning::for_tank(
                        vessel_id,
                        &tank.id,
                        WarningKind::MethanolContentMismatch,
                        format!("甲醇舱 {} 装有非甲醇类流体: {}", tank.id, fluid),
                    ));
                }
                TankType::Slop if category != Some(FluidCategory::Waste) => {
                    warnings.push(TankWarning::for_tank(
                        vessel_id,
                        &tank.id,
                        WarningKind::SlopContentMismatch,
                        format!("污液舱 {} 装有非废液: {}", tank.id, fluid),
                    ));
                }
                _ => {}
            }
        }

        warnings
    }

    /// 单船告警 (按舱序)
    pub fn scan_vessel(&self, vessel: &Vessel) -> Vec<TankWarning> {
        vessel
            .tanks
            .iter()
            .flat_map(|tank| self.scan_tank(vessel.id, tank))
            .collect()
    }

    /// 船队告警 (按船序)
    pub fn scan_fleet(&self, vessels: &[Vessel]) -> Vec<TankWarning> {
        let warnings: Vec<TankWarning> = vessels.iter().flat_map(|v| self.scan_vessel(v)).collect();
        debug!(
            vessel_count = vessels.len(),
            warnings = warnings.len(),
            "船队告警扫描完成"
        );
        warnings
    }

    pub fn warning_count(&self, vessel: &Vessel) -> usize {
        self.scan_vessel(vessel).len()
    }
}
