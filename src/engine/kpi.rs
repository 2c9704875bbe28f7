// ==========================================
// OSV 液舱管理系统 - 船队统计与 KPI
// ==========================================
// 职责: 舱型/客户/货物分组统计, 单船汇总, 船队 KPI
// 红线: 空船队/无舱船舶一律返回零值, 不报错
// ==========================================

use crate::domain::capacity::{
    ClientBreakdown, ContentVolume, FleetKpi, TankTypeBreakdown, VesselCapacityRollup,
    VesselPerformance,
};
use crate::domain::fluid::FluidCatalog;
use crate::domain::tank::Tank;
use crate::domain::types::TankType;
use crate::domain::vessel::Vessel;
use crate::engine::capacity::{CapacityCalculator, TankFilter, UNASSIGNED_CLIENT};
use crate::engine::warning_scan::TankWarningScanner;
use std::collections::BTreeMap;
use tracing::{info, instrument};

// ==========================================
// FleetStatistics
// ==========================================
pub struct FleetStatistics<'a> {
    calculator: CapacityCalculator,
    fluids: &'a FluidCatalog,
}

impl<'a> FleetStatistics<'a> {
    pub fn new(calculator: CapacityCalculator, fluids: &'a FluidCatalog) -> Self {
        Self { calculator, fluids }
    }

    fn filtered<'v>(vessels: &'v [Vessel], filter: &'v TankFilter) -> impl Iterator<Item = &'v Tank> {
        vessels
            .iter()
            .flat_map(|v| v.tanks.iter())
            .filter(move |t| filter.matches(t))
    }

    /// 按舱型分组 (固定顺序, 无舱的舱型不输出)
    pub fn breakdown_by_tank_type(&self, vessels: &[Vessel], filter: &TankFilter) -> Vec<TankTypeBreakdown> {
        TankType::ALL
            .iter()
            .filter_map(|tank_type| {
                let summary = self
                    .calculator
                    .summarize(Self::filtered(vessels, filter).filter(|t| t.tank_type == *tank_type));
                (summary.tank_count > 0).then_some(TankTypeBreakdown {
                    tank_type: *tank_type,
                    summary,
                })
            })
            .collect()
    }

    /// 按客户分组 (名称升序, 未分配归入 "Unassigned")
    pub fn breakdown_by_client(&self, vessels: &[Vessel], filter: &TankFilter) -> Vec<ClientBreakdown> {
        let mut groups: BTreeMap<&str, Vec<&Tank>> = BTreeMap::new();
        for tank in Self::filtered(vessels, filter) {
            let client = tank.client.as_deref().unwrap_or(UNASSIGNED_CLIENT);
            groups.entry(client).or_default().push(tank);
        }
        groups
            .into_iter()
            .map(|(client, tanks)| ClientBreakdown {
                client: client.to_string(),
                summary: self.calculator.summarize(tanks),
            })
            .collect()
    }

    /// 货物体量 (仅非空舱, 停用舱不计, 体量降序)
    pub fn content_volumes(&self, vessels: &[Vessel], filter: &TankFilter) -> Vec<ContentVolume> {
        let mut groups: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for tank in Self::filtered(vessels, filter) {
            let Some(fluid) = tank.contents.fluid_name() else {
                continue;
            };
            // 同一流体的大小写变体合并到目录名下
            let name = self
                .fluids
                .find(fluid)
                .map(|f| f.name.clone())
                .unwrap_or_else(|| fluid.to_string());
            let entry = groups.entry(name).or_insert((0.0, 0));
            entry.0 += tank.current_level;
            entry.1 += 1;
        }

        let mut volumes: Vec<ContentVolume> = groups
            .into_iter()
            .map(|(contents, (volume, tank_count))| ContentVolume {
                contents,
                volume,
                tank_count,
            })
            .collect();
        volumes.sort_by(|a, b| b.volume.total_cmp(&a.volume));
        volumes
    }

    /// 单船按货物类型汇总
    pub fn vessel_rollup(&self, vessel: &Vessel) -> VesselCapacityRollup {
        let by_type = |tank_type| self.calculator.summarize(vessel.tanks_of_type(tank_type));
        VesselCapacityRollup {
            vessel_id: vessel.id,
            vessel_name: vessel.name.clone(),
            liquid: by_type(TankType::Liquid),
            liquid_by_pump_system: self
                .calculator
                .pump_system_capacities(vessel)
                .into_iter()
                .filter(|system| {
                    system.tank_ids.iter().any(|id| {
                        vessel
                            .find_tank(id)
                            .map(|t| t.tank_type == TankType::Liquid)
                            .unwrap_or(false)
                    })
                })
                .collect(),
            methanol: by_type(TankType::Methanol),
            slop: by_type(TankType::Slop),
            dry_bulk: by_type(TankType::DryBulk),
        }
    }

    /// 单船绩效
    pub fn vessel_performance(&self, vessel: &Vessel) -> VesselPerformance {
        let liquid = self.calculator.vessel_liquid_summary(vessel);
        let scanner = TankWarningScanner::new(self.fluids, self.calculator.fill_limit());
        VesselPerformance {
            vessel_id: vessel.id,
            vessel_name: vessel.name.clone(),
            utilization_percent: liquid.utilization_percent,
            available_capacity: liquid.available_capacity,
            warning_count: scanner.warning_count(vessel),
            empty_tanks: vessel.tanks.iter().filter(|t| t.is_empty()).count(),
            total_tanks: vessel.tanks.len(),
            last_updated: vessel.last_updated,
            best_candidate: vessel.best_candidate,
        }
    }

    /// 船队 KPI
    #[instrument(skip(self, vessels), fields(vessel_count = vessels.len()))]
    pub fn fleet_kpi(&self, vessels: &[Vessel]) -> FleetKpi {
        let liquid = self.calculator.fleet_summary(vessels);
        let dry_bulk = self
            .calculator
            .summarize_for_types(vessels, &[TankType::DryBulk]);
        let performances: Vec<VesselPerformance> =
            vessels.iter().map(|v| self.vessel_performance(v)).collect();

        let average_utilization_percent = if performances.is_empty() {
            0
        } else {
            let sum: u32 = performances.iter().map(|p| p.utilization_percent).sum();
            (sum as f64 / performances.len() as f64).round() as u32
        };
        let total_warnings = performances.iter().map(|p| p.warning_count).sum();

        info!(
            utilization = liquid.utilization_percent,
            total_warnings, "船队 KPI 计算完成"
        );

        FleetKpi {
            vessel_count: vessels.len(),
            liquid,
            dry_bulk,
            average_utilization_percent,
            total_warnings,
            vessels: performances,
        }
    }
}
