// ==========================================
// OSV 液舱管理系统 - 容量计算引擎
// ==========================================
// 职责: 按灌装上限计算有效舱容、已用量、可用量与利用率
// 输入: 舱快照 + 船队灌装上限
// 输出: CapacitySummary (单船/泵系统/船队/舱型)
// 红线: 可用量 = max(0, 有效舱容 - 液位), 超灌只告警不报错
// 红线: 灌装上限为全局值, 修改后所有汇总立即按新值重算
// ==========================================

use crate::config::PlannerConfigReader;
use crate::domain::capacity::{CapacitySummary, FillLimitConstraint, PumpSystemCapacity};
use crate::domain::tank::Tank;
use crate::domain::types::TankType;
use crate::domain::vessel::Vessel;
use crate::engine::pump_system::{group_by_pump_system, pump_system_label};
use tracing::{debug, instrument};

/// 未分配客户的分组名
pub const UNASSIGNED_CLIENT: &str = "Unassigned";

// ==========================================
// TankFilter - 汇总前的舱过滤条件
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TankFilter {
    pub tank_type: Option<TankType>,
    pub client: Option<String>, // "Unassigned" 匹配未分配客户的舱
}

impl TankFilter {
    pub fn by_type(tank_type: TankType) -> Self {
        Self {
            tank_type: Some(tank_type),
            client: None,
        }
    }

    pub fn by_client(client: &str) -> Self {
        Self {
            tank_type: None,
            client: Some(client.to_string()),
        }
    }

    pub fn matches(&self, tank: &Tank) -> bool {
        if let Some(tank_type) = self.tank_type {
            if tank.tank_type != tank_type {
                return false;
            }
        }
        match &self.client {
            None => true,
            Some(client) => tank.client.as_deref().unwrap_or(UNASSIGNED_CLIENT) == client,
        }
    }
}

// ==========================================
// CapacityCalculator - 容量计算引擎
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityCalculator {
    fill_limit: f64,
}

impl CapacityCalculator {
    /// 构造函数
    ///
    /// # 参数
    /// - `fill_limit`: 灌装上限比例 (如 0.8)
    pub fn new(fill_limit: f64) -> Self {
        Self { fill_limit }
    }

    /// 从配置读取当前灌装上限
    pub fn from_config(config: &dyn PlannerConfigReader) -> Self {
        Self::new(config.get_fill_limit())
    }

    pub fn fill_limit(&self) -> f64 {
        self.fill_limit
    }

    pub fn effective_capacity(&self, tank: &Tank) -> f64 {
        tank.effective_capacity(self.fill_limit)
    }

    pub fn is_overfilled(&self, tank: &Tank) -> bool {
        tank.is_overfilled(self.fill_limit)
    }

    pub fn available_capacity(&self, tank: &Tank) -> f64 {
        tank.available_capacity(self.fill_limit)
    }

    // ==========================================
    // 汇总
    // ==========================================

    /// 对任意舱集合汇总
    ///
    /// 可用量按合计值截断, 单舱超灌会抵消其他舱的余量
    pub fn summarize<'a, I>(&self, tanks: I) -> CapacitySummary
    where
        I: IntoIterator<Item = &'a Tank>,
    {
        let mut total = 0.0;
        let mut used = 0.0;
        let mut count = 0;
        for tank in tanks {
            total += self.effective_capacity(tank);
            used += tank.current_level;
            count += 1;
        }
        CapacitySummary::from_totals(total, used, count)
    }

    /// 单船全部舱 (含干散货)
    pub fn vessel_summary(&self, vessel: &Vessel) -> CapacitySummary {
        self.summarize(&vessel.tanks)
    }

    /// 单船非干散货舱
    pub fn vessel_liquid_summary(&self, vessel: &Vessel) -> CapacitySummary {
        self.summarize(vessel.liquid_bearing_tanks())
    }

    /// 单船按过滤条件汇总
    pub fn vessel_filtered_summary(&self, vessel: &Vessel, filter: &TankFilter) -> CapacitySummary {
        self.summarize(vessel.tanks.iter().filter(|t| filter.matches(t)))
    }

    /// 单船各泵系统容量 (编号升序)
    pub fn pump_system_capacities(&self, vessel: &Vessel) -> Vec<PumpSystemCapacity> {
        group_by_pump_system(vessel)
            .iter()
            .map(|(pump_system_id, tanks)| PumpSystemCapacity {
                pump_system_id,
                label: pump_system_label(pump_system_id),
                tank_ids: tanks.iter().map(|t| t.id.clone()).collect(),
                summary: self.summarize(tanks.iter().copied()),
            })
            .collect()
    }

    /// 船队非干散货舱汇总
    #[instrument(skip(self, vessels), fields(vessel_count = vessels.len(), fill_limit = self.fill_limit))]
    pub fn fleet_summary(&self, vessels: &[Vessel]) -> CapacitySummary {
        let summary = self.summarize(vessels.iter().flat_map(|v| v.liquid_bearing_tanks()));
        debug!(
            total = summary.total_capacity,
            used = summary.used_capacity,
            available = summary.available_capacity,
            "船队容量汇总完成"
        );
        summary
    }

    /// 船队内指定舱型的汇总
    pub fn summarize_for_types(&self, vessels: &[Vessel], types: &[TankType]) -> CapacitySummary {
        self.summarize(
            vessels
                .iter()
                .flat_map(|v| v.tanks.iter())
                .filter(|t| types.contains(&t.tank_type)),
        )
    }

    /// 船队按过滤条件汇总
    pub fn fleet_filtered_summary(&self, vessels: &[Vessel], filter: &TankFilter) -> CapacitySummary {
        self.summarize(
            vessels
                .iter()
                .flat_map(|v| v.tanks.iter())
                .filter(|t| filter.matches(t)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tank::TankContents;
    use chrono::NaiveDate;

    fn tank(id: &str, tank_type: TankType, capacity: f64, level: f64, pump: Option<u32>) -> Tank {
        Tank {
            id: id.to_string(),
            tank_type,
            capacity,
            current_level: level,
            contents: if level > 0.0 {
                TankContents::fluid("KCl")
            } else {
                TankContents::Empty
            },
            pump_system_id: pump,
            client: None,
            last_cleaning: None,
            history: None,
            pressure: 0.0,
        }
    }

    fn vessel(tanks: Vec<Tank>) -> Vessel {
        Vessel {
            id: 1,
            name: "M/V Test".to_string(),
            last_updated: NaiveDate::from_ymd_opt(2025, 5, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            fuel_onboard: 0.0,
            water_onboard: 0.0,
            best_candidate: false,
            tanks,
        }
    }

    #[test]
    fn test_liquid_summary_applies_fill_limit() {
        let v = vessel(vec![
            tank("Tk 1S", TankType::Liquid, 1000.0, 200.0, Some(1)),
            tank("Tk 1P", TankType::Liquid, 1000.0, 0.0, Some(1)),
            tank("Dry Bulk 1", TankType::DryBulk, 2000.0, 500.0, None),
        ]);
        let calc = CapacityCalculator::new(0.8);

        let liquid = calc.vessel_liquid_summary(&v);
        assert_eq!(liquid.total_capacity, 1600.0);
        assert_eq!(liquid.used_capacity, 200.0);
        assert_eq!(liquid.available_capacity, 1400.0);
        assert_eq!(liquid.utilization_percent, 13);
        assert_eq!(liquid.tank_count, 2);

        // 干散货不折减
        let all = calc.vessel_summary(&v);
        assert_eq!(all.total_capacity, 3600.0);
    }

    #[test]
    fn test_fill_limit_change_recomputes() {
        let v = vessel(vec![tank("Meth 1P", TankType::Methanol, 455.0, 400.0, Some(4))]);

        let normal = CapacityCalculator::new(0.8);
        assert!(normal.is_overfilled(&v.tanks[0]));
        assert_eq!(normal.vessel_liquid_summary(&v).available_capacity, 0.0);

        let raised = CapacityCalculator::new(0.9);
        assert!(!raised.is_overfilled(&v.tanks[0]));
        let available = raised.vessel_liquid_summary(&v).available_capacity;
        assert!((available - 9.5).abs() < 1e-9);
    }

    #[test]
    fn test_pump_system_capacities() {
        let v = vessel(vec![
            tank("Tk 1S", TankType::Liquid, 1000.0, 100.0, Some(1)),
            tank("Meth 1S", TankType::Methanol, 500.0, 0.0, Some(4)),
            tank("Tk 1P", TankType::Liquid, 1000.0, 300.0, Some(1)),
            tank("Dry Bulk 1", TankType::DryBulk, 2000.0, 0.0, None),
        ]);
        let systems = CapacityCalculator::new(0.8).pump_system_capacities(&v);

        assert_eq!(systems.len(), 2);
        assert_eq!(systems[0].pump_system_id, 1);
        assert_eq!(systems[0].tank_ids, vec!["Tk 1S", "Tk 1P"]);
        assert_eq!(systems[0].summary.used_capacity, 400.0);
        assert_eq!(systems[1].label, "Methanol System");
        assert_eq!(systems[1].summary.total_capacity, 400.0);
    }

    #[test]
    fn test_filter_by_client() {
        let mut assigned = tank("Tk 1S", TankType::Liquid, 1000.0, 100.0, Some(1));
        assigned.client = Some("Na Kika".to_string());
        let v = vessel(vec![assigned, tank("Tk 1P", TankType::Liquid, 1000.0, 0.0, Some(1))]);
        let calc = CapacityCalculator::new(0.8);

        let na_kika = calc.vessel_filtered_summary(&v, &TankFilter::by_client("Na Kika"));
        assert_eq!(na_kika.tank_count, 1);
        let unassigned = calc.vessel_filtered_summary(&v, &TankFilter::by_client(UNASSIGNED_CLIENT));
        assert_eq!(unassigned.tank_count, 1);
        assert_eq!(unassigned.used_capacity, 0.0);
    }

    #[test]
    fn test_empty_fleet() {
        let summary = CapacityCalculator::new(0.8).fleet_summary(&[]);
        assert_eq!(summary, CapacitySummary::from_totals(0.0, 0.0, 0));
    }
}
