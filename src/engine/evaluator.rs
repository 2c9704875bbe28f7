// ==========================================
// OSV 液舱管理系统 - 相容性评估引擎 (船队级)
// ==========================================
// 职责: 对候选流体, 给出船队内各舱的相容性等级
// 输入: 相容性矩阵 + 流体目录 + 船舶快照
// 输出: (船, 舱, 等级) 列表, 按等级降序, 同级保持输入顺序
// 红线: 纯函数, 不修改任何舱状态
// ==========================================

use crate::domain::fluid::FluidCatalog;
use crate::domain::tank::Tank;
use crate::domain::types::{CompatibilityLevel, TankType};
use crate::domain::vessel::Vessel;
use crate::engine::compatibility::CompatibilityMatrix;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

// ==========================================
// TankMatch - 单舱评估结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankMatch<'a> {
    pub vessel: &'a Vessel,
    pub tank: &'a Tank,
    pub level: CompatibilityLevel,
}

// ==========================================
// CompatibilityEvaluator - 相容性评估引擎
// ==========================================
pub struct CompatibilityEvaluator<'a> {
    matrix: &'a CompatibilityMatrix,
    fluids: &'a FluidCatalog,
}

impl<'a> CompatibilityEvaluator<'a> {
    pub fn new(matrix: &'a CompatibilityMatrix, fluids: &'a FluidCatalog) -> Self {
        Self { matrix, fluids }
    }

    pub fn matrix(&self) -> &'a CompatibilityMatrix {
        self.matrix
    }

    pub fn fluids(&self) -> &'a FluidCatalog {
        self.fluids
    }

    /// 单舱相容性 (仅矩阵查询, 不考虑舱型)
    pub fn compatibility(&self, tank: &Tank, candidate_fluid: &str) -> CompatibilityLevel {
        self.matrix.compatibility_for_tank(tank, candidate_fluid)
    }

    /// 候选流体合法的舱型集合
    ///
    /// 流体不在目录中时返回空集 (即零个可用舱)
    pub fn classify_by_tank_type(&self, candidate_fluid: &str) -> BTreeSet<TankType> {
        self.fluids
            .allowed_tank_types(candidate_fluid)
            .iter()
            .copied()
            .collect()
    }

    /// 舱型是否可装载该流体
    pub fn is_eligible(&self, tank: &Tank, candidate_fluid: &str) -> bool {
        self.fluids
            .allowed_tank_types(candidate_fluid)
            .contains(&tank.tank_type)
    }

    /// 船队内可装载候选流体的舱及其相容性等级
    ///
    /// 规则:
    /// 1) 仅包含舱型合法的舱
    /// 2) 按等级降序 (COMPATIBLE > NEEDS_CLEANING > INCOMPATIBLE)
    /// 3) 同级保持输入顺序 (船序, 舱序)
    ///
    /// # 参数
    /// - `vessels`: 船舶快照
    /// - `candidate_fluid`: 候选流体名
    #[instrument(skip(self, vessels), fields(vessel_count = vessels.len()))]
    pub fn find_compatible_tanks<'v>(
        &self,
        vessels: &'v [Vessel],
        candidate_fluid: &str,
    ) -> Vec<TankMatch<'v>> {
        let mut matches: Vec<TankMatch<'v>> = vessels
            .iter()
            .flat_map(|vessel| vessel.tanks.iter().map(move |tank| (vessel, tank)))
            .filter(|(_, tank)| self.is_eligible(tank, candidate_fluid))
            .map(|(vessel, tank)| TankMatch {
                vessel,
                tank,
                level: self.compatibility(tank, candidate_fluid),
            })
            .collect();

        // sort_by 为稳定排序
        matches.sort_by(|a, b| b.level.cmp(&a.level));

        debug!(
            fluid = candidate_fluid,
            matched = matches.len(),
            "候选流体相容性评估完成"
        );
        matches
    }

    /// 单船中可立即使用 (COMPATIBLE 且舱型合法) 的舱数量
    pub fn ready_tank_count(&self, vessel: &Vessel, candidate_fluid: &str) -> usize {
        vessel
            .tanks
            .iter()
            .filter(|tank| self.is_eligible(tank, candidate_fluid))
            .filter(|tank| self.compatibility(tank, candidate_fluid).is_immediately_usable())
            .count()
    }

    /// 单船是否至少有一个可立即使用的舱
    pub fn has_compatible_tank(&self, vessel: &Vessel, candidate_fluid: &str) -> bool {
        self.ready_tank_count(vessel, candidate_fluid) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fluid::Fluid;
    use crate::domain::tank::TankContents;
    use crate::domain::types::{FluidCategory, FluidUnit};
    use crate::engine::compatibility::CompatibilityEntry;
    use chrono::NaiveDate;

    fn fluid(name: &str, category: FluidCategory) -> Fluid {
        Fluid {
            id: name.to_lowercase(),
            name: name.to_string(),
            color: "#000".to_string(),
            category,
            unit: FluidUnit::Bbl,
        }
    }

    fn tank(id: &str, tank_type: TankType, contents: &str) -> Tank {
        Tank {
            id: id.to_string(),
            tank_type,
            capacity: 1000.0,
            current_level: if contents == "Empty" { 0.0 } else { 100.0 },
            contents: TankContents::fluid(contents),
            pump_system_id: Some(1),
            client: None,
            last_cleaning: None,
            history: None,
            pressure: 0.0,
        }
    }

    fn vessel(id: u32, tanks: Vec<Tank>) -> Vessel {
        Vessel {
            id,
            name: format!("V{}", id),
            last_updated: NaiveDate::from_ymd_opt(2025, 5, 5)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            fuel_onboard: 0.0,
            water_onboard: 0.0,
            best_candidate: false,
            tanks,
        }
    }

    fn setup() -> (CompatibilityMatrix, FluidCatalog) {
        let fluids = FluidCatalog::new(vec![
            fluid("CaCl2", FluidCategory::Brine),
            fluid("KCl", FluidCategory::Brine),
            fluid("Methanol", FluidCategory::Methanol),
        ]);
        let (matrix, _) = CompatibilityMatrix::build(
            &fluids,
            vec![
                CompatibilityEntry::new("CaCl2", "KCl", "OK; Residue <= 5 bbls"),
                CompatibilityEntry::new("KCl", "KCl", "OK"),
            ],
        );
        (matrix, fluids)
    }

    #[test]
    fn test_sorted_by_level_then_input_order() {
        let (matrix, fluids) = setup();
        let evaluator = CompatibilityEvaluator::new(&matrix, &fluids);
        let vessels = vec![
            vessel(1, vec![
                tank("Tk 1S", TankType::Liquid, "CaCl2"),
                tank("Tk 1P", TankType::Liquid, "Mystery Mud"),
                tank("Meth 1S", TankType::Methanol, "Empty"),
            ]),
            vessel(2, vec![
                tank("Tk 1S", TankType::Liquid, "Empty"),
                tank("Tk 1P", TankType::Liquid, "KCl"),
            ]),
        ];

        let matches = evaluator.find_compatible_tanks(&vessels, "KCl");
        let order: Vec<(u32, &str, CompatibilityLevel)> = matches
            .iter()
            .map(|m| (m.vessel.id, m.tank.id.as_str(), m.level))
            .collect();

        assert_eq!(
            order,
            vec![
                (2, "Tk 1S", CompatibilityLevel::Compatible),
                (2, "Tk 1P", CompatibilityLevel::Compatible),
                (1, "Tk 1S", CompatibilityLevel::NeedsCleaning),
                (1, "Tk 1P", CompatibilityLevel::Incompatible),
            ]
        );
    }

    #[test]
    fn test_unknown_fluid_has_no_eligible_tanks() {
        let (matrix, fluids) = setup();
        let evaluator = CompatibilityEvaluator::new(&matrix, &fluids);
        let vessels = vec![vessel(1, vec![tank("Tk 1S", TankType::Liquid, "Empty")])];

        assert!(evaluator.classify_by_tank_type("Unobtainium").is_empty());
        assert!(evaluator.find_compatible_tanks(&vessels, "Unobtainium").is_empty());
    }

    #[test]
    fn test_ready_tank_count_ignores_out_of_service() {
        let (matrix, fluids) = setup();
        let evaluator = CompatibilityEvaluator::new(&matrix, &fluids);
        let mut oos = tank("Tk 2S", TankType::Liquid, "Empty");
        oos.contents = TankContents::OutOfService;
        let v = vessel(1, vec![tank("Tk 1S", TankType::Liquid, "Empty"), oos]);

        assert_eq!(evaluator.ready_tank_count(&v, "CaCl2"), 1);
        assert!(evaluator.has_compatible_tank(&v, "CaCl2"));
        assert!(!evaluator.has_compatible_tank(&v, "Methanol"));
    }
}
