// ==========================================
// OSV 液舱管理系统 - 泵系统分组
// ==========================================
// 职责: 按 pump_system_id 对船舶非干散货舱分组
// 红线: 分组为派生数据, 每次按当前舱状态重新计算, 不缓存
// 红线: 干散货舱不属于任何泵系统
// ==========================================

use crate::domain::tank::Tank;
use crate::domain::vessel::Vessel;
use std::collections::{BTreeMap, BTreeSet};

/// 甲醇泵系统编号
pub const METHANOL_PUMP_SYSTEM_ID: u32 = 4;

/// 污液泵系统编号
pub const SLOP_PUMP_SYSTEM_ID: u32 = 5;

/// 泵系统展示名
pub fn pump_system_label(pump_system_id: u32) -> String {
    match pump_system_id {
        METHANOL_PUMP_SYSTEM_ID => "Methanol System".to_string(),
        SLOP_PUMP_SYSTEM_ID => "Slop System".to_string(),
        id => format!("System {}", id),
    }
}

// ==========================================
// PumpSystemGrouping - 泵系统分组结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PumpSystemGrouping<'a> {
    groups: BTreeMap<u32, Vec<&'a Tank>>,
}

impl<'a> PumpSystemGrouping<'a> {
    /// 升序的泵系统编号
    pub fn ids(&self) -> Vec<u32> {
        self.groups.keys().copied().collect()
    }

    /// 某泵系统内的舱 (保持舱序)
    pub fn tanks(&self, pump_system_id: u32) -> &[&'a Tank] {
        self.groups
            .get(&pump_system_id)
            .map(|tanks| tanks.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// 按编号升序遍历 (编号, 舱列表)
    pub fn iter(&self) -> impl Iterator<Item = (u32, &[&'a Tank])> {
        self.groups.iter().map(|(id, tanks)| (*id, tanks.as_slice()))
    }
}

/// 按泵系统分组
///
/// 干散货舱排除; 未设置编号的舱归入 0 号系统
pub fn group_by_pump_system(vessel: &Vessel) -> PumpSystemGrouping<'_> {
    let mut groups: BTreeMap<u32, Vec<&Tank>> = BTreeMap::new();
    for tank in &vessel.tanks {
        if let Some(id) = tank.effective_pump_system_id() {
            groups.entry(id).or_default().push(tank);
        }
    }
    PumpSystemGrouping { groups }
}

/// 船舶泵系统数量
pub fn pump_system_count(vessel: &Vessel) -> usize {
    vessel
        .tanks
        .iter()
        .filter_map(|t| t.effective_pump_system_id())
        .collect::<BTreeSet<_>>()
        .len()
}

/// 一组舱涉及的泵系统编号
///
/// 干散货舱与船上不存在的舱号不计入
pub fn pump_system_spread(vessel: &Vessel, tank_ids: &[String]) -> BTreeSet<u32> {
    tank_ids
        .iter()
        .filter_map(|id| vessel.find_tank(id))
        .filter_map(|t| t.effective_pump_system_id())
        .collect()
}
