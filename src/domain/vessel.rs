// ==========================================
// OSV 液舱管理系统 - 船舶/船队领域模型
// ==========================================
// 职责: 船舶、客户、船队目录
// 红线: 舱序有意义 (左右舷成对布局), 不得重排
// ==========================================

use crate::domain::fluid::FluidCatalog;
use crate::domain::tank::Tank;
use crate::domain::types::TankType;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ==========================================
// Vessel - 船舶
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vessel {
    pub id: u32,
    pub name: String,
    pub last_updated: NaiveDateTime, // 最近更新时间
    pub fuel_onboard: f64,           // 船载燃油
    pub water_onboard: f64,          // 船载淡水
    pub best_candidate: bool,        // 人工标记的"最佳候选"
    pub tanks: Vec<Tank>,            // 有序舱列表
}

impl Vessel {
    pub fn find_tank(&self, tank_id: &str) -> Option<&Tank> {
        self.tanks.iter().find(|t| t.id == tank_id)
    }

    pub fn find_tank_mut(&mut self, tank_id: &str) -> Option<&mut Tank> {
        self.tanks.iter_mut().find(|t| t.id == tank_id)
    }

    pub fn has_tank(&self, tank_id: &str) -> bool {
        self.find_tank(tank_id).is_some()
    }

    /// 按舱型筛选（保持原有舱序）
    pub fn tanks_of_type(&self, tank_type: TankType) -> impl Iterator<Item = &Tank> {
        self.tanks.iter().filter(move |t| t.tank_type == tank_type)
    }

    /// 非干散货舱（液货/甲醇/污液）
    pub fn liquid_bearing_tanks(&self) -> impl Iterator<Item = &Tank> {
        self.tanks.iter().filter(|t| t.tank_type.is_fill_limited())
    }
}

// ==========================================
// Client - 客户
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: u32,
    pub name: String,
    pub location: String,
}

// ==========================================
// FleetCatalog - 船队主数据
// ==========================================
// 启动时一次性提供; 会话期内仅舱内货物/液位/客户/停用状态可变
#[derive(Debug, Clone, Default)]
pub struct FleetCatalog {
    pub vessels: Vec<Vessel>,
    pub clients: Vec<Client>,
    pub fluids: FluidCatalog,
}

impl FleetCatalog {
    pub fn find_vessel(&self, vessel_id: u32) -> Option<&Vessel> {
        self.vessels.iter().find(|v| v.id == vessel_id)
    }

    pub fn find_vessel_mut(&mut self, vessel_id: u32) -> Option<&mut Vessel> {
        self.vessels.iter_mut().find(|v| v.id == vessel_id)
    }

    pub fn find_client(&self, name: &str) -> Option<&Client> {
        self.clients.iter().find(|c| c.name == name)
    }

    /// 全船队舱总数
    pub fn tank_count(&self) -> usize {
        self.vessels.iter().map(|v| v.tanks.len()).sum()
    }
}
