// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 临时数据库、船队/舱构造器、内置主数据装配
// ==========================================

#![allow(dead_code)]

use chrono::NaiveDate;
use osv_tank_planner::db;
use osv_tank_planner::domain::{
    Fluid, FluidCatalog, FluidCategory, FluidUnit, Tank, TankContents, TankType, Vessel,
};
use osv_tank_planner::engine::CompatibilityMatrix;
use osv_tank_planner::importer::{default_compatibility_matrix, default_fleet_catalog};
use osv_tank_planner::domain::FleetCatalog;
use rusqlite::Connection;
use std::error::Error;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file
        .path()
        .to_str()
        .ok_or("临时文件路径不是 UTF-8")?
        .to_string();

    let conn = db::open_sqlite_connection(&db_path)?;
    db::init_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开共享连接
pub fn open_shared_connection(db_path: &str) -> Result<Arc<Mutex<Connection>>, Box<dyn Error>> {
    let conn = db::open_sqlite_connection(db_path)?;
    db::init_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 内置船队目录 + 相容性矩阵
pub fn bundled_master_data() -> (FleetCatalog, CompatibilityMatrix) {
    let fleet = default_fleet_catalog().expect("内置船队目录应可加载");
    let (matrix, _) = default_compatibility_matrix(&fleet.fluids).expect("内置相容性表应可加载");
    (fleet, matrix)
}

pub fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

pub fn fixed_time() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 5)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

// ==========================================
// 构造器
// ==========================================

/// 舱构造器
pub struct TankBuilder {
    tank: Tank,
}

impl TankBuilder {
    pub fn new(id: &str, tank_type: TankType) -> Self {
        Self {
            tank: Tank {
                id: id.to_string(),
                tank_type,
                capacity: 1000.0,
                current_level: 0.0,
                contents: TankContents::Empty,
                pump_system_id: if tank_type == TankType::DryBulk { None } else { Some(1) },
                client: None,
                last_cleaning: None,
                history: None,
                pressure: 0.0,
            },
        }
    }

    pub fn capacity(mut self, capacity: f64) -> Self {
        self.tank.capacity = capacity;
        self
    }

    pub fn holding(mut self, contents: &str, level: f64) -> Self {
        self.tank.contents = TankContents::fluid(contents);
        self.tank.current_level = level;
        self
    }

    pub fn pump_system(mut self, id: Option<u32>) -> Self {
        self.tank.pump_system_id = id;
        self
    }

    pub fn client(mut self, client: &str) -> Self {
        self.tank.client = Some(client.to_string());
        self
    }

    pub fn build(self) -> Tank {
        self.tank
    }
}

/// 船舶构造器
pub fn vessel(id: u32, name: &str, tanks: Vec<Tank>) -> Vessel {
    Vessel {
        id,
        name: name.to_string(),
        last_updated: fixed_time(),
        fuel_onboard: 0.0,
        water_onboard: 0.0,
        best_candidate: false,
        tanks,
    }
}

/// 两舱场景船: Tk 1S (液货, 泵 1) + Meth 1P (甲醇, 泵 4)
pub fn pelican_two_tank_vessel() -> Vessel {
    vessel(
        1,
        "M/V Pelican Island",
        vec![
            TankBuilder::new("Tk 1S", TankType::Liquid)
                .capacity(1540.0)
                .holding("Liquid Mud", 800.0)
                .pump_system(Some(1))
                .build(),
            TankBuilder::new("Meth 1P", TankType::Methanol)
                .capacity(455.0)
                .holding("Methanol", 400.0)
                .pump_system(Some(4))
                .build(),
        ],
    )
}

/// 最小流体目录
pub fn small_fluid_catalog() -> FluidCatalog {
    let fluid = |name: &str, category| Fluid {
        id: name.to_lowercase(),
        name: name.to_string(),
        color: "#888".to_string(),
        category,
        unit: FluidUnit::Bbl,
    };
    FluidCatalog::new(vec![
        fluid("KCl", FluidCategory::Brine),
        fluid("CaCl2", FluidCategory::Brine),
        fluid("Methanol", FluidCategory::Methanol),
        fluid("Trash Fluid", FluidCategory::Waste),
    ])
}
