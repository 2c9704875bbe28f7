// ==========================================
// OSV 液舱管理系统 - 船队目录加载
// ==========================================
// 输入: {"vessels": [...], "clients": [...], "fluidTypes": [...]}
// 红线: 同船舱号唯一; 0 <= currentLevel <= capacity
// 说明: 缺失的非关键字段 (日期/压力/油水量) 回退默认值并告警
// ==========================================

use crate::domain::fluid::{Fluid, FluidCatalog, FluidKey, EMPTY_CONTENTS};
use crate::domain::tank::{Tank, TankContents};
use crate::domain::types::{FluidCategory, FluidUnit, TankType};
use crate::domain::vessel::{Client, FleetCatalog, Vessel};
use crate::importer::error::{CatalogError, CatalogResult};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

/// 内置船队目录
const BUNDLED_FLEET_CATALOG: &str = include_str!("../../data/fleet_catalog.json");

/// 清舱日期格式 (依次尝试)
const CLEANING_DATE_FORMATS: [&str; 2] = ["%d.%m.%Y", "%Y-%m-%d"];

/// 更新时间格式 (依次尝试)
const UPDATED_AT_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

// ==========================================
// 原始记录 (JSON 映射)
// ==========================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawFleetCatalog {
    #[serde(default)]
    vessels: Vec<RawVessel>,
    #[serde(default)]
    clients: Vec<Client>,
    #[serde(default)]
    fluid_types: Vec<RawFluidType>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawVessel {
    id: u32,
    name: String,
    last_updated: Option<String>,
    fuel_onboard: Option<f64>,
    water_onboard: Option<f64>,
    #[serde(default)]
    best_candidate: bool,
    #[serde(default)]
    tanks: Vec<RawTank>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTank {
    id: String,
    #[serde(rename = "type")]
    tank_type: String,
    capacity: f64,
    #[serde(default)]
    current_level: f64,
    contents: Option<String>,
    history: Option<String>,
    last_cleaning: Option<String>,
    pressure: Option<f64>,
    client: Option<String>,
    pump_system_id: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawFluidType {
    id: String,
    name: String,
    #[serde(default)]
    color: String,
    category: String,
    unit: Option<FluidUnit>,
}

// ==========================================
// 加载入口
// ==========================================

/// 从 JSON 文本加载船队目录
///
/// # 返回
/// - `Ok(FleetCatalog)`: 校验通过的目录
/// - `Err(CatalogError)`: JSON 结构错误 / 舱号重复 / 舱容或液位非法
pub fn load_fleet_catalog(json: &str) -> CatalogResult<FleetCatalog> {
    let raw: RawFleetCatalog = serde_json::from_str(json)?;

    let fluids = convert_fluids(raw.fluid_types)?;

    let mut seen_vessels = HashSet::new();
    let mut vessels = Vec::with_capacity(raw.vessels.len());
    for raw_vessel in raw.vessels {
        if !seen_vessels.insert(raw_vessel.id) {
            return Err(CatalogError::DuplicateVesselId(raw_vessel.id));
        }
        vessels.push(convert_vessel(raw_vessel)?);
    }

    let catalog = FleetCatalog {
        vessels,
        clients: raw.clients,
        fluids,
    };
    warn_unknown_references(&catalog);

    info!(
        vessels = catalog.vessels.len(),
        tanks = catalog.tank_count(),
        fluids = catalog.fluids.len(),
        clients = catalog.clients.len(),
        "船队目录加载完成"
    );
    Ok(catalog)
}

/// 从文件加载船队目录
pub fn load_fleet_catalog_file(path: &Path) -> CatalogResult<FleetCatalog> {
    let json = std::fs::read_to_string(path)?;
    load_fleet_catalog(&json)
}

/// 内置船队目录
pub fn default_fleet_catalog() -> CatalogResult<FleetCatalog> {
    load_fleet_catalog(BUNDLED_FLEET_CATALOG)
}

// ==========================================
// 转换
// ==========================================

fn convert_fluids(raw: Vec<RawFluidType>) -> CatalogResult<FluidCatalog> {
    let empty = FluidKey::empty();
    let mut fluids = Vec::with_capacity(raw.len());

    for raw_fluid in raw {
        // "Empty" 是哨兵值, 不是流体
        if FluidKey::new(&raw_fluid.name) == empty {
            continue;
        }
        let category = FluidCategory::from_str(&raw_fluid.category).ok_or_else(|| {
            CatalogError::UnknownFluidCategory {
                fluid: raw_fluid.name.clone(),
                category: raw_fluid.category.clone(),
            }
        })?;
        let unit = raw_fluid.unit.unwrap_or(match category {
            FluidCategory::DryBulk => FluidUnit::Cf,
            _ => FluidUnit::Bbl,
        });

        fluids.push(Fluid {
            id: raw_fluid.id,
            name: raw_fluid.name.trim().to_string(),
            color: raw_fluid.color,
            category,
            unit,
        });
    }

    Ok(FluidCatalog::new(fluids))
}

fn convert_vessel(raw: RawVessel) -> CatalogResult<Vessel> {
    let last_updated = match raw.last_updated.as_deref().and_then(parse_updated_at) {
        Some(ts) => ts,
        None => {
            warn!(vessel = %raw.name, value = ?raw.last_updated, "更新时间缺失或格式错误, 使用当前时间");
            Utc::now().naive_utc()
        }
    };

    let mut seen = HashSet::new();
    let mut tanks = Vec::with_capacity(raw.tanks.len());
    for raw_tank in raw.tanks {
        if !seen.insert(raw_tank.id.clone()) {
            return Err(CatalogError::DuplicateTankId {
                vessel: raw.name.clone(),
                tank_id: raw_tank.id,
            });
        }
        tanks.push(convert_tank(&raw.name, raw_tank)?);
    }

    Ok(Vessel {
        id: raw.id,
        name: raw.name,
        last_updated,
        fuel_onboard: raw.fuel_onboard.unwrap_or(0.0),
        water_onboard: raw.water_onboard.unwrap_or(0.0),
        best_candidate: raw.best_candidate,
        tanks,
    })
}

fn convert_tank(vessel: &str, raw: RawTank) -> CatalogResult<Tank> {
    let field_error = |field: &str, message: String| CatalogError::InvalidTankField {
        vessel: vessel.to_string(),
        tank_id: raw.id.clone(),
        field: field.to_string(),
        message,
    };

    let tank_type = TankType::from_str(&raw.tank_type)
        .ok_or_else(|| field_error("type", format!("未知舱型 {}", raw.tank_type)))?;

    if !raw.capacity.is_finite() || raw.capacity < 0.0 {
        return Err(field_error("capacity", format!("舱容不能为负: {}", raw.capacity)));
    }
    if !raw.current_level.is_finite() || raw.current_level < 0.0 {
        return Err(field_error("currentLevel", format!("液位不能为负: {}", raw.current_level)));
    }
    if raw.current_level > raw.capacity {
        return Err(field_error(
            "currentLevel",
            format!("液位 {} 超过舱容 {}", raw.current_level, raw.capacity),
        ));
    }

    let last_cleaning = raw.last_cleaning.as_deref().and_then(|s| {
        let parsed = parse_cleaning_date(s);
        if parsed.is_none() {
            warn!(vessel, tank = %raw.id, value = s, "清舱日期格式错误, 已忽略");
        }
        parsed
    });

    // 干散货舱不属于泵系统
    let pump_system_id = if tank_type.has_pump_system() {
        raw.pump_system_id
    } else {
        None
    };

    Ok(Tank {
        id: raw.id.trim().to_string(),
        tank_type,
        capacity: raw.capacity,
        current_level: raw.current_level,
        contents: TankContents::from(raw.contents.clone().unwrap_or_else(|| EMPTY_CONTENTS.to_string())),
        pump_system_id,
        client: raw.client.filter(|c| !c.trim().is_empty()),
        last_cleaning,
        history: raw.history.filter(|h| !h.trim().is_empty()),
        pressure: raw.pressure.unwrap_or(0.0),
    })
}

fn parse_cleaning_date(s: &str) -> Option<NaiveDate> {
    CLEANING_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
}

fn parse_updated_at(s: &str) -> Option<NaiveDateTime> {
    UPDATED_AT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s.trim(), fmt).ok())
}

/// 舱内货物或客户不在目录中时告警 (不阻断加载)
fn warn_unknown_references(catalog: &FleetCatalog) {
    for vessel in &catalog.vessels {
        for tank in &vessel.tanks {
            if let Some(name) = tank.contents.fluid_name() {
                if !catalog.fluids.contains(name) {
                    warn!(vessel = %vessel.name, tank = %tank.id, fluid = name, "舱内流体不在目录中, 相容性查询将按 INCOMPATIBLE 处理");
                }
            }
            if let Some(client) = &tank.client {
                if catalog.find_client(client).is_none() {
                    warn!(vessel = %vessel.name, tank = %tank.id, client = %client, "舱的客户不在目录中");
                }
            }
        }
    }
}
