// ==========================================
// OSV 液舱管理系统 - 舱命令校验器
// ==========================================
// 职责: 舱命令执行前的输入校验
// 校验项: 舱存在 / 0 <= 液位 <= 舱容 / 流体已知或为哨兵值 / 客户存在
// 说明: 舱型与流体类别不符不在此拒绝, 由告警扫描给出注记
// ==========================================

use crate::api::error::{ApiError, ApiResult, ValidationViolation};
use crate::domain::tank::{Tank, TankContents};
use crate::domain::vessel::FleetCatalog;

// ==========================================
// TankCommandValidator - 舱命令校验器
// ==========================================
pub struct TankCommandValidator;

impl TankCommandValidator {
    /// 查找舱 (船或舱不存在时返回 NotFound)
    pub fn require_tank<'a>(
        catalog: &'a FleetCatalog,
        vessel_id: u32,
        tank_id: &str,
    ) -> ApiResult<&'a Tank> {
        let vessel = catalog
            .find_vessel(vessel_id)
            .ok_or_else(|| ApiError::NotFound(format!("船舶(id={})不存在", vessel_id)))?;
        vessel.find_tank(tank_id).ok_or_else(|| {
            ApiError::NotFound(format!("舱 {} 不存在于船舶 {}", tank_id, vessel.name))
        })
    }

    /// 校验液位
    ///
    /// # 返回
    /// - Err(CommandValidationError): 液位为负/非有限数/超过名义舱容
    pub fn validate_level(vessel_id: u32, tank: &Tank, level: f64) -> ApiResult<()> {
        let reason = if !level.is_finite() {
            Some(format!("液位必须为有限数值: {}", level))
        } else if level < 0.0 {
            Some(format!("液位不能为负: {}", level))
        } else if level > tank.capacity {
            Some(format!("液位 {} 超过舱容 {}", level, tank.capacity))
        } else {
            None
        };

        match reason {
            None => Ok(()),
            Some(reason) => Err(ApiError::CommandValidationError {
                reason: format!("舱 {} 液位校验失败", tank.id),
                violations: vec![ValidationViolation {
                    violation_type: "LEVEL_RANGE".to_string(),
                    target: format!("{}/{}", vessel_id, tank.id),
                    reason,
                }],
            }),
        }
    }

    /// 校验货物: 必须为 "Empty" 或目录中的流体
    ///
    /// "Out of Service" 只能通过停用命令设置
    pub fn validate_contents(
        catalog: &FleetCatalog,
        vessel_id: u32,
        tank: &Tank,
        contents: &TankContents,
    ) -> ApiResult<()> {
        match contents {
            TankContents::Empty => Ok(()),
            TankContents::OutOfService => Err(ApiError::InvalidInput(format!(
                "舱 {} 停用请使用停用命令",
                tank.id
            ))),
            TankContents::Fluid(name) if catalog.fluids.contains(name) => Ok(()),
            TankContents::Fluid(name) => Err(ApiError::CommandValidationError {
                reason: format!("未知流体: {}", name),
                violations: vec![ValidationViolation {
                    violation_type: "UNKNOWN_FLUID".to_string(),
                    target: format!("{}/{}", vessel_id, tank.id),
                    reason: format!("流体 {} 不在流体目录中", name),
                }],
            }),
        }
    }

    /// 校验客户 (None 表示取消分配, 总是合法)
    pub fn validate_client(
        catalog: &FleetCatalog,
        vessel_id: u32,
        tank: &Tank,
        client: Option<&str>,
    ) -> ApiResult<()> {
        let Some(name) = client else {
            return Ok(());
        };
        if catalog.find_client(name).is_some() {
            return Ok(());
        }
        Err(ApiError::CommandValidationError {
            reason: format!("未知客户: {}", name),
            violations: vec![ValidationViolation {
                violation_type: "UNKNOWN_CLIENT".to_string(),
                target: format!("{}/{}", vessel_id, tank.id),
                reason: format!("客户 {} 不在客户目录中", name),
            }],
        })
    }
}
