// ==========================================
// OSV 液舱管理系统 - API层错误类型
// ==========================================
// 职责: 将仓储/引擎/加载错误转换为用户可读的错误消息
// 红线: 所有错误信息必须包含显式原因
// ==========================================

use crate::engine::error::EngineError;
use crate::importer::error::CatalogError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入与校验错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    /// 舱命令校验失败（带详细原因）
    #[error("命令校验失败: {reason}")]
    CommandValidationError {
        reason: String,
        violations: Vec<ValidationViolation>,
    },

    /// 无效调驳步骤 (调用方应保持编辑状态不变)
    #[error("无效调驳步骤: {0}")]
    InvalidStep(String),

    // ==========================================
    // 存储与加载错误
    // ==========================================
    #[error("存储错误: {0}")]
    StorageError(String),

    #[error("主数据加载失败: {0}")]
    CatalogError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::StorageError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::StorageError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::StorageError(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::StorageWriteError { key, message } => {
                ApiError::StorageError(format!("写入 {} 失败: {}", key, message))
            }
            RepositoryError::SerializationError(msg) => ApiError::InternalError(msg),
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::EmptyTankSelection | EngineError::BlankNote => {
                ApiError::InvalidStep(err.to_string())
            }
            EngineError::StepIndexOutOfRange { .. } => ApiError::NotFound(err.to_string()),
        }
    }
}

// ==========================================
// 从 CatalogError 转换
// ==========================================
impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError::CatalogError(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// 校验违规详情
// ==========================================

/// 校验违规详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationViolation {
    /// 违规类型（LEVEL_RANGE / UNKNOWN_FLUID / UNKNOWN_CLIENT / UNKNOWN_TANK）
    pub violation_type: String,
    /// 目标 ("{vessel_id}/{tank_id}")
    pub target: String,
    /// 违规原因
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_mapping() {
        assert!(matches!(
            ApiError::from(EngineError::BlankNote),
            ApiError::InvalidStep(_)
        ));
        assert!(matches!(
            ApiError::from(EngineError::StepIndexOutOfRange { index: 2, len: 1 }),
            ApiError::NotFound(_)
        ));
    }

    #[test]
    fn test_repository_error_mapping() {
        let err = ApiError::from(RepositoryError::StorageWriteError {
            key: "osv_transfer_steps/1".to_string(),
            message: "quota exceeded".to_string(),
        });
        assert!(err.to_string().contains("osv_transfer_steps/1"));
    }
}
