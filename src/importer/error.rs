// ==========================================
// OSV 液舱管理系统 - 主数据加载错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 主数据加载错误类型
#[derive(Error, Debug)]
pub enum CatalogError {
    // ===== 文件相关错误 =====
    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("船队目录 JSON 解析失败: {0}")]
    JsonParseError(String),

    #[error("相容性表 CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("相容性表缺少表头: {0}")]
    MissingHeader(String),

    // ===== 数据质量错误 =====
    #[error("舱号重复 (船舶 {vessel}): {tank_id}")]
    DuplicateTankId { vessel: String, tank_id: String },

    #[error("船舶ID重复: {0}")]
    DuplicateVesselId(u32),

    #[error("舱字段错误 (船舶 {vessel}, 舱 {tank_id}, 字段 {field}): {message}")]
    InvalidTankField {
        vessel: String,
        tank_id: String,
        field: String,
        message: String,
    },

    #[error("流体类别未知 (流体 {fluid}): {category}")]
    UnknownFluidCategory { fluid: String, category: String },
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::JsonParseError(err.to_string())
    }
}

impl From<csv::Error> for CatalogError {
    fn from(err: csv::Error) -> Self {
        CatalogError::CsvParseError(err.to_string())
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::FileReadError(err.to_string())
    }
}

/// Result 类型别名
pub type CatalogResult<T> = Result<T, CatalogError>;
