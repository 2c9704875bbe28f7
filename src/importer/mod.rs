// ==========================================
// OSV 液舱管理系统 - 主数据加载层
// ==========================================
// 职责: 启动时加载船队目录 (JSON) 与相容性表 (CSV)
// 说明: 加载完成后目录与矩阵只读
// ==========================================

pub mod catalog_loader;
pub mod compatibility_loader;
pub mod error;

// 重导出核心类型
pub use catalog_loader::{default_fleet_catalog, load_fleet_catalog, load_fleet_catalog_file};
pub use compatibility_loader::{
    bundled_compatibility_entries, default_compatibility_matrix, load_compatibility_grid_file,
    load_compatibility_pairs_file, parse_compatibility_grid, parse_compatibility_pairs,
};
pub use error::{CatalogError, CatalogResult};
