// ==========================================
// OSV 液舱管理系统 - 相容性表加载
// ==========================================
// 两种输入:
// - 网格 CSV: 表头为拟加入流体, 每行首列为舱内现有流体
// - 成对 CSV: current,new,description
// 说明: 行长度允许不一致, 缺失单元格不生成记录 (查询时即为 INCOMPATIBLE)
// ==========================================

use crate::domain::fluid::FluidCatalog;
use crate::engine::compatibility::{CompatibilityEntry, CompatibilityMatrix, MatrixBuildReport};
use crate::importer::error::{CatalogError, CatalogResult};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// 内置网格表 (钻井液/盐水)
const BUNDLED_COMPATIBILITY_GRID: &str = include_str!("../../data/compatibility_grid.csv");

/// 内置成对表 (甲醇/废液/干散货)
const BUNDLED_COMPATIBILITY_PAIRS: &str = include_str!("../../data/compatibility_pairs.csv");

// ==========================================
// 网格 CSV
// ==========================================

/// 解析网格形式的相容性表
///
/// # 参数
/// - `reader`: CSV 数据源, 首行为表头 (首格为角标, 其余为流体名)
///
/// # 返回
/// - 每个非空单元格一条记录 (行 = 现有流体, 列 = 拟加入流体)
pub fn parse_compatibility_grid<R: Read>(reader: R) -> CatalogResult<Vec<CompatibilityEntry>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 允许行长度不一致
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.len() < 2 {
        return Err(CatalogError::MissingHeader(
            "网格表至少需要一列流体".to_string(),
        ));
    }

    let mut entries = Vec::new();
    for result in reader.records() {
        let record = result?;
        let current = match record.get(0).map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue, // 跳过空行
        };

        for (col_idx, candidate) in headers.iter().enumerate().skip(1) {
            let description = record.get(col_idx).map(str::trim).unwrap_or("");
            if candidate.is_empty() || description.is_empty() {
                continue;
            }
            entries.push(CompatibilityEntry::new(&current, candidate, description));
        }
    }

    debug!(entries = entries.len(), "网格相容性表解析完成");
    Ok(entries)
}

// ==========================================
// 成对 CSV
// ==========================================

/// 解析成对形式的相容性表
///
/// 表头必须包含 current / new / description 三列 (顺序不限, 忽略大小写)
pub fn parse_compatibility_pairs<R: Read>(reader: R) -> CatalogResult<Vec<CompatibilityEntry>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CatalogError::MissingHeader(name.to_string()))
    };
    let current_idx = column("current")?;
    let new_idx = column("new")?;
    let description_idx = column("description")?;

    let mut entries = Vec::new();
    for result in reader.records() {
        let record = result?;
        let current = record.get(current_idx).map(str::trim).unwrap_or("");
        let candidate = record.get(new_idx).map(str::trim).unwrap_or("");
        let description = record.get(description_idx).map(str::trim).unwrap_or("");
        if current.is_empty() || candidate.is_empty() {
            continue;
        }
        entries.push(CompatibilityEntry::new(current, candidate, description));
    }

    debug!(entries = entries.len(), "成对相容性表解析完成");
    Ok(entries)
}

// ==========================================
// 文件入口
// ==========================================

pub fn load_compatibility_grid_file(path: &Path) -> CatalogResult<Vec<CompatibilityEntry>> {
    let file = std::fs::File::open(path)?;
    parse_compatibility_grid(file)
}

pub fn load_compatibility_pairs_file(path: &Path) -> CatalogResult<Vec<CompatibilityEntry>> {
    let file = std::fs::File::open(path)?;
    parse_compatibility_pairs(file)
}

/// 内置相容性表的全部记录
pub fn bundled_compatibility_entries() -> CatalogResult<Vec<CompatibilityEntry>> {
    let mut entries = parse_compatibility_grid(BUNDLED_COMPATIBILITY_GRID.as_bytes())?;
    entries.extend(parse_compatibility_pairs(BUNDLED_COMPATIBILITY_PAIRS.as_bytes())?);
    Ok(entries)
}

/// 基于给定流体目录构建内置相容性矩阵
pub fn default_compatibility_matrix(
    fluids: &FluidCatalog,
) -> CatalogResult<(CompatibilityMatrix, MatrixBuildReport)> {
    let entries = bundled_compatibility_entries()?;
    let (matrix, report) = CompatibilityMatrix::build(fluids, entries);
    info!(
        cells = matrix.entry_count(),
        skipped = report.skipped_names.len(),
        "内置相容性矩阵已加载"
    );
    Ok((matrix, report))
}
