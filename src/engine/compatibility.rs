// ==========================================
// OSV 液舱管理系统 - 流体相容性矩阵
// ==========================================
// 职责: (舱内现有流体, 拟加入流体) -> 相容性等级
// 红线: 未知流体一律 INCOMPATIBLE (fail closed)
// 红线: "Empty" 作为现有货物时对所有目录流体均为 COMPATIBLE
// 红线: 矩阵值不保证对称, 两个方向独立给定
// ==========================================

use crate::domain::fluid::{FluidCatalog, FluidKey, EMPTY_CONTENTS};
use crate::domain::tank::{Tank, TankContents};
use crate::domain::types::CompatibilityLevel;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

// ==========================================
// 描述文本分类
// ==========================================

/// 将相容性描述文本分类为三值等级
///
/// 规则按顺序判断:
/// 1. 以 "OK" 开头且不含 "Residue" -> COMPATIBLE
/// 2. 以 "OK; Residue" 开头 -> NEEDS_CLEANING
/// 3. 含 "maintenance cleaned" -> INCOMPATIBLE
/// 4. 含 "completion cleaned" 或以 "NOT OK" 开头 -> INCOMPATIBLE
/// 5. 其他 -> INCOMPATIBLE
pub fn classify_description(text: &str) -> CompatibilityLevel {
    let text = text.trim();

    if text.starts_with("OK") && !text.contains("Residue") {
        return CompatibilityLevel::Compatible;
    }
    if text.starts_with("OK; Residue") {
        return CompatibilityLevel::NeedsCleaning;
    }
    if text.contains("maintenance cleaned") {
        return CompatibilityLevel::Incompatible;
    }
    if text.contains("completion cleaned") || text.starts_with("NOT OK") {
        return CompatibilityLevel::Incompatible;
    }
    CompatibilityLevel::Incompatible
}

// ==========================================
// CompatibilityEntry - 相容性表中的一条记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityEntry {
    pub current: String,     // 舱内现有流体 (行)
    pub candidate: String,   // 拟加入流体 (列)
    pub description: String, // 原始描述文本
}

impl CompatibilityEntry {
    pub fn new(current: &str, candidate: &str, description: &str) -> Self {
        Self {
            current: current.trim().to_string(),
            candidate: candidate.trim().to_string(),
            description: description.trim().to_string(),
        }
    }

    pub fn level(&self) -> CompatibilityLevel {
        classify_description(&self.description)
    }
}

/// 矩阵构建报告
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatrixBuildReport {
    pub applied: usize,
    /// 目录中不存在而被跳过的流体名
    pub skipped_names: BTreeSet<String>,
}

// ==========================================
// CompatibilityMatrix - 相容性矩阵
// ==========================================
// 启动时构建一次, 之后只读
#[derive(Debug, Clone, Default)]
pub struct CompatibilityMatrix {
    levels: HashMap<FluidKey, HashMap<FluidKey, CompatibilityLevel>>,
}

impl CompatibilityMatrix {
    /// 由相容性记录构建矩阵
    ///
    /// # 参数
    /// - `catalog`: 流体目录 (行/列名必须在目录中, 否则跳过)
    /// - `entries`: 相容性记录 (网格或成对表)
    ///
    /// # 返回
    /// - 矩阵与构建报告
    pub fn build(
        catalog: &FluidCatalog,
        entries: impl IntoIterator<Item = CompatibilityEntry>,
    ) -> (Self, MatrixBuildReport) {
        let mut matrix = Self::default();
        let mut report = MatrixBuildReport::default();
        let empty = FluidKey::empty();

        for entry in entries {
            let current = FluidKey::new(&entry.current);
            let candidate = FluidKey::new(&entry.candidate);

            let mut known = true;
            if current != empty && !catalog.contains(&entry.current) {
                report.skipped_names.insert(entry.current.clone());
                known = false;
            }
            if !catalog.contains(&entry.candidate) {
                report.skipped_names.insert(entry.candidate.clone());
                known = false;
            }
            if !known {
                continue;
            }

            matrix.insert(current, candidate, entry.level());
            report.applied += 1;
        }

        // 空舱对所有目录流体均相容
        for fluid in catalog.fluids() {
            matrix.insert(empty.clone(), fluid.key(), CompatibilityLevel::Compatible);
        }

        for name in &report.skipped_names {
            warn!(fluid = %name, "相容性表中的流体不在目录中, 已跳过");
        }
        debug!(
            applied = report.applied,
            skipped = report.skipped_names.len(),
            "相容性矩阵构建完成"
        );

        (matrix, report)
    }

    fn insert(&mut self, current: FluidKey, candidate: FluidKey, level: CompatibilityLevel) {
        self.levels.entry(current).or_default().insert(candidate, level);
    }

    /// 查询相容性
    ///
    /// 任一流体名不在矩阵中时返回 INCOMPATIBLE
    pub fn compatibility(&self, current_contents: &str, candidate_fluid: &str) -> CompatibilityLevel {
        self.levels
            .get(&FluidKey::new(current_contents))
            .and_then(|row| row.get(&FluidKey::new(candidate_fluid)))
            .copied()
            .unwrap_or(CompatibilityLevel::Incompatible)
    }

    /// 以舱内货物查询相容性
    ///
    /// 停用舱不参与分配, 恒为 INCOMPATIBLE
    pub fn compatibility_for_contents(
        &self,
        contents: &TankContents,
        candidate_fluid: &str,
    ) -> CompatibilityLevel {
        match contents {
            TankContents::OutOfService => CompatibilityLevel::Incompatible,
            TankContents::Empty => self.compatibility(EMPTY_CONTENTS, candidate_fluid),
            TankContents::Fluid(name) => self.compatibility(name, candidate_fluid),
        }
    }

    pub fn compatibility_for_tank(&self, tank: &Tank, candidate_fluid: &str) -> CompatibilityLevel {
        self.compatibility_for_contents(&tank.contents, candidate_fluid)
    }

    /// 矩阵中是否出现该流体 (行或列)
    pub fn contains(&self, fluid: &str) -> bool {
        let key = FluidKey::new(fluid);
        self.levels.contains_key(&key) || self.levels.values().any(|row| row.contains_key(&key))
    }

    /// 已填充的单元格数量
    pub fn entry_count(&self) -> usize {
        self.levels.values().map(|row| row.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fluid::Fluid;
    use crate::domain::types::{FluidCategory, FluidUnit};

    fn catalog(names: &[&str]) -> FluidCatalog {
        FluidCatalog::new(
            names
                .iter()
                .map(|n| Fluid {
                    id: n.to_lowercase(),
                    name: n.to_string(),
                    color: "#000".to_string(),
                    category: FluidCategory::Brine,
                    unit: FluidUnit::Bbl,
                })
                .collect(),
        )
    }

    #[test]
    fn test_classification_rules() {
        assert_eq!(classify_description("OK"), CompatibilityLevel::Compatible);
        assert_eq!(
            classify_description("OK; Residue <= 5 bbls; Tank > 1000 bbls"),
            CompatibilityLevel::NeedsCleaning
        );
        assert_eq!(
            classify_description("NO; Tank must be maintenance cleaned first"),
            CompatibilityLevel::Incompatible
        );
        assert_eq!(
            classify_description("NOT OK; must be completion cleaned"),
            CompatibilityLevel::Incompatible
        );
        assert_eq!(classify_description("ask the mud engineer"), CompatibilityLevel::Incompatible);
        assert_eq!(classify_description(""), CompatibilityLevel::Incompatible);
    }

    #[test]
    fn test_matrix_is_directional() {
        let catalog = catalog(&["CaCl2", "CaBr2"]);
        let (matrix, report) = CompatibilityMatrix::build(
            &catalog,
            vec![
                CompatibilityEntry::new("CaCl2", "CaBr2", "OK"),
                CompatibilityEntry::new("CaBr2", "CaCl2", "NOT OK; must be completion cleaned"),
            ],
        );
        assert_eq!(report.applied, 2);
        assert_eq!(matrix.compatibility("CaCl2", "CaBr2"), CompatibilityLevel::Compatible);
        assert_eq!(matrix.compatibility("CaBr2", "CaCl2"), CompatibilityLevel::Incompatible);
        // 未给定的自身组合同样 fail closed
        assert_eq!(matrix.compatibility("CaCl2", "CaCl2"), CompatibilityLevel::Incompatible);
    }

    #[test]
    fn test_unknown_names_skipped_and_fail_closed() {
        let catalog = catalog(&["KCl"]);
        let (matrix, report) = CompatibilityMatrix::build(
            &catalog,
            vec![
                CompatibilityEntry::new("KCl", "KCl", "OK"),
                CompatibilityEntry::new("Mystery", "KCl", "OK"),
            ],
        );
        assert!(report.skipped_names.contains("Mystery"));
        assert_eq!(matrix.compatibility("Mystery", "KCl"), CompatibilityLevel::Incompatible);
        assert_eq!(matrix.compatibility("KCl", "Mystery"), CompatibilityLevel::Incompatible);
        assert_eq!(matrix.compatibility("Empty", "Mystery"), CompatibilityLevel::Incompatible);
    }

    #[test]
    fn test_empty_seeded_and_out_of_service_blocked() {
        let catalog = catalog(&["KCl", "CaCl2"]);
        let (matrix, _) = CompatibilityMatrix::build(&catalog, Vec::new());
        assert_eq!(matrix.compatibility("Empty", "KCl"), CompatibilityLevel::Compatible);
        assert_eq!(matrix.compatibility(" empty ", "CaCl2"), CompatibilityLevel::Compatible);
        assert_eq!(
            matrix.compatibility_for_contents(&TankContents::OutOfService, "KCl"),
            CompatibilityLevel::Incompatible
        );
        assert_eq!(matrix.entry_count(), 2);
    }
}
