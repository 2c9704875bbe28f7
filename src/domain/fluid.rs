// ==========================================
// OSV 液舱管理系统 - 流体领域模型
// ==========================================
// 职责: 流体参考数据 (不可变) 与流体名称键
// ==========================================

use crate::domain::types::{FluidCategory, FluidUnit, TankType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// 空舱哨兵值
pub const EMPTY_CONTENTS: &str = "Empty";

/// 停用舱哨兵值
pub const OUT_OF_SERVICE_CONTENTS: &str = "Out of Service";

// ==========================================
// FluidKey - 流体名称键
// ==========================================
// 名称比较忽略大小写与空白: "CaCl2 /CaBr2" == "CaCl2/CaBr2"
// 原始名称保留用于展示
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FluidKey(String);

impl FluidKey {
    pub fn new(name: &str) -> Self {
        let normalized: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(|c| c.to_lowercase())
            .collect();
        Self(normalized)
    }

    /// 空舱键
    pub fn empty() -> Self {
        Self::new(EMPTY_CONTENTS)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FluidKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// Fluid - 流体
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fluid {
    pub id: String,              // 流体ID (如 "cacl2")
    pub name: String,            // 显示名称 (矩阵键)
    pub color: String,           // 展示色
    pub category: FluidCategory, // 所属类别
    pub unit: FluidUnit,         // 计量单位
}

impl Fluid {
    pub fn key(&self) -> FluidKey {
        FluidKey::new(&self.name)
    }
}

// ==========================================
// FluidCatalog - 流体目录
// ==========================================
// 启动时加载, 之后只读
#[derive(Debug, Clone, Default)]
pub struct FluidCatalog {
    fluids: Vec<Fluid>,
    index: HashMap<FluidKey, usize>,
}

impl FluidCatalog {
    /// 构建流体目录（同名流体以先出现者为准）
    pub fn new(fluids: Vec<Fluid>) -> Self {
        let mut index = HashMap::new();
        for (i, fluid) in fluids.iter().enumerate() {
            index.entry(fluid.key()).or_insert(i);
        }
        Self { fluids, index }
    }

    pub fn fluids(&self) -> &[Fluid] {
        &self.fluids
    }

    pub fn len(&self) -> usize {
        self.fluids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fluids.is_empty()
    }

    /// 按名称查找流体
    pub fn find(&self, name: &str) -> Option<&Fluid> {
        self.index.get(&FluidKey::new(name)).map(|&i| &self.fluids[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// 流体所属类别
    pub fn category_of(&self, name: &str) -> Option<FluidCategory> {
        self.find(name).map(|f| f.category)
    }

    /// 某类别下的全部流体名称
    pub fn names_in_category(&self, category: FluidCategory) -> Vec<&str> {
        self.fluids
            .iter()
            .filter(|f| f.category == category)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// 某流体可合法装载的舱型
    ///
    /// 目录中不存在的流体返回空切片（零个合法舱型）
    pub fn allowed_tank_types(&self, name: &str) -> &'static [TankType] {
        self.category_of(name)
            .map(|c| c.allowed_tank_types())
            .unwrap_or(&[])
    }
}
