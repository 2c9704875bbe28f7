// ==========================================
// OSV 液舱管理系统 - 调驳计划领域模型
// ==========================================
// 红线: 舱列表为空或说明为空白的步骤不得提交
// 状态: EDITING (编辑槽) -> COMMITTED (计划列表)
// ==========================================

use crate::domain::tank::{Tank, TankContents};
use crate::domain::types::TankType;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// TransferStep - 已提交的调驳步骤
// ==========================================
// 持久化格式: {"tanks": [...], "note": "..."}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStep {
    pub tanks: Vec<String>, // 舱号 (有序, 无重复)
    pub note: String,       // 作业说明
}

impl TransferStep {
    pub fn new(tanks: Vec<String>, note: impl Into<String>) -> Self {
        Self {
            tanks,
            note: note.into(),
        }
    }
}

// ==========================================
// EditingStep - 编辑槽
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditingStep {
    pub tanks: Vec<String>,
    pub note: String,
    /// 从计划列表载入时的原位置 (新建步骤为 None)
    pub origin_index: Option<usize>,
}

impl EditingStep {
    /// 从已提交步骤载入
    pub fn from_step(step: TransferStep, origin_index: usize) -> Self {
        Self {
            tanks: step.tanks,
            note: step.note,
            origin_index: Some(origin_index),
        }
    }

    /// 切换舱选择: 不在则加入, 在则移除
    ///
    /// # 返回
    /// - true: 切换后处于选中状态
    /// - false: 切换后处于未选中状态
    pub fn toggle_tank(&mut self, tank_id: &str) -> bool {
        if let Some(pos) = self.tanks.iter().position(|t| t == tank_id) {
            self.tanks.remove(pos);
            false
        } else {
            self.tanks.push(tank_id.to_string());
            true
        }
    }

    pub fn is_selected(&self, tank_id: &str) -> bool {
        self.tanks.iter().any(|t| t == tank_id)
    }

    /// 编辑槽是否没有任何内容
    pub fn is_blank(&self) -> bool {
        self.tanks.is_empty() && self.note.trim().is_empty() && self.origin_index.is_none()
    }

    /// 是否满足提交条件 (用于 UI 禁用提交按钮)
    pub fn can_commit(&self) -> bool {
        !self.tanks.is_empty() && !self.note.trim().is_empty()
    }
}

// ==========================================
// 导出文档
// ==========================================

/// 文件名中不允许出现的字符
const FILE_NAME_UNSAFE_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// 导出时的舱快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TankSnapshot {
    pub id: String,
    #[serde(rename = "type")]
    pub tank_type: TankType,
    pub capacity: f64,
    pub contents: TankContents,
    pub current_level: f64,
}

impl From<&Tank> for TankSnapshot {
    fn from(tank: &Tank) -> Self {
        Self {
            id: tank.id.clone(),
            tank_type: tank.tank_type,
            capacity: tank.capacity,
            contents: tank.contents.clone(),
            current_level: tank.current_level,
        }
    }
}

/// 导出的调驳步骤 (步骤号从 1 开始)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedStep {
    pub step_number: usize,
    pub tanks: Vec<TankSnapshot>,
    pub instructions: String,
}

/// 导出的调驳计划
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedPlan {
    pub vessel: String,
    pub date: NaiveDate,
    pub steps: Vec<ExportedStep>,
}

impl ExportedPlan {
    /// 建议文件名: transfer-plan-{船名}-{日期}.json
    ///
    /// 船名中的空白与路径非法字符转为短横, 连续短横合并
    pub fn file_name(&self) -> String {
        let dashed = self
            .vessel
            .split(|c: char| c.is_whitespace() || FILE_NAME_UNSAFE_CHARS.contains(&c))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        format!(
            "transfer-plan-{}-{}.json",
            dashed,
            self.date.format("%Y-%m-%d")
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
