// ==========================================
// OSV 液舱管理系统 - 操作日志领域模型
// ==========================================
// 红线: 所有舱状态命令与计划变更必须记录
// 对齐: action_log 表
// ==========================================

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// 默认操作人
pub const DEFAULT_ACTOR: &str = "operator";

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLog {
    // ===== 主键 =====
    pub action_id: String,        // 日志ID (UUID)
    pub vessel_id: Option<u32>,   // 关联船舶 (配置类操作为 None)
    pub tank_id: Option<String>,  // 关联舱
    pub action_type: String,      // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime, // 操作时间戳
    pub actor: String,            // 操作人

    // ===== 操作负载 =====
    pub payload_json: Option<JsonValue>,
    pub detail: Option<String>,
}

impl ActionLog {
    /// 以当前时间创建日志
    pub fn new(action_type: ActionType, vessel_id: Option<u32>, tank_id: Option<&str>) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            vessel_id,
            tank_id: tank_id.map(str::to_string),
            action_type: action_type.as_str().to_string(),
            action_ts: Utc::now().naive_utc(),
            actor: DEFAULT_ACTOR.to_string(),
            payload_json: None,
            detail: None,
        }
    }

    pub fn with_payload(mut self, payload: JsonValue) -> Self {
        self.payload_json = Some(payload);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    // ===== 舱命令 =====
    SetContents,      // 设置货物
    SetLevel,         // 设置液位
    SetOutOfService,  // 停用
    RestoreService,   // 恢复使用
    AssignClient,     // 分配客户
    // ===== 船命令 =====
    SetBestCandidate, // 标记最佳候选
    TouchVessel,      // 刷新更新时间
    // ===== 调驳计划 =====
    CommitStep,
    EditStep,
    DeleteStep,
    ResetPlan,
    ExportPlan,
    // ===== 配置 =====
    SetFillLimit,
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::SetContents => "SetContents",
            ActionType::SetLevel => "SetLevel",
            ActionType::SetOutOfService => "SetOutOfService",
            ActionType::RestoreService => "RestoreService",
            ActionType::AssignClient => "AssignClient",
            ActionType::SetBestCandidate => "SetBestCandidate",
            ActionType::TouchVessel => "TouchVessel",
            ActionType::CommitStep => "CommitStep",
            ActionType::EditStep => "EditStep",
            ActionType::DeleteStep => "DeleteStep",
            ActionType::ResetPlan => "ResetPlan",
            ActionType::ExportPlan => "ExportPlan",
            ActionType::SetFillLimit => "SetFillLimit",
        }
    }
}
