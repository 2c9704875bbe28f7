// ==========================================
// OSV 液舱管理系统 - 引擎层错误类型
// ==========================================
// 说明: 引擎对数据形态差异一律给出回退值, 仅以下情况向上返回
// - 提交无效步骤 (无舱 / 说明为空白)
// - 编辑/删除时步骤序号越界
// ==========================================

use thiserror::Error;

/// 引擎层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("调驳步骤未选择任何舱")]
    EmptyTankSelection,

    #[error("调驳步骤说明不能为空")]
    BlankNote,

    #[error("调驳步骤序号越界: index={index}, len={len}")]
    StepIndexOutOfRange { index: usize, len: usize },
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;
