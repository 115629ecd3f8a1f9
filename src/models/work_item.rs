use serde::{Deserialize, Serialize};

/// 一条训练样本（Alpaca 格式）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub instruction: String,
    #[serde(default)]
    pub input: String,
    pub output: String,
}

/// 改写结果，字段与 `WorkItem` 相同，`input` 沿用原始样本
pub type RewriteResult = WorkItem;

impl WorkItem {
    pub fn new(
        instruction: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            instruction: instruction.into(),
            input: input.into(),
            output: output.into(),
        }
    }
}
