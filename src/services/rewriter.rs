//! 改写服务 - 业务能力层
//!
//! 只负责"把一条样本改写成 5 个版本"的能力，不关心批次和进度文件

use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::debug;

use crate::clients::{ChatModel, ChatRequest};
use crate::error::LlmError;
use crate::models::{RewriteResult, WorkItem};

/// 每条样本需要的改写版本数量
pub const VARIANTS_PER_ITEM: usize = 5;

const SYSTEM_MESSAGE: &str = "你是一个专业的文本改写助手，擅长用不同的表达方式重写文本，同时保持原意。\
                              你需要为每个输入生成5个完全不同的改写版本。";

#[derive(Debug, Deserialize)]
struct RewrittenVersion {
    instruction: String,
    output: String,
}

/// 改写服务
pub struct Rewriter {
    model: Arc<dyn ChatModel>,
    temperature: f32,
}

impl Rewriter {
    pub fn new(model: Arc<dyn ChatModel>, temperature: f32) -> Self {
        Self { model, temperature }
    }

    /// 改写一条样本
    ///
    /// 成功时恰好返回 `VARIANTS_PER_ITEM` 条结果，`input` 字段沿用原样本
    pub async fn rewrite(&self, item: &WorkItem) -> Result<Vec<RewriteResult>, LlmError> {
        let request = ChatRequest::new(build_rewrite_prompt(&item.instruction, &item.output))
            .with_system(SYSTEM_MESSAGE)
            .with_temperature(self.temperature);

        let response = self.model.complete(request).await?;
        let versions = parse_versions(&response)?;

        debug!("改写成功，模型: {}", self.model.model_name());

        Ok(versions
            .into_iter()
            .map(|v| RewriteResult {
                instruction: v.instruction,
                input: item.input.clone(),
                output: v.output,
            })
            .collect())
    }
}

/// 构建改写提示词
fn build_rewrite_prompt(instruction: &str, output: &str) -> String {
    format!(
        r#"请帮我将以下问题和答案改写成5个不同的版本，每个版本都要保持原意但使用完全不同的表达方式。要求：
1. 每个问题(instruction)都需要完全改写，使用不同的表达方式但保持原意
2. 每个答案(output)可以简单改写，但不要改变原意或产生歧义
3. 保持中文输出
4. 5个版本之间要有明显的区别，不能过于相似

原始问题：{instruction}
原始答案：{output}

请按照以下JSON格式返回：
{{
    "versions": [
        {{"instruction": "改写后的问题1", "output": "改写后的答案1"}},
        {{"instruction": "改写后的问题2", "output": "改写后的答案2"}},
        {{"instruction": "改写后的问题3", "output": "改写后的答案3"}},
        {{"instruction": "改写后的问题4", "output": "改写后的答案4"}},
        {{"instruction": "改写后的问题5", "output": "改写后的答案5"}}
    ]
}}"#
    )
}

/// 去掉模型常见的 Markdown 代码块包裹
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // 跳过语言标记所在的第一行；整段回复只有一行时没有语言标记
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// 解析 `{"versions": [...]}` 响应
fn parse_versions(response: &str) -> Result<Vec<RewrittenVersion>, LlmError> {
    let body: JsonValue = serde_json::from_str(strip_code_fence(response)).map_err(|e| {
        LlmError::ResponseParseFailed {
            message: e.to_string(),
        }
    })?;

    let versions = match body.get("versions") {
        Some(versions @ JsonValue::Array(_)) => versions.clone(),
        _ => return Err(LlmError::MissingVersions),
    };

    let versions: Vec<RewrittenVersion> =
        serde_json::from_value(versions).map_err(|e| LlmError::ResponseParseFailed {
            message: e.to_string(),
        })?;

    if versions.len() != VARIANTS_PER_ITEM {
        return Err(LlmError::WrongVariantCount {
            expected: VARIANTS_PER_ITEM,
            actual: versions.len(),
        });
    }

    Ok(versions)
}
