//! 评测服务 - 业务能力层
//!
//! 被测模型作答 → 裁判模型打分，只处理单条样本
//!
//! 被测模型调用失败时直接返回错误，不会把错误文本交给裁判打分；
//! 编排层把这类样本记为 -1，与裁判调用失败的处理相同。

use regex::Regex;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::clients::{ChatModel, ChatRequest};
use crate::error::LlmError;
use crate::models::WorkItem;

/// 裁判回复中找不到分数时使用的默认分
pub const FALLBACK_SCORE: u8 = 5;

const SCORE_PATTERN: &str = r"\b([0-9]|10)\b";

const RESPONDER_SYSTEM_MESSAGE: &str = "You are a helpful assistant.";
const JUDGE_SYSTEM_MESSAGE: &str = "你是一个公正的评分助手，请根据指示给出准确的评分。";

/// 单条样本的评测结果
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// 被测模型的回答
    pub response: String,
    pub score: u8,
}

/// 评测服务
pub struct Judge {
    subject: Arc<dyn ChatModel>,
    judge: Arc<dyn ChatModel>,
}

impl Judge {
    /// `subject` 为被测模型，`judge` 为裁判模型
    pub fn new(subject: Arc<dyn ChatModel>, judge: Arc<dyn ChatModel>) -> Self {
        Self { subject, judge }
    }

    /// 让被测模型回答问题
    pub async fn respond(&self, instruction: &str) -> Result<String, LlmError> {
        let request = ChatRequest::new(instruction)
            .with_system(RESPONDER_SYSTEM_MESSAGE)
            .with_max_tokens(512)
            .with_temperature(0.0);

        self.subject.complete(request).await
    }

    /// 让裁判模型比较参考答案与实际回答，返回 0-10 分
    pub async fn score(&self, reference: &str, candidate: &str) -> Result<u8, LlmError> {
        let request = ChatRequest::new(build_judge_prompt(reference, candidate))
            .with_system(JUDGE_SYSTEM_MESSAGE)
            .with_max_tokens(10)
            .with_temperature(0.0);

        let reply = self.judge.complete(request).await?;
        debug!("裁判模型 {} 回复: {}", self.judge.model_name(), reply);

        Ok(parse_score(&reply))
    }

    /// 作答并打分
    pub async fn evaluate(&self, item: &WorkItem) -> Result<Evaluation, LlmError> {
        let response = self.respond(&item.instruction).await?;
        let score = self.score(&item.output, &response).await?;
        Ok(Evaluation { response, score })
    }
}

/// 构建裁判提示词
fn build_judge_prompt(reference: &str, candidate: &str) -> String {
    format!(
        "请检测以下两段文本的相似度是多少，特别要注意其中的参考文献，如果其中一个有参\
         考文献，另一个没有参考文献，或者错误的参考文献，则不能高于6分。给出一个0-10的分数，\
         其中0表示完全不相似，10表示完全相同。只需回复一个0-10之间的整数分数，不要有其他解释。\
         参考答案: {reference}实际回答:{candidate}相似度分数(0-10):"
    )
}

/// 从裁判回复中提取分数
///
/// 取第一个独立的 0-9 或 10，找不到时返回 `FALLBACK_SCORE`
pub fn parse_score(reply: &str) -> u8 {
    let Ok(re) = Regex::new(SCORE_PATTERN) else {
        return FALLBACK_SCORE;
    };

    match re
        .captures(reply.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok())
    {
        Some(score) => score,
        None => {
            warn!("无法从裁判回复 '{}' 中解析分数，使用默认值 {}", reply, FALLBACK_SCORE);
            FALLBACK_SCORE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct ScriptedModel {
        name: &'static str,
        reply: Option<&'static str>,
        prompts: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedModel {
        fn new(name: &'static str, reply: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(request);
            self.reply
                .map(str::to_string)
                .ok_or_else(|| LlmError::api_call_failed(self.name, "connection refused"))
        }

        fn model_name(&self) -> &str {
            self.name
        }
    }

    #[test]
    fn test_parse_score_plain_digit() {
        assert_eq!(parse_score("7"), 7);
        assert_eq!(parse_score("0"), 0);
        assert_eq!(parse_score(" 9\n"), 9);
    }

    #[test]
    fn test_parse_score_ten() {
        assert_eq!(parse_score("10 points"), 10);
        assert_eq!(parse_score("10"), 10);
    }

    #[test]
    fn test_parse_score_with_text() {
        assert_eq!(parse_score("相似度分数: 8"), 8);
        assert_eq!(parse_score("score 3 out of 10"), 3);
    }

    #[test]
    fn test_parse_score_fallback() {
        assert_eq!(parse_score("abc"), FALLBACK_SCORE);
        assert_eq!(parse_score(""), FALLBACK_SCORE);
        // 多位数不是独立的分数
        assert_eq!(parse_score("123"), FALLBACK_SCORE);
    }

    #[tokio::test]
    async fn evaluate_sends_reference_and_response_to_judge() {
        let subject = ScriptedModel::new("subject", Some("模型回答"));
        let judge_model = ScriptedModel::new("judge", Some("8"));
        let judge = Judge::new(subject.clone(), judge_model.clone());

        let evaluation = judge
            .evaluate(&WorkItem::new("问题", "", "参考答案"))
            .await
            .unwrap();

        assert_eq!(evaluation.score, 8);
        assert_eq!(evaluation.response, "模型回答");

        let subject_prompts = subject.prompts.lock().unwrap();
        assert_eq!(subject_prompts[0].user, "问题");
        assert_eq!(subject_prompts[0].max_tokens, Some(512));

        let judge_prompts = judge_model.prompts.lock().unwrap();
        assert!(judge_prompts[0].user.contains("参考答案: 参考答案实际回答:模型回答"));
        assert_eq!(judge_prompts[0].max_tokens, Some(10));
        assert_eq!(judge_prompts[0].temperature, Some(0.0));
    }

    #[tokio::test]
    async fn subject_failure_skips_judge() {
        let subject = ScriptedModel::new("subject", None);
        let judge_model = ScriptedModel::new("judge", Some("8"));
        let judge = Judge::new(subject, judge_model.clone());

        let result = judge.evaluate(&WorkItem::new("问题", "", "参考答案")).await;

        assert!(result.is_err());
        assert!(judge_model.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn judge_failure_is_an_error() {
        let judge = Judge::new(
            ScriptedModel::new("subject", Some("回答")),
            ScriptedModel::new("judge", None),
        );
        let err = judge.score("参考", "回答").await.unwrap_err();
        assert!(matches!(err, LlmError::ApiCallFailed { .. }));
    }
}
