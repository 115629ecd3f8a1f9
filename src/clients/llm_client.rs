//! LLM API 客户端
//!
//! `ChatModel` 是远程调用的唯一接缝：服务层只依赖该 trait，
//! 生产环境使用 `OpenAiChatModel`（`async-openai`，兼容 OpenAI API 的服务），
//! 测试中替换为假实现。

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::EndpointConfig;
use crate::error::LlmError;

/// 一次聊天请求
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: Option<String>,
    pub user: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    pub fn new(user: impl Into<String>) -> Self {
        Self {
            system: None,
            user: user.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// 聊天补全能力
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// 发送请求并返回 `choices[0].message.content`（已去除首尾空白）
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError>;

    fn model_name(&self) -> &str;
}

/// 基于 `async-openai` 的聊天客户端
pub struct OpenAiChatModel {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl OpenAiChatModel {
    /// 根据端点配置创建客户端
    pub fn new(endpoint: &EndpointConfig) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&endpoint.api_key)
            .with_api_base(&endpoint.api_base_url);

        Self {
            client: Client::with_config(openai_config),
            model_name: endpoint.model_name.clone(),
        }
    }

    fn build_error(&self, e: impl std::fmt::Display) -> LlmError {
        LlmError::RequestBuild {
            model: self.model_name.clone(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", request.user.chars().count());

        let mut messages = Vec::new();

        if let Some(sys_msg) = &request.system {
            let system_msg = ChatCompletionRequestSystemMessageArgs::default()
                .content(sys_msg.as_str())
                .build()
                .map_err(|e| self.build_error(e))?;
            messages.push(ChatCompletionRequestMessage::System(system_msg));
        }

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(request.user.as_str())
            .build()
            .map_err(|e| self.build_error(e))?;
        messages.push(ChatCompletionRequestMessage::User(user_msg));

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model_name).messages(messages);
        if let Some(temperature) = request.temperature {
            args.temperature(temperature);
        }
        if let Some(max_tokens) = request.max_tokens {
            args.max_tokens(max_tokens);
        }
        let chat_request = args.build().map_err(|e| self.build_error(e))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            LlmError::api_call_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        Ok(content.trim().to_string())
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
