#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use sft_toolkit::{ChatModel, ChatRequest, LlmError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Handler = Box<dyn Fn(&ChatRequest) -> Result<String, LlmError> + Send + Sync>;
type DelayFn = Box<dyn Fn(&ChatRequest) -> Duration + Send + Sync>;

/// 并发计数器，可在多个假模型之间共享
#[derive(Debug, Default)]
pub struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// 按请求内容返回回复的假模型，记录调用次数和并发峰值
pub struct FakeChatModel {
    name: String,
    handler: Handler,
    delay: DelayFn,
    in_flight: Arc<InFlight>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl FakeChatModel {
    pub fn new<F>(name: &str, handler: F) -> Self
    where
        F: Fn(&ChatRequest) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            handler: Box::new(handler),
            delay: Box::new(|_| Duration::ZERO),
            in_flight: Arc::new(InFlight::default()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        self.with_delay_by(move |_| delay)
    }

    /// 按请求内容决定延迟
    pub fn with_delay_by<F>(mut self, delay: F) -> Self
    where
        F: Fn(&ChatRequest) -> Duration + Send + Sync + 'static,
    {
        self.delay = Box::new(delay);
        self
    }

    /// 与其他假模型共用同一个并发计数器
    pub fn with_in_flight(mut self, in_flight: Arc<InFlight>) -> Self {
        self.in_flight = in_flight;
        self
    }

    pub fn peak_in_flight(&self) -> usize {
        self.in_flight.peak()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// 改写请求中的原始问题
    pub fn seen_instructions(&self) -> Vec<String> {
        self.requests()
            .iter()
            .filter_map(|r| original_instruction(&r.user))
            .collect()
    }
}

#[async_trait]
impl ChatModel for FakeChatModel {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        self.in_flight.enter();

        let delay = (self.delay)(&request);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let reply = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);

        self.in_flight.leave();
        reply
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

/// 从改写提示词中取出原始问题
pub fn original_instruction(prompt: &str) -> Option<String> {
    prompt
        .lines()
        .find_map(|line| line.strip_prefix("原始问题："))
        .map(str::to_string)
}

/// 针对某个问题生成 5 个版本的改写回复
pub fn five_versions_for(instruction: &str) -> String {
    let versions: Vec<_> = (1..=5)
        .map(|i| {
            json!({
                "instruction": format!("{instruction}-改写{i}"),
                "output": format!("{instruction}-答案{i}"),
            })
        })
        .collect();
    json!({ "versions": versions }).to_string()
}

/// 总是给出 5 个版本的改写模型
pub fn echo_rewriter() -> FakeChatModel {
    FakeChatModel::new("rewriter", |request| {
        let instruction = original_instruction(&request.user).unwrap_or_default();
        Ok(five_versions_for(&instruction))
    })
}

pub fn items_json(count: usize) -> String {
    let items: Vec<_> = (1..=count)
        .map(|i| json!({"instruction": format!("Q{i}"), "input": "", "output": format!("A{i}")}))
        .collect();
    serde_json::to_string(&items).unwrap()
}
