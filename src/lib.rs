//! # SFT Toolkit
//!
//! 微调数据流程工具：调用 OpenAI 兼容接口改写指令、评测微调模型
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - `ChatModel` 是唯一的远程调用接缝
//! - `OpenAiChatModel` - 基于 `async-openai` 的实现，按端点配置显式构造
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 只处理单条样本
//! - `Rewriter` - 把一条样本改写成 5 个版本
//! - `Judge` - 被测模型作答 + 裁判模型打分
//! - `ProgressStore` - 输出文件兼断点
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/` - 分批派发、并发限制、断点续跑、统计
//!
//! ## 模块结构

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::{ChatModel, ChatRequest, OpenAiChatModel};
pub use config::{Config, EndpointConfig};
pub use error::{AppError, AppResult, FileError, ItemError, LlmError};
pub use models::{EvalReport, RewriteResult, ScoreResult, WorkItem};
pub use orchestrator::{App, ConcurrencyLimiter, EvalProcessor, RewriteProcessor, RewriteStats};
pub use services::{Judge, ProgressStore, Rewriter};
