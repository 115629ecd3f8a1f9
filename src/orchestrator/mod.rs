//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `limiter` - 并发限制器
//! - 用 Semaphore 限制同时进行的远程调用数量
//!
//! ### `rewrite_processor` - 改写批处理器
//! - 断点续跑、分批派发、每条样本完成即落盘
//!
//! ### `eval_processor` - 评测处理器
//! - 一次性派发前 N 条样本，汇总得分
//!
//! ### `app` - 应用入口
//! - 根据配置构造客户端和服务，运行对应流程
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! rewrite_processor / eval_processor (处理 Vec<WorkItem>)
//!     ↓
//! services (能力层：rewriter / judge / progress_store，处理单条样本)
//!     ↓
//! clients (ChatModel)
//! ```

pub mod app;
pub mod eval_processor;
pub mod limiter;
pub mod rewrite_processor;

pub use app::App;
pub use eval_processor::EvalProcessor;
pub use limiter::ConcurrencyLimiter;
pub use rewrite_processor::{RewriteProcessor, RewriteStats};
