//! 应用入口 - 编排层
//!
//! 根据配置显式构造各端点的客户端，组装服务并运行对应流程。
//! 不持有任何全局客户端。

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::clients::{ChatModel, OpenAiChatModel};
use crate::config::Config;
use crate::models::{load_work_items, EvalReport};
use crate::orchestrator::{EvalProcessor, RewriteProcessor, RewriteStats};
use crate::services::{save_json, Judge, ProgressStore, Rewriter};
use crate::utils::logging::{log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    log_file: PathBuf,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config, log_file: PathBuf) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, log_file })
    }

    /// 运行改写流程
    pub async fn run_rewrite(&self, input: &Path, output: &Path) -> Result<RewriteStats> {
        log_startup("指令改写", self.config.rewrite_concurrency);
        info!("🤖 改写模型: {}", self.config.rewrite_model_name);

        let model: Arc<dyn ChatModel> = Arc::new(OpenAiChatModel::new(&self.config.rewrite_endpoint()));
        let rewriter = Rewriter::new(model, self.config.rewrite_temperature);
        let processor = RewriteProcessor::new(
            rewriter,
            self.config.rewrite_concurrency,
            self.config.rewrite_batch_size,
        );

        let items = load_work_items(input).await?;
        let stats = processor.run(&items, &ProgressStore::new(output)).await?;

        print_final_stats(
            stats.succeeded,
            stats.failed,
            stats.total_items - stats.resumed_items,
            &self.log_file,
        );

        Ok(stats)
    }

    /// 运行评测流程，`report` 不为空时把汇总报告写入该文件
    pub async fn run_eval(&self, input: &Path, report: Option<&Path>) -> Result<EvalReport> {
        log_startup("模型评测", self.config.eval_concurrency);
        info!(
            "🤖 被测模型: {} | 裁判模型: {}",
            self.config.subject_model_name, self.config.judge_model_name
        );

        let subject: Arc<dyn ChatModel> = Arc::new(OpenAiChatModel::new(&self.config.subject_endpoint()));
        let judge_model: Arc<dyn ChatModel> = Arc::new(OpenAiChatModel::new(&self.config.judge_endpoint()));
        let processor = EvalProcessor::new(
            Judge::new(subject, judge_model),
            self.config.eval_concurrency,
            self.config.eval_sample_limit,
        );

        let items = load_work_items(input).await?;
        let eval_report = processor.run(&items).await;

        if let Some(path) = report {
            save_json(path, &eval_report)
                .await
                .with_context(|| format!("无法写入评测报告: {}", path.display()))?;
            info!("评测报告已保存至: {}", path.display());
        }

        print_final_stats(
            eval_report.scored,
            eval_report.failed,
            eval_report.evaluated,
            &self.log_file,
        );

        Ok(eval_report)
    }
}
