//! 评测处理器 - 编排层
//!
//! 取前 N 条样本一次性派发，`ConcurrencyLimiter` 限制并发，
//! 汇总得分。得分顺序与输入顺序一致，失败的样本记为 -1。

use futures::future::join_all;
use tracing::{error, info};

use crate::error::ItemError;
use crate::models::{EvalReport, ScoreResult, WorkItem};
use crate::orchestrator::limiter::ConcurrencyLimiter;
use crate::services::Judge;
use crate::utils::truncate_text;

pub struct EvalProcessor {
    judge: Judge,
    limiter: ConcurrencyLimiter,
    sample_limit: usize,
}

impl EvalProcessor {
    /// `sample_limit` 为 0 时评测全部样本
    pub fn new(judge: Judge, concurrency: usize, sample_limit: usize) -> Self {
        Self {
            judge,
            limiter: ConcurrencyLimiter::new(concurrency),
            sample_limit,
        }
    }

    pub async fn run(&self, items: &[WorkItem]) -> EvalReport {
        let sample_len = match self.sample_limit {
            0 => items.len(),
            limit => limit.min(items.len()),
        };
        let sample = &items[..sample_len];

        info!("开始评测 {} 条样本...", sample.len());

        let tasks = sample
            .iter()
            .enumerate()
            .map(|(idx, item)| self.evaluate_one(idx + 1, sample.len(), item));
        let scores = join_all(tasks).await;

        let report = EvalReport::from_scores(scores);
        log_report(&report);
        report
    }

    async fn evaluate_one(&self, item_index: usize, total: usize, item: &WorkItem) -> ScoreResult {
        let outcome = self
            .limiter
            .run(async {
                info!(
                    "[样本 {}/{}] 正在处理: {}",
                    item_index,
                    total,
                    truncate_text(&item.instruction, 100)
                );
                self.judge.evaluate(item).await
            })
            .await;

        let evaluation = match outcome {
            Ok(result) => result.map_err(ItemError::from),
            Err(e) => Err(ItemError::from(e)),
        };

        match evaluation {
            Ok(evaluation) => {
                info!("[样本 {}/{}] 模型回答: {}", item_index, total, evaluation.response);
                info!("[样本 {}/{}] 参考答案: {}", item_index, total, item.output);
                let score = ScoreResult::Scored(evaluation.score);
                info!("[样本 {}/{}] 得分: {}", item_index, total, score);
                score
            }
            Err(e) => {
                error!("[样本 {}/{}] ❌ 评测失败: {}", item_index, total, e);
                ScoreResult::Failed
            }
        }
    }
}

fn log_report(report: &EvalReport) {
    info!("{}", "=".repeat(60));
    info!("📊 评测完成");
    info!("{}", "=".repeat(60));
    info!("评测样本: {} (成功 {}，失败 {})", report.evaluated, report.scored, report.failed);
    info!("总分: {}/{}", report.total_score, report.max_possible_score);
    info!("百分制得分: {:.2}%", report.normalized_percent);
    info!("{}", "=".repeat(60));
}
