//! 改写批处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **断点续跑**：读取已有输出文件，按 `结果数 / 5` 跳过已处理的前缀
//! 2. **分批派发**：每批样本一起派发，整批完成（含写盘）后再开始下一批
//! 3. **并发控制**：`ConcurrencyLimiter` 限制同时进行的远程调用
//! 4. **即时落盘**：按输入顺序，前序样本全部完成后立即整体重写输出文件
//! 5. **统计输出**：成功/失败数量
//!
//! 单条样本失败只记录日志，不会中断批次。

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, error, info, warn};

use crate::error::{FileError, ItemError};
use crate::models::{RewriteResult, WorkItem};
use crate::orchestrator::limiter::ConcurrencyLimiter;
use crate::services::{resume_offset, ProgressStore, Rewriter, VARIANTS_PER_ITEM};
use crate::utils::logging::{log_batch_complete, log_batch_start};
use crate::utils::{progress, truncate_text};

/// 改写统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RewriteStats {
    /// 输入样本总数
    pub total_items: usize,
    /// 断点续跑时跳过的样本数
    pub resumed_items: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 运行结束时输出文件中的结果数
    pub results_written: usize,
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    failed: usize,
}

pub struct RewriteProcessor {
    rewriter: Rewriter,
    limiter: ConcurrencyLimiter,
    batch_size: usize,
}

impl RewriteProcessor {
    pub fn new(rewriter: Rewriter, concurrency: usize, batch_size: usize) -> Self {
        Self {
            rewriter,
            limiter: ConcurrencyLimiter::new(concurrency),
            batch_size: batch_size.max(1),
        }
    }

    /// 改写全部样本，结果写入 `store`
    ///
    /// 只有进度文件读写失败才返回错误
    pub async fn run(&self, items: &[WorkItem], store: &ProgressStore) -> Result<RewriteStats, FileError> {
        let mut log: Vec<RewriteResult> = store.load().await?;
        if !log.is_empty() {
            info!("📂 发现已有输出文件，包含 {} 条结果", log.len());
        }

        let processed = resume_offset(log.len(), VARIANTS_PER_ITEM).min(items.len());
        let mut stats = RewriteStats {
            total_items: items.len(),
            resumed_items: processed,
            ..Default::default()
        };

        let pending = &items[processed..];
        if pending.is_empty() {
            info!("✓ 全部 {} 条样本已处理，无需改写", items.len());
            stats.results_written = log.len();
            return Ok(stats);
        }
        if processed > 0 {
            info!("⏩ 跳过前 {} 条已处理的样本", processed);
        }

        let bar = progress::item_bar(items.len() as u64, processed as u64, "改写样本");
        let total_batches = pending.len().div_ceil(self.batch_size);

        for (batch_idx, batch) in pending.chunks(self.batch_size).enumerate() {
            let batch_start = processed + batch_idx * self.batch_size;
            log_batch_start(
                batch_idx + 1,
                total_batches,
                batch_start + 1,
                batch_start + batch.len(),
                items.len(),
            );

            let batch_result = self
                .process_batch(batch, batch_start, store, &mut log, &bar)
                .await?;

            stats.succeeded += batch_result.success;
            stats.failed += batch_result.failed;

            log_batch_complete(
                batch_idx + 1,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );
        }

        bar.finish_and_clear();
        stats.results_written = log.len();

        info!("✓ 改写完成，结果已保存到 {}", store.path().display());
        info!("原始样本: {}，改写结果: {}", items.len(), log.len());

        Ok(stats)
    }

    /// 处理单个批次：一起派发，按输入顺序落盘
    ///
    /// 先完成的样本暂存在缓冲区中，只有它之前的样本全部完成后才写入，
    /// 保证输出文件始终对应输入的一个前缀。失败的样本同样视为已完成。
    async fn process_batch(
        &self,
        batch: &[WorkItem],
        batch_start: usize,
        store: &ProgressStore,
        log: &mut Vec<RewriteResult>,
        bar: &indicatif::ProgressBar,
    ) -> Result<BatchResult, FileError> {
        let mut in_flight: FuturesUnordered<_> = batch
            .iter()
            .enumerate()
            .map(|(offset, item)| async move {
                let outcome = match self.limiter.run(self.rewriter.rewrite(item)).await {
                    Ok(result) => result.map_err(ItemError::from),
                    Err(e) => Err(ItemError::from(e)),
                };
                (offset, item, outcome)
            })
            .collect();

        let mut result = BatchResult::default();
        let mut finished: Vec<Option<Vec<RewriteResult>>> = vec![None; batch.len()];
        let mut next_to_write = 0;

        while let Some((offset, item, outcome)) = in_flight.next().await {
            let item_index = batch_start + offset + 1;
            let variants = match outcome {
                Ok(variants) => {
                    result.success += 1;
                    variants
                }
                Err(e) => {
                    error!("[样本 {}] ❌ 改写失败: {}", item_index, e);
                    warn!(
                        "[样本 {}] ⚠️ 生成失败，跳过: {}",
                        item_index,
                        truncate_text(&item.instruction, 50)
                    );
                    result.failed += 1;
                    Vec::new()
                }
            };
            finished[offset] = Some(variants);
            bar.inc(1);

            let mut ready = Vec::new();
            while let Some(variants) = finished.get_mut(next_to_write).and_then(Option::take) {
                ready.extend(variants);
                next_to_write += 1;
            }
            if !ready.is_empty() {
                store.append_and_flush(log, ready).await?;
            } else if next_to_write <= offset {
                debug!("[样本 {}] 已完成，等待前序样本后写入", item_index);
            }
        }

        Ok(result)
    }
}
