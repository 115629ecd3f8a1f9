//! 并发限制器
//!
//! 用 Semaphore 限制同时进行的远程调用数量。
//! 获取槽位没有超时；槽位在被包裹的 future 结束（成功、失败或被丢弃）时释放。

use std::future::Future;
use std::sync::Arc;
use tokio::sync::{AcquireError, Semaphore};

#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl ConcurrencyLimiter {
    /// 创建限制器，`limit` 至少为 1
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// 当前空闲的槽位数
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// 在持有一个槽位期间执行 `fut`
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, AcquireError>
    where
        F: Future,
    {
        let _permit = self.semaphore.acquire().await?;
        Ok(fut.await)
    }
}
