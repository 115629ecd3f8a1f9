//! 进度存储 - 业务能力层
//!
//! 输出文件同时充当断点：每完成一条样本就整体重写一次文件。
//! 写入过程中崩溃可能留下损坏的文件，不做临时文件替换。

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::FileError;
use crate::models::load_json;

/// JSON 数组形式的进度文件
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 读取已有进度，文件不存在时返回空列表
    pub async fn load<T: DeserializeOwned>(&self) -> Result<Vec<T>, FileError> {
        match load_json(&self.path).await {
            Ok(log) => Ok(log),
            Err(FileError::NotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// 追加结果并整体重写文件
    pub async fn append_and_flush<T, I>(&self, log: &mut Vec<T>, items: I) -> Result<(), FileError>
    where
        T: Serialize,
        I: IntoIterator<Item = T>,
    {
        log.extend(items);
        self.flush(log).await
    }

    /// 将当前内容整体写入文件
    pub async fn flush<T: Serialize>(&self, log: &[T]) -> Result<(), FileError> {
        save_json(&self.path, log).await?;
        debug!("已写入 {} 条记录到 {}", log.len(), self.path.display());
        Ok(())
    }
}

/// 以缩进 2 的格式写出 JSON，非 ASCII 字符原样保留
pub async fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), FileError> {
    let display = path.display().to_string();

    let content = serde_json::to_string_pretty(value).map_err(|source| {
        FileError::JsonSerializeFailed {
            path: display.clone(),
            source,
        }
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| FileError::WriteFailed {
                path: display.clone(),
                source,
            })?;
    }

    fs::write(path, content)
        .await
        .map_err(|source| FileError::WriteFailed {
            path: display,
            source,
        })
}

/// 根据已存结果数推断已处理的样本数
///
/// 只按数量推断，不核对具体是哪些样本；数量不是整倍数时给出警告
pub fn resume_offset(stored_len: usize, variants_per_item: usize) -> usize {
    if variants_per_item == 0 {
        return 0;
    }
    if stored_len % variants_per_item != 0 {
        warn!(
            "⚠️ 已有结果数 {} 不是 {} 的整数倍，断点位置可能不准确",
            stored_len, variants_per_item
        );
    }
    stored_len / variants_per_item
}
