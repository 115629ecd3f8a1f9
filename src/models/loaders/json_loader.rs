use crate::error::FileError;
use crate::models::work_item::WorkItem;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

/// 读取 JSON 文件并反序列化
///
/// 文件不存在或内容不是合法 JSON 都视为致命错误
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, FileError> {
    let display = path.display().to_string();

    let content = fs::read_to_string(path).await.map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            FileError::NotFound {
                path: display.clone(),
            }
        } else {
            FileError::ReadFailed {
                path: display.clone(),
                source,
            }
        }
    })?;

    serde_json::from_str(&content).map_err(|source| FileError::JsonParseFailed {
        path: display,
        source,
    })
}

/// 从 JSON 数组文件加载全部样本
pub async fn load_work_items(path: &Path) -> Result<Vec<WorkItem>, FileError> {
    let items: Vec<WorkItem> = load_json(path).await?;
    tracing::info!(
        "已加载 {} 条样本: {}",
        items.len(),
        path.file_name().unwrap_or_default().to_string_lossy()
    );
    Ok(items)
}
