//! 错误类型
//!
//! - `LlmError`：单条数据的远程调用 / 解析失败，由编排层汇总，不会中断批次
//! - `FileError`：输入文件、进度文件、报告文件的读写失败，属于致命错误
//! - `ConfigError`：配置非法，启动阶段即终止
//! - `ItemError`：编排层看到的单条数据失败（LLM 错误或并发槽位不可用）

use thiserror::Error;
use tokio::sync::AcquireError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 请求构建失败
    #[error("构建 LLM 请求失败 (模型: {model}): {message}")]
    RequestBuild { model: String, message: String },

    /// API 调用失败（网络错误、限流、服务端错误）
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: BoxError,
    },

    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },

    /// 返回内容不是合法 JSON，或字段类型不符
    #[error("无法解析LLM返回内容: {message}")]
    ResponseParseFailed { message: String },

    /// 返回的 JSON 中缺少 `versions` 数组
    #[error("LLM返回内容缺少 versions 数组")]
    MissingVersions,

    /// 改写版本数量不符
    #[error("LLM返回了 {actual} 个改写版本，期望 {expected} 个")]
    WrongVariantCount { expected: usize, actual: usize },
}

impl LlmError {
    /// 创建 API 调用错误
    pub fn api_call_failed(model: impl Into<String>, source: impl Into<BoxError>) -> Self {
        LlmError::ApiCallFailed {
            model: model.into(),
            source: source.into(),
        }
    }
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },

    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON 解析失败
    #[error("JSON解析失败 ({path}): {source}")]
    JsonParseFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON 序列化失败
    #[error("JSON序列化失败 ({path}): {source}")]
    JsonSerializeFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置值非法
    #[error("配置项 {name} 非法: {reason}")]
    InvalidValue { name: String, reason: String },
}

/// 单条数据处理失败
#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("无法获取并发槽位: {0}")]
    Limiter(#[from] AcquireError),
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrong_variant_count_display() {
        let err = LlmError::WrongVariantCount {
            expected: 5,
            actual: 3,
        };
        assert_eq!(err.to_string(), "LLM返回了 3 个改写版本，期望 5 个");
    }

    #[test]
    fn api_call_failed_keeps_source() {
        let err = LlmError::api_call_failed("test", "connection refused");
        assert!(err.to_string().contains("connection refused"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn item_error_is_transparent_over_llm_error() {
        let err: ItemError = LlmError::MissingVersions.into();
        assert_eq!(err.to_string(), LlmError::MissingVersions.to_string());
    }

    #[test]
    fn errors_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AppError>();
        assert_send_sync::<ItemError>();
    }
}
