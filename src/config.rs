use crate::error::ConfigError;
use std::path::Path;
use std::str::FromStr;

const PLACEHOLDER_API_KEY: &str = "sk-123";

/// 单个 OpenAI 兼容端点的连接配置
#[derive(Clone, Debug, PartialEq)]
pub struct EndpointConfig {
    pub api_key: String,
    pub api_base_url: String,
    pub model_name: String,
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- 被测模型 / 改写模型端点 ---
    pub subject_api_key: String,
    pub subject_api_base_url: String,
    pub subject_model_name: String,
    pub rewrite_model_name: String,
    // --- 裁判模型端点 ---
    pub judge_api_key: String,
    pub judge_api_base_url: String,
    pub judge_model_name: String,
    // --- 改写流程 ---
    /// 改写时的采样温度
    pub rewrite_temperature: f32,
    /// 改写流程同时进行的远程调用数量
    pub rewrite_concurrency: usize,
    /// 改写流程每批派发的条目数量
    pub rewrite_batch_size: usize,
    // --- 评测流程 ---
    /// 评测流程同时进行的远程调用数量
    pub eval_concurrency: usize,
    /// 只评测前 N 条数据
    pub eval_sample_limit: usize,
    // --- 日志 ---
    /// 日志根目录，实际文件为 `<log_dir>/<YYYYMMDD>/<HHMMSS>.log`
    pub log_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            subject_api_key: PLACEHOLDER_API_KEY.to_string(),
            subject_api_base_url: "http://127.0.0.1:10080/v1".to_string(),
            subject_model_name: "test".to_string(),
            rewrite_model_name: "Qwen/Qwen3-30B-A3B".to_string(),
            judge_api_key: PLACEHOLDER_API_KEY.to_string(),
            judge_api_base_url: "http://10.16.189.166:10080/v1".to_string(),
            judge_model_name: "Qwen/Qwen2.5-7B-Instruct".to_string(),
            rewrite_temperature: 0.8,
            rewrite_concurrency: 5,
            rewrite_batch_size: 20,
            eval_concurrency: 16,
            eval_sample_limit: 100,
            log_dir: "log".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 先加载 `.env` 文件，再读取环境变量
    ///
    /// `dotenv_path` 为空时从当前目录向上查找 `.env`；文件不存在时忽略。
    /// 已设置的环境变量优先于文件中的值。
    pub fn load(dotenv_path: Option<&Path>) -> Self {
        let _ = match dotenv_path {
            Some(path) => dotenvy::from_path(path).is_ok(),
            None => dotenvy::dotenv().is_ok(),
        };
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 从任意键值来源读取配置，缺失或无法解析的值使用默认值
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let subject_api_key = lookup("OPENAI_API_KEY").unwrap_or(default.subject_api_key);
        // 裁判端点未单独配置密钥时沿用被测端点的密钥
        let judge_api_key = lookup("JUDGE_API_KEY").unwrap_or_else(|| subject_api_key.clone());

        Self {
            subject_api_base_url: lookup("OPENAI_API_BASE").unwrap_or(default.subject_api_base_url),
            subject_model_name: lookup("SUBJECT_MODEL").unwrap_or(default.subject_model_name),
            rewrite_model_name: lookup("REWRITE_MODEL").unwrap_or(default.rewrite_model_name),
            judge_api_base_url: lookup("JUDGE_API_BASE").unwrap_or(default.judge_api_base_url),
            judge_model_name: lookup("JUDGE_MODEL").unwrap_or(default.judge_model_name),
            rewrite_temperature: parse_var(&lookup, "REWRITE_TEMPERATURE").unwrap_or(default.rewrite_temperature),
            rewrite_concurrency: parse_var(&lookup, "REWRITE_CONCURRENCY").unwrap_or(default.rewrite_concurrency),
            rewrite_batch_size: parse_var(&lookup, "REWRITE_BATCH_SIZE").unwrap_or(default.rewrite_batch_size),
            eval_concurrency: parse_var(&lookup, "EVAL_CONCURRENCY").unwrap_or(default.eval_concurrency),
            eval_sample_limit: parse_var(&lookup, "EVAL_SAMPLE_LIMIT").unwrap_or(default.eval_sample_limit),
            log_dir: lookup("LOG_DIR").unwrap_or(default.log_dir),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            subject_api_key,
            judge_api_key,
        }
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("rewrite_concurrency", self.rewrite_concurrency),
            ("rewrite_batch_size", self.rewrite_batch_size),
            ("eval_concurrency", self.eval_concurrency),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    reason: "必须大于 0".to_string(),
                });
            }
        }
        if !(0.0..=2.0).contains(&self.rewrite_temperature) {
            return Err(ConfigError::InvalidValue {
                name: "rewrite_temperature".to_string(),
                reason: format!("{} 不在 [0, 2] 范围内", self.rewrite_temperature),
            });
        }
        Ok(())
    }

    /// 改写流程使用的端点（与被测模型共用地址，模型不同）
    pub fn rewrite_endpoint(&self) -> EndpointConfig {
        EndpointConfig {
            api_key: self.subject_api_key.clone(),
            api_base_url: self.subject_api_base_url.clone(),
            model_name: self.rewrite_model_name.clone(),
        }
    }

    pub fn subject_endpoint(&self) -> EndpointConfig {
        EndpointConfig {
            api_key: self.subject_api_key.clone(),
            api_base_url: self.subject_api_base_url.clone(),
            model_name: self.subject_model_name.clone(),
        }
    }

    pub fn judge_endpoint(&self) -> EndpointConfig {
        EndpointConfig {
            api_key: self.judge_api_key.clone(),
            api_base_url: self.judge_api_base_url.clone(),
            model_name: self.judge_model_name.clone(),
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name).and_then(|v| v.trim().parse().ok())
}
