//! 命令行接口
//!
//! 子命令 `rewrite`（指令改写）与 `eval`（模型评测），
//! 命令行参数优先于环境变量配置。

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;

/// 微调数据处理工具：指令改写与模型评测
#[derive(Debug, Parser)]
#[command(name = "sft-toolkit", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// 显示详细日志
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    /// 日志根目录
    #[arg(long, global = true)]
    pub log_dir: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 将每条样本改写为 5 个版本，支持断点续跑
    Rewrite {
        /// 输入文件（Alpaca 格式 JSON 数组）
        #[arg(long, short, default_value = "./data/relay_protection_issues_export_mini.json")]
        input: PathBuf,

        /// 输出文件，同时作为断点
        #[arg(long, short, default_value = "./data/rewritten_output.json")]
        output: PathBuf,

        /// 最大并发数
        #[arg(long)]
        concurrency: Option<usize>,

        /// 每批派发的样本数
        #[arg(long)]
        batch_size: Option<usize>,

        /// 改写模型名称
        #[arg(long)]
        model: Option<String>,
    },

    /// 用裁判模型评测被测模型的回答
    Eval {
        /// 输入文件（Alpaca 格式 JSON 数组）
        #[arg(long, short, default_value = "./data/relay_protection_issues_export.json")]
        input: PathBuf,

        /// 只评测前 N 条样本（0 表示全部）
        #[arg(long)]
        limit: Option<usize>,

        /// 最大并发数
        #[arg(long)]
        concurrency: Option<usize>,

        /// 评测报告输出文件
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

impl Cli {
    /// 用命令行参数覆盖配置
    pub fn apply_overrides(&self, config: &mut Config) {
        if self.verbose {
            config.verbose_logging = true;
        }
        if let Some(log_dir) = &self.log_dir {
            config.log_dir = log_dir.clone();
        }

        match &self.command {
            Command::Rewrite {
                concurrency,
                batch_size,
                model,
                ..
            } => {
                if let Some(n) = concurrency {
                    config.rewrite_concurrency = *n;
                }
                if let Some(n) = batch_size {
                    config.rewrite_batch_size = *n;
                }
                if let Some(model) = model {
                    config.rewrite_model_name = model.clone();
                }
            }
            Command::Eval {
                limit, concurrency, ..
            } => {
                if let Some(n) = limit {
                    config.eval_sample_limit = *n;
                }
                if let Some(n) = concurrency {
                    config.eval_concurrency = *n;
                }
            }
        }
    }
}
