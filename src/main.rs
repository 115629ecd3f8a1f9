use anyhow::Result;
use clap::Parser;

use sft_toolkit::cli::{Cli, Command};
use sft_toolkit::utils::logging;
use sft_toolkit::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置（.env + 环境变量），命令行参数优先
    let mut config = Config::load(None);
    cli.apply_overrides(&mut config);

    // 初始化日志
    let log_file = logging::init(&config.log_dir, config.verbose_logging)?;

    let app = App::initialize(config, log_file)?;

    match &cli.command {
        Command::Rewrite { input, output, .. } => {
            app.run_rewrite(input, output).await?;
        }
        Command::Eval { input, report, .. } => {
            app.run_eval(input, report.as_deref()).await?;
        }
    }

    Ok(())
}
