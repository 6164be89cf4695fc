use clap::Parser;
use numinfo_proxy::utils::{logger, validation::Validate};
use numinfo_proxy::{CliConfig, ConfigProvider, ProxyServer, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting numinfo-proxy");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 如果指定了 TOML 配置檔就優先使用
    match cli.config.clone() {
        Some(path) => {
            let config = match TomlConfig::from_file(&path) {
                Ok(config) => config,
                Err(e) => {
                    tracing::error!("❌ Failed to load config file {}: {}", path, e);
                    eprintln!("❌ {}", e);
                    std::process::exit(1);
                }
            };
            run(config).await
        }
        None => run(cli).await,
    }
}

async fn run<C>(config: C) -> anyhow::Result<()>
where
    C: ConfigProvider + Validate + std::fmt::Debug + 'static,
{
    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    tracing::info!(
        "Upstream: {} (max retries: {}, delay: {:?}, timeout: {:?})",
        config.upstream_url(),
        config.max_retries(),
        config.retry_delay(),
        config.request_timeout()
    );

    let server = ProxyServer::new(config);
    server.start().await?;

    Ok(())
}
