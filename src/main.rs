use clap::Parser;
use label_validator::config::cli::Command;
use label_validator::core::RequestContext;
use label_validator::server::{start_server, ServiceState};
use label_validator::utils::error::ErrorCategory;
use label_validator::utils::{logger, validation::Validate};
use label_validator::{
    build_vision_model, AppConfig, CliConfig, LabelError, LabelValidator, UpsClient,
};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    if let Err(e) = run(cli).await {
        tracing::error!(
            "❌ label-validator failed: {} (Category: {:?})",
            e,
            e.category()
        );
        eprintln!("❌ {}", e.user_friendly_message());

        // 依錯誤類別決定退出碼
        let exit_code = match e.category() {
            ErrorCategory::Configuration => 2,
            ErrorCategory::InvalidInput => 3,
            ErrorCategory::NotFound => 4,
            ErrorCategory::Transport | ErrorCategory::MalformedResponse => 5,
            ErrorCategory::Internal => 1,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: CliConfig) -> Result<(), LabelError> {
    // 載入配置：有指定檔案就讀檔，否則讀環境變數
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };

    if config.server.is_production() && matches!(cli.command, Command::Serve) {
        logger::init_json_logger(&config.server.environment);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!(environment = %config.server.environment, "Starting label-validator");
    if cli.verbose {
        tracing::debug!(
            "Vision backend: {:?}, match policy: {:?}",
            config.vision.backend,
            config.validation.match_policy
        );
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e);
    }

    let prompt = config.validation.load_prompt()?;
    let vision = build_vision_model(&config.vision)?;
    let carrier = UpsClient::connect(&config.carrier).await?;
    let validator = LabelValidator::new(
        vision,
        Arc::new(carrier),
        prompt,
        config.validation.match_policy,
    );
    let request_timeout = Duration::from_secs(config.server.request_timeout_seconds);

    match cli.command {
        Command::Serve => {
            let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;
            start_server(
                listener,
                ServiceState {
                    validator,
                    request_timeout,
                    max_body_bytes: config.server.max_body_bytes,
                },
            )
            .await
        }
        Command::Check {
            image: image_path,
            tracking_number,
        } => {
            let bytes = tokio::fs::read(&image_path).await?;
            let label = image::load_from_memory(&bytes).map_err(|e| LabelError::InvalidInput {
                message: format!("{}: {}", image_path.display(), e),
            })?;

            let ctx = RequestContext::with_timeout(request_timeout);
            let result = validator
                .validate(&ctx, tracking_number.as_deref(), &label)
                .await?;

            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.valid {
                println!("✅ Label address matches the carrier destination");
            } else {
                println!("❌ Label address does not match the carrier destination");
            }
            Ok(())
        }
    }
}
