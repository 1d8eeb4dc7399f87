use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// RUST_LOG 優先，否則依 verbose 決定預設層級
fn env_filter(verbose: bool) -> EnvFilter {
    let default = if verbose {
        "label_validator=debug,info"
    } else {
        "label_validator=info,warn"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// 部署環境輸出 JSON lines，事件欄位攤平到頂層方便查詢
pub fn init_json_logger(environment: &str) {
    tracing_subscriber::registry()
        .with(env_filter(false))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_span_list(false)
                .with_target(false),
        )
        .init();

    tracing::info!(environment, "📝 JSON logging enabled");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_follows_verbosity() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        assert!(env_filter(true).to_string().contains("label_validator=debug"));
        assert!(env_filter(false).to_string().contains("label_validator=info"));
    }
}
