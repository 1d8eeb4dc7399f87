pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::carrier::UpsClient;
pub use adapters::vision::{build_vision_model, GeminiModel, OpenAiModel, VisionBackend};
pub use config::AppConfig;
pub use core::validator::LabelValidator;
pub use utils::error::{LabelError, Result};
