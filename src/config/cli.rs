use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "label-validator")]
#[command(about = "Validate shipping labels against carrier tracking data")]
pub struct CliConfig {
    #[arg(long, short, help = "TOML configuration file (falls back to environment variables)")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the HTTP service
    Serve,
    /// Validate a single label image from disk
    Check {
        #[arg(long)]
        image: PathBuf,

        #[arg(long)]
        tracking_number: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check_command() {
        let cli = CliConfig::parse_from([
            "label-validator",
            "--config",
            "label.toml",
            "check",
            "--image",
            "label.jpg",
            "--tracking-number",
            "1Z999AA10123456784",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("label.toml")));
        match cli.command {
            Command::Check {
                image,
                tracking_number,
            } => {
                assert_eq!(image, PathBuf::from("label.jpg"));
                assert_eq!(tracking_number.as_deref(), Some("1Z999AA10123456784"));
            }
            Command::Serve => panic!("expected check command"),
        }
    }
}
