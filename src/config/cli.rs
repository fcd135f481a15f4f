use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "order-wizard")]
#[command(about = "Walk a landscaping service order through the order wizard")]
pub struct CliConfig {
    /// JSON file holding the order draft
    #[arg(long)]
    pub draft: String,

    /// TOML file with rates, pricing and the submission endpoint
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the submission endpoint from the config file
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Send the order once every step validates
    #[arg(long)]
    pub submit: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}
