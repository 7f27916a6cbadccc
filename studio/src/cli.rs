use std::path::PathBuf;

use flux_engine::{Endpoint, SeedChoice};

#[derive(Debug, clap::Parser)]
#[command(version, about = "Generate images with the Black Forest Labs API")]
pub struct Cli {
    /// Use this config file instead of the default location
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Generate one image from a prompt and save it
    Generate(GenerateArgs),
    /// List the model endpoints
    Models,
    /// Write a config file with the default settings
    InitConfig,
}

#[derive(Debug, Default, clap::Args)]
pub struct GenerateArgs {
    /// The prompt for image generation
    pub prompt: String,

    #[arg(short, long, value_enum, default_value_t)]
    pub model: Endpoint,

    /// Fixed seed, 0 to 99999999. Defaults to 42
    #[arg(long, conflicts_with = "random_seed")]
    pub seed: Option<u64>,

    #[arg(long)]
    pub random_seed: bool,

    /// Overrides BLACK_FOREST_LABS_API_KEY and the config file
    #[arg(long)]
    pub api_key: Option<String>,

    /// Give up polling after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Seconds between status queries
    #[arg(long)]
    pub interval: Option<u64>,

    /// Retries for status queries that fail on the network level
    #[arg(long)]
    pub retries: Option<u32>,

    /// Directory the image is written to
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl GenerateArgs {
    pub fn seed_choice(&self) -> SeedChoice {
        match (self.random_seed, self.seed) {
            (true, _) => SeedChoice::Random,
            (false, Some(seed)) => SeedChoice::Fixed(seed),
            (false, None) => SeedChoice::default(),
        }
    }
}
