use clap::Parser;
use color_eyre::Result;
use flux_studio::{
    cli::{Cli, Command},
    config::config_path,
    generate, init_config, list_models,
};

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    color_eyre::install()?;

    let cli = Cli::parse();
    let config_path = match cli.config {
        Some(path) => path,
        None => config_path()?,
    };

    match cli.command {
        Command::Generate(args) => {
            let path = generate(args, &config_path).await?;
            println!("Image saved as '{}'", path.display());
        }
        Command::Models => {
            for line in list_models() {
                println!("{line}");
            }
        }
        Command::InitConfig => {
            init_config(&config_path)?;
            println!("Wrote {}", config_path.display());
        }
    }
    Ok(())
}
