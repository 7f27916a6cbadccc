use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use color_eyre::{
    Result,
    eyre::{WrapErr as _, eyre},
};
use flux_engine::{Endpoint, GenerationRequest, HttpTransport, JobClient, PollOptions, Transport};
use log::info;
use serde::{Serialize, de::DeserializeOwned};
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;

use crate::{
    cli::GenerateArgs,
    config::{API_KEY_VAR, Config, Settings, load_config},
};

pub mod cli;
pub mod config;

const SLUG_WORDS: usize = 10;

pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let src = fs::read_to_string(path)?;
    Ok(ron::from_str(&src)?)
}

pub fn save_ron_file<T: Serialize>(path: &Path, x: &T) -> Result<()> {
    Ok(fs::write(path, ron::to_string(x)?)?)
}

/// File name stem for a generated image: the first words of the prompt plus a timestamp.
pub fn create_slug(prompt: &str, timestamp: u64) -> String {
    let slug: String = prompt
        .split_whitespace()
        .take(SLUG_WORDS)
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    format!("{slug}-{timestamp}")
}

pub fn artifact_path(dir: &Path, slug: &str) -> PathBuf {
    dir.join(format!("{slug}.jpg"))
}

pub fn save_artifact(dir: &Path, slug: &str, data: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(dir).wrap_err_with(|| format!("creating {}", dir.display()))?;
    let path = artifact_path(dir, slug);
    fs::write(&path, data).wrap_err_with(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn unix_now() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

pub async fn generate(args: GenerateArgs, config_path: &Path) -> Result<PathBuf> {
    let cfg = load_config(config_path)?.unwrap_or_default();
    let settings = Settings::resolve(&args, &cfg, std::env::var(API_KEY_VAR).ok())?;
    let seed = args.seed_choice();
    let request = GenerationRequest::try_new(args.prompt, args.model, seed)?;

    let client = JobClient::new(HttpTransport::with_base_url(
        settings.api_key,
        settings.base_url,
    ));

    let cancel = CancellationToken::new();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    println!(
        "Generating with {} (seed {}), this usually takes a few seconds...",
        request.endpoint, request.seed
    );
    run_generation(&client, &request, &settings.poll, &settings.images_dir, &cancel).await
}

/// Generates one image and stores it in `images_dir`. The directory is only
/// touched once the image is downloaded.
pub async fn run_generation<T: Transport + Sync>(
    client: &JobClient<T>,
    request: &GenerationRequest,
    poll: &PollOptions,
    images_dir: &Path,
    cancel: &CancellationToken,
) -> Result<PathBuf> {
    let artifact = client.generate(request, poll, cancel).await?;
    info!("Job {} done, image at {}", artifact.job_id, artifact.locator);

    let slug = create_slug(&request.prompt, unix_now()?);
    save_artifact(images_dir, &slug, &artifact.data)
}

pub fn list_models() -> Vec<String> {
    Endpoint::iter()
        .map(|e| {
            let mut line = e.to_string();
            if e == Endpoint::default() {
                line.push_str(" (default)");
            }
            if e.is_premium() {
                line.push_str(" (more expensive)");
            }
            line
        })
        .collect()
}

pub fn init_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(eyre!("{} already exists", path.display()));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    save_ron_file(path, &Config::with_defaults())
}
