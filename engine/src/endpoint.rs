use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// The model variants the provider exposes. Each one has its own submission path.
#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    Hash,
    PartialEq,
    Eq,
    EnumIter,
    Default,
)]
pub enum Endpoint {
    #[default]
    #[strum(to_string = "flux-dev")]
    #[value(name = "flux-dev")]
    #[serde(rename = "flux-dev")]
    FluxDev,

    #[strum(to_string = "flux-pro-1.1-ultra")]
    #[value(name = "flux-pro-1.1-ultra")]
    #[serde(rename = "flux-pro-1.1-ultra")]
    FluxPro11Ultra,

    #[strum(to_string = "flux-pro-1.1")]
    #[value(name = "flux-pro-1.1")]
    #[serde(rename = "flux-pro-1.1")]
    FluxPro11,
}

impl Endpoint {
    pub fn path(&self) -> String {
        format!("/v1/{self}")
    }

    /// The pro variants are billed at a higher rate than `flux-dev`.
    pub fn is_premium(&self) -> bool {
        match self {
            Endpoint::FluxDev => false,
            Endpoint::FluxPro11Ultra | Endpoint::FluxPro11 => true,
        }
    }
}
