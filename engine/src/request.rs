use std::ops::RangeInclusive;

use rand::Rng;
use serde::Serialize;

use crate::{endpoint::Endpoint, error::RequestError};

pub const RANDOM_SEED_RANGE: RangeInclusive<u64> = 1..=9_999_999;
pub const FIXED_SEED_RANGE: RangeInclusive<u64> = 0..=99_999_999;
pub const DEFAULT_SEED: u64 = 42;

/// Sampling controls. They are the same for every request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SamplingParams {
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub top_k: u32,
    pub repetition_penalty: f64,
    pub stop: Vec<String>,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            repetition_penalty: 1.1,
            stop: vec!["\n\n".into()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedChoice {
    Random,
    Fixed(u64),
}

impl Default for SeedChoice {
    fn default() -> Self {
        SeedChoice::Fixed(DEFAULT_SEED)
    }
}

impl SeedChoice {
    fn resolve(self) -> Result<u64, RequestError> {
        match self {
            SeedChoice::Random => Ok(rand::rng().random_range(RANDOM_SEED_RANGE)),
            SeedChoice::Fixed(seed) if FIXED_SEED_RANGE.contains(&seed) => Ok(seed),
            SeedChoice::Fixed(seed) => Err(RequestError::SeedOutOfRange { seed }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub endpoint: Endpoint,
    pub seed: u64,
    pub sampling: SamplingParams,
}

/// What actually goes over the wire to the submission endpoint
#[derive(Debug, Serialize)]
pub struct RequestBody<'a> {
    pub prompt: &'a str,
    #[serde(flatten)]
    pub sampling: &'a SamplingParams,
    pub seed: u64,
}

impl GenerationRequest {
    pub fn try_new(
        prompt: impl Into<String>,
        endpoint: Endpoint,
        seed: SeedChoice,
    ) -> Result<Self, RequestError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(RequestError::EmptyPrompt);
        }

        Ok(Self {
            prompt,
            endpoint,
            seed: seed.resolve()?,
            sampling: SamplingParams::default(),
        })
    }

    pub fn body(&self) -> RequestBody<'_> {
        RequestBody {
            prompt: &self.prompt,
            sampling: &self.sampling,
            seed: self.seed,
        }
    }
}
