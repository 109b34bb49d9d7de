//! Configuration module

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use stay_core::constants::DEFAULT_BUNDLE_DIR;
use stay_core::{AgeBanding, BucketingProfile, PipelineConfig};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Model bundle directory
    pub model_bundle: PathBuf,

    /// Bucketing rules the model was trained with
    pub bucketing: BucketingProfile,

    /// Age banding for numeric ages
    pub age_banding: AgeBanding,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            model_bundle: PathBuf::from(DEFAULT_BUNDLE_DIR),
            bucketing: BucketingProfile::default(),
            age_banding: AgeBanding::default(),
            environment: "development".to_string(),
        }
    }
}

/// Parse an env var, falling back to `default` (with a warning) on bad input
fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            tracing::warn!("Ignoring {}='{}': {}", name, raw, e);
            default
        }),
        Err(_) => default,
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            port: parse_var("PORT", defaults.port),

            model_bundle: env::var("MODEL_BUNDLE")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_bundle),

            bucketing: parse_var("BUCKETING_PROFILE", defaults.bucketing),

            age_banding: parse_var("AGE_BANDING", defaults.age_banding),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Pipeline settings handed to the predictor
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig::new(self.bucketing, self.age_banding)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
