//! Turn pacing and reply randomness

use serde::Deserialize;
use std::time::Duration;

/// Generation loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Delay between completion calls, in milliseconds
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,

    /// Seed for fallback-reply selection; entropy when unset
    pub seed: Option<u64>,
}

impl GenerationConfig {
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            pacing_ms: default_pacing_ms(),
            seed: None,
        }
    }
}

fn default_pacing_ms() -> u64 {
    1000
}
