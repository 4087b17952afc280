//! Bridge configuration loaded once at startup.
//!
//! Follows a "fail-safe" approach: a missing or unparseable config file logs
//! a warning and falls back to the documented defaults instead of preventing
//! startup. Unknown keys in the file are ignored; only keys matching the
//! schema override their defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Default config file, looked up relative to the working directory.
pub const CONFIG_FILE: &str = "bridge_config.toml";

/// Immutable-after-load configuration for the steering bridge.
#[derive(Deserialize, Serialize, Clone, Debug)]
#[serde(default)]
pub struct BridgeConfig {
    /// Listen address for the controller connection
    pub host: String,
    /// Listen port for the controller connection
    pub port: u16,
    /// Name of the game process the bridge attaches to
    pub process_name: String,
    /// Memory offset consumed by the process-attach collaborator
    pub speed_offset: u64,
    /// Steering magnitude below which the axis output is forced to zero
    pub steering_deadzone: f32,
    /// Linear multiplier applied to raw steering input
    pub steering_sensitivity: f32,
    /// Delay between accept retries, in seconds
    pub reconnect_timeout: f32,
    /// Accept failures tolerated before the supervisor gives up
    pub max_reconnect_attempts: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 65433,
            process_name: "ForzaHorizon5.exe".to_string(),
            speed_offset: 0x1234_5678,
            steering_deadzone: 0.2,
            steering_sensitivity: 2.0,
            reconnect_timeout: 5.0,
            max_reconnect_attempts: 3,
        }
    }
}

impl BridgeConfig {
    /// Lädt die Konfiguration aus einer TOML-Datei, mit Defaults als Fallback.
    pub async fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match tokio::fs::read_to_string(path).await {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(config) => {
                    info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Invalid TOML in {}, using defaults: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                warn!("Config file {} not found, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Parst eine Konfiguration aus einem TOML-String.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Clamps out-of-range values back into their documented ranges.
    ///
    /// Invariants: `0 <= steering_deadzone < 1`, `steering_sensitivity >= 0`,
    /// `reconnect_timeout >= 0`. Violations are logged and corrected rather
    /// than aborting startup.
    pub fn validate(&mut self) {
        if !(0.0..1.0).contains(&self.steering_deadzone) {
            warn!(
                "steering_deadzone {} outside [0, 1), clamping",
                self.steering_deadzone
            );
            self.steering_deadzone = self.steering_deadzone.clamp(0.0, 0.999);
        }
        if self.steering_sensitivity < 0.0 {
            warn!(
                "steering_sensitivity {} negative, clamping to 0",
                self.steering_sensitivity
            );
            self.steering_sensitivity = 0.0;
        }
        if self.reconnect_timeout < 0.0 {
            warn!(
                "reconnect_timeout {} negative, clamping to 0",
                self.reconnect_timeout
            );
            self.reconnect_timeout = 0.0;
        }
    }

    /// Socket address string for the listening socket.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Delay between accept retries.
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_secs_f32(self.reconnect_timeout.max(0.0))
    }
}
