//! Output sink traits and error types.
//!
//! These are the narrow interfaces the core calls into: a key press surface
//! for the discrete pedals and an analog surface for the steering axis. Both
//! are injected into the session handler, never reached through globals, and
//! transient failures are logged by the caller, not escalated.

use std::fmt;
use thiserror::Error;

/// Discrete pedal key, mutually exclusive by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PedalKey {
    Accelerate,
    Brake,
}

impl PedalKey {
    /// Game key bound to this pedal.
    pub fn key_name(self) -> &'static str {
        match self {
            PedalKey::Accelerate => "w",
            PedalKey::Brake => "s",
        }
    }
}

impl fmt::Display for PedalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PedalKey::Accelerate => write!(f, "accelerate"),
            PedalKey::Brake => write!(f, "brake"),
        }
    }
}

/// Axis identifier on the virtual controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamepadAxis {
    /// Steering channel
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
}

/// Error type for output operations.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Backend I/O failure (transient; session keeps running)
    #[error("output backend error: {0}")]
    Backend(String),
    /// Backend not available on this platform
    #[error("output backend not available: {0}")]
    Unavailable(String),
}

/// Key press surface: sets a named pedal key pressed or released.
///
/// Implementations must be idempotent: pressing a pressed key or releasing
/// a released key is a no-op, not an error.
pub trait KeySurface {
    fn press_key(&mut self, key: PedalKey) -> Result<(), OutputError>;
    fn release_key(&mut self, key: PedalKey) -> Result<(), OutputError>;
}

/// Analog surface: publishes a signed 16-bit value to a controller axis.
pub trait AnalogSurface {
    fn set_axis(&mut self, axis: GamepadAxis, value: i16) -> Result<(), OutputError>;
}

/// Combined sink handle injected into the session handler.
pub trait OutputSink: KeySurface + AnalogSurface + Send {}

impl<T: KeySurface + AnalogSurface + Send> OutputSink for T {}

/// OS-level keyboard injection seam (out of scope for the core).
pub trait KeyBackend {
    fn key_event(&mut self, key: &str, pressed: bool) -> Result<(), OutputError>;
}

/// Backend that only logs key events; used where no injection layer exists.
pub struct LogKeyBackend;

impl KeyBackend for LogKeyBackend {
    fn key_event(&mut self, key: &str, pressed: bool) -> Result<(), OutputError> {
        tracing::info!(
            "key '{}' {}",
            key,
            if pressed { "pressed" } else { "released" }
        );
        Ok(())
    }
}
