//! Ausgabe-Seite der Bridge: Pedal-Tasten und virtueller Gamepad-Zustand.
//!
//! Die OS-nahen Injektionsschichten (Tastatur-Events, Gamepad-Treiber,
//! Prozess-Attach) sind bewusst hinter schmalen Traits gekapselt. Die Bridge
//! besitzt genau eine `BridgeSink`-Instanz; nur die gerade aktive Session
//! schreibt darauf (single-writer).

pub mod gamepad;
pub mod process;
pub mod sink;

pub use gamepad::{GamepadDevice, GamepadState, LogDevice, VirtualGamepad};
pub use process::{AttachError, ProcessAttach, ProcessHandle, ProcessTable};
pub use sink::{
    AnalogSurface, GamepadAxis, KeyBackend, KeySurface, LogKeyBackend, OutputError, OutputSink,
    PedalKey,
};

use tracing::debug;

/// Process-wide output sink combining both collaborator surfaces.
///
/// Key events go to a [`KeyBackend`]; steering goes into the held
/// [`VirtualGamepad`] state and is published from there.
pub struct BridgeSink {
    keys: Box<dyn KeyBackend + Send>,
    pad: VirtualGamepad,
}

impl BridgeSink {
    pub fn new(keys: Box<dyn KeyBackend + Send>, device: Box<dyn GamepadDevice + Send>) -> Self {
        Self {
            keys,
            pad: VirtualGamepad::new(device),
        }
    }

    /// Sink mit reinen Logging-Backends, für Plattformen ohne Treiberanbindung.
    pub fn with_log_backends() -> Self {
        Self::new(Box::new(LogKeyBackend), Box::new(LogDevice))
    }
}

impl KeySurface for BridgeSink {
    fn press_key(&mut self, key: PedalKey) -> Result<(), OutputError> {
        debug!("press key '{}'", key.key_name());
        self.keys.key_event(key.key_name(), true)
    }

    fn release_key(&mut self, key: PedalKey) -> Result<(), OutputError> {
        debug!("release key '{}'", key.key_name());
        self.keys.key_event(key.key_name(), false)
    }
}

impl AnalogSurface for BridgeSink {
    fn set_axis(&mut self, axis: GamepadAxis, value: i16) -> Result<(), OutputError> {
        self.pad.set_axis(axis, value)
    }
}
