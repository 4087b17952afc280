//! TCP-Seite der Bridge: Listener-Supervisor und Session-Handler.
//!
//! Es existiert ein einziger logischer Kontrollfluss: ein lauschender
//! Socket, höchstens eine Session zur Zeit, strikt sequentielles
//! accept → serve → close. Nur die aktive Session schreibt auf den
//! Output Sink.

pub mod session;
pub mod supervisor;

pub use session::{Session, SessionEnd};
pub use supervisor::{BridgeHandle, BridgeServer, ServerState};

use thiserror::Error;

/// Fehlertypen der Server-Schicht.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Bind-Fehler sind fatal; ohne erreichbaren Socket kein Betrieb
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },
    #[error("listener not available: {0}")]
    Listener(String),
    #[error("server task panicked: {0}")]
    TaskPanic(String),
}
