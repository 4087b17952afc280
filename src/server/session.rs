//! Session handler for one accepted controller connection.
//!
//! Reads raw buffers, decodes frames and drives the output sink until the
//! peer disconnects or the socket fails. Decode errors only drop the
//! offending read; transport errors end the session. Either way the
//! teardown releases both pedal keys and zeroes the steering axis, because
//! the sink outlives any single connection.

use crate::config::BridgeConfig;
use crate::mapping::{steering, Pedals};
use crate::output::{GamepadAxis, OutputSink};
use crate::protocol;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

/// Maximum bytes taken from the socket per read.
const READ_BUFFER_LEN: usize = 1024;

/// Fixed pause after each processed read, bounds CPU usage.
const READ_PAUSE: Duration = Duration::from_millis(10);

/// How a session ended. None of the variants is fatal; `Shutdown` tells
/// the supervisor to stop instead of accepting again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Peer closed the connection normally
    Closed,
    /// Transport-level read error
    SocketError,
    /// Shutdown signal arrived mid-session
    Shutdown,
}

/// One live connection: socket plus pass-through config and sink references.
pub struct Session<'a> {
    config: &'a BridgeConfig,
    sink: &'a mut dyn OutputSink,
    pedals: Pedals,
}

impl<'a> Session<'a> {
    pub fn new(config: &'a BridgeConfig, sink: &'a mut dyn OutputSink) -> Self {
        Self {
            config,
            sink,
            pedals: Pedals::new(),
        }
    }

    /// Serves the connection until disconnect, socket error or shutdown.
    ///
    /// Der Shutdown-Kanal wird mitten in der Session beobachtet, damit die
    /// Aufräum-Garantie (Tasten lösen) auch bei Unterbrechung greift.
    pub async fn run(
        mut self,
        mut stream: TcpStream,
        shutdown_rx: &mut oneshot::Receiver<()>,
    ) -> SessionEnd {
        let mut buf = [0u8; READ_BUFFER_LEN];

        let end = loop {
            tokio::select! {
                _ = &mut *shutdown_rx => {
                    info!("Shutdown signal received during session");
                    break SessionEnd::Shutdown;
                }

                read = stream.read(&mut buf) => match read {
                    Ok(0) => {
                        info!("Connection closed by client");
                        break SessionEnd::Closed;
                    }
                    Ok(n) => {
                        self.process(&buf[..n]);
                        tokio::time::sleep(READ_PAUSE).await;
                    }
                    Err(e) => {
                        error!("Socket error: {}", e);
                        break SessionEnd::SocketError;
                    }
                }
            }
        };

        self.teardown();
        end
    }

    /// Decodes one read buffer and applies it to both output channels.
    fn process(&mut self, data: &[u8]) {
        debug!("Raw received data: {:02x?}", data);

        match protocol::decode(data) {
            Ok(frame) => {
                self.pedals.apply(frame.command, &mut *self.sink);

                // Lenkung wird für jeden gültigen Frame angewendet, auch
                // ohne erkanntes Kommando.
                let value = steering::axis_value(frame.rotation_x, self.config);
                debug!(
                    "steering rotation_x={} -> axis {}",
                    frame.rotation_x, value
                );
                if let Err(e) = self.sink.set_axis(GamepadAxis::LeftStickX, value) {
                    warn!("Failed to set steering axis: {}", e);
                }
            }
            Err(e) => {
                warn!("Dropping read: {}", e);
            }
        }
    }

    /// Scoped cleanup: keine Taste bleibt gedrückt, Achse zurück auf 0.
    fn teardown(&mut self) {
        self.pedals.reset(&mut *self.sink);
        if let Err(e) = self.sink.set_axis(GamepadAxis::LeftStickX, 0) {
            warn!("Failed to zero steering axis: {}", e);
        }
    }
}
