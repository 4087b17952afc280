//! Listener supervisor with statum state machine for the accept loop.
//!
//! # State Machine
//!
//! ```text
//! Initializing ──bind──► Listening ──retries exhausted / shutdown──► Stopped
//! ```
//!
//! The supervisor owns the listening socket and serves connections strictly
//! one at a time: no new accept happens while a session is live. Accept
//! failures consume a bounded retry budget with a fixed back-off delay;
//! bind failures are fatal and never retried. When the machine stops for
//! any reason the socket is closed and both pedal keys are released.

use crate::config::BridgeConfig;
use crate::mapping::pedals;
use crate::output::OutputSink;
use crate::server::{Session, SessionEnd, ServerError};
use statum::{machine, state};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// States for the supervisor lifecycle using statum
#[state]
#[derive(Debug, Clone)]
pub enum ServerState {
    Initializing, // Created, socket not bound yet
    Listening,    // Bound and accepting connections
    Stopped,      // Terminal; socket closed, keys released
}

/// Bounded retry accounting for accept-level failures.
///
/// The counter is monotonic for the listener's lifetime; a successful
/// accept does not refill the budget.
#[derive(Debug)]
pub(crate) struct RetryBudget {
    attempts: u32,
    max_attempts: u32,
    delay: Duration,
}

impl RetryBudget {
    pub(crate) fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            delay,
        }
    }

    /// Registers one failed attempt. Returns the back-off delay to wait
    /// before retrying, or `None` once the budget is exhausted.
    pub(crate) fn next_delay(&mut self) -> Option<Duration> {
        self.attempts += 1;
        if self.attempts < self.max_attempts {
            Some(self.delay)
        } else {
            None
        }
    }

    pub(crate) fn attempts(&self) -> u32 {
        self.attempts
    }
}

/// Listener supervisor with compile-time state safety via statum.
#[machine]
pub struct BridgeServer<S: ServerState> {
    config: Arc<BridgeConfig>,
    sink: Box<dyn OutputSink>,
    listener: Option<TcpListener>,
    accept_attempts: u32,
}

impl BridgeServer<Initializing> {
    pub fn create(config: Arc<BridgeConfig>, sink: Box<dyn OutputSink>) -> Self {
        info!("Initializing bridge server for {}", config.listen_addr());
        Self::new(config, sink, None, 0)
    }

    /// Binds the listening socket and transitions to Listening.
    ///
    /// Address reuse is enabled by the runtime's listener defaults. A bind
    /// failure is fatal: the process cannot proceed without a reachable
    /// listening socket, so no retry is defined here.
    pub async fn bind(mut self) -> Result<BridgeServer<Listening>, ServerError> {
        let addr = self.config.listen_addr();
        match TcpListener::bind(&addr).await {
            Ok(listener) => {
                info!("Socket bound to {} and listening", addr);
                self.listener = Some(listener);
                Ok(self.transition())
            }
            Err(e) => {
                error!("Error creating/binding socket: {}", e);
                Err(ServerError::Bind { addr, source: e })
            }
        }
    }
}

impl BridgeServer<Listening> {
    /// Address the socket actually bound to (relevant with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        let listener = self
            .listener
            .as_ref()
            .ok_or_else(|| ServerError::Listener("socket already taken".to_string()))?;
        listener
            .local_addr()
            .map_err(|e| ServerError::Listener(e.to_string()))
    }

    /// Accept loop: serves one session at a time until the retry budget is
    /// exhausted or a shutdown signal arrives.
    pub async fn run_until_shutdown(
        mut self,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) -> BridgeServer<Stopped> {
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => {
                error!("Listener missing, stopping supervisor");
                return self.stop();
            }
        };

        let mut budget = RetryBudget::new(
            self.config.max_reconnect_attempts,
            self.config.reconnect_delay(),
        );

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("Shutdown signal received, stopping supervisor");
                    break;
                }

                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        info!("Connected by {}", addr);
                        let session = Session::new(&self.config, self.sink.as_mut());
                        match session.run(stream, &mut shutdown_rx).await {
                            SessionEnd::Closed => debug!("Session ended normally"),
                            SessionEnd::SocketError => {
                                warn!("Session ended after socket error")
                            }
                            SessionEnd::Shutdown => break,
                        }
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        match budget.next_delay() {
                            Some(delay) => {
                                info!(
                                    "Reconnecting attempt {}/{}",
                                    budget.attempts() + 1,
                                    self.config.max_reconnect_attempts
                                );
                                tokio::time::sleep(delay).await;
                            }
                            None => {
                                error!("Max reconnection attempts reached");
                                break;
                            }
                        }
                    }
                }
            }
        }

        self.accept_attempts = budget.attempts();
        // Socket schließt mit dem Drop des Listeners
        drop(listener);
        self.stop()
    }

    fn stop(mut self) -> BridgeServer<Stopped> {
        pedals::release_all(self.sink.as_mut());
        info!("Supervisor stopped, all keys released");
        self.transition()
    }
}

impl BridgeServer<Stopped> {
    /// Accept failures recorded before the supervisor stopped.
    pub fn accept_attempts(&self) -> u32 {
        self.accept_attempts
    }
}

/// Handle for running the supervisor in a tokio task.
///
/// Mirrors the accept loop's lifecycle into spawn/shutdown calls so `main`
/// can wait on either a signal or the supervisor stopping on its own.
pub struct BridgeHandle {
    task: Option<JoinHandle<u32>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl BridgeHandle {
    /// Binds the socket and spawns the accept loop.
    pub async fn start(
        config: Arc<BridgeConfig>,
        sink: Box<dyn OutputSink>,
    ) -> Result<Self, ServerError> {
        let server = BridgeServer::create(config, sink).bind().await?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let stopped = server.run_until_shutdown(shutdown_rx).await;
            stopped.accept_attempts()
        });

        Ok(Self {
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
        })
    }

    /// Waits until the supervisor stops on its own (retry budget exhausted).
    pub async fn join(&mut self) {
        if let Some(task) = self.task.as_mut() {
            let _ = task.await;
            self.task = None;
        }
    }

    /// Signals shutdown and waits for the task to finish.
    pub async fn shutdown(&mut self) -> Result<(), ServerError> {
        debug!("Sending shutdown signal to bridge server");
        if let Some(tx) = self.shutdown_tx.take() {
            if tx.send(()).is_err() {
                warn!("Supervisor task already terminated");
            }
        }

        if let Some(task) = self.task.take() {
            match task.await {
                Ok(attempts) => {
                    debug!("Supervisor task completed ({} accept failures)", attempts);
                    Ok(())
                }
                Err(e) => {
                    error!("Supervisor task panicked: {}", e);
                    Err(ServerError::TaskPanic(e.to_string()))
                }
            }
        } else {
            debug!("Supervisor already shut down");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_allows_exactly_max_attempts() {
        // max=3: Versuch 1 und 2 liefern eine Wartezeit, Versuch 3 stoppt
        let mut budget = RetryBudget::new(3, Duration::from_secs(5));
        assert_eq!(budget.next_delay(), Some(Duration::from_secs(5)));
        assert_eq!(budget.next_delay(), Some(Duration::from_secs(5)));
        assert_eq!(budget.next_delay(), None);
        assert_eq!(budget.attempts(), 3);
    }

    #[test]
    fn budget_of_one_stops_after_first_failure() {
        let mut budget = RetryBudget::new(1, Duration::from_secs(1));
        assert_eq!(budget.next_delay(), None);
        assert_eq!(budget.attempts(), 1);
    }

    #[test]
    fn budget_never_refills() {
        let mut budget = RetryBudget::new(2, Duration::ZERO);
        assert_eq!(budget.next_delay(), Some(Duration::ZERO));
        assert_eq!(budget.next_delay(), None);
        // Weitere Fehlversuche bleiben erschöpft
        assert_eq!(budget.next_delay(), None);
    }

    #[tokio::test]
    async fn bind_failure_is_fatal() {
        use crate::output::testing::RecordingSink;

        let config = Arc::new(BridgeConfig {
            // TEST-NET-Adresse, lokal nicht bindbar
            host: "192.0.2.1".to_string(),
            port: 65433,
            ..BridgeConfig::default()
        });
        let result = BridgeServer::create(config, Box::new(RecordingSink::new()))
            .bind()
            .await;
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }
}
