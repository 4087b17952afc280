//! Attach collaborator: finds the running game process at startup.
//!
//! Invoked exactly once before the listener starts; a failure here is fatal
//! to the whole program. The lookup sits behind a trait so the core never
//! depends on a concrete process API.

use thiserror::Error;
use tracing::info;

/// Handle to the attached game process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessHandle {
    pub pid: u32,
    pub name: String,
}

#[derive(Debug, Error)]
pub enum AttachError {
    #[error("{0} not found. Make sure the game is running")]
    NotFound(String),
    #[error("process lookup not supported on this platform")]
    Unsupported,
    #[error("process lookup failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Seam for attaching to the target process.
pub trait ProcessAttach {
    fn attach(&self, process_name: &str) -> Result<ProcessHandle, AttachError>;
}

/// Attach implementation backed by the local process table.
#[derive(Debug, Default)]
pub struct ProcessTable;

impl ProcessAttach for ProcessTable {
    #[cfg(target_os = "linux")]
    fn attach(&self, process_name: &str) -> Result<ProcessHandle, AttachError> {
        let wanted = process_name.to_ascii_lowercase();
        for entry in std::fs::read_dir("/proc")? {
            let entry = entry?;
            let pid: u32 = match entry.file_name().to_string_lossy().parse() {
                Ok(pid) => pid,
                Err(_) => continue,
            };
            let comm = match std::fs::read_to_string(entry.path().join("comm")) {
                Ok(comm) => comm,
                Err(_) => continue,
            };
            let name = comm.trim();
            if name.to_ascii_lowercase() == wanted
                || wanted.starts_with(&name.to_ascii_lowercase())
            {
                info!("Attached to process {} (pid {})", name, pid);
                return Ok(ProcessHandle {
                    pid,
                    name: process_name.to_string(),
                });
            }
        }
        Err(AttachError::NotFound(process_name.to_string()))
    }

    #[cfg(not(target_os = "linux"))]
    fn attach(&self, _process_name: &str) -> Result<ProcessHandle, AttachError> {
        Err(AttachError::Unsupported)
    }
}
