//! Output streams that compiler messages are written to. Messages either go
//! to the process' standard streams or are captured in memory, which is what
//! tests use to inspect what was logged.

use std::{
    io,
    sync::{Arc, Mutex},
};

/// Where compiler output should be written to.
#[derive(Debug, Clone)]
pub enum CompilerOutputStream {
    /// Write to the process `stdout`.
    Stdout,

    /// Write to the process `stderr`.
    Stderr,

    /// Collect everything into a shared in-memory buffer.
    Owned(Arc<Mutex<Vec<u8>>>),
}

impl CompilerOutputStream {
    /// Create a new in-memory [CompilerOutputStream].
    pub fn owned() -> Self {
        Self::Owned(Arc::new(Mutex::new(Vec::new())))
    }

    /// Get everything that has been written to an owned stream so far. Streams
    /// that write to the process streams have no captured contents.
    pub fn captured(&self) -> Option<String> {
        match self {
            Self::Owned(buffer) => {
                let buffer = buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                Some(String::from_utf8_lossy(&buffer).into_owned())
            }
            Self::Stdout | Self::Stderr => None,
        }
    }
}

impl io::Write for CompilerOutputStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Stdout => io::stdout().lock().write(buf),
            Self::Stderr => io::stderr().lock().write(buf),
            Self::Owned(buffer) => {
                let mut buffer = buffer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                buffer.extend_from_slice(buf);
                Ok(buf.len())
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Stdout => io::stdout().flush(),
            Self::Stderr => io::stderr().flush(),
            Self::Owned(_) => Ok(()),
        }
    }
}
