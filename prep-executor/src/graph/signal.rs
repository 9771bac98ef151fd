//! Out-of-band control values.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Control value propagated depth-first through the graph, independent of
/// row flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    /// No more rows will come; sinks flush their output.
    EndOfStream,
    /// Stop accepting rows but still flush what was received.
    Stop,
    /// Abort; drop buffered rows and pending output.
    Cancel,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfStream => write!(f, "END_OF_STREAM"),
            Self::Stop => write!(f, "STOP"),
            Self::Cancel => write!(f, "CANCEL"),
        }
    }
}

/// Shared flag raised by a node that wants the feeding loop to stop early.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    /// Create a lowered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the token.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether the token was raised.
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_shared_between_clones() {
        let token = StopToken::new();
        let other = token.clone();
        assert!(!other.is_stopped());
        token.stop();
        assert!(other.is_stopped());
    }

    #[test]
    fn signal_display() {
        assert_eq!(Signal::EndOfStream.to_string(), "END_OF_STREAM");
        assert_eq!(Signal::Cancel.to_string(), "CANCEL");
    }
}
