/// Supervisor phase.
///
/// State transitions:
/// ```text
/// searching → streaming → shutdown
///     ↑           │
///     └───────────┘  (recoverable stream failure)
/// ```
/// `Shutdown` is terminal and only entered on an external cancellation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Searching,
    Streaming { device_index: usize },
    Shutdown,
}

impl SessionState {
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Shutdown)
    }

    /// The device index bound while streaming.
    pub fn device_index(&self) -> Option<usize> {
        match self {
            Self::Streaming { device_index } => Some(*device_index),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Searching => "searching",
            Self::Streaming { .. } => "streaming",
            Self::Shutdown => "shutdown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_carries_device_index() {
        let state = SessionState::Streaming { device_index: 3 };
        assert!(state.is_streaming());
        assert_eq!(state.device_index(), Some(3));
        assert_eq!(SessionState::Searching.device_index(), None);
    }

    #[test]
    fn only_shutdown_is_terminal() {
        assert!(!SessionState::Searching.is_terminal());
        assert!(!SessionState::Streaming { device_index: 0 }.is_terminal());
        assert!(SessionState::Shutdown.is_terminal());
    }
}
