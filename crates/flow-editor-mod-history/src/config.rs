/// Maximum number of snapshots kept on the undo stack.
const DEFAULT_MAX_HISTORY_DEPTH: usize = 100;

/// Configuration for the history system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    /// Max snapshots on the undo stack. Oldest entries are dropped first.
    /// Values below 1 are treated as 1.
    pub max_history_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_depth: DEFAULT_MAX_HISTORY_DEPTH,
        }
    }
}

impl HistoryConfig {
    pub fn with_depth(max_history_depth: usize) -> Self {
        Self { max_history_depth }
    }

    /// The depth actually enforced by the store.
    pub(crate) fn effective_depth(&self) -> usize {
        self.max_history_depth.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HistoryConfig::default();
        assert_eq!(config.max_history_depth, 100);
    }

    #[test]
    fn test_zero_depth_is_clamped() {
        assert_eq!(HistoryConfig::with_depth(0).effective_depth(), 1);
        assert_eq!(HistoryConfig::with_depth(7).effective_depth(), 7);
    }
}
