use std::fmt;

/// Lifecycle state of the crawl controller
///
/// A controller starts `Idle`, moves to `Running` when `crawl` starts and to
/// `Completed` once the frontier is exhausted or the page budget is spent.
/// A new `initialize` call brings a completed controller back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// No run in progress
    Idle,

    /// Frontier loop is executing
    Running,

    /// Last run finished (frontier empty or budget exhausted)
    Completed,
}

impl CrawlState {
    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Idle)
                | (Self::Idle, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Completed, Self::Idle)
        )
    }

    /// Converts the state to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
        }
    }

    /// Parses a state from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Self::Idle),
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_transitions() {
        assert!(CrawlState::Idle.can_transition_to(CrawlState::Running));
        assert!(CrawlState::Running.can_transition_to(CrawlState::Completed));
        assert!(CrawlState::Completed.can_transition_to(CrawlState::Idle));
        assert!(CrawlState::Idle.can_transition_to(CrawlState::Idle));
    }

    #[test]
    fn test_illegal_transitions() {
        assert!(!CrawlState::Idle.can_transition_to(CrawlState::Completed));
        assert!(!CrawlState::Running.can_transition_to(CrawlState::Idle));
        assert!(!CrawlState::Running.can_transition_to(CrawlState::Running));
        assert!(!CrawlState::Completed.can_transition_to(CrawlState::Running));
    }

    #[test]
    fn test_roundtrip_db_string() {
        for state in [CrawlState::Idle, CrawlState::Running, CrawlState::Completed] {
            assert_eq!(CrawlState::from_db_string(state.to_db_string()), Some(state));
        }
        assert_eq!(CrawlState::from_db_string("invalid"), None);
    }
}
