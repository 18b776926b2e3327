//! Page state definitions for tracking crawl progress
//!
//! Every URL moves through `Unseen -> Enqueued -> Running -> Done` exactly
//! once per crawl.
use std::fmt;

/// Represents the current state of a page in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageState {
    /// Page has not been discovered yet
    #[default]
    Unseen,

    /// Page is marked visited and waiting for a worker
    Enqueued,

    /// A worker is rendering the page
    Running,

    /// Rendering finished, succeeded or not
    Done,
}

impl PageState {
    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Unseen, Self::Enqueued)
                | (Self::Enqueued, Self::Running)
                | (Self::Running, Self::Done)
        )
    }

    /// Short lowercase name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unseen => "unseen",
            Self::Enqueued => "enqueued",
            Self::Running => "running",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PageState; 4] = [
        PageState::Unseen,
        PageState::Enqueued,
        PageState::Running,
        PageState::Done,
    ];

    #[test]
    fn test_forward_transitions() {
        assert!(PageState::Unseen.can_transition_to(PageState::Enqueued));
        assert!(PageState::Enqueued.can_transition_to(PageState::Running));
        assert!(PageState::Running.can_transition_to(PageState::Done));
    }

    #[test]
    fn test_no_skipping_or_going_back() {
        assert!(!PageState::Unseen.can_transition_to(PageState::Running));
        assert!(!PageState::Unseen.can_transition_to(PageState::Done));
        assert!(!PageState::Enqueued.can_transition_to(PageState::Done));
        assert!(!PageState::Done.can_transition_to(PageState::Enqueued));
        assert!(!PageState::Running.can_transition_to(PageState::Enqueued));
    }

    #[test]
    fn test_no_self_transitions() {
        for state in ALL {
            assert!(!state.can_transition_to(state), "{} -> {}", state, state);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(PageState::Enqueued.to_string(), "enqueued");
        assert_eq!(format!("{}", PageState::Done), "done");
    }
}
