//! Frontier and visited set
//!
//! The visited set, the per-URL state and the sending half of the work
//! queue live behind a single lock. Admission inserts into the visited set,
//! bumps the in-flight count and enqueues the URL in one step, and
//! completion decrements the count and closes the queue once nothing is in
//! flight. Workers admit children before completing their parent, so the
//! queue can only close when no work remains.

use crate::state::PageState;
use crate::{Result, SnapError};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Debug)]
struct Inner {
    states: HashMap<String, PageState>,
    in_flight: usize,
    sender: Option<UnboundedSender<String>>,
}

/// Shared crawl frontier
#[derive(Debug)]
pub struct Frontier {
    inner: Mutex<Inner>,
}

impl Frontier {
    /// Creates an empty frontier feeding the given queue
    pub fn new(sender: UnboundedSender<String>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                states: HashMap::new(),
                in_flight: 0,
                sender: Some(sender),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave the map half-updated
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Marks `url` visited and enqueues it
    ///
    /// # Returns
    ///
    /// * `true` - The URL was unseen and is now enqueued
    /// * `false` - The URL was already visited, or the queue is closed
    pub fn admit(&self, url: &str) -> bool {
        let mut inner = self.lock();
        if inner.states.contains_key(url) {
            return false;
        }

        let sent = match &inner.sender {
            Some(sender) => sender.send(url.to_string()).is_ok(),
            None => false,
        };
        if !sent {
            tracing::debug!("Queue closed, not admitting {}", url);
            return false;
        }

        inner.states.insert(url.to_string(), PageState::Enqueued);
        inner.in_flight += 1;
        true
    }

    /// Moves an enqueued URL to running
    pub fn start(&self, url: &str) -> Result<()> {
        let mut inner = self.lock();
        transition(&mut inner, url, PageState::Running)
    }

    /// Marks `url` done and releases its in-flight slot
    ///
    /// The slot is released even when the transition is invalid so the
    /// crawl still reaches its fixed point. When the last slot is released
    /// the queue is closed.
    pub fn complete(&self, url: &str) -> Result<()> {
        let mut inner = self.lock();
        let result = transition(&mut inner, url, PageState::Done);
        if result.is_err() {
            inner.states.insert(url.to_string(), PageState::Done);
        }

        inner.in_flight = inner.in_flight.saturating_sub(1);
        if inner.in_flight == 0 {
            inner.sender = None;
        }
        result
    }

    /// Closes the queue if nothing was ever admitted
    pub fn close_if_idle(&self) {
        let mut inner = self.lock();
        if inner.in_flight == 0 {
            inner.sender = None;
        }
    }

    /// Number of URLs admitted so far
    pub fn visited_count(&self) -> usize {
        self.lock().states.len()
    }

    /// Number of URLs enqueued or running
    pub fn remaining(&self) -> usize {
        self.lock().in_flight
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn state_of(&self, url: &str) -> PageState {
        self.lock().states.get(url).copied().unwrap_or_default()
    }

    /// Every admitted URL, sorted lexicographically
    pub fn visited_sorted(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.lock().states.keys().cloned().collect();
        urls.sort();
        urls
    }
}

fn transition(inner: &mut Inner, url: &str, to: PageState) -> Result<()> {
    let from = inner.states.get(url).copied().unwrap_or_default();
    if !from.can_transition_to(to) {
        return Err(SnapError::InvalidTransition {
            url: url.to_string(),
            from,
            to,
        });
    }
    inner.states.insert(url.to_string(), to);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[test]
    fn test_admit_is_at_most_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let frontier = Frontier::new(tx);

        assert!(frontier.admit("https://example.com/"));
        assert!(!frontier.admit("https://example.com/"));

        assert_eq!(rx.try_recv().unwrap(), "https://example.com/");
        assert!(rx.try_recv().is_err());
        assert_eq!(frontier.visited_count(), 1);
        assert_eq!(frontier.remaining(), 1);
        assert_eq!(frontier.state_of("https://example.com/"), PageState::Enqueued);
    }

    #[test]
    fn test_lifecycle_closes_queue_at_fixed_point() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let frontier = Frontier::new(tx);
        frontier.admit("https://example.com/");
        rx.try_recv().unwrap();

        frontier.start("https://example.com/").unwrap();
        assert_eq!(frontier.state_of("https://example.com/"), PageState::Running);

        // child registered before the parent completes
        assert!(frontier.admit("https://example.com/a"));
        frontier.complete("https://example.com/").unwrap();
        assert!(!frontier.is_empty());
        assert_eq!(rx.try_recv().unwrap(), "https://example.com/a");

        frontier.start("https://example.com/a").unwrap();
        frontier.complete("https://example.com/a").unwrap();
        assert!(frontier.is_empty());

        assert_eq!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        );
        assert!(!frontier.admit("https://example.com/late"));
        assert_eq!(
            frontier.visited_sorted(),
            vec!["https://example.com/", "https://example.com/a"]
        );
    }

    #[test]
    fn test_invalid_transition_still_releases_slot() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let frontier = Frontier::new(tx);
        frontier.admit("https://example.com/");

        let result = frontier.complete("https://example.com/");
        assert!(matches!(
            result,
            Err(SnapError::InvalidTransition {
                from: PageState::Enqueued,
                to: PageState::Done,
                ..
            })
        ));
        assert!(frontier.is_empty());
        assert_eq!(frontier.state_of("https://example.com/"), PageState::Done);
    }

    #[test]
    fn test_start_unknown_url_fails() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let frontier = Frontier::new(tx);
        assert!(frontier.start("https://example.com/").is_err());
        assert_eq!(frontier.state_of("https://example.com/"), PageState::Unseen);
    }

    #[test]
    fn test_close_if_idle() {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();
        let frontier = Frontier::new(tx);
        frontier.close_if_idle();
        assert_eq!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        );
    }
}
