//! Challenge page detection
//!
//! After a page loads its visible text is checked for anti-bot challenge
//! markers. A positive result triggers the escalating retry in
//! [`PageProcessor`](crate::crawler::PageProcessor).

use crate::config::DetectionSettings;

/// Decides whether a loaded page is a bot-challenge page
pub trait BlockDetector: Send + Sync {
    /// Returns true if `text` looks like a challenge rather than content
    fn is_blocked(&self, text: &str) -> bool;
}

impl<F> BlockDetector for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_blocked(&self, text: &str) -> bool {
        self(text)
    }
}

/// Matches configured phrases case-insensitively and flags near-empty pages
#[derive(Debug, Clone)]
pub struct SignatureDetector {
    signatures: Vec<String>,
    min_content_length: usize,
}

impl SignatureDetector {
    pub fn new<I, S>(signatures: I, min_content_length: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            signatures: signatures
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .collect(),
            min_content_length,
        }
    }

    pub fn from_settings(settings: &DetectionSettings) -> Self {
        Self::new(&settings.signatures, settings.min_content_length)
    }
}

impl BlockDetector for SignatureDetector {
    fn is_blocked(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.chars().count() < self.min_content_length {
            return true;
        }

        let lower = trimmed.to_lowercase();
        self.signatures.iter().any(|sig| lower.contains(sig.as_str()))
    }
}

/// Detector that accepts every page
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverBlocked;

impl BlockDetector for NeverBlocked {
    fn is_blocked(&self, _text: &str) -> bool {
        false
    }
}
