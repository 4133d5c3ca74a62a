use serde::Serialize;

/// Aggregated view of session progress, useful for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    #[must_use]
    pub(crate) fn new(total: usize, answered: usize) -> Self {
        let remaining = total.saturating_sub(answered);
        Self {
            total,
            answered,
            remaining,
            is_complete: remaining == 0,
        }
    }

    /// One-based position of the question on screen, capped at `total`.
    #[must_use]
    pub fn position(&self) -> usize {
        (self.answered + 1).min(self.total)
    }
}
