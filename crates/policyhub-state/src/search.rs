//! Debounced search input.

use std::time::Duration;

use tokio::time::Instant;

/// Quiet period before typed search text is committed.
pub const DEBOUNCE_DELAY: Duration = Duration::from_millis(300);

/// Holds the latest value until no new value arrived for the delay.
///
/// Each [`push`](Self::push) restarts the timer. The value becomes available
/// from [`poll_ready`](Self::poll_ready) once the delay has passed, or can be
/// awaited with [`settled`](Self::settled).
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replaces the pending value and restarts the timer.
    pub fn push(&mut self, value: T) {
        self.pending = Some((value, Instant::now()));
    }

    /// Drops the pending value.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes ready.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at + self.delay)
    }

    /// Takes the pending value if the delay has passed.
    pub fn poll_ready(&mut self) -> Option<T> {
        let deadline = self.deadline()?;
        if Instant::now() >= deadline {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    /// Waits for the pending value to settle. Returns `None` when nothing is pending.
    pub async fn settled(&mut self) -> Option<T> {
        let deadline = self.deadline()?;
        tokio::time::sleep_until(deadline).await;
        self.pending.take().map(|(value, _)| value)
    }
}

/// Search box state: the text being typed and the value committed to the filters.
///
/// Typing updates [`text`](Self::text) immediately; the parent only sees the
/// text once it has been stable for the delay. An external change (for
/// example navigating to a different location) resyncs both values at once
/// and cancels any pending commit.
#[derive(Debug, Clone)]
pub struct SearchInput {
    text: String,
    value: String,
    debouncer: Debouncer<String>,
}

impl SearchInput {
    pub fn new(value: impl Into<String>) -> Self {
        Self::with_delay(value, DEBOUNCE_DELAY)
    }

    pub fn with_delay(value: impl Into<String>, delay: Duration) -> Self {
        let value = value.into();
        Self {
            text: value.clone(),
            value,
            debouncer: Debouncer::new(delay),
        }
    }

    /// Text as typed.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Last committed value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Records typed text and restarts the commit timer.
    pub fn input(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.debouncer.push(self.text.clone());
    }

    /// Adopts a value that changed outside the input. Unchanged values are ignored.
    pub fn sync_external(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value != self.value {
            self.debouncer.cancel();
            self.text = value.clone();
            self.value = value;
        }
    }

    /// Clears both values and commits `""` immediately.
    pub fn clear(&mut self) -> String {
        self.debouncer.cancel();
        self.text.clear();
        self.value.clear();
        String::new()
    }

    /// When the pending commit is due.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Commits the typed text if it settled and differs from the committed value.
    pub fn poll(&mut self) -> Option<String> {
        let settled = self.debouncer.poll_ready()?;
        self.commit(settled)
    }

    /// Waits for the typed text to settle and commits it.
    pub async fn next_commit(&mut self) -> Option<String> {
        let settled = self.debouncer.settled().await?;
        self.commit(settled)
    }

    fn commit(&mut self, settled: String) -> Option<String> {
        if settled == self.value {
            return None;
        }
        tracing::debug!(search = %settled, "search committed");
        self.value = settled.clone();
        Some(settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_restarts_on_push() {
        let mut debouncer = Debouncer::new(Duration::from_millis(100));
        debouncer.push(1);
        tokio::time::advance(Duration::from_millis(60)).await;
        debouncer.push(2);
        tokio::time::advance(Duration::from_millis(60)).await;
        assert_eq!(debouncer.poll_ready(), None);
        tokio::time::advance(Duration::from_millis(40)).await;
        assert_eq!(debouncer.poll_ready(), Some(2));
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settled_waits_for_deadline() {
        let mut debouncer = Debouncer::new(DEBOUNCE_DELAY);
        debouncer.push("x");
        let start = Instant::now();
        assert_eq!(debouncer.settled().await, Some("x"));
        assert!(start.elapsed() >= DEBOUNCE_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_change_cancels_pending() {
        let mut input = SearchInput::new("");
        input.input("jw");
        input.sync_external("cors");
        tokio::time::advance(DEBOUNCE_DELAY).await;
        assert_eq!(input.poll(), None);
        assert_eq!(input.text(), "cors");
        assert_eq!(input.value(), "cors");
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_commits_immediately() {
        let mut input = SearchInput::new("jwt");
        input.input("jwt a");
        assert_eq!(input.clear(), "");
        assert_eq!(input.value(), "");
        tokio::time::advance(DEBOUNCE_DELAY).await;
        assert_eq!(input.poll(), None);
    }
}
