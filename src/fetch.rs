//! Loading/data/error state for an async load
//!
//! Each load takes a ticket. Starting a new load invalidates older tickets,
//! so a slow response can never overwrite the result of a newer one.

use std::future::Future;

/// Handle for one started load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "pass the ticket to FetchState::complete"]
pub struct FetchTicket(u64);

/// State of the most recent load
#[derive(Debug)]
pub struct FetchState<T, E> {
    data: Option<T>,
    error: Option<E>,
    loading: bool,
    generation: u64,
}

impl<T, E> Default for FetchState<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> FetchState<T, E> {
    pub fn new() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
            generation: 0,
        }
    }

    /// Start a load: sets `loading`, clears the error, keeps old data
    pub fn begin(&mut self) -> FetchTicket {
        self.generation = self.generation.wrapping_add(1);
        self.loading = true;
        self.error = None;
        FetchTicket(self.generation)
    }

    /// Record the outcome of the load behind `ticket`.
    ///
    /// Returns `false` and changes nothing if a newer load has started.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<T, E>) -> bool {
        if ticket.0 != self.generation {
            log::debug!(
                "Dropping stale load result ({} superseded by {})",
                ticket.0,
                self.generation
            );
            return false;
        }

        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(error) => {
                self.error = Some(error);
                self.data = None;
            }
        }
        self.loading = false;
        true
    }

    /// Run `load` to completion and record its outcome
    pub async fn load<F>(&mut self, load: F) -> bool
    where
        F: Future<Output = Result<T, E>>,
    {
        let ticket = self.begin();
        let result = load.await;
        self.complete(ticket, result)
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RetryPolicy;
    use std::cell::Cell;

    #[test]
    fn test_initial_state() {
        let state: FetchState<u32, String> = FetchState::new();
        assert!(state.data().is_none());
        assert!(state.error().is_none());
        assert!(!state.is_loading());
    }

    #[test]
    fn test_success_then_failure() {
        let mut state: FetchState<u32, &str> = FetchState::default();

        let ticket = state.begin();
        assert!(state.is_loading());
        assert!(state.complete(ticket, Ok(1)));
        assert_eq!(state.data(), Some(&1));
        assert!(!state.is_loading());

        // Refetch keeps old data while loading
        let ticket = state.begin();
        assert_eq!(state.data(), Some(&1));
        assert!(state.complete(ticket, Err("offline")));
        assert_eq!(state.data(), None);
        assert_eq!(state.error(), Some(&"offline"));

        // The next begin clears the error
        let _ticket = state.begin();
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_stale_result_ignored() {
        let mut state: FetchState<&str, ()> = FetchState::new();
        let first = state.begin();
        let second = state.begin();

        assert!(state.complete(second, Ok("new")));
        assert!(!state.complete(first, Ok("old")));
        assert_eq!(state.data(), Some(&"new"));
        assert!(!state.is_loading());
    }

    #[test]
    fn test_stale_completion_keeps_loading() {
        let mut state: FetchState<u8, ()> = FetchState::new();
        let first = state.begin();
        let _second = state.begin();
        assert!(!state.complete(first, Ok(1)));
        assert!(state.is_loading());
        assert!(state.data().is_none());
    }

    #[tokio::test]
    async fn test_load_with_retry() {
        let calls = Cell::new(0);
        let policy = RetryPolicy::try_new(3, 0).unwrap();
        let mut state = FetchState::new();

        let applied = state
            .load(policy.run(|| {
                let n = calls.get() + 1;
                calls.set(n);
                async move { if n < 2 { Err("flaky") } else { Ok(n * 10) } }
            }))
            .await;

        assert!(applied);
        assert_eq!(state.data(), Some(&20));
        assert_eq!(calls.get(), 2);
    }
}
