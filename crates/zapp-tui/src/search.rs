//! Search controller — debounce, suppression, and stale-result stamping.
//!
//! The controller never performs I/O itself.  It tracks the raw query, the
//! debounced copy, and a per-resolution sequence number; the event loop asks
//! it what to do when the debounce deadline fires and feeds completed
//! resolutions back through `accepts`/`finish`.

use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

/// What to do once a debounce deadline fired.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchPlan {
    /// A list switch is in flight — the value is recorded, nothing issued.
    Suppressed,
    /// Query empty or below the minimum length: reload the unfiltered list.
    FetchAll { seq: u64 },
    /// Issue a backend search.
    Query { seq: u64, query: String },
}

pub struct SearchController {
    raw: String,
    debounced: String,
    deadline: Option<Instant>,
    /// True while a backend search call is outstanding.
    pub is_searching: bool,
    seq: u64,
    window: Duration,
    min_chars: usize,
}

impl SearchController {
    pub fn new(window: Duration, min_chars: usize) -> Self {
        Self {
            raw: String::new(),
            debounced: String::new(),
            deadline: None,
            is_searching: false,
            seq: 0,
            window,
            min_chars,
        }
    }

    pub fn query(&self) -> &str {
        &self.raw
    }

    pub fn debounced(&self) -> &str {
        &self.debounced
    }

    /// Record an edit and (re)start the debounce window.  Only the most
    /// recently started deadline may fire.
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query == self.raw {
            return;
        }
        self.raw = query;
        self.deadline = Some(Instant::now() + self.window);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// The debounce deadline fired: latch the debounced copy and decide.
    /// While suppressed the value is still latched but nothing is issued.
    pub fn fire(&mut self, suppressed: bool) -> SearchPlan {
        self.deadline = None;
        self.debounced = self.raw.clone();
        if suppressed {
            debug!("search inert during list switch: {:?}", self.debounced);
            return SearchPlan::Suppressed;
        }
        self.plan()
    }

    /// Re-evaluate the latched query after a list switch commits.  Only a
    /// real search is worth re-issuing — the switch itself just loaded the
    /// unfiltered list.
    pub fn reevaluate(&mut self) -> Option<SearchPlan> {
        if self.debounced.chars().count() >= self.min_chars {
            Some(self.plan())
        } else {
            None
        }
    }

    fn plan(&mut self) -> SearchPlan {
        self.seq += 1;
        if self.debounced.is_empty() || self.debounced.chars().count() < self.min_chars {
            SearchPlan::FetchAll { seq: self.seq }
        } else {
            self.is_searching = true;
            SearchPlan::Query {
                seq: self.seq,
                query: self.debounced.clone(),
            }
        }
    }

    /// True when a finished resolution is still the latest one issued.
    pub fn accepts(&self, seq: u64) -> bool {
        seq == self.seq
    }

    /// Mark the resolution finished (success or failure).
    pub fn finish(&mut self, seq: u64) {
        if self.accepts(seq) {
            self.is_searching = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> SearchController {
        SearchController::new(Duration::from_millis(400), 3)
    }

    #[test]
    fn typing_restarts_the_deadline_and_fires_once_with_final_value() {
        let mut s = controller();
        s.set_query("n");
        let first = s.deadline().unwrap();
        s.set_query("ne");
        s.set_query("news");
        let last = s.deadline().unwrap();
        assert!(last >= first);

        let plan = s.fire(false);
        assert_eq!(
            plan,
            SearchPlan::Query {
                seq: 1,
                query: "news".into()
            }
        );
        // One fire consumed the deadline; nothing is pending afterwards.
        assert!(s.deadline().is_none());
        assert!(s.is_searching);
    }

    #[test]
    fn unchanged_query_does_not_rearm() {
        let mut s = controller();
        s.set_query("news");
        s.fire(false);
        s.set_query("news");
        assert!(s.deadline().is_none());
    }

    #[test]
    fn short_and_empty_queries_fetch_unfiltered() {
        let mut s = controller();
        s.set_query("ab");
        assert_eq!(s.fire(false), SearchPlan::FetchAll { seq: 1 });
        assert!(!s.is_searching);

        s.set_query("");
        assert_eq!(s.fire(false), SearchPlan::FetchAll { seq: 2 });
    }

    #[test]
    fn suppressed_fire_latches_but_issues_nothing() {
        let mut s = controller();
        s.set_query("sports");
        assert_eq!(s.fire(true), SearchPlan::Suppressed);
        assert_eq!(s.debounced(), "sports");
        assert!(!s.is_searching);

        // After the switch commits, the latched query is re-issued.
        let plan = s.reevaluate().unwrap();
        assert_eq!(
            plan,
            SearchPlan::Query {
                seq: 1,
                query: "sports".into()
            }
        );
    }

    #[test]
    fn reevaluate_skips_short_queries() {
        let mut s = controller();
        s.set_query("ab");
        s.fire(true);
        assert_eq!(s.reevaluate(), None);
    }

    #[test]
    fn stale_sequence_numbers_are_rejected() {
        let mut s = controller();
        s.set_query("first query");
        let first = match s.fire(false) {
            SearchPlan::Query { seq, .. } => seq,
            other => panic!("unexpected plan {other:?}"),
        };
        s.set_query("second query");
        let second = match s.fire(false) {
            SearchPlan::Query { seq, .. } => seq,
            other => panic!("unexpected plan {other:?}"),
        };

        assert!(!s.accepts(first));
        assert!(s.accepts(second));

        // A stale completion must not clear the in-flight flag.
        s.finish(first);
        assert!(s.is_searching);
        s.finish(second);
        assert!(!s.is_searching);
    }
}
