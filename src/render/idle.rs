//! Network activity bookkeeping for one browser page
//!
//! A page counts as loaded once no more than `max_in_flight` requests have
//! been outstanding for a full settling window.

use std::collections::HashSet;
use std::time::{Duration, Instant};

/// Requests observed on a page plus the in-flight set used for idle detection
#[derive(Debug)]
pub struct NetworkLog {
    requests: Vec<String>,
    in_flight: HashSet<String>,
    max_in_flight: usize,
    idle_since: Option<Instant>,
}

impl NetworkLog {
    /// Creates an empty log that treats `max_in_flight` open requests as idle
    pub fn new(max_in_flight: usize) -> Self {
        Self {
            requests: Vec::new(),
            in_flight: HashSet::new(),
            max_in_flight,
            idle_since: Some(Instant::now()),
        }
    }

    /// Clears everything ahead of a new navigation
    pub fn reset(&mut self, now: Instant) {
        self.requests.clear();
        self.in_flight.clear();
        self.idle_since = Some(now);
    }

    /// Records a request leaving the page
    ///
    /// Redirect hops reuse their request id, so each hop's URL is recorded
    /// while the request still counts once toward the in-flight total.
    pub fn request_started(&mut self, request_id: &str, url: &str) {
        self.requests.push(url.to_string());
        self.in_flight.insert(request_id.to_string());
        if self.in_flight.len() > self.max_in_flight {
            self.idle_since = None;
        }
    }

    /// Records a request finishing, successfully or not
    pub fn request_finished(&mut self, request_id: &str, now: Instant) {
        self.in_flight.remove(request_id);
        if self.idle_since.is_none() && self.in_flight.len() <= self.max_in_flight {
            self.idle_since = Some(now);
        }
    }

    /// Returns true if the page has been idle for at least `window`
    pub fn is_settled(&self, window: Duration, now: Instant) -> bool {
        self.idle_since
            .is_some_and(|since| now.saturating_duration_since(since) >= window)
    }

    /// Number of requests currently outstanding
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Hands over the request URLs recorded since the last reset
    pub fn take_requests(&mut self) -> Vec<String> {
        std::mem::take(&mut self.requests)
    }
}
