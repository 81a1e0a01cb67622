//! Frontier and visited-set management for one crawl session
//!
//! The frontier is a plain FIFO queue. A URL is only queued once at a time
//! and never after it has been visited; "visited" means rendered
//! successfully, so failed URLs stay eligible for re-queueing.

use std::collections::{HashSet, VecDeque};

/// FIFO frontier plus the set of successfully rendered URLs
#[derive(Debug, Default)]
pub struct Frontier {
    /// URLs waiting for a render attempt, oldest first
    queue: VecDeque<String>,

    /// Mirror of `queue` for O(1) duplicate suppression
    queued: HashSet<String>,

    /// URLs rendered successfully
    visited: HashSet<String>,

    /// `visited` in the order pages were rendered
    visit_order: Vec<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `url` unless it is already queued or visited
    ///
    /// Returns true if the URL was added.
    pub fn enqueue(&mut self, url: &str) -> bool {
        if self.visited.contains(url) || self.queued.contains(url) {
            return false;
        }
        self.queued.insert(url.to_string());
        self.queue.push_back(url.to_string());
        true
    }

    /// Removes and returns the oldest queued URL, or None when empty
    pub fn dequeue(&mut self) -> Option<String> {
        let url = self.queue.pop_front()?;
        self.queued.remove(&url);
        Some(url)
    }

    /// Records a successful render of `url`
    pub fn mark_visited(&mut self, url: &str) {
        if self.visited.insert(url.to_string()) {
            self.visit_order.push(url.to_string());
        }
    }

    /// Returns true if `url` was rendered successfully
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Returns true if `url` is waiting in the queue
    pub fn is_queued(&self, url: &str) -> bool {
        self.queued.contains(url)
    }

    /// Number of successfully rendered URLs
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Visited URLs in render order
    pub fn visited(&self) -> &[String] {
        &self.visit_order
    }

    /// Number of queued URLs
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
