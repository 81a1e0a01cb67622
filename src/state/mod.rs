//! State module for tracking crawl progress
//!
//! This module provides the lifecycle state of a crawl session.
//!
//! # Components
//!
//! - `SessionState`: Tracks a session through init, running and done

mod session_state;

// Re-export main types
pub use session_state::SessionState;
