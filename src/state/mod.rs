//! State module for tracking per-host request pacing
//!
//! The crawl engine owns one [`HostPacer`] per crawl; it is discarded with
//! the crawl result.

mod host_state;

pub use host_state::HostPacer;
