//! posting-listener: classified listing watcher
//!
//! A library for polling classified-listing search pages on a jittered
//! schedule and reporting the postings that are new since the previous poll.

pub mod config;
pub mod fetch;
pub mod monitor;
pub mod source;
pub mod state;
pub mod time;
