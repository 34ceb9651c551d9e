//! Feed fetching.
//!
//! This module provides the `FeedFetcher` seam used by the refresh cache and
//! `FeedClient`, its reqwest implementation. A fetch is a single GET with no
//! retry; failures surface as `FeedError::Network`.

pub mod client;

pub use client::{FeedClient, FeedFetcher};
