//! Content module - article model and the content API client

mod client;
mod post;

pub use client::{fetch_with_deadline, ApiClient, ContentSource, FetchError, FetchOutcome};
pub use post::{ContentType, Post, PostEnvelope};
