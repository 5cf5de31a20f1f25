//! Roster API adapter

mod client;

pub use client::RosterApiClient;
pub(crate) use client::normalize_base_url;
