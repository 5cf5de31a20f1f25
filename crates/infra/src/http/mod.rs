//! HTTP transport shared by the adapters

mod client;

pub use client::{HttpClient, HttpClientBuilder, TextResponse};
