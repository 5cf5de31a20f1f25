//! Destination export: the capacity-aware, rate-limit tolerant bulk writer

pub mod ports;
pub mod progress;
pub mod retry;
pub mod writer;
