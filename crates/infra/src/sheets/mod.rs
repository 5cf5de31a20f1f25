//! Google Sheets adapter and its credentials

mod auth;
mod client;

pub use auth::{
    AccessTokenProvider, ServiceAccountKey, ServiceAccountTokenProvider, StaticTokenProvider,
    SPREADSHEETS_SCOPE, TOKEN_EXCHANGE_ATTEMPTS,
};
pub use client::{GoogleSheetsStore, SHEETS_API_BASE};
