//! HTTP client for the remote POI store.
//!
//! The store owns all durable state: the POI list and each record's review
//! status. This crate only reads the list and issues approve/reject commands.

pub mod client;
pub mod error;

pub use client::{PoiStoreClient, ReviewAction, ReviewOutcome};
pub use error::StoreError;
