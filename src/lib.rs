//! Filing Diff Server Library
//!
//! Retrieves SEC EDGAR filings and financial facts through a cached,
//! rate-governed, retrying fetcher, slices filings into named sections and
//! reports sentence-level differences between two versions of a section.
//!
//! # Modules
//!
//! - `fetch`: cache, rate governor, retry policy and the resilient fetcher
//! - `text`: HTML normalization, section extraction, sentence diffing
//! - `edgar`: company, filing and financials lookups
//! - `diff`: two-filing section diff orchestration
//! - `routes`: HTTP API

pub mod config;
pub mod diff;
pub mod edgar;
pub mod error;
pub mod fetch;
pub mod routes;
pub mod state;
pub mod text;
