//! `noticeboard` — search, filter and rank school announcements.
//!
//! This crate provides the core library for reading announcement records
//! from Airtable or local JSON exports, filtering them by sender and date,
//! and ranking them against free-text queries.

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod search;
pub mod stats;
pub mod store;
