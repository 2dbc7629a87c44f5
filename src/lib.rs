//! Backend for a Letterboxd-powered dating profile generator
//!
//! Relays Letterboxd screenshots to an external language model, turns them
//! into joke dating profiles and compatibility reports, and stores finished
//! profiles behind short shareable codes in a key-value store with a TTL.

pub mod ai;
pub mod analysis;
pub mod api;
pub mod app;
pub mod canned;
pub mod codes;
pub mod error;
pub mod models;
pub mod prompts;
pub mod store;

pub use error::{Error, Result};
