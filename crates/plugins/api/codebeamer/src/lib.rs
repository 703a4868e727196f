//! Codebeamer provider implementation for beamer-tools.
//!
//! This crate talks to the Codebeamer REST API (v3) with basic
//! authentication. Every call yields a normalized [`beamer_core::Envelope`];
//! transport and HTTP failures never surface as Rust errors.

mod client;
mod endpoints;

pub use client::{CodebeamerClient, REQUEST_TIMEOUT};
pub use endpoints::{
    item_comments_path, item_path, project_trackers_path, tracker_items_path, PROJECTS_PATH,
};
