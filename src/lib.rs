//! Disguised edge reverse proxy for the TMDB REST API and image CDN.
//!
//! Incoming paths are classified into a small set of route classes, rewritten
//! against fixed upstream hosts, and forwarded with header filtering, API key
//! injection, and path-based cache-control policies. The root path masquerades
//! as a 404 to hide the service from casual probing.

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod state;
pub mod utils;
pub mod web;
