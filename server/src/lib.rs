//! Hookwire Server
//!
//! Receives signed interaction webhooks from the chat platform, routes them
//! to registered handlers, and talks back to the platform's REST API under
//! its global rate limit.

pub mod api;
pub mod config;
pub mod interactions;
pub mod ratelimit;
pub mod rest;
