//! HTTP surface over the stewardship service.

pub mod app;
pub mod error;
pub mod handlers;
pub mod state;
