//! Shared helpers for end-to-end tests

#![allow(dead_code)]

pub mod app;
pub mod upstream;

pub use app::{create_test_app, get};
pub use upstream::{release_json, start_upstream};
