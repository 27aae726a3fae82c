//! Shared test utilities

#![allow(dead_code)]

pub mod github;

pub use github::*;
