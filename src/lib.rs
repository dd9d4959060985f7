//! arpadroid-build - build orchestrator for the @arpadroid package family
//!
//! Builds front-end packages together with their sibling dependencies, merges
//! theme stylesheets across packages and schedules workspace-wide builds.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Business logic: resolution, build phases, scheduling
//! - [`infra`] - Infrastructure layer (filesystem, external tools)
//! - [`config`] - Configuration and constants
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;
