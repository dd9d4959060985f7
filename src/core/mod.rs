//! Core business logic module
//!
//! Package resolution, build planning and phase sequencing. External tools are
//! reached only through the traits in [`toolchain`]; their subprocess-backed
//! implementations live in [`crate::infra`].
//!
//! # Submodules
//!
//! - [`settings`] - Workspace settings (arpadroid.toml)
//! - [`manifest`] - package.json parsing
//! - [`registry`] - Namespace filtering and priority ordering
//! - [`project`] - Package descriptors
//! - [`workspace`] - Package location context
//! - [`options`] - Build options
//! - [`compiler`] - Compiler configuration per build kind
//! - [`toolchain`] - External collaborator interfaces
//! - [`styles`] - Theme stylesheet aggregation
//! - [`coordinator`] - Single package build phases
//! - [`scheduler`] - Multi-package dispatch
//! - [`testing`] - Package test runs

pub mod compiler;
pub mod coordinator;
pub mod manifest;
pub mod options;
pub mod project;
pub mod registry;
pub mod scheduler;
pub mod settings;
pub mod styles;
pub mod testing;
pub mod toolchain;
pub mod workspace;
