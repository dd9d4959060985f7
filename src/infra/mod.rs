//! Infrastructure layer
//!
//! Handles all I/O operations: filesystem and external processes.
//! This module is the only place where tools are spawned.

pub mod declarations;
pub mod filesystem;
pub mod i18n;
pub mod launcher;
pub mod process;
pub mod rollup;
pub mod stylesheets;
pub mod toolchain;
pub mod watch;

pub use toolchain::toolchain_for;
