//! Shared utilities for papyri-cli
//!
//! Request building, input expansion and the command implementations, kept
//! in a library so they can be tested without spawning the binary.

pub mod builders;
pub mod commands;
pub mod parsers;
pub mod processing;

pub use builders::{build_request, build_retinex, build_sink, EnhanceOverrides};
pub use commands::{cmd_enhance, cmd_init, cmd_labels, EnhanceArgs};
pub use processing::{expand_inputs, SUPPORTED_EXTENSIONS};
