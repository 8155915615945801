//! Command implementations for the papyri CLI.

mod enhance;
mod init;
mod labels;

#[cfg(test)]
mod tests;

pub use enhance::{cmd_enhance, format_summary, EnhanceArgs};
pub use init::{cmd_init, init_config_at};
pub use labels::{cmd_labels, label_listing};
