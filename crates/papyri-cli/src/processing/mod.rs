//! Input handling.

mod input;


pub use input::{expand_inputs, is_supported_image};
pub use papyri_core::decoders::SUPPORTED_EXTENSIONS;
