//! Parsing functions for CLI arguments.

mod base;


pub use base::{
    parse_background, parse_class, parse_formats, parse_label_order, parse_operators,
    parse_retinex_methods, OperatorFlags,
};
