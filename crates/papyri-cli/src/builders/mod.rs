//! Builder functions that turn configuration plus flags into runnable pieces.

mod request;


pub use request::{build_request, build_retinex, build_sink, EnhanceOverrides};
