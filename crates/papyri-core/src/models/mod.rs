//! Data models for papyri
//!
//! The enhancement request and the enums describing its axes.

mod enums;
mod request;


pub use enums::{
    Background, BaseOperator, ImageClass, MaskRun, OutputFormat, Postprocess, RetinexDirective,
    GRAYSCALE_RETINEX_METHOD, KNOWN_RETINEX_METHODS,
};
pub use request::{
    ClaheParams, EnhancementRequest, GaborParams, MaskSettings, OperatorSelection, OutputSettings,
    PostprocessSelection,
};
