//! Papyri Core Library
//!
//! Legibility enhancement for degraded document images: classification,
//! background segmentation, color-space enhancement operators and the
//! labeled variant sets they produce.

pub mod batch;
pub mod classify;
pub mod color;
pub mod config;
pub mod decoders;
pub mod enhance;
pub mod error;
pub mod exporters;
pub mod labels;
pub mod models;
pub mod segment;
pub mod variants;

// Re-export commonly used types
pub use batch::{
    BatchOutcome, BatchRunner, CancelDecision, CancelHandler, CancellationToken, UnreadableInput,
};
pub use classify::{classify, Classification, GraySource, RasterImage};
pub use color::{GamutExpander, Lab, LabColorField};
pub use error::{EnhanceError, Result, Warning};
pub use exporters::{FileSink, ImageSink};
pub use labels::LabelOrder;
pub use models::{
    Background, BaseOperator, EnhancementRequest, ImageClass, MaskRun, OutputFormat, Postprocess,
};
pub use variants::{OutputEntry, OutputSet};
