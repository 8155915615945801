//! Variant expansion
//!
//! Each base operator is multiplied by the postprocessing values and the
//! mask runs. Variants are emitted one at a time in interleaved order so the
//! caller can write, check for cancellation, and stop between any two.


use std::collections::HashMap;
use std::ops::ControlFlow;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::classify::RasterImage;
use crate::color::{GamutExpander, LabColorField};
use crate::enhance::{self, Retinex};
use crate::error::Warning;
use crate::labels::{self, LabelOrder, ORIGINAL_LABEL};
use crate::models::{
    BaseOperator, EnhancementRequest, ImageClass, MaskRun, Postprocess, RetinexDirective,
};
use crate::segment::BackgroundMask;

/// A classified raster ready for the operators.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Gamut-expanded when color and an expander is available
    pub raster: RasterImage,
    /// CIELAB decomposition, color only
    pub lab: Option<LabColorField>,
    /// Normalized lightness (color) or channel (grayscale), 0.0-1.0
    pub field: Vec<f32>,
}

impl PreparedImage {
    pub fn new(raster: &RasterImage, gamut: Option<&GamutExpander>) -> Self {
        match raster.class() {
            ImageClass::Color => {
                let raster = match gamut {
                    Some(expander) => expander.expand(raster),
                    None => raster.clone(),
                };
                let lab = LabColorField::from_rgb8(raster.width, raster.height, &raster.data);
                let field = lab.normalized_lightness();
                Self {
                    raster,
                    lab: Some(lab),
                    field,
                }
            }
            ImageClass::Grayscale => Self {
                field: raster.gray_unit(),
                raster: raster.clone(),
                lab: None,
            },
        }
    }

    pub fn class(&self) -> ImageClass {
        self.raster.class()
    }
}

/// One position in the execution order of an image's variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantStep {
    pub operator: BaseOperator,
    pub postprocess: Postprocess,
    pub mask_run: MaskRun,
    /// 1-based position in the interleaved execution order
    pub index: usize,
}

impl VariantStep {
    pub fn label(&self) -> String {
        labels::compose_label(
            &self.operator.label(),
            self.postprocess.suffix(),
            self.mask_run.suffix(),
        )
    }
}

/// Every variant an image of `class` produces, in execution order.
pub fn plan(request: &EnhancementRequest, class: ImageClass) -> Vec<VariantStep> {
    let mut steps = Vec::with_capacity(request.variant_count(class));
    for operator in request.base_operators(class) {
        for postprocess in request.postprocess_values(class) {
            for mask_run in request.mask_runs() {
                steps.push(VariantStep {
                    operator: operator.clone(),
                    postprocess,
                    mask_run,
                    index: steps.len() + 1,
                });
            }
        }
    }
    steps
}

/// A produced variant.
#[derive(Debug, Clone)]
pub struct OutputEntry {
    pub label: String,
    /// 0 for the original, otherwise the step index
    pub index: usize,
    pub image: RasterImage,
    /// `None` for the original
    pub step: Option<VariantStep>,
}

impl OutputEntry {
    pub fn original(image: RasterImage) -> Self {
        Self {
            label: ORIGINAL_LABEL.to_string(),
            index: 0,
            image,
            step: None,
        }
    }
}

/// All entries produced for one input image.
#[derive(Debug, Clone, Default)]
pub struct OutputSet {
    pub source: PathBuf,
    pub entries: Vec<OutputEntry>,
}

impl OutputSet {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: OutputEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn indices(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.index).collect()
    }

    pub fn get(&self, label: &str) -> Option<&OutputEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    /// Entries reordered by the label universe of `class` in `order`.
    pub fn ordered(&self, class: ImageClass, order: LabelOrder) -> Vec<&OutputEntry> {
        let universe = labels::universe(class, order);
        labels::project(&universe, &self.labels())
            .iter()
            .filter_map(|label| self.get(label))
            .collect()
    }
}

/// What one step of the plan produced.
#[derive(Debug, Clone)]
pub enum StepOutput {
    Variant(OutputEntry),
    /// The step could not be produced; a warning has been recorded
    Skipped(VariantStep),
}

impl StepOutput {
    pub fn into_variant(self) -> Option<OutputEntry> {
        match self {
            Self::Variant(entry) => Some(entry),
            Self::Skipped(_) => None,
        }
    }
}

/// Produces the variants of prepared images.
pub struct VariantExpander<'a> {
    request: &'a EnhancementRequest,
    retinex: Option<&'a dyn Retinex>,
}

impl<'a> VariantExpander<'a> {
    pub fn new(request: &'a EnhancementRequest, retinex: Option<&'a dyn Retinex>) -> Self {
        Self { request, retinex }
    }

    /// Emit the outcome of every plan step of `image` in execution order.
    ///
    /// Stops as soon as `emit` breaks. Variants that cannot be produced are
    /// reported as skipped with a warning; their indices stay unused.
    pub fn expand<F>(
        &self,
        image: &PreparedImage,
        mask: Option<&BackgroundMask>,
        warnings: &mut Vec<Warning>,
        mut emit: F,
    ) -> ControlFlow<()>
    where
        F: FnMut(StepOutput) -> ControlFlow<()>,
    {
        if self.request.mask.enabled && mask.is_none() {
            warn!("masking enabled without a mask, masked variants are left unmasked");
        }

        // Results of the operator in progress; dropped when the operator changes
        let mut current: Option<BaseOperator> = None;
        let mut primary: Option<Vec<f32>> = None;
        let mut retinex_results: HashMap<Postprocess, Option<RasterImage>> = HashMap::new();

        for step in plan(self.request, image.class()) {
            if current.as_ref() != Some(&step.operator) {
                current = Some(step.operator.clone());
                primary = None;
                retinex_results.clear();
            }

            let produced = match &step.operator {
                BaseOperator::Retinex(method) => retinex_results
                    .entry(step.postprocess)
                    .or_insert_with(|| self.run_retinex(image, method, &step, warnings))
                    .as_ref()
                    .map(|out| match (step.mask_run, mask) {
                        (MaskRun::Masked, Some(mask)) => {
                            enhance::reinsert_samples(out, &image.raster, mask)
                        }
                        _ => out.clone(),
                    }),
                operator => {
                    if primary.is_none() {
                        primary = self.primary_field(operator, image);
                    }
                    primary.as_ref().map(|field| {
                        let base = match (step.mask_run, mask) {
                            (MaskRun::Masked, Some(mask)) => {
                                enhance::reinsert(field, &image.field, mask)
                            }
                            _ => field.clone(),
                        };
                        enhance::render(&base, step.postprocess, image.lab.as_ref(), &image.raster)
                    })
                }
            };

            let output = match produced {
                Some(produced) => {
                    let label = step.label();
                    debug!(index = step.index, label = %label, "variant ready");
                    StepOutput::Variant(OutputEntry {
                        label,
                        index: step.index,
                        image: produced,
                        step: Some(step),
                    })
                }
                None => StepOutput::Skipped(step),
            };
            emit(output)?;
        }
        ControlFlow::Continue(())
    }

    /// Lightness-domain result of a non-retinex operator.
    fn primary_field(&self, operator: &BaseOperator, image: &PreparedImage) -> Option<Vec<f32>> {
        let width = image.raster.width as usize;
        let height = image.raster.height as usize;
        match operator {
            BaseOperator::Vividness => image.lab.as_ref().map(enhance::vividness),
            BaseOperator::Lsv => image
                .lab
                .as_ref()
                .map(|lab| enhance::lsv(lab, &image.raster.data)),
            BaseOperator::AdaptiveContrast => Some(enhance::adaptive_contrast(
                &image.field,
                width,
                height,
                &self.request.clahe,
            )),
            BaseOperator::Retinex(_) => None,
        }
    }

    fn run_retinex(
        &self,
        image: &PreparedImage,
        method: &str,
        step: &VariantStep,
        warnings: &mut Vec<Warning>,
    ) -> Option<RasterImage> {
        let label = labels::compose_label(&step.operator.label(), step.postprocess.suffix(), "");
        let Some(retinex) = self.retinex else {
            warnings.push(Warning::RetinexFailed {
                label,
                reason: "no retinex program configured".to_string(),
            });
            return None;
        };
        match retinex.apply(&image.raster, method, RetinexDirective::from(step.postprocess)) {
            Ok(out) => Some(out),
            Err(e) => {
                warn!(label = %label, error = %e, "retinex failed");
                warnings.push(Warning::RetinexFailed {
                    label,
                    reason: e.to_string(),
                });
                None
            }
        }
    }
}
