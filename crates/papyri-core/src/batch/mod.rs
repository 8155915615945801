//! Batch runner
//!
//! Inputs are processed one at a time as a fold over the batch state:
//! decode, classify, prepare, segment, expand and write. Every step reports
//! `ControlFlow`, so an abort stops the fold without unwinding through
//! errors. Unreadable inputs are logged and skipped.

mod cancel;
mod error_log;

#[cfg(test)]
mod tests;

pub use cancel::{AbortOnCancel, CancelDecision, CancelHandler, CancellationToken};
pub use error_log::{ErrorLog, UnreadableInput, ERROR_LOG_NAME};

use std::ops::ControlFlow;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::classify::classify;
use crate::color::GamutExpander;
use crate::decoders::decode_image;
use crate::enhance::Retinex;
use crate::error::{EnhanceError, Result, Warning};
use crate::exporters::{ImageSink, OutputName, MASK_LABEL};
use crate::labels::compose_label;
use crate::models::{BaseOperator, EnhancementRequest, ImageClass, MaskRun};
use crate::segment::segment;
use crate::variants::{OutputEntry, OutputSet, PreparedImage, StepOutput, VariantExpander};

/// Everything a finished (or aborted) batch leaves behind.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Output sets of every processed image, when retention is enabled
    pub outputs: Vec<OutputSet>,
    /// Output set of the first successfully processed image, with the original
    pub first: Option<OutputSet>,
    pub unreadable: Vec<UnreadableInput>,
    pub warnings: Vec<Warning>,
    /// Non-fatal profile embedding messages
    pub statuses: Vec<String>,
    pub processed: usize,
    pub aborted: bool,
}

/// Why the fold stopped early.
enum Stop {
    Aborted,
    Failed(EnhanceError),
}

/// Runs one enhancement request over a list of inputs.
pub struct BatchRunner<'a> {
    request: EnhancementRequest,
    sink: &'a mut dyn ImageSink,
    retinex: Option<&'a dyn Retinex>,
    gamut: Option<Option<PathBuf>>,
    output_dir: Option<PathBuf>,
    token: CancellationToken,
    handler: Box<dyn CancelHandler + 'a>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(request: EnhancementRequest, sink: &'a mut dyn ImageSink) -> Self {
        Self {
            request,
            sink,
            retinex: None,
            gamut: None,
            output_dir: None,
            token: CancellationToken::new(),
            handler: Box::new(AbortOnCancel),
        }
    }

    pub fn with_retinex(mut self, retinex: &'a dyn Retinex) -> Self {
        self.retinex = Some(retinex);
        self
    }

    /// Expand color images to Adobe RGB (1998), with profiles from `profile_dir`
    /// or the built-in ones.
    pub fn with_gamut_expansion(mut self, profile_dir: Option<PathBuf>) -> Self {
        self.gamut = Some(profile_dir);
        self
    }

    /// Write everything to `dir` instead of next to each input.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_cancellation(
        mut self,
        token: CancellationToken,
        handler: impl CancelHandler + 'a,
    ) -> Self {
        self.token = token;
        self.handler = Box::new(handler);
        self
    }

    pub fn request(&self) -> &EnhancementRequest {
        &self.request
    }

    /// Directory outputs of `input` are written to.
    pub fn output_dir_for(&self, input: &Path) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.clone(),
            None => input
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(&self.request.output.dir_name),
        }
    }

    /// Process `inputs` in order.
    ///
    /// Fails only for configuration errors (before any input is touched) and
    /// write failures; everything else is reported in the outcome.
    pub fn run<P: AsRef<Path>>(&mut self, inputs: &[P]) -> Result<BatchOutcome> {
        let mut outcome = BatchOutcome::default();
        outcome.warnings.extend(
            self.request
                .sanitize()
                .into_iter()
                .map(Warning::ConfigAdjusted),
        );
        self.request.validate()?;

        let gamut = match &self.gamut {
            Some(profile_dir) => match GamutExpander::load(profile_dir.as_deref()) {
                Ok(expander) => Some(expander),
                Err(e) => {
                    warn!(error = %e, "gamut expansion disabled");
                    outcome.warnings.push(Warning::GamutExpansionDisabled {
                        reason: e.to_string(),
                    });
                    None
                }
            },
            None => None,
        };

        let log_dir = match inputs.first() {
            Some(first) => self.output_dir_for(first.as_ref()),
            None => return Ok(outcome),
        };
        let mut error_log = ErrorLog::new(&log_dir);

        info!(inputs = inputs.len(), "starting batch");
        let flow = inputs
            .iter()
            .enumerate()
            .try_fold(outcome, |outcome, (i, path)| {
                self.process_input(outcome, path.as_ref(), i + 1, gamut.as_ref(), &mut error_log)
            });

        let outcome = match flow {
            ControlFlow::Continue(outcome) => outcome,
            ControlFlow::Break((mut outcome, Stop::Aborted)) => {
                info!(processed = outcome.processed, "batch aborted");
                outcome.aborted = true;
                outcome
            }
            ControlFlow::Break((_, Stop::Failed(e))) => return Err(e),
        };
        if !outcome.aborted {
            error_log.finish()?;
        }
        Ok(outcome)
    }

    fn process_input(
        &mut self,
        mut outcome: BatchOutcome,
        path: &Path,
        position: usize,
        gamut: Option<&GamutExpander>,
        error_log: &mut ErrorLog,
    ) -> ControlFlow<(BatchOutcome, Stop), BatchOutcome> {
        let decoded = decode_image(path).and_then(|d| classify(d, self.request.red_channel_only));
        let raster = match decoded {
            Ok(raster) => raster,
            Err(e) => {
                warn!(path = %path.display(), position, error = %e, "unreadable input skipped");
                let entry = UnreadableInput {
                    path: path.to_path_buf(),
                    position,
                    reason: e.to_string(),
                };
                if let Err(e) = error_log.record(&entry) {
                    return ControlFlow::Break((outcome, Stop::Failed(e)));
                }
                outcome.unreadable.push(entry);
                return ControlFlow::Continue(outcome);
            }
        };

        let class = raster.class();
        let unsupported = self.request.unsupported_operators(class);
        if class == ImageClass::Grayscale && !unsupported.is_empty() {
            let methods: Vec<String> = unsupported.iter().map(BaseOperator::label).collect();
            warn!(path = %path.display(), ?methods, "grayscale image, color-only methods skipped");
            outcome.warnings.push(Warning::GrayscaleUnsupported {
                path: path.to_path_buf(),
                methods,
            });
        }

        debug!(path = %path.display(), ?class, "processing");
        let prepared = PreparedImage::new(&raster, gamut);
        let names = OutputName::new(path, raster.classification.is_red_channel());
        let dir = self.output_dir_for(path);
        let mask_settings = &self.request.mask;
        let mask_suffix = Some((mask_settings.background, mask_settings.deshadow));

        let mask = if mask_settings.enabled {
            let mask = segment(
                &prepared.raster,
                &prepared.field,
                mask_settings,
                &self.request.gabor,
            );
            let base = dir.join(names.variant(MASK_LABEL, mask_suffix));
            match self.sink.write(&mask.to_raster(), &base) {
                Ok(statuses) => outcome.statuses.extend(statuses),
                Err(e) => return ControlFlow::Break((outcome, Stop::Failed(e))),
            }
            Some(mask)
        } else {
            None
        };

        let mut set = OutputSet::new(path);
        if outcome.first.is_none() {
            set.push(OutputEntry::original(raster.clone()));
        }

        let mut stop = None;
        let mut steps = 0usize;
        let expander = VariantExpander::new(&self.request, self.retinex);
        let sink = &mut *self.sink;
        let token = &self.token;
        let handler = &mut self.handler;
        let statuses = &mut outcome.statuses;

        let mut flow = expander.expand(&prepared, mask.as_ref(), &mut outcome.warnings, |output| {
            steps += 1;
            if let StepOutput::Variant(entry) = output {
                if let Some(step) = &entry.step {
                    let label =
                        compose_label(&step.operator.label(), step.postprocess.suffix(), "");
                    let masked = if step.mask_run == MaskRun::Masked {
                        mask_suffix
                    } else {
                        None
                    };
                    let base = dir.join(names.variant(&label, masked));
                    match sink.write(&entry.image, &base) {
                        Ok(written) => statuses.extend(written),
                        Err(e) => {
                            stop = Some(Stop::Failed(e));
                            return ControlFlow::Break(());
                        }
                    }
                }
                set.push(entry);
            }
            checkpoint(token, &mut **handler)
        });
        // An image without any plan step still gets one checkpoint
        if flow.is_continue() && steps == 0 {
            flow = checkpoint(token, &mut **handler);
        }

        if flow.is_break() {
            return ControlFlow::Break((outcome, stop.unwrap_or(Stop::Aborted)));
        }

        outcome.processed += 1;
        debug!(path = %path.display(), variants = set.len(), "image done");
        if outcome.first.is_none() {
            if self.request.output.retain_all {
                outcome.outputs.push(set.clone());
            }
            outcome.first = Some(set);
        } else if self.request.output.retain_all {
            outcome.outputs.push(set);
        }
        ControlFlow::Continue(outcome)
    }
}

/// Ask the handler what to do when `token` has been tripped.
fn checkpoint(token: &CancellationToken, handler: &mut dyn CancelHandler) -> ControlFlow<()> {
    if token.is_cancelled() {
        match handler.on_cancel() {
            CancelDecision::Abort => return ControlFlow::Break(()),
            CancelDecision::Resume => token.reset(),
        }
    }
    ControlFlow::Continue(())
}
