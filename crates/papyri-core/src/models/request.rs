//! The immutable configuration snapshot of one enhancement run.

use serde::{Deserialize, Serialize};

use super::enums::{
    Background, BaseOperator, ImageClass, MaskRun, OutputFormat, Postprocess,
    GRAYSCALE_RETINEX_METHOD, KNOWN_RETINEX_METHODS,
};
use crate::error::{EnhanceError, Result};

/// Which base operators are enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorSelection {
    pub vividness: bool,
    pub lsv: bool,
    pub adaptive_contrast: bool,
    /// Retinex variants to run on color images, in execution order
    pub retinex: Vec<String>,
}

impl Default for OperatorSelection {
    fn default() -> Self {
        Self {
            vividness: true,
            lsv: false,
            adaptive_contrast: true,
            retinex: Vec::new(),
        }
    }
}

/// Which postprocessing axes are enabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PostprocessSelection {
    pub negative: bool,
    pub blue_shift: bool,
}

/// Background masking options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MaskSettings {
    pub enabled: bool,
    pub background: Background,
    /// Also emit the unmasked variants when masking is on
    pub keep_unmasked: bool,
    /// Segment on a shadow-free chromaticity image
    pub deshadow: bool,
}

/// Even-symmetric Gabor filter bank parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaborParams {
    /// Wavelength in pixels (2.0 is the sampling limit)
    pub wavelength: f32,
    /// Number of orientations, evenly spaced over 180 degrees
    pub orientations: usize,
    /// Spatial-frequency bandwidth in octaves
    pub bandwidth: f32,
    /// Ratio of the along-stroke to the across-stroke envelope width
    pub aspect_ratio: f32,
}

impl Default for GaborParams {
    fn default() -> Self {
        Self {
            wavelength: 2.0,
            orientations: 4,
            bandwidth: 1.5,
            aspect_ratio: 0.3,
        }
    }
}

impl GaborParams {
    fn sanitize(&mut self, adjustments: &mut Vec<String>) {
        if !self.wavelength.is_finite() || self.wavelength < 2.0 {
            adjustments.push(format!(
                "gabor.wavelength {} below sampling limit, using 2.0",
                self.wavelength
            ));
            self.wavelength = 2.0;
        }
        if self.orientations == 0 {
            adjustments.push("gabor.orientations must be at least 1, using 4".to_string());
            self.orientations = 4;
        }
        if !self.bandwidth.is_finite() || self.bandwidth <= 0.0 {
            adjustments.push(format!(
                "gabor.bandwidth {} must be positive, using 1.5",
                self.bandwidth
            ));
            self.bandwidth = 1.5;
        }
        if !self.aspect_ratio.is_finite() || self.aspect_ratio <= 0.0 {
            adjustments.push(format!(
                "gabor.aspect_ratio {} must be positive, using 0.3",
                self.aspect_ratio
            ));
            self.aspect_ratio = 0.3;
        }
    }
}

/// Contrast-limited adaptive histogram equalization parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaheParams {
    pub tiles_x: u32,
    pub tiles_y: u32,
    /// Clip limit as a fraction of the tile pixel count (0.0-1.0)
    pub clip_limit: f32,
    pub bins: usize,
    /// Rayleigh distribution parameter
    pub alpha: f32,
}

impl Default for ClaheParams {
    fn default() -> Self {
        Self {
            tiles_x: 8,
            tiles_y: 8,
            clip_limit: 0.01,
            bins: 256,
            alpha: 0.4,
        }
    }
}

impl ClaheParams {
    fn sanitize(&mut self, adjustments: &mut Vec<String>) {
        if self.tiles_x < 2 || self.tiles_y < 2 {
            adjustments.push(format!(
                "clahe tiles {}x{} raised to at least 2x2",
                self.tiles_x, self.tiles_y
            ));
            self.tiles_x = self.tiles_x.max(2);
            self.tiles_y = self.tiles_y.max(2);
        }
        if !(0.0..=1.0).contains(&self.clip_limit) {
            let clamped = if self.clip_limit.is_finite() {
                self.clip_limit.clamp(0.0, 1.0)
            } else {
                0.01
            };
            adjustments.push(format!(
                "clahe.clip_limit {} clamped to {}",
                self.clip_limit, clamped
            ));
            self.clip_limit = clamped;
        }
        if self.bins < 2 {
            adjustments.push(format!("clahe.bins {} raised to 256", self.bins));
            self.bins = 256;
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 {
            adjustments.push(format!("clahe.alpha {} must be positive, using 0.4", self.alpha));
            self.alpha = 0.4;
        }
    }
}

/// Where and how variants are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub formats: Vec<OutputFormat>,
    pub jpeg_quality: i32,
    /// Directory name created next to each input
    pub dir_name: String,
    /// Keep every image's output set in memory, not only the first
    pub retain_all: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            formats: vec![OutputFormat::Tiff],
            jpeg_quality: 90,
            dir_name: "enhanced".to_string(),
            retain_all: false,
        }
    }
}

/// Complete configuration of one enhancement run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EnhancementRequest {
    pub operators: OperatorSelection,
    pub postprocessing: PostprocessSelection,
    pub mask: MaskSettings,
    pub red_channel_only: bool,
    pub output: OutputSettings,
    pub gabor: GaborParams,
    pub clahe: ClaheParams,
}

impl EnhancementRequest {
    /// Force out-of-range values into range, returning a message per change.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut adjustments = Vec::new();

        if !(0..=100).contains(&self.output.jpeg_quality) {
            let clamped = self.output.jpeg_quality.clamp(0, 100);
            adjustments.push(format!(
                "jpeg_quality {} clamped to {}",
                self.output.jpeg_quality, clamped
            ));
            self.output.jpeg_quality = clamped;
        }
        if self.output.dir_name.trim().is_empty() {
            adjustments.push("output dir_name empty, using \"enhanced\"".to_string());
            self.output.dir_name = "enhanced".to_string();
        }

        let before = self.operators.retinex.len();
        self.operators
            .retinex
            .retain(|method| KNOWN_RETINEX_METHODS.contains(&method.as_str()));
        if self.operators.retinex.len() != before {
            adjustments.push(format!(
                "unknown retinex methods dropped (known: {})",
                KNOWN_RETINEX_METHODS.join(", ")
            ));
        }
        let mut seen = Vec::with_capacity(self.operators.retinex.len());
        self.operators.retinex.retain(|method| {
            if seen.contains(method) {
                false
            } else {
                seen.push(method.clone());
                true
            }
        });

        self.gabor.sanitize(&mut adjustments);
        self.clahe.sanitize(&mut adjustments);
        adjustments
    }

    /// Reject requests that cannot produce any output.
    pub fn validate(&self) -> Result<()> {
        let ops = &self.operators;
        if !ops.vividness && !ops.lsv && !ops.adaptive_contrast && ops.retinex.is_empty() {
            return Err(EnhanceError::Config("no enhancement method selected".to_string()));
        }
        if let Some(unknown) = ops
            .retinex
            .iter()
            .find(|method| !KNOWN_RETINEX_METHODS.contains(&method.as_str()))
        {
            return Err(EnhanceError::Config(format!(
                "unknown retinex method: {}",
                unknown
            )));
        }
        if self.output.formats.is_empty() {
            return Err(EnhanceError::Config("no output format selected".to_string()));
        }
        Ok(())
    }

    /// Every selected base operator in execution order, regardless of class.
    pub fn selected_operators(&self) -> Vec<BaseOperator> {
        let ops = &self.operators;
        let mut selected = Vec::new();
        if ops.vividness {
            selected.push(BaseOperator::Vividness);
        }
        if ops.lsv {
            selected.push(BaseOperator::Lsv);
        }
        if ops.adaptive_contrast {
            selected.push(BaseOperator::AdaptiveContrast);
        }
        selected.extend(ops.retinex.iter().cloned().map(BaseOperator::Retinex));
        selected
    }

    /// Base operators that will run on an image of `class`, in execution order.
    ///
    /// Grayscale images collapse any retinex selection to the single
    /// grayscale variant.
    pub fn base_operators(&self, class: ImageClass) -> Vec<BaseOperator> {
        match class {
            ImageClass::Color => self.selected_operators(),
            ImageClass::Grayscale => {
                let mut ops = Vec::new();
                if self.operators.adaptive_contrast {
                    ops.push(BaseOperator::AdaptiveContrast);
                }
                if !self.operators.retinex.is_empty() {
                    ops.push(BaseOperator::Retinex(GRAYSCALE_RETINEX_METHOD.to_string()));
                }
                ops
            }
        }
    }

    /// Selected operators that cannot run on `class`.
    pub fn unsupported_operators(&self, class: ImageClass) -> Vec<BaseOperator> {
        self.selected_operators()
            .into_iter()
            .filter(|op| !op.supports(class))
            .collect()
    }

    /// Postprocessing values emitted per base operator, in execution order.
    pub fn postprocess_values(&self, class: ImageClass) -> Vec<Postprocess> {
        let mut values = vec![Postprocess::Primary];
        if self.postprocessing.negative {
            values.push(Postprocess::Negative);
        }
        if self.postprocessing.blue_shift && class == ImageClass::Color {
            values.push(Postprocess::Blue);
        }
        values
    }

    /// Mask runs emitted per (operator, postprocess) pair, in execution order.
    pub fn mask_runs(&self) -> Vec<MaskRun> {
        match (self.mask.enabled, self.mask.keep_unmasked) {
            (false, _) => vec![MaskRun::Unmasked],
            (true, false) => vec![MaskRun::Masked],
            (true, true) => vec![MaskRun::Unmasked, MaskRun::Masked],
        }
    }

    /// Number of variants one image of `class` produces.
    pub fn variant_count(&self, class: ImageClass) -> usize {
        self.base_operators(class).len()
            * self.postprocess_values(class).len()
            * self.mask_runs().len()
    }
}
