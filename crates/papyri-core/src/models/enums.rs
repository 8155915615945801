//! Enums describing the axes of an enhancement run.

use serde::{Deserialize, Serialize};

/// Retinex variants the external capability is known to provide.
pub const KNOWN_RETINEX_METHODS: &[&str] = &["SSR", "MSR", "MSRCR", "AutoMSRCR", "MSRCP"];

/// The single-channel retinex variant used for grayscale images.
pub const GRAYSCALE_RETINEX_METHOD: &str = "MSR";

/// Image class as far as method selection is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageClass {
    Color,
    Grayscale,
}

/// A base enhancement operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BaseOperator {
    /// Lightness replaced by the Euclidean norm of the Lab triple
    Vividness,

    /// Lightness / saturation / value blend
    Lsv,

    /// Tiled histogram equalization with a Rayleigh target
    AdaptiveContrast,

    /// A named variant of the external retinex capability
    Retinex(String),
}

impl BaseOperator {
    /// Label fragment naming this operator.
    pub fn label(&self) -> String {
        match self {
            Self::Vividness => "Vividness".to_string(),
            Self::Lsv => "LSV".to_string(),
            Self::AdaptiveContrast => "Adapthisteq".to_string(),
            Self::Retinex(method) => format!("Retinex {}", method),
        }
    }

    /// Whether the operator can run on images of the given class.
    pub fn supports(&self, class: ImageClass) -> bool {
        match self {
            Self::Vividness | Self::Lsv => class == ImageClass::Color,
            Self::AdaptiveContrast | Self::Retinex(_) => true,
        }
    }
}

/// Postprocessing applied to a base operator's primary result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Postprocess {
    Primary,

    /// Inverted lightness
    Negative,

    /// Inverted lightness and negated chroma planes
    Blue,
}

impl Postprocess {
    pub const ALL: [Postprocess; 3] = [Self::Primary, Self::Negative, Self::Blue];

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Primary => "",
            Self::Negative => "Negative",
            Self::Blue => "Blue",
        }
    }
}

/// Whether a variant is produced with background reinsertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskRun {
    Unmasked,
    Masked,
}

impl MaskRun {
    pub const ALL: [MaskRun; 2] = [Self::Unmasked, Self::Masked];

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Unmasked => "",
            Self::Masked => "Masked",
        }
    }
}

/// Expected brightness of the document background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    #[default]
    Light,
    Dark,
}

impl Background {
    /// Short tag used in output file names.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Light => "lightbg",
            Self::Dark => "darkbg",
        }
    }
}

/// On-disk output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Tiff,
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Tiff => "tif",
            Self::Jpeg => "jpg",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tif" | "tiff" => Ok(Self::Tiff),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Directive passed to the retinex capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetinexDirective {
    None,
    Negative,
    NegativeHueComplement,
}

impl From<Postprocess> for RetinexDirective {
    fn from(post: Postprocess) -> Self {
        match post {
            Postprocess::Primary => Self::None,
            Postprocess::Negative => Self::Negative,
            Postprocess::Blue => Self::NegativeHueComplement,
        }
    }
}
