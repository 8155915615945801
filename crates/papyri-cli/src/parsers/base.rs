//! Parsers for comma-separated lists and named options.

use papyri_core::labels::LabelOrder;
use papyri_core::models::{Background, ImageClass, OutputFormat, KNOWN_RETINEX_METHODS};

/// Parse output formats in format "tiff,jpeg"
pub fn parse_formats(value: &str) -> Result<Vec<OutputFormat>, String> {
    let formats = split_list(value)
        .map(|part| part.parse::<OutputFormat>())
        .collect::<Result<Vec<_>, _>>()?;
    if formats.is_empty() {
        return Err("At least one output format is required (tiff, jpeg)".to_string());
    }
    Ok(formats)
}

/// Built-in operators named on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperatorFlags {
    pub vividness: bool,
    pub lsv: bool,
    pub adaptive_contrast: bool,
}

/// Parse built-in operator names in format "vividness,adapthisteq"
pub fn parse_operators(value: &str) -> Result<OperatorFlags, String> {
    let mut flags = OperatorFlags::default();
    for part in split_list(value) {
        match part.to_lowercase().as_str() {
            "vividness" => flags.vividness = true,
            "lsv" => flags.lsv = true,
            "adapthisteq" | "adaptive" | "clahe" => flags.adaptive_contrast = true,
            _ => {
                return Err(format!(
                    "Unknown method: {} (expected vividness, lsv or adapthisteq)",
                    part
                ))
            }
        }
    }
    Ok(flags)
}

/// Parse retinex method names in format "MSR,MSRCP"
///
/// Names are matched case-insensitively against the known methods and
/// returned in their canonical spelling.
pub fn parse_retinex_methods(value: &str) -> Result<Vec<String>, String> {
    split_list(value)
        .map(|part| {
            KNOWN_RETINEX_METHODS
                .iter()
                .find(|known| known.eq_ignore_ascii_case(part))
                .map(|known| known.to_string())
                .ok_or_else(|| {
                    format!(
                        "Unknown retinex method: {} (known: {})",
                        part,
                        KNOWN_RETINEX_METHODS.join(", ")
                    )
                })
        })
        .collect()
}

/// Parse background polarity: "light" or "dark"
pub fn parse_background(value: &str) -> Result<Background, String> {
    match value.trim().to_lowercase().as_str() {
        "light" | "lightbg" => Ok(Background::Light),
        "dark" | "darkbg" => Ok(Background::Dark),
        _ => Err(format!(
            "Unknown background: {} (expected light or dark)",
            value
        )),
    }
}

/// Parse image class: "color" or "gray"
pub fn parse_class(value: &str) -> Result<ImageClass, String> {
    match value.trim().to_lowercase().as_str() {
        "color" | "colour" | "rgb" => Ok(ImageClass::Color),
        "gray" | "grey" | "grayscale" | "greyscale" => Ok(ImageClass::Grayscale),
        _ => Err(format!("Unknown image class: {} (expected color or gray)", value)),
    }
}

pub fn parse_label_order(value: &str) -> Result<LabelOrder, String> {
    value.trim().parse()
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|part| !part.is_empty())
}
