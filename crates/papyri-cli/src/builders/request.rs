//! EnhancementRequest and collaborator builders.

use papyri_core::config::PapyriConfig;
use papyri_core::enhance::CommandRetinex;
use papyri_core::models::EnhancementRequest;
use papyri_core::FileSink;

use crate::parsers::{parse_background, parse_formats, parse_operators, parse_retinex_methods};

/// Command-line values that override the configured defaults.
///
/// `None` and `false` leave the configured value untouched.
#[derive(Debug, Clone, Default)]
pub struct EnhanceOverrides {
    /// Built-in operators, replacing the configured selection ("vividness,lsv,adapthisteq")
    pub methods: Option<String>,
    /// Retinex variants, replacing the configured list
    pub retinex: Option<String>,
    pub negative: bool,
    pub blue_shift: bool,
    pub mask: bool,
    pub background: Option<String>,
    pub keep_unmasked: bool,
    pub deshadow: bool,
    pub red_channel_only: bool,
    pub formats: Option<String>,
    pub jpeg_quality: Option<i32>,
    pub dir_name: Option<String>,
}

/// Build the request for one run from the config defaults and `overrides`.
///
/// Returns an error when the resulting request cannot produce any output.
pub fn build_request(
    config: &PapyriConfig,
    overrides: &EnhanceOverrides,
) -> Result<EnhancementRequest, String> {
    let mut request = config.to_request();

    if let Some(methods) = &overrides.methods {
        let flags = parse_operators(methods)?;
        request.operators.vividness = flags.vividness;
        request.operators.lsv = flags.lsv;
        request.operators.adaptive_contrast = flags.adaptive_contrast;
    }
    if let Some(retinex) = &overrides.retinex {
        request.operators.retinex = parse_retinex_methods(retinex)?;
    }

    request.postprocessing.negative |= overrides.negative;
    request.postprocessing.blue_shift |= overrides.blue_shift;

    request.mask.enabled |= overrides.mask;
    request.mask.keep_unmasked |= overrides.keep_unmasked;
    request.mask.deshadow |= overrides.deshadow;
    if let Some(background) = &overrides.background {
        request.mask.background = parse_background(background)?;
    }

    request.red_channel_only |= overrides.red_channel_only;

    if let Some(formats) = &overrides.formats {
        request.output.formats = parse_formats(formats)?;
    }
    if let Some(quality) = overrides.jpeg_quality {
        request.output.jpeg_quality = quality;
    }
    if let Some(dir_name) = &overrides.dir_name {
        request.output.dir_name = dir_name.clone();
    }

    request.validate().map_err(|e| e.to_string())?;
    Ok(request)
}

/// File sink for `request`, embedding profiles as the config says.
pub fn build_sink(config: &PapyriConfig, request: &EnhancementRequest) -> FileSink {
    let sink = FileSink::new(request.output.formats.clone(), request.output.jpeg_quality)
        .with_exiftool(config.color.exiftool.clone());
    if config.color.embed_icc {
        sink
    } else {
        sink.without_icc()
    }
}

/// The configured external retinex program, if any.
pub fn build_retinex(config: &PapyriConfig) -> Option<CommandRetinex> {
    config
        .retinex
        .command
        .as_ref()
        .map(|program| CommandRetinex::new(program.clone()))
}
