//! ICC gamut expansion from sRGB to Adobe RGB (1998)

use std::path::Path;

use lcms2::{CIExyY, CIExyYTRIPLE, Intent, PixelFormat, Profile, ToneCurve, Transform};
use tracing::debug;

use crate::classify::{Classification, RasterImage};
use crate::error::{EnhanceError, Result};

/// File names looked up in a configured profile directory.
pub const SRGB_PROFILE_FILE: &str = "sRGB.icc";
pub const ADOBE_RGB_PROFILE_FILE: &str = "AdobeRGB1998.icc";

/// Adobe RGB (1998) encoding gamma, 563/256
const ADOBE_RGB_GAMMA: f64 = 2.199_218_75;

/// Perceptual sRGB to Adobe RGB (1998) transform for 8-bit color rasters.
pub struct GamutExpander {
    transform: Transform<[u8; 3], [u8; 3]>,
}

impl GamutExpander {
    /// Build the transform.
    ///
    /// With a profile directory, both profiles must be present there. Without
    /// one, the built-in sRGB profile and an Adobe RGB (1998) profile built
    /// from its published primaries are used.
    pub fn load(profile_dir: Option<&Path>) -> Result<Self> {
        let (source, target) = match profile_dir {
            Some(dir) => (
                load_profile_file(&dir.join(SRGB_PROFILE_FILE))?,
                load_profile_file(&dir.join(ADOBE_RGB_PROFILE_FILE))?,
            ),
            None => (Profile::new_srgb(), adobe_rgb_profile()?),
        };

        let transform = Transform::new(
            &source,
            PixelFormat::RGB_8,
            &target,
            PixelFormat::RGB_8,
            Intent::Perceptual,
        )
        .map_err(|e| EnhanceError::Profile(format!("failed to build transform: {}", e)))?;

        debug!(?profile_dir, "gamut expansion ready");
        Ok(Self { transform })
    }

    /// Expand a color raster. Grayscale rasters are returned unchanged.
    pub fn expand(&self, image: &RasterImage) -> RasterImage {
        if image.classification != Classification::Color {
            return image.clone();
        }
        RasterImage {
            data: self.expand_samples(&image.data),
            ..image.clone()
        }
    }

    /// Expand interleaved 8-bit RGB samples.
    pub fn expand_samples(&self, data: &[u8]) -> Vec<u8> {
        let source: Vec<[u8; 3]> = data
            .chunks_exact(3)
            .map(|px| [px[0], px[1], px[2]])
            .collect();
        let mut target = vec![[0u8; 3]; source.len()];
        self.transform.transform_pixels(&source, &mut target);
        target.into_iter().flatten().collect()
    }
}

fn load_profile_file(path: &Path) -> Result<Profile> {
    if !path.is_file() {
        return Err(EnhanceError::Profile(format!(
            "profile not found: {}",
            path.display()
        )));
    }
    Profile::new_file(path)
        .map_err(|e| EnhanceError::Profile(format!("{}: {}", path.display(), e)))
}

fn adobe_rgb_profile() -> Result<Profile> {
    let white_point = CIExyY {
        x: 0.3127,
        y: 0.3290,
        Y: 1.0,
    };
    let primaries = CIExyYTRIPLE {
        Red: CIExyY {
            x: 0.64,
            y: 0.33,
            Y: 1.0,
        },
        Green: CIExyY {
            x: 0.21,
            y: 0.71,
            Y: 1.0,
        },
        Blue: CIExyY {
            x: 0.15,
            y: 0.06,
            Y: 1.0,
        },
    };
    let curve = ToneCurve::new(ADOBE_RGB_GAMMA);
    Profile::new_rgb(&white_point, &primaries, &[&curve, &curve, &curve])
        .map_err(|e| EnhanceError::Profile(format!("failed to build Adobe RGB profile: {}", e)))
}

/// ICC bytes of the sRGB IEC 61966-2.1 profile, for embedding in outputs.
pub fn srgb_icc_bytes() -> Result<Vec<u8>> {
    Profile::new_srgb()
        .icc()
        .map_err(|e| EnhanceError::Profile(format!("failed to serialize sRGB profile: {}", e)))
}
