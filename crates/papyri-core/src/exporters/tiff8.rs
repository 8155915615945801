//! 8-bit TIFF writer with an embedded ICC profile

use std::borrow::Cow;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use tiff::encoder::{colortype, TiffEncoder, TiffValue};
use tiff::tags::{Tag, Type};

use crate::classify::{Classification, RasterImage};
use crate::error::Result;

/// ICCProfile, written as UNDEFINED bytes
pub const TAG_ICC_PROFILE: u16 = 34675;

struct UndefinedBytes<'a>(&'a [u8]);

impl TiffValue for UndefinedBytes<'_> {
    const BYTE_LEN: u8 = 1;
    const FIELD_TYPE: Type = Type::UNDEFINED;

    fn count(&self) -> usize {
        self.0.len()
    }

    fn data(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.0)
    }
}

/// Write `image` as an uncompressed 8-bit TIFF, RGB or grayscale.
///
/// `icc_profile` is embedded in RGB files only.
pub fn export_tiff8(image: &RasterImage, path: &Path, icc_profile: Option<&[u8]>) -> Result<()> {
    let file = File::create(path)?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file))?;

    match image.classification {
        Classification::Color => {
            let mut tiff = encoder.new_image::<colortype::RGB8>(image.width, image.height)?;
            if let Some(icc) = icc_profile {
                tiff.encoder()
                    .write_tag(Tag::Unknown(TAG_ICC_PROFILE), UndefinedBytes(icc))?;
            }
            tiff.write_data(&image.data)?;
        }
        Classification::Grayscale(_) => {
            // The sRGB profile describes RGB data only
            let tiff = encoder.new_image::<colortype::Gray8>(image.width, image.height)?;
            tiff.write_data(&image.data)?;
        }
    }
    Ok(())
}
