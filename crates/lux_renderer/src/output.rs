//! Writing rendered images to disk.
//!
//! The renderer hands over a flat row-major RGB8 buffer; encoding is left
//! to the `image` crate, except for the plain-text PPM preview which is
//! written directly.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageFormat};
use thiserror::Error;

use crate::renderer::ImageBuffer;

/// Errors that can occur while writing an image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Encode(#[from] image::ImageError),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
}

pub type OutputResult<T> = Result<T, OutputError>;

/// JPEG quality used for `.jpg` output.
const JPEG_QUALITY: u8 = 100;

/// Write the image as a plain-text (P3) PPM.
pub fn write_ppm<W: Write>(image: &ImageBuffer, mut writer: W) -> OutputResult<()> {
    writeln!(writer, "P3")?;
    writeln!(writer, "{} {}", image.width, image.height)?;
    writeln!(writer, "255")?;

    for rgb in image.to_rgb8().chunks_exact(3) {
        writeln!(writer, "{} {} {}", rgb[0], rgb[1], rgb[2])?;
    }

    writer.flush()?;
    Ok(())
}

/// Encode the image in a binary format into `writer`.
pub fn encode_image<W: Write>(image: &ImageBuffer, format: ImageFormat, mut writer: W) -> OutputResult<()> {
    let rgb = image.to_rgb8();
    match format {
        ImageFormat::Jpeg => {
            let mut encoder = JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY);
            encoder.encode(&rgb, image.width, image.height, ColorType::Rgb8)?;
        }
        ImageFormat::Png => {
            use image::ImageEncoder;
            image::codecs::png::PngEncoder::new(&mut writer).write_image(
                &rgb,
                image.width,
                image.height,
                ColorType::Rgb8,
            )?;
        }
        other => return Err(OutputError::UnsupportedFormat(format!("{other:?}"))),
    }
    writer.flush()?;
    Ok(())
}

/// Save the image, choosing the format from the file extension.
///
/// `.ppm` writes the text preview; `.png`, `.jpg` and `.jpeg` are encoded.
pub fn save_image(image: &ImageBuffer, path: impl AsRef<Path>) -> OutputResult<()> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let format = match extension.as_str() {
        "ppm" => None,
        "png" => Some(ImageFormat::Png),
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        _ => return Err(OutputError::UnsupportedFormat(path.display().to_string())),
    };

    let writer = BufWriter::new(File::create(path)?);
    match format {
        None => write_ppm(image, writer)?,
        Some(format) => encode_image(image, format, writer)?,
    }

    log::info!("Saved {}", path.display());
    Ok(())
}
