//! Image viewer state: decoding, the current raster, and snapshot capture
//!
//! The decoder is injected at construction time so the viewer can be driven
//! by any collaborator that turns file bytes into RGBA pixels.

use std::io::Cursor;

use dicom_pixeldata::PixelDecoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};
use log::{debug, info};

/// Part 10 files start with a 128 byte preamble followed by `DICM`
const DICOM_PREAMBLE_LEN: usize = 128;
const DICOM_MAGIC: &[u8] = b"DICM";

#[derive(Debug, Clone, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported or corrupt image data: {0}")]
    InvalidData(String),
    #[error("file is empty")]
    Empty,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum CaptureError {
    #[error("No image canvas found to capture.")]
    NoImage,
    #[error("Viewport has no visible area to capture.")]
    EmptyViewport,
    #[error("Failed to encode snapshot: {0}")]
    Encode(String),
}

/// Decoded, displayable pixels
#[derive(Debug, Clone)]
pub struct RasterImage {
    pixels: RgbaImage,
}

impl RasterImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

pub trait ImageDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, DecodeError>;
}

/// Decoder backed by the `image` crate's format detection
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| DecodeError::InvalidData(e.to_string()))?;
        Ok(RasterImage::new(decoded.into_rgba8()))
    }
}

pub fn is_dicom(bytes: &[u8]) -> bool {
    bytes.get(DICOM_PREAMBLE_LEN..DICOM_PREAMBLE_LEN + DICOM_MAGIC.len()) == Some(DICOM_MAGIC)
}

/// Decoder for DICOM Part 10 files; renders the first frame
#[derive(Debug, Default, Clone, Copy)]
pub struct DicomDecoder;

impl ImageDecoder for DicomDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, DecodeError> {
        if bytes.is_empty() {
            return Err(DecodeError::Empty);
        }
        if !is_dicom(bytes) {
            return Err(DecodeError::InvalidData("missing DICM preamble".to_string()));
        }

        // from_reader expects the stream to start at the magic code
        let object = dicom_object::from_reader(&bytes[DICOM_PREAMBLE_LEN..])
            .map_err(|e| DecodeError::InvalidData(e.to_string()))?;
        let pixel_data = object
            .decode_pixel_data()
            .map_err(|e| DecodeError::InvalidData(e.to_string()))?;
        let frame = pixel_data
            .to_dynamic_image(0)
            .map_err(|e| DecodeError::InvalidData(e.to_string()))?;

        debug!("Decoded DICOM frame {}x{}", frame.width(), frame.height());
        Ok(RasterImage::new(frame.into_rgba8()))
    }
}

/// Sends DICOM files to `DicomDecoder` and everything else to the `image` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanDecoder;

impl ImageDecoder for ScanDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<RasterImage, DecodeError> {
        if is_dicom(bytes) {
            DicomDecoder.decode(bytes)
        } else {
            ImageCrateDecoder.decode(bytes)
        }
    }
}

pub struct Viewer {
    decoder: Box<dyn ImageDecoder>,
    image: Option<RasterImage>,
    viewport_size: (u32, u32),
}

impl Viewer {
    pub fn new(decoder: Box<dyn ImageDecoder>, viewport_width: u32, viewport_height: u32) -> Self {
        Self {
            decoder,
            image: None,
            viewport_size: (viewport_width, viewport_height),
        }
    }

    /// Decode and display new file contents.
    /// On failure the previous image is dropped, leaving the viewer empty.
    pub fn load(&mut self, bytes: &[u8]) -> Result<&RasterImage, DecodeError> {
        self.image = None;
        let raster = self.decoder.decode(bytes)?;
        let (w, h) = raster.dimensions();
        info!("Decoded image {}x{}", w, h);
        Ok(self.image.insert(raster))
    }

    pub fn unload(&mut self) {
        self.image = None;
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    /// Rendered pixel size of the viewport the image is displayed in
    pub fn viewport_size(&self) -> (u32, u32) {
        self.viewport_size
    }

    #[cfg(test)]
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport_size = (width, height);
    }

    /// Render the current image the way the viewport shows it (stretched to
    /// the viewport) and encode it as PNG.
    pub fn capture_png(&self) -> Result<Vec<u8>, CaptureError> {
        let raster = self.image.as_ref().ok_or(CaptureError::NoImage)?;
        let (width, height) = self.viewport_size;
        if width == 0 || height == 0 {
            return Err(CaptureError::EmptyViewport);
        }

        let rendered = if raster.dimensions() == (width, height) {
            raster.pixels().clone()
        } else {
            image::imageops::resize(raster.pixels(), width, height, FilterType::Triangle)
        };

        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(rendered)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| CaptureError::Encode(e.to_string()))?;

        debug!("Captured {}x{} snapshot ({} bytes)", width, height, buffer.len());
        Ok(buffer)
    }
}
