//! Image Encoder
//!
//! Turns a rendered [`FrameSurface`] into a binary-safe image payload.
//! Extraction runs through an ordered list of named strategies, native
//! file-producing exports before blob-producing ones, and only falls back
//! to reconstructing bytes from the surface's text-encoded data-URI dump
//! when no native primitive is available. The strategy list itself is a
//! queryable artifact so the preference order can be asserted without
//! caring which platform primitives back each entry.
//!
//! This component raises no user-facing errors: an unrecognized format
//! name silently defaults to PNG, matching the lenient contract callers
//! rely on.

use crate::error::{CaptureError, Result};
use crate::payload::FormPayload;
use crate::surface::FrameSurface;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Requested image format for the encoded payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// PNG, the lossless default
    #[default]
    Png,
    /// JPEG
    #[serde(rename = "jpg", alias = "jpeg")]
    Jpeg,
}

impl ImageFormat {
    /// Lenient parse: `"jpg"` (or `"jpeg"`) selects JPEG, anything else
    /// falls back to PNG
    pub fn parse_lenient(name: &str) -> Self {
        match name {
            "jpg" | "jpeg" => Self::Jpeg,
            _ => Self::Png,
        }
    }

    /// MIME type for the format
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Suggested filename for a multipart file field
    pub fn filename(&self) -> &'static str {
        match self {
            Self::Png => "image.png",
            Self::Jpeg => "image.jpg",
        }
    }
}

/// Binary image payload ready for multipart submission
///
/// Derived once at take time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Encoded image bytes
    pub bytes: Vec<u8>,
    /// MIME type of the bytes
    pub mime: &'static str,
    /// Suggested filename
    pub filename: &'static str,
}

// ============================================================================
// Extraction strategies
// ============================================================================

/// A named "extract the visible surface as encoded bytes" primitive
pub trait ExtractionStrategy: Send + Sync {
    /// Stable strategy name, used in logs and preference-order assertions
    fn name(&self) -> &str;

    /// Try to extract encoded bytes; `None` when the surface does not
    /// offer this primitive
    fn extract(&self, surface: &FrameSurface, mime: &str) -> Option<Vec<u8>>;
}

/// Native file-producing export
struct SurfaceFileStrategy;

impl ExtractionStrategy for SurfaceFileStrategy {
    fn name(&self) -> &str {
        "surface-file"
    }

    fn extract(&self, surface: &FrameSurface, mime: &str) -> Option<Vec<u8>> {
        surface.export_file(mime)
    }
}

/// Native blob-producing export
struct SurfaceBlobStrategy;

impl ExtractionStrategy for SurfaceBlobStrategy {
    fn name(&self) -> &str {
        "surface-blob"
    }

    fn extract(&self, surface: &FrameSurface, mime: &str) -> Option<Vec<u8>> {
        surface.export_blob(mime)
    }
}

// ============================================================================
// Binary buffer assembly
// ============================================================================

/// Wraps reconstructed bytes into the final binary buffer
///
/// Two constructors exist for the same reason two data-URI decoders do:
/// hosts that lack the native buffer constructor still carry a legacy
/// chunk-appending builder.
pub trait BufferAssembler: Send + Sync {
    /// Stable assembler name
    fn name(&self) -> &str;

    /// Whether the host offers this constructor
    fn available(&self) -> bool;

    /// Build the final buffer from the reconstructed byte sequence
    fn assemble(&self, bytes: &[u8]) -> Vec<u8>;
}

/// Native buffer constructor: one pass, byte by byte
pub struct NativeBufferAssembler {
    available: bool,
}

impl NativeBufferAssembler {
    /// Native constructor, available by default
    pub fn new() -> Self {
        Self { available: true }
    }

    /// Builder: mark the constructor unavailable (tests, legacy hosts)
    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = available;
        self
    }
}

impl Default for NativeBufferAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferAssembler for NativeBufferAssembler {
    fn name(&self) -> &str {
        "native-buffer"
    }

    fn available(&self) -> bool {
        self.available
    }

    fn assemble(&self, bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(bytes.len());
        for &b in bytes {
            out.push(b);
        }
        out
    }
}

/// Legacy chunk-appending builder, the last resort
pub struct ChunkedBuilderAssembler {
    chunk_size: usize,
}

impl ChunkedBuilderAssembler {
    /// Builder with the legacy default chunk size
    pub fn new() -> Self {
        Self { chunk_size: 4096 }
    }
}

impl Default for ChunkedBuilderAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl BufferAssembler for ChunkedBuilderAssembler {
    fn name(&self) -> &str {
        "chunked-builder"
    }

    fn available(&self) -> bool {
        true
    }

    fn assemble(&self, bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(bytes.len());
        for chunk in bytes.chunks(self.chunk_size.max(1)) {
            out.extend_from_slice(chunk);
        }
        out
    }
}

// ============================================================================
// Encoder
// ============================================================================

/// Image encoder with an ordered extraction fallback chain
pub struct Encoder {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    assemblers: Vec<Box<dyn BufferAssembler>>,
}

impl Default for Encoder {
    fn default() -> Self {
        Self {
            // File-producing exports before blob-producing ones.
            strategies: vec![Box::new(SurfaceFileStrategy), Box::new(SurfaceBlobStrategy)],
            assemblers: vec![
                Box::new(NativeBufferAssembler::new()),
                Box::new(ChunkedBuilderAssembler::new()),
            ],
        }
    }
}

impl Encoder {
    /// Encoder with the default strategy and assembler chains
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoder with custom assembler availability (tests, legacy hosts)
    pub fn with_assemblers(mut self, assemblers: Vec<Box<dyn BufferAssembler>>) -> Self {
        self.assemblers = assemblers;
        self
    }

    /// The extraction preference order
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Encode a surface into a binary image payload
    ///
    /// Tries each extraction strategy in order; when none applies, falls
    /// back to decoding the surface's text-encoded data-URI dump and
    /// reconstructing the bytes manually.
    pub fn encode(&self, surface: &FrameSurface, format: ImageFormat) -> Result<EncodedImage> {
        let mime = format.mime();

        for strategy in &self.strategies {
            if let Some(bytes) = strategy.extract(surface, mime) {
                debug!(strategy = strategy.name(), mime, "extracted surface natively");
                return Ok(EncodedImage {
                    bytes,
                    mime,
                    filename: format.filename(),
                });
            }
        }

        debug!(mime, "no native extraction primitive, using data-URI fallback");
        let data_url = surface
            .export_data_url(mime)
            .ok_or_else(|| CaptureError::encoding("surface could not be exported"))?;
        let bytes = decode_data_url(&data_url)?;
        let bytes = self.assemble(&bytes)?;

        Ok(EncodedImage {
            bytes,
            mime,
            filename: format.filename(),
        })
    }

    /// Encode a surface and attach the result to an outgoing form payload
    /// under `field_name`
    pub fn attach(
        &self,
        payload: &mut FormPayload,
        field_name: &str,
        surface: &FrameSurface,
        format: ImageFormat,
    ) -> Result<()> {
        let image = self.encode(surface, format)?;
        payload.append_image(field_name, image);
        Ok(())
    }

    /// Wrap reconstructed bytes with the first available constructor
    fn assemble(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        for assembler in &self.assemblers {
            if assembler.available() {
                debug!(assembler = assembler.name(), "assembling binary buffer");
                return Ok(assembler.assemble(bytes));
            }
        }
        Err(CaptureError::encoding("no binary buffer constructor"))
    }
}

/// Decode a data-URI payload to raw bytes
///
/// A base64-marked header takes the base64 decoder; everything else is
/// percent-decoded. Using the wrong decoder corrupts every byte, so the
/// marker check comes first.
fn decode_data_url(data_url: &str) -> Result<Vec<u8>> {
    let (header, payload) = data_url
        .split_once(',')
        .ok_or_else(|| CaptureError::encoding("malformed data URI"))?;

    if header.contains("base64") {
        BASE64
            .decode(payload)
            .map_err(|e| CaptureError::encoding(format!("base64 payload: {}", e)))
    } else {
        Ok(percent_decode_str(payload).collect())
    }
}

/// Parse a caller-supplied format name, logging when it falls back
///
/// Leniency is the contract here: malformed input defaults to PNG rather
/// than failing the session.
pub fn parse_format(name: &str) -> ImageFormat {
    let format = ImageFormat::parse_lenient(name);
    if format == ImageFormat::Png && !name.is_empty() && name != "png" {
        warn!(name, "unrecognized image format, defaulting to png");
    }
    format
}
