//! Option validation
//!
//! Each validator takes one raw option and returns the typed value or the
//! caller-facing error message. [`BlendRequest::from_options`] runs them in a
//! single pass; the first failure ends validation and nothing is built.

use crate::utils::{parse_hex_color, BlendError, Result};

use super::{
    BlendOptions, BlendRequest, EncodeOptions, LayerInput, LayerSpec, OutputFormat, PngEncoder,
    QuantizeMode, Tint, TintOptions, TintRange, DEFAULT_COMPRESSION, DEFAULT_JPEG_QUALITY,
};

/// Validate the output format name (PNG when absent)
pub fn validate_format(format: Option<&str>) -> Result<OutputFormat> {
    match format {
        None | Some("png") => Ok(OutputFormat::Png),
        Some("jpeg" | "jpg") => Ok(OutputFormat::Jpeg),
        Some(_) => Err(BlendError::invalid_request("Invalid output format.")),
    }
}

/// Validate quality for the chosen format
///
/// JPEG accepts 0-100 with 0 meaning the default of 80. PNG accepts 0 (no
/// quantization) or a palette size of 2-256.
pub fn validate_quality(format: OutputFormat, quality: Option<i64>) -> Result<u32> {
    let quality = quality.unwrap_or(0);
    match format {
        OutputFormat::Jpeg => match quality {
            0 => Ok(DEFAULT_JPEG_QUALITY),
            1..=100 => Ok(quality as u32),
            _ => Err(BlendError::invalid_request("JPEG quality is range 0-100.")),
        },
        OutputFormat::Png => match quality {
            0 | 2..=256 => Ok(quality as u32),
            _ => Err(BlendError::invalid_request(
                "PNG images must be quantized between 2 and 256 colors.",
            )),
        },
    }
}

/// Validate the quantization mode name (octree when absent)
pub fn validate_mode(mode: Option<&str>) -> Result<QuantizeMode> {
    match mode {
        None | Some("octree" | "o") => Ok(QuantizeMode::Octree),
        Some("hextree" | "h") => Ok(QuantizeMode::Hextree),
        Some(_) => Err(BlendError::invalid_request("Invalid quantization mode.")),
    }
}

/// Validate the PNG writer name (libpng when absent)
pub fn validate_encoder(encoder: Option<&str>) -> Result<PngEncoder> {
    match encoder {
        None | Some("libpng") => Ok(PngEncoder::Libpng),
        Some("miniz") => Ok(PngEncoder::Miniz),
        Some(_) => Err(BlendError::invalid_request("Invalid PNG encoder.")),
    }
}

/// Validate compression against the writer's maximum
///
/// Missing or non-positive levels fall back to the default.
pub fn validate_compression(encoder: PngEncoder, compression: Option<i64>) -> Result<u8> {
    let max = encoder.max_compression();
    match compression {
        None => Ok(DEFAULT_COMPRESSION),
        Some(level) if level <= 0 => Ok(DEFAULT_COMPRESSION),
        Some(level) if level > i64::from(max) => Err(BlendError::invalid_request(format!(
            "Compression level must be between 1 and {max}"
        ))),
        Some(level) => Ok(level as u8),
    }
}

/// Validate explicit canvas dimensions, 0 meaning "derive from layers"
pub fn validate_dimensions(width: Option<i64>, height: Option<i64>) -> Result<(u32, u32)> {
    let width = width.unwrap_or(0);
    let height = height.unwrap_or(0);
    if width < 0 || height < 0 {
        return Err(BlendError::invalid_request(
            "Image dimensions must be greater than 0.",
        ));
    }
    match (i32::try_from(width), i32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w as u32, h as u32)),
        _ => Err(BlendError::InvalidDimensions { width, height }),
    }
}

/// Validate the matte color (transparent black when absent)
pub fn validate_matte(matte: Option<&str>) -> Result<u32> {
    matte.map_or(Ok(0), parse_hex_color)
}

fn validate_tint_range(name: &str, range: Option<&[f64]>) -> Result<TintRange> {
    match range {
        None => Ok(TintRange::default()),
        Some(&[low, high]) => Ok(TintRange::new(low, high)),
        Some(_) => Err(BlendError::invalid_request(format!(
            "{name} array must be a pair of values"
        ))),
    }
}

/// Validate tint ranges; any tint object turns the tint stage on
pub fn validate_tint(tint: Option<&TintOptions>) -> Result<Tint> {
    let Some(tint) = tint else {
        return Ok(Tint::identity());
    };
    Ok(Tint {
        hue: validate_tint_range("h", tint.h.as_deref())?,
        saturation: validate_tint_range("s", tint.s.as_deref())?,
        lightness: validate_tint_range("l", tint.l.as_deref())?,
        alpha: validate_tint_range("a", tint.a.as_deref())?,
        identity: false,
    })
}

/// Validate layer payloads against the requested canvas size
///
/// An empty layer list is only allowed when both dimensions are given, in
/// which case the result is a matte-filled canvas.
pub fn validate_layers(layers: Vec<LayerSpec>, width: u32, height: u32) -> Result<Vec<LayerInput>> {
    if layers.is_empty() && (width == 0 || height == 0) {
        return Err(BlendError::invalid_request(
            "Without layers, you have to specify width and height.",
        ));
    }
    layers
        .into_iter()
        .enumerate()
        .map(|(index, layer)| match layer.data {
            Some(data) => Ok(LayerInput {
                data,
                x: layer.x,
                y: layer.y,
            }),
            None => Err(BlendError::invalid_request(format!(
                "Layer {index} has no image data"
            ))),
        })
        .collect()
}

impl BlendRequest {
    /// Validate caller options and layers into a request
    ///
    /// A non-zero matte implies `reencode`, so a lone matching layer with
    /// transparency still gets composited over the matte.
    ///
    /// # Errors
    ///
    /// Returns `BlendError::InvalidRequest` with the caller-facing message for
    /// the first option that fails validation.
    pub fn from_options(layers: Vec<LayerSpec>, options: &BlendOptions) -> Result<Self> {
        let format = validate_format(options.format.as_deref())?;
        let quality = validate_quality(format, options.quality)?;
        let matte = validate_matte(options.matte.as_deref())?;
        let reencode = options.reencode.unwrap_or(false) || matte != 0;
        let mode = validate_mode(options.mode.as_deref())?;
        let encoder = validate_encoder(options.encoder.as_deref())?;
        let compression = validate_compression(encoder, options.compression)?;
        let tint = validate_tint(options.tint.as_ref())?;
        let (width, height) = validate_dimensions(options.width, options.height)?;
        let layers = validate_layers(layers, width, height)?;

        Ok(Self {
            layers,
            width,
            height,
            matte,
            reencode,
            encode: EncodeOptions {
                format,
                quality,
                compression,
                encoder,
                mode,
                palette: options.palette.clone(),
            },
            tint,
        })
    }
}
