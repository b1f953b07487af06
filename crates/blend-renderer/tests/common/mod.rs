//! Shared fixtures for pipeline tests
//!
//! Layers use a tiny synthetic container so tests can control dimensions,
//! alpha and warnings exactly and can observe which layers were decoded:
//!
//! ```text
//! "LYR" id:u8 flags:u8 width:u32le height:u32le pixels:[u32le; width*height]
//! ```

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use blend_core::{Palette, QuantizeMode};
use blend_renderer::backends::Warnings;
use blend_renderer::{
    Canvas, CanvasEncoder, Codecs, DecodeError, EncodeError, LayerDecoder, LayerHeader,
    LayerImage, PaletteBuilder, PngOptions,
};

pub const FLAG_ALPHA: u8 = 1;
pub const FLAG_WARN: u8 = 2;
pub const FLAG_BROKEN: u8 = 4;

pub const WARNING: &str = "synthetic warning";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Encode a synthetic layer; alpha is flagged when any pixel is not opaque
pub fn layer(id: u8, width: u32, height: u32, pixels: &[u32]) -> Vec<u8> {
    let flags = if pixels.iter().any(|&p| p >> 24 != 0xFF) {
        FLAG_ALPHA
    } else {
        0
    };
    layer_with_flags(id, flags, width, height, pixels)
}

/// Synthetic layer filled with one pixel
pub fn solid(id: u8, width: u32, height: u32, pixel: u32) -> Vec<u8> {
    layer(id, width, height, &vec![pixel; (width * height) as usize])
}

pub fn layer_with_flags(id: u8, flags: u8, width: u32, height: u32, pixels: &[u32]) -> Vec<u8> {
    let mut data = b"LYR".to_vec();
    data.push(id);
    data.push(flags);
    data.extend_from_slice(&width.to_le_bytes());
    data.extend_from_slice(&height.to_le_bytes());
    for pixel in pixels {
        data.extend_from_slice(&pixel.to_le_bytes());
    }
    data
}

/// Decoder for the synthetic container that records probe and decode calls
#[derive(Default)]
pub struct FakeDecoder {
    pub probed: Mutex<Vec<u8>>,
    pub decoded: Mutex<Vec<u8>>,
}

impl FakeDecoder {
    pub fn decoded(&self) -> Vec<u8> {
        self.decoded.lock().unwrap().clone()
    }

    pub fn probed(&self) -> Vec<u8> {
        self.probed.lock().unwrap().clone()
    }
}

fn parse(data: &[u8]) -> Result<(u8, u8, u32, u32), DecodeError> {
    if data.len() < 13 || &data[..3] != b"LYR" {
        return Err(DecodeError::new("corrupt layer"));
    }
    let width = u32::from_le_bytes(data[5..9].try_into().unwrap());
    let height = u32::from_le_bytes(data[9..13].try_into().unwrap());
    Ok((data[3], data[4], width, height))
}

impl LayerDecoder for FakeDecoder {
    fn probe(&self, data: &[u8]) -> Result<LayerHeader, DecodeError> {
        let (id, flags, width, height) = parse(data)?;
        self.probed.lock().unwrap().push(id);
        Ok(LayerHeader {
            width,
            height,
            has_alpha: flags & FLAG_ALPHA != 0,
        })
    }

    fn decode(&self, data: &[u8]) -> Result<LayerImage, DecodeError> {
        let (id, flags, width, height) = parse(data)?;
        self.decoded.lock().unwrap().push(id);
        if flags & FLAG_BROKEN != 0 {
            return Err(DecodeError::new("truncated pixel data"));
        }
        let pixels = data[13..]
            .chunks_exact(4)
            .map(|p| u32::from_le_bytes([p[0], p[1], p[2], p[3]]))
            .collect();
        let mut warnings = Warnings::new();
        if flags & FLAG_WARN != 0 {
            warnings.push(WARNING.to_string());
        }
        Ok(LayerImage {
            width,
            height,
            has_alpha: flags & FLAG_ALPHA != 0,
            pixels,
            warnings,
        })
    }
}

/// What the encoder was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    Jpeg(u8),
    Png { alpha: bool },
    Paletted { colors: usize },
}

/// Encoder that keeps every canvas it is handed
#[derive(Default)]
pub struct CaptureEncoder {
    pub calls: Mutex<Vec<(Encoded, Canvas)>>,
}

impl CaptureEncoder {
    pub fn last(&self) -> (Encoded, Canvas) {
        self.calls
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("encoder was not called")
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, encoded: Encoded, canvas: &Canvas) -> Result<Vec<u8>, EncodeError> {
        self.calls.lock().unwrap().push((encoded, canvas.clone()));
        Ok(b"encoded".to_vec())
    }
}

impl CanvasEncoder for CaptureEncoder {
    fn encode_jpeg(&self, canvas: &Canvas, quality: u8) -> Result<Vec<u8>, EncodeError> {
        self.record(Encoded::Jpeg(quality), canvas)
    }

    fn encode_png(
        &self,
        canvas: &Canvas,
        _options: &PngOptions,
        alpha: bool,
    ) -> Result<Vec<u8>, EncodeError> {
        self.record(Encoded::Png { alpha }, canvas)
    }

    fn encode_paletted(
        &self,
        canvas: &Canvas,
        palette: &Palette,
        _options: &PngOptions,
    ) -> Result<Vec<u8>, EncodeError> {
        self.record(
            Encoded::Paletted {
                colors: palette.len(),
            },
            canvas,
        )
    }
}

/// Encoder that always fails
pub struct FailingEncoder;

impl CanvasEncoder for FailingEncoder {
    fn encode_jpeg(&self, _canvas: &Canvas, _quality: u8) -> Result<Vec<u8>, EncodeError> {
        Err(EncodeError::new("disk full"))
    }

    fn encode_png(
        &self,
        _canvas: &Canvas,
        _options: &PngOptions,
        _alpha: bool,
    ) -> Result<Vec<u8>, EncodeError> {
        Err(EncodeError::new("disk full"))
    }

    fn encode_paletted(
        &self,
        _canvas: &Canvas,
        _palette: &Palette,
        _options: &PngOptions,
    ) -> Result<Vec<u8>, EncodeError> {
        Err(EncodeError::new("disk full"))
    }
}

/// Palette builder that records the strategy it was asked for
#[derive(Default)]
pub struct RecordingQuantizer {
    pub requests: Mutex<Vec<(usize, QuantizeMode)>>,
}

impl PaletteBuilder for RecordingQuantizer {
    fn build_palette(&self, _canvas: &Canvas, max_colors: usize, strategy: QuantizeMode) -> Palette {
        self.requests.lock().unwrap().push((max_colors, strategy));
        Palette::new(vec![[0, 0, 0, 255]])
    }
}

pub struct Fixture {
    pub codecs: Codecs,
    pub decoder: Arc<FakeDecoder>,
    pub encoder: Arc<CaptureEncoder>,
    pub quantizer: Arc<RecordingQuantizer>,
}

pub fn fixture() -> Fixture {
    init_logging();
    let decoder = Arc::new(FakeDecoder::default());
    let encoder = Arc::new(CaptureEncoder::default());
    let quantizer = Arc::new(RecordingQuantizer::default());
    let codecs = Codecs::standard()
        .with_decoder(decoder.clone())
        .with_encoder(encoder.clone())
        .with_quantizer(quantizer.clone());
    Fixture {
        codecs,
        decoder,
        encoder,
        quantizer,
    }
}
