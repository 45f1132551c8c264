use core::fmt;

use crate::layout::PackLayout;
use crate::{Vec, BYTES_PER_PIXEL, RGB_CHANNELS};

/// Errors raised while turning pixel buffers into packed streams
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    /// Only 3-channel RGB buffers are accepted
    ChannelCount(u8),
    /// Width or height is zero
    EmptyImage,
    /// Buffer length does not match width × height × channels
    LengthMismatch { expected: usize, actual: usize },
    /// A packed stream must hold whole 16-bit words
    OddStreamLength(usize),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::ChannelCount(n) => write!(
                f,
                "expected {} color channels, got {} (convert to RGB first)",
                RGB_CHANNELS, n
            ),
            CodecError::EmptyImage => f.write_str("image has zero width or height"),
            CodecError::LengthMismatch { expected, actual } => write!(
                f,
                "pixel buffer holds {} bytes, expected {}",
                actual, expected
            ),
            CodecError::OddStreamLength(len) => {
                write!(f, "stream length {} is not a whole number of pixels", len)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for CodecError {}

/// Borrowed, validated view over interleaved RGB888 pixels in row-major order
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
}

impl<'a> PixelBuffer<'a> {
    /// Wrap raw pixel bytes; anything but 3 channels is rejected
    pub fn new(data: &'a [u8], width: u32, height: u32, channels: u8) -> Result<Self, CodecError> {
        if channels != RGB_CHANNELS {
            return Err(CodecError::ChannelCount(channels));
        }
        if width == 0 || height == 0 {
            return Err(CodecError::EmptyImage);
        }

        let expected = width as usize * height as usize * RGB_CHANNELS as usize;
        if data.len() != expected {
            return Err(CodecError::LengthMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self { data, width, height })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + 'a {
        self.data
            .chunks_exact(RGB_CHANNELS as usize)
            .map(|p| [p[0], p[1], p[2]])
    }
}

/// Exact byte length of the stream for an image
pub fn stream_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * BYTES_PER_PIXEL
}

/// Packed words in row-major order, byte order already applied
pub fn encode_words(buffer: &PixelBuffer<'_>, layout: &PackLayout) -> Vec<u16> {
    buffer.pixels().map(|rgb| layout.encode(rgb)).collect()
}

/// Headerless stream of little-endian words, `width × height × 2` bytes
pub fn encode_stream(buffer: &PixelBuffer<'_>, layout: &PackLayout) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(stream_len(buffer.width(), buffer.height()));
    for rgb in buffer.pixels() {
        bytes.extend_from_slice(&layout.encode(rgb).to_le_bytes());
    }
    bytes
}

/// Unpack a stream produced by [`encode_stream`] with the same layout
pub fn decode_stream(bytes: &[u8], layout: &PackLayout) -> Result<Vec<[u8; 3]>, CodecError> {
    if bytes.len() % BYTES_PER_PIXEL != 0 {
        return Err(CodecError::OddStreamLength(bytes.len()));
    }

    Ok(bytes
        .chunks_exact(BYTES_PER_PIXEL)
        .map(|w| layout.decode(u16::from_le_bytes([w[0], w[1]])))
        .collect())
}
