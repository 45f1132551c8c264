#![cfg_attr(not(feature = "std"), no_std)]

//! RGB565 pixel codec for 480×480 puzzle panels.
//!
//! A [`PackLayout`] describes where each color channel lives inside the
//! 16-bit word and whether the two bytes of that word are swapped before
//! they hit the wire. The candidate layouts used while calibrating panels are
//! kept as named [`presets`].

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "std")]
use std::vec::Vec;

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use crc::{Crc, CRC_16_IBM_SDLC};

pub mod layout;
pub mod presets;
pub mod stream;

pub use layout::{Channel, ChannelSlot, LayoutError, PackLayout};
pub use presets::{find_preset, Preset, PRESETS};
pub use stream::{
    decode_stream, encode_stream, encode_words, stream_len, CodecError, PixelBuffer,
};

/// CRC-16 calculator used to fingerprint emitted pixel streams
pub const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_SDLC);

/// Bytes per packed pixel
pub const BYTES_PER_PIXEL: usize = 2;

/// Channel count accepted by the codec
pub const RGB_CHANNELS: u8 = 3;

/// Edge length of the target display
pub const PANEL_SIZE: u32 = 480;

/// Checksum of an encoded stream, printed next to generated artifacts so a
/// file copied to the device can be compared against the host side.
pub fn stream_checksum(bytes: &[u8]) -> u16 {
    CRC16.checksum(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_changes_with_layout() {
        let pixels = [10u8, 200, 30, 255, 0, 128];
        let buffer = PixelBuffer::new(&pixels, 2, 1, RGB_CHANNELS).unwrap();

        let standard = encode_stream(&buffer, &PackLayout::RGB565);
        let swapped = encode_stream(&buffer, &PackLayout::RGB565.with_byte_swap(true));

        assert_ne!(stream_checksum(&standard), stream_checksum(&swapped));
        assert_eq!(stream_checksum(&standard), stream_checksum(&standard.clone()));
    }

    #[test]
    fn test_panel_frame_size() {
        assert_eq!(
            stream_len(PANEL_SIZE, PANEL_SIZE),
            (PANEL_SIZE * PANEL_SIZE) as usize * BYTES_PER_PIXEL
        );
        assert_eq!(stream_len(PANEL_SIZE, PANEL_SIZE), 460_800);
    }
}
