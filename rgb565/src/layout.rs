use core::fmt;
use core::str::FromStr;

use crate::presets::find_preset;

/// Width of a packed pixel in bits
pub const WORD_BITS: u8 = 16;

/// Color channel of a 24-bit RGB pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Channel {
    Red = 0,
    Green = 1,
    Blue = 2,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Red, Channel::Green, Channel::Blue];

    /// Offset of the channel inside an `[r, g, b]` triple
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn letter(self) -> char {
        match self {
            Channel::Red => 'R',
            Channel::Green => 'G',
            Channel::Blue => 'B',
        }
    }

    fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'r' => Some(Channel::Red),
            'g' => Some(Channel::Green),
            'b' => Some(Channel::Blue),
            _ => None,
        }
    }
}

/// Bit field occupied by one channel inside the packed word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSlot {
    pub channel: Channel,
    /// Number of high bits of the 8-bit channel that survive packing
    pub bits: u8,
    /// Position of the field's least significant bit
    pub shift: u8,
}

impl ChannelSlot {
    pub const fn new(channel: Channel, bits: u8, shift: u8) -> Self {
        Self { channel, bits, shift }
    }

    /// Mask of the field before shifting
    pub fn value_mask(&self) -> u16 {
        ((1u32 << self.bits) - 1) as u16
    }

    /// Mask of the field at its position in the word
    pub fn field_mask(&self) -> u16 {
        self.value_mask() << self.shift
    }

    /// Drop the low bits of an 8-bit channel value
    pub fn truncate(&self, value: u8) -> u16 {
        (value >> (8 - self.bits)) as u16
    }

    /// Expand a field value back to 8 bits by repeating its bit pattern, so
    /// an all-ones field maps to 255 and all-zeros to 0.
    pub fn expand(&self, value: u16) -> u8 {
        let value = (value & self.value_mask()) as u32;
        let bits = self.bits as u32;
        let mut acc = 0u32;
        let mut filled = 0u32;
        while filled < 8 {
            acc = (acc << bits) | value;
            filled += bits;
        }
        (acc >> (filled - 8)) as u8
    }

    fn end(&self) -> u16 {
        self.shift as u16 + self.bits as u16
    }
}

/// Reasons a channel arrangement cannot form a valid 16-bit layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// The same channel was assigned twice
    DuplicateChannel(Channel),
    /// A channel must keep between 1 and 8 bits
    InvalidWidth { channel: Channel, bits: u8 },
    /// Field widths must add up to exactly 16 bits
    WidthTotal(u8),
    /// A field extends past bit 15
    OutOfRange(Channel),
    /// Two fields share bits
    Overlap(Channel, Channel),
    /// Layout text could not be parsed
    Syntax,
    /// Layout name is neither a preset nor a field list
    UnknownPreset,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::DuplicateChannel(c) => {
                write!(f, "channel {} is assigned more than once", c.letter())
            }
            LayoutError::InvalidWidth { channel, bits } => write!(
                f,
                "channel {} has {} bits, expected 1..=8",
                channel.letter(),
                bits
            ),
            LayoutError::WidthTotal(total) => {
                write!(f, "field widths add up to {} bits, expected 16", total)
            }
            LayoutError::OutOfRange(c) => {
                write!(f, "channel {} does not fit inside 16 bits", c.letter())
            }
            LayoutError::Overlap(a, b) => {
                write!(f, "channels {} and {} overlap", a.letter(), b.letter())
            }
            LayoutError::Syntax => {
                f.write_str("expected a preset name or fields like r5@11,g6@5,b5@0[,swap]")
            }
            LayoutError::UnknownPreset => f.write_str("unknown layout preset"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LayoutError {}

/// Placement of the three channels in a packed word plus the wire byte order
#[derive(Debug, Clone, Copy)]
pub struct PackLayout {
    slots: [ChannelSlot; 3],
    swap_bytes: bool,
}

impl PackLayout {
    /// Standard RGB565: red in bits 11-15, green in 5-10, blue in 0-4
    pub const RGB565: PackLayout = PackLayout::from_fields(
        [
            ChannelSlot::new(Channel::Red, 5, 11),
            ChannelSlot::new(Channel::Green, 6, 5),
            ChannelSlot::new(Channel::Blue, 5, 0),
        ],
        false,
    );

    /// Standard RGB565 with the two bytes of each word exchanged on the wire
    pub const RGB565_SWAPPED: PackLayout = PackLayout::from_fields(
        [
            ChannelSlot::new(Channel::Red, 5, 11),
            ChannelSlot::new(Channel::Green, 6, 5),
            ChannelSlot::new(Channel::Blue, 5, 0),
        ],
        true,
    );

    /// Build a layout without validation, for compile-time tables only
    pub(crate) const fn from_fields(slots: [ChannelSlot; 3], swap_bytes: bool) -> Self {
        Self { slots, swap_bytes }
    }

    /// Create a validated layout
    pub fn new(slots: [ChannelSlot; 3], swap_bytes: bool) -> Result<Self, LayoutError> {
        let layout = Self { slots, swap_bytes };
        layout.validate()?;
        Ok(layout)
    }

    /// Check that every channel appears once and the fields tile 16 bits
    pub fn validate(&self) -> Result<(), LayoutError> {
        let mut seen = [false; 3];
        let mut total = 0u8;

        for slot in &self.slots {
            if seen[slot.channel.index()] {
                return Err(LayoutError::DuplicateChannel(slot.channel));
            }
            seen[slot.channel.index()] = true;

            if slot.bits == 0 || slot.bits > 8 {
                return Err(LayoutError::InvalidWidth {
                    channel: slot.channel,
                    bits: slot.bits,
                });
            }
            if slot.end() > WORD_BITS as u16 {
                return Err(LayoutError::OutOfRange(slot.channel));
            }
            total += slot.bits;
        }

        if total != WORD_BITS {
            return Err(LayoutError::WidthTotal(total));
        }

        for (i, a) in self.slots.iter().enumerate() {
            for b in &self.slots[i + 1..] {
                if a.field_mask() & b.field_mask() != 0 {
                    return Err(LayoutError::Overlap(a.channel, b.channel));
                }
            }
        }

        Ok(())
    }

    pub fn slots(&self) -> &[ChannelSlot; 3] {
        &self.slots
    }

    /// Slot assigned to a channel
    pub fn slot(&self, channel: Channel) -> ChannelSlot {
        // Validated layouts hold each channel exactly once
        self.slots
            .iter()
            .copied()
            .find(|s| s.channel == channel)
            .unwrap_or(ChannelSlot::new(channel, 0, 0))
    }

    pub fn swaps_bytes(&self) -> bool {
        self.swap_bytes
    }

    /// Same channel placement with the given byte order
    pub fn with_byte_swap(mut self, swap_bytes: bool) -> Self {
        self.swap_bytes = swap_bytes;
        self
    }

    /// Pack an RGB888 color into the logical 16-bit word
    pub fn pack(&self, rgb: [u8; 3]) -> u16 {
        self.slots.iter().fold(0u16, |word, slot| {
            word | (slot.truncate(rgb[slot.channel.index()]) << slot.shift)
        })
    }

    /// Inverse of [`pack`](Self::pack); each channel is within its truncation step
    pub fn unpack(&self, word: u16) -> [u8; 3] {
        let mut rgb = [0u8; 3];
        for slot in &self.slots {
            rgb[slot.channel.index()] = slot.expand(word >> slot.shift);
        }
        rgb
    }

    /// Pack a color and apply the configured byte order
    pub fn encode(&self, rgb: [u8; 3]) -> u16 {
        let word = self.pack(rgb);
        if self.swap_bytes {
            word.swap_bytes()
        } else {
            word
        }
    }

    /// Inverse of [`encode`](Self::encode)
    pub fn decode(&self, word: u16) -> [u8; 3] {
        let word = if self.swap_bytes { word.swap_bytes() } else { word };
        self.unpack(word)
    }

    /// Largest difference between a channel and its decoded value
    pub fn max_error(&self, channel: Channel) -> u8 {
        ((1u16 << (8 - self.slot(channel).bits)) - 1) as u8
    }
}

/// Layouts are equal when every channel sits in the same field, whatever
/// order the slots were listed in.
impl PartialEq for PackLayout {
    fn eq(&self, other: &Self) -> bool {
        self.swap_bytes == other.swap_bytes
            && Channel::ALL
                .iter()
                .all(|&c| self.slot(c) == other.slot(c))
    }
}

impl Eq for PackLayout {}

impl Default for PackLayout {
    fn default() -> Self {
        PackLayout::RGB565
    }
}

/// Renders as `R5@11 G6@5 B5@0`, most significant field first
impl fmt::Display for PackLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut slots = self.slots;
        slots.sort_unstable_by(|a, b| b.shift.cmp(&a.shift));
        for (i, slot) in slots.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}{}@{}", slot.channel.letter(), slot.bits, slot.shift)?;
        }
        if self.swap_bytes {
            f.write_str(" swapped")?;
        }
        Ok(())
    }
}

/// Accepts a preset name (`rgb565`, `bgr565-swapped`, ...) or an explicit
/// field list such as `r5@11,g6@5,b5@0,swap`.
impl FromStr for PackLayout {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(preset) = find_preset(s) {
            return Ok(preset.layout);
        }
        if !s.contains('@') {
            return Err(LayoutError::UnknownPreset);
        }

        let mut slots = [ChannelSlot::new(Channel::Red, 0, 0); 3];
        let mut count = 0;
        let mut swap_bytes = false;

        for part in s.split(',').map(str::trim) {
            if part.eq_ignore_ascii_case("swap") {
                swap_bytes = true;
                continue;
            }
            if count == slots.len() {
                return Err(LayoutError::Syntax);
            }
            slots[count] = parse_field(part)?;
            count += 1;
        }

        if count != slots.len() {
            return Err(LayoutError::Syntax);
        }
        PackLayout::new(slots, swap_bytes)
    }
}

fn parse_field(field: &str) -> Result<ChannelSlot, LayoutError> {
    let mut chars = field.chars();
    let channel = chars
        .next()
        .and_then(Channel::from_letter)
        .ok_or(LayoutError::Syntax)?;
    let (bits, shift) = chars
        .as_str()
        .split_once('@')
        .ok_or(LayoutError::Syntax)?;
    let bits = bits.parse::<u8>().map_err(|_| LayoutError::Syntax)?;
    let shift = shift.parse::<u8>().map_err(|_| LayoutError::Syntax)?;
    Ok(ChannelSlot::new(channel, bits, shift))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_primaries() {
        let layout = PackLayout::RGB565;
        assert_eq!(layout.pack([255, 255, 255]), 0xFFFF);
        assert_eq!(layout.pack([0, 0, 0]), 0x0000);
        assert_eq!(layout.pack([255, 0, 0]), 0xF800);
        assert_eq!(layout.pack([0, 255, 0]), 0x07E0);
        assert_eq!(layout.pack([0, 0, 255]), 0x001F);
    }

    #[test]
    fn test_byte_swap_applies_on_encode_only() {
        let layout = PackLayout::RGB565.with_byte_swap(true);
        assert_eq!(layout, PackLayout::RGB565_SWAPPED);
        assert_eq!(layout.pack([255, 0, 0]), 0xF800);
        assert_eq!(layout.encode([255, 0, 0]), 0x00F8);
        assert_eq!(layout.decode(0x00F8), [255, 0, 0]);
    }

    #[test]
    fn test_expand_replicates_bits() {
        let five = ChannelSlot::new(Channel::Red, 5, 11);
        assert_eq!(five.expand(0x1F), 255);
        assert_eq!(five.expand(0), 0);
        assert_eq!(five.expand(0b10000), 0b1000_0100);

        let one = ChannelSlot::new(Channel::Blue, 1, 0);
        assert_eq!(one.expand(1), 255);
    }

    #[test]
    fn test_standard_round_trip_all_colors() {
        let layout = PackLayout::RGB565;
        let bounds = [8i16, 4, 8];

        for r in 0..=255u8 {
            for g in 0..=255u8 {
                for b in 0..=255u8 {
                    let rgb = [r, g, b];
                    let back = layout.decode(layout.encode(rgb));
                    for c in 0..3 {
                        let err = (rgb[c] as i16 - back[c] as i16).abs();
                        assert!(err < bounds[c], "{:?} -> {:?}", rgb, back);
                    }
                }
            }
        }
    }

    #[test]
    fn test_validation_rejects_bad_layouts() {
        let dup = [
            ChannelSlot::new(Channel::Red, 5, 11),
            ChannelSlot::new(Channel::Red, 6, 5),
            ChannelSlot::new(Channel::Blue, 5, 0),
        ];
        assert_eq!(
            PackLayout::new(dup, false),
            Err(LayoutError::DuplicateChannel(Channel::Red))
        );

        let short = [
            ChannelSlot::new(Channel::Red, 5, 11),
            ChannelSlot::new(Channel::Green, 5, 5),
            ChannelSlot::new(Channel::Blue, 5, 0),
        ];
        assert_eq!(PackLayout::new(short, false), Err(LayoutError::WidthTotal(15)));

        let overlap = [
            ChannelSlot::new(Channel::Red, 5, 10),
            ChannelSlot::new(Channel::Green, 6, 5),
            ChannelSlot::new(Channel::Blue, 5, 0),
        ];
        assert_eq!(
            PackLayout::new(overlap, false),
            Err(LayoutError::Overlap(Channel::Red, Channel::Green))
        );

        let wide = [
            ChannelSlot::new(Channel::Red, 5, 12),
            ChannelSlot::new(Channel::Green, 6, 5),
            ChannelSlot::new(Channel::Blue, 5, 0),
        ];
        assert_eq!(
            PackLayout::new(wide, false),
            Err(LayoutError::OutOfRange(Channel::Red))
        );

        assert_eq!(
            "r5@250,g6@5,b5@0".parse::<PackLayout>(),
            Err(LayoutError::OutOfRange(Channel::Red))
        );
    }

    #[test]
    fn test_parse_field_list() {
        let layout: PackLayout = "b5@11, g6@5, r5@0, swap".parse().unwrap();
        assert!(layout.swaps_bytes());
        assert_eq!(layout.pack([0, 0, 255]), 0xF800);
        assert_eq!(layout.encode([0, 0, 255]), 0x00F8);

        assert_eq!("rgb565".parse::<PackLayout>(), Ok(PackLayout::RGB565));
        assert_eq!("r5@11,g6@5".parse::<PackLayout>(), Err(LayoutError::Syntax));
        assert_eq!("nope".parse::<PackLayout>(), Err(LayoutError::UnknownPreset));
    }

    #[test]
    fn test_equality_ignores_slot_order() {
        let reordered: PackLayout = "b5@0,r5@11,g6@5".parse().unwrap();
        assert_eq!(reordered, PackLayout::RGB565);
        assert_ne!(reordered.with_byte_swap(true), PackLayout::RGB565);
    }

    #[test]
    fn test_display() {
        let text = std::format!("{}", PackLayout::RGB565);
        assert_eq!(text, "R5@11 G6@5 B5@0");
        let text = std::format!("{}", PackLayout::RGB565.with_byte_swap(true));
        assert_eq!(text, "R5@11 G6@5 B5@0 swapped");
    }
}
