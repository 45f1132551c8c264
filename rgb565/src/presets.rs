//! Candidate layouts tried while bringing up the 480×480 panel.
//!
//! Which arrangement the panel really expects has not been confirmed, so
//! every candidate stays available by name. `rgb-reversed` and
//! `bgr-reversed` produce the same words as `bgr565` and `rgb565`; they are
//! kept so calibration file names stay stable. In `brg` and `rbg` green
//! occupies bits 10-15, the only placement of that order that fits 16 bits.

use crate::layout::{Channel, ChannelSlot, PackLayout};
use crate::layout::Channel::{Blue as B, Green as G, Red as R};

/// Named packing layout
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub layout: PackLayout,
}

const fn fields(
    high: (Channel, u8, u8),
    mid: (Channel, u8, u8),
    low: (Channel, u8, u8),
    swap_bytes: bool,
) -> PackLayout {
    PackLayout::from_fields(
        [
            ChannelSlot::new(high.0, high.1, high.2),
            ChannelSlot::new(mid.0, mid.1, mid.2),
            ChannelSlot::new(low.0, low.1, low.2),
        ],
        swap_bytes,
    )
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "rgb565",
        description: "standard RGB565",
        layout: PackLayout::RGB565,
    },
    Preset {
        name: "bgr565",
        description: "red and blue exchanged",
        layout: fields((B, 5, 11), (G, 6, 5), (R, 5, 0), false),
    },
    Preset {
        name: "grb",
        description: "green low, red middle, blue high",
        layout: fields((B, 5, 11), (R, 5, 6), (G, 6, 0), false),
    },
    Preset {
        name: "brg",
        description: "blue low, red middle, green high",
        layout: fields((G, 6, 10), (R, 5, 5), (B, 5, 0), false),
    },
    Preset {
        name: "gbr",
        description: "green low, blue middle, red high",
        layout: fields((R, 5, 11), (B, 5, 6), (G, 6, 0), false),
    },
    Preset {
        name: "rbg",
        description: "red low, blue middle, green high",
        layout: fields((G, 6, 10), (B, 5, 5), (R, 5, 0), false),
    },
    Preset {
        name: "rgb565-swapped",
        description: "standard RGB565, bytes swapped",
        layout: PackLayout::RGB565_SWAPPED,
    },
    Preset {
        name: "bgr565-swapped",
        description: "red and blue exchanged, bytes swapped",
        layout: fields((B, 5, 11), (G, 6, 5), (R, 5, 0), true),
    },
    Preset {
        name: "rgb-reversed",
        description: "red low, green middle, blue high",
        layout: fields((B, 5, 11), (G, 6, 5), (R, 5, 0), false),
    },
    Preset {
        name: "bgr-reversed",
        description: "blue low, green middle, red high",
        layout: fields((R, 5, 11), (G, 6, 5), (B, 5, 0), false),
    },
];

/// Look up a preset by name, ignoring case and `_`/`-` differences
pub fn find_preset(name: &str) -> Option<&'static Preset> {
    let name = name.trim();
    PRESETS.iter().find(|preset| {
        preset.name.len() == name.len()
            && preset
                .name
                .chars()
                .zip(name.chars())
                .all(|(a, b)| a == normalize(b))
    })
}

fn normalize(c: char) -> char {
    match c {
        '_' => '-',
        c => c.to_ascii_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_all_presets_valid() {
        assert_eq!(PRESETS.len(), 10);
        for preset in PRESETS {
            assert_eq!(preset.layout.validate(), Ok(()), "{}", preset.name);
        }
    }

    #[test]
    fn test_presets_match_calibration_formulas() {
        let (r, g, b) = (0b10110u16, 0b101101u16, 0b01011u16);
        let rgb = [(r << 3) as u8, (g << 2) as u8, (b << 3) as u8];
        let expected: [(&str, u16); 10] = [
            ("rgb565", (r << 11) | (g << 5) | b),
            ("bgr565", (b << 11) | (g << 5) | r),
            ("grb", g | (r << 6) | (b << 11)),
            ("brg", b | (r << 5) | (g << 10)),
            ("gbr", g | (b << 6) | (r << 11)),
            ("rbg", r | (b << 5) | (g << 10)),
            ("rgb565-swapped", ((r << 11) | (g << 5) | b).swap_bytes()),
            ("bgr565-swapped", ((b << 11) | (g << 5) | r).swap_bytes()),
            ("rgb-reversed", r | (g << 5) | (b << 11)),
            ("bgr-reversed", b | (g << 5) | (r << 11)),
        ];

        for (name, word) in expected {
            let preset = find_preset(name).unwrap();
            assert_eq!(preset.layout.encode(rgb), word, "{}", name);
        }
    }

    #[test]
    fn test_find_preset_is_lenient() {
        assert_eq!(find_preset("RGB565_Swapped").unwrap().name, "rgb565-swapped");
        assert!(find_preset("rgb666").is_none());
    }

    proptest! {
        #[test]
        fn prop_round_trip_within_truncation(
            index in 0..PRESETS.len(),
            r in any::<u8>(),
            g in any::<u8>(),
            b in any::<u8>(),
        ) {
            let layout = PRESETS[index].layout;
            let rgb = [r, g, b];
            let back = layout.decode(layout.encode(rgb));
            for channel in Channel::ALL {
                let i = channel.index();
                let err = (rgb[i] as i16 - back[i] as i16).unsigned_abs();
                prop_assert!(err <= layout.max_error(channel) as u16);
                let step = 1u16 << (8 - layout.slot(channel).bits);
                prop_assert!(err < step);
            }
        }
    }
}
