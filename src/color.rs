//! Color helpers over [`RGB8`].
//!
//! These mirror the small FastLED vocabulary effects are written against
//! (`scale8`, saturating add, blend, hue wheel, 16-entry palettes). No gamma
//! work happens here; that belongs to the output driver.
#![expect(clippy::arithmetic_side_effects, reason = "8-bit channel math widened to u16")]

pub use smart_leds::RGB8;
/// Predefined RGB color constants from the `smart_leds` crate.
#[doc(inline)]
pub use smart_leds::colors;
use smart_leds::hsv::{Hsv, hsv2rgb};

/// Scale `value` by `scale / 256`.
#[must_use]
pub const fn scale8(value: u8, scale: u8) -> u8 {
    ((value as u16 * (scale as u16 + 1)) >> 8) as u8
}

/// Scale each channel by `scale / 256`.
#[must_use]
pub const fn scale_color(color: RGB8, scale: u8) -> RGB8 {
    RGB8::new(
        scale8(color.r, scale),
        scale8(color.g, scale),
        scale8(color.b, scale),
    )
}

/// Darken `color` by `amount / 256`.
#[must_use]
pub const fn fade_to_black(color: RGB8, amount: u8) -> RGB8 {
    scale_color(color, 255 - amount)
}

/// Channelwise saturating sum.
#[must_use]
pub const fn saturating_add(lhs: RGB8, rhs: RGB8) -> RGB8 {
    RGB8::new(
        lhs.r.saturating_add(rhs.r),
        lhs.g.saturating_add(rhs.g),
        lhs.b.saturating_add(rhs.b),
    )
}

/// Mix `overlay` into `existing`; `amount` 0 keeps `existing`, 255 is almost all `overlay`.
#[must_use]
pub const fn blend(existing: RGB8, overlay: RGB8, amount: u8) -> RGB8 {
    const fn channel(from: u8, to: u8, amount: u8) -> u8 {
        let keep = 255 - amount;
        ((from as u16 * keep as u16 + to as u16 * amount as u16) / 255) as u8
    }
    RGB8::new(
        channel(existing.r, overlay.r, amount),
        channel(existing.g, overlay.g, amount),
        channel(existing.b, overlay.b, amount),
    )
}

/// Fully saturated color on the 8-bit hue wheel.
#[must_use]
pub fn hue(hue: u8) -> RGB8 {
    hsv(hue, 255, 255)
}

/// Convert hue/saturation/value to RGB.
#[must_use]
pub fn hsv(hue: u8, sat: u8, val: u8) -> RGB8 {
    hsv2rgb(Hsv { hue, sat, val })
}

/// Brightest channel value.
#[must_use]
pub fn brightness(color: RGB8) -> u8 {
    color.r.max(color.g).max(color.b)
}

/// One of the fixed 16-entry gradients effects can draw from.
///
/// Lookups blend linearly between neighboring entries and wrap from the
/// last entry back to the first.
///
/// ```
/// use led_projector::color::{Palette, colors};
///
/// assert_eq!(Palette::Heat.color(0, 255), colors::BLACK);
/// assert_eq!(Palette::from_index(1), Palette::Lava);
/// assert_eq!(Palette::NAMES[Palette::Rainbow as usize], "Rainbow");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Palette {
    /// Blues and white.
    Cloud,
    /// Black through reds to white.
    Lava,
    /// Deep blues and sea greens.
    Ocean,
    /// Greens.
    Forest,
    /// The hue wheel.
    #[default]
    Rainbow,
    /// The hue wheel with black between the stripes.
    RainbowStripe,
    /// Purples, reds, and oranges.
    Party,
    /// Black through red and yellow to white.
    Heat,
}

impl Palette {
    /// Display names, by selector index.
    pub const NAMES: [&'static str; 8] = [
        "Cloud",
        "Lava",
        "Ocean",
        "Forest",
        "Rainbow",
        "RainbowStripe",
        "Party",
        "Heat",
    ];

    /// The palette at selector `index`. Out-of-range indices fall back to [`Palette::Party`].
    #[must_use]
    pub const fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Cloud,
            1 => Self::Lava,
            2 => Self::Ocean,
            3 => Self::Forest,
            4 => Self::Rainbow,
            5 => Self::RainbowStripe,
            7 => Self::Heat,
            _ => Self::Party,
        }
    }

    /// The 16 gradient stops.
    #[must_use]
    pub const fn entries(self) -> &'static [RGB8; 16] {
        match self {
            Self::Cloud => &CLOUD,
            Self::Lava => &LAVA,
            Self::Ocean => &OCEAN,
            Self::Forest => &FOREST,
            Self::Rainbow => &RAINBOW,
            Self::RainbowStripe => &RAINBOW_STRIPE,
            Self::Party => &PARTY,
            Self::Heat => &HEAT,
        }
    }

    /// Color at `index` (0..=255 spans the palette once), scaled by `brightness`.
    #[must_use]
    pub fn color(self, index: u8, brightness: u8) -> RGB8 {
        let entries = self.entries();
        let stop = usize::from(index >> 4);
        let from = entries.get(stop).copied().unwrap_or_default();
        let to = entries.get((stop + 1) % entries.len()).copied().unwrap_or_default();
        let mixed = blend(from, to, (index & 0x0f) << 4);
        if brightness == 255 {
            mixed
        } else {
            scale_color(mixed, brightness)
        }
    }
}

const fn rgb(hex: u32) -> RGB8 {
    RGB8::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

const CLOUD: [RGB8; 16] = {
    use colors::{BLUE, DARK_BLUE, LIGHT_BLUE, SKY_BLUE, WHITE};
    [
        BLUE, DARK_BLUE, DARK_BLUE, DARK_BLUE, DARK_BLUE, DARK_BLUE, DARK_BLUE, DARK_BLUE, BLUE,
        DARK_BLUE, SKY_BLUE, SKY_BLUE, LIGHT_BLUE, WHITE, LIGHT_BLUE, SKY_BLUE,
    ]
};

const LAVA: [RGB8; 16] = {
    use colors::{BLACK, DARK_RED, MAROON, ORANGE, RED, WHITE};
    [
        BLACK, MAROON, BLACK, MAROON, DARK_RED, DARK_RED, MAROON, DARK_RED, DARK_RED, DARK_RED,
        RED, ORANGE, WHITE, ORANGE, RED, DARK_RED,
    ]
};

const OCEAN: [RGB8; 16] = {
    use colors::{
        AQUA, AQUAMARINE, BLUE, CADET_BLUE, CORNFLOWER_BLUE, DARK_BLUE, DARK_CYAN, LIGHT_SKY_BLUE,
        MEDIUM_BLUE, MIDNIGHT_BLUE, NAVY, SEA_GREEN, TEAL,
    };
    [
        MIDNIGHT_BLUE, DARK_BLUE, MIDNIGHT_BLUE, NAVY, DARK_BLUE, MEDIUM_BLUE, SEA_GREEN, TEAL,
        CADET_BLUE, BLUE, DARK_CYAN, CORNFLOWER_BLUE, AQUAMARINE, SEA_GREEN, AQUA, LIGHT_SKY_BLUE,
    ]
};

const FOREST: [RGB8; 16] = {
    use colors::{
        DARK_GREEN, DARK_OLIVE_GREEN, FOREST_GREEN, GREEN, LAWN_GREEN, LIGHT_GREEN, LIME_GREEN,
        MEDIUM_AQUAMARINE, OLIVE_DRAB, SEA_GREEN, YELLOW_GREEN,
    };
    [
        DARK_GREEN, DARK_GREEN, DARK_OLIVE_GREEN, DARK_GREEN, GREEN, FOREST_GREEN, OLIVE_DRAB,
        GREEN, SEA_GREEN, MEDIUM_AQUAMARINE, LIME_GREEN, YELLOW_GREEN, LIGHT_GREEN, LAWN_GREEN,
        MEDIUM_AQUAMARINE, FOREST_GREEN,
    ]
};

const RAINBOW: [RGB8; 16] = [
    rgb(0xFF0000),
    rgb(0xD52A00),
    rgb(0xAB5500),
    rgb(0xAB7F00),
    rgb(0xABAB00),
    rgb(0x56D500),
    rgb(0x00FF00),
    rgb(0x00D52A),
    rgb(0x00AB55),
    rgb(0x0056AA),
    rgb(0x0000FF),
    rgb(0x2A00D5),
    rgb(0x5500AB),
    rgb(0x7F0081),
    rgb(0xAB0055),
    rgb(0xD5002B),
];

const RAINBOW_STRIPE: [RGB8; 16] = [
    rgb(0xFF0000),
    rgb(0x000000),
    rgb(0xAB5500),
    rgb(0x000000),
    rgb(0xABAB00),
    rgb(0x000000),
    rgb(0x00FF00),
    rgb(0x000000),
    rgb(0x00AB55),
    rgb(0x000000),
    rgb(0x0000FF),
    rgb(0x000000),
    rgb(0x5500AB),
    rgb(0x000000),
    rgb(0xAB0055),
    rgb(0x000000),
];

const PARTY: [RGB8; 16] = [
    rgb(0x5500AB),
    rgb(0x84007C),
    rgb(0xB5004B),
    rgb(0xE5001B),
    rgb(0xE81700),
    rgb(0xB84700),
    rgb(0xAB7700),
    rgb(0xABAB00),
    rgb(0xAB5500),
    rgb(0xDD2200),
    rgb(0xF2000E),
    rgb(0xC2003E),
    rgb(0x8F0071),
    rgb(0x5F00A1),
    rgb(0x2F00D0),
    rgb(0x0007F9),
];

const HEAT: [RGB8; 16] = [
    rgb(0x000000),
    rgb(0x330000),
    rgb(0x660000),
    rgb(0x990000),
    rgb(0xCC0000),
    rgb(0xFF0000),
    rgb(0xFF3300),
    rgb(0xFF6600),
    rgb(0xFF9900),
    rgb(0xFFCC00),
    rgb(0xFFFF00),
    rgb(0xFFFF33),
    rgb(0xFFFF66),
    rgb(0xFFFF99),
    rgb(0xFFFFCC),
    rgb(0xFFFFFF),
];
