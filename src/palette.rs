//! Color palettes
//!
//! A palette maps semantic roles (container fill, backdrop, four shape slots,
//! accent) to colors. Palettes never carry geometry, so swapping one is always
//! a cosmetic change.

use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// Backdrop used when nothing else is specified
pub const BACKGROUND_COLOR: Color = Color::rgb8(0xFC, 0xFC, 0xFC);
/// Accent body color unless the palette overrides it
pub const GOLD_COLOR: Color = Color::rgb8(0xF5, 0xC5, 0x18);

/// RGBA color with sRGB-encoded channels, serialized as `#RRGGBB[AA]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const fn rgb8(r: u8, g: u8, b: u8) -> Self {
        Self([r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0])
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional)
    pub fn from_hex(s: &str) -> Result<Self, ColorError> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 && digits.len() != 8 {
            return Err(ColorError::BadLength(s.to_string()));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::BadDigit(s.to_string()));
        }

        let mut rgba = [1.0f32; 4];
        for (i, channel) in rgba.iter_mut().enumerate().take(digits.len() / 2) {
            let byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
                .map_err(|_| ColorError::BadDigit(s.to_string()))?;
            *channel = byte as f32 / 255.0;
        }
        Ok(Self(rgba))
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.0.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
        if a == 255 {
            format!("#{:02X}{:02X}{:02X}", r, g, b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
        }
    }

    pub fn to_wgpu(&self) -> wgpu::Color {
        wgpu::Color {
            r: self.0[0] as f64,
            g: self.0[1] as f64,
            b: self.0[2] as f64,
            a: self.0[3] as f64,
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::from_hex(&s)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

/// The four shape color slots, in palette order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeSlot {
    Square,
    Bar,
    Triangle,
    Hexagon,
}

impl ShapeSlot {
    pub const ALL: [ShapeSlot; 4] = [
        ShapeSlot::Square,
        ShapeSlot::Bar,
        ShapeSlot::Triangle,
        ShapeSlot::Hexagon,
    ];

    /// Slot for an ordinal, cycling through the four slots
    pub fn from_index(i: usize) -> Self {
        Self::ALL[i % Self::ALL.len()]
    }
}

/// Role a dynamic body plays in the palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorSlot {
    Accent,
    Shape(ShapeSlot),
}

/// Built-in palette identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteId {
    #[default]
    Constructivist,
    Original,
    Ember,
}

impl PaletteId {
    pub const ALL: [PaletteId; 3] = [
        PaletteId::Constructivist,
        PaletteId::Original,
        PaletteId::Ember,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaletteId::Constructivist => "constructivist",
            PaletteId::Original => "original",
            PaletteId::Ember => "ember",
        }
    }

    pub fn palette(&self) -> Palette {
        Palette::builtin(*self)
    }
}

/// Mapping from semantic slot to color
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    pub id: PaletteId,
    pub name: String,
    /// Fill of the container's interior region
    pub container: Color,
    /// Canvas backdrop and wall fill
    pub background: Color,
    pub square: Color,
    pub bar: Color,
    pub triangle: Color,
    pub hexagon: Color,
    /// Accent body override; gold is kept when absent
    #[serde(default)]
    pub accent: Option<Color>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::builtin(PaletteId::default())
    }
}

impl Palette {
    pub fn builtin(id: PaletteId) -> Self {
        match id {
            PaletteId::Constructivist => Self {
                id,
                name: "Constructivist".to_string(),
                container: Color::rgb8(0x1A, 0x1A, 0x1A),
                square: Color::rgb8(0x1B, 0x4B, 0xA8),
                bar: Color::rgb8(0x1B, 0x4B, 0xA8),
                triangle: Color::rgb8(0x1A, 0x6B, 0x3A),
                hexagon: Color::rgb8(0xB0, 0x1A, 0x1A),
                background: Color::rgb8(0xE7, 0xE0, 0xD6),
                accent: None,
            },
            PaletteId::Original => Self {
                id,
                name: "Original".to_string(),
                container: Color::rgb8(0x8B, 0x7E, 0xA8),
                square: Color::rgb8(0xAD, 0xD8, 0xE6),
                bar: Color::rgb8(0xE8, 0x89, 0x4A),
                triangle: Color::rgb8(0x8F, 0xBA, 0x8F),
                hexagon: Color::rgb8(0x2E, 0x4A, 0x8B),
                background: Color::rgb8(0xE7, 0xE0, 0xD6),
                accent: None,
            },
            PaletteId::Ember => Self {
                id,
                name: "Ember".to_string(),
                container: Color::rgb8(0x2B, 0x1B, 0x17),
                square: Color::rgb8(0xE2, 0x58, 0x22),
                bar: Color::rgb8(0xF2, 0x8C, 0x28),
                triangle: Color::rgb8(0xB3, 0x3A, 0x3A),
                hexagon: Color::rgb8(0x6B, 0x2D, 0x1F),
                background: Color::rgb8(0xF3, 0xE9, 0xDC),
                accent: Some(Color::rgb8(0xFF, 0xD1, 0x66)),
            },
        }
    }

    pub fn shape(&self, slot: ShapeSlot) -> Color {
        match slot {
            ShapeSlot::Square => self.square,
            ShapeSlot::Bar => self.bar,
            ShapeSlot::Triangle => self.triangle,
            ShapeSlot::Hexagon => self.hexagon,
        }
    }

    pub fn resolve(&self, slot: ColorSlot) -> Color {
        match slot {
            ColorSlot::Accent => self.accent.unwrap_or(GOLD_COLOR),
            ColorSlot::Shape(s) => self.shape(s),
        }
    }
}
