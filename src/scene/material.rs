use crate::scene::texture::Texture;
use serde::Deserialize;
use std::{str::FromStr, sync::Arc};

/// Linear RGB color with components in `0.0..=1.0`.
#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
        )
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("expected #rrggbb, got `{s}`"));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex)
            .map_err(|e| format!("invalid color `{s}`: {e}"))
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhysicalProperties {
    pub transparent: bool,
    pub opacity: f32,
    pub roughness: f32,
    pub metalness: f32,
    pub clearcoat: f32,
    pub clearcoat_roughness: f32,
    pub transmission: f32,
    pub ior: f32,
}

impl Default for PhysicalProperties {
    fn default() -> Self {
        Self {
            transparent: false,
            opacity: 1.0,
            roughness: 1.0,
            metalness: 0.0,
            clearcoat: 0.0,
            clearcoat_roughness: 0.0,
            transmission: 0.0,
            ior: 1.5,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MaterialKind {
    Basic,
    PhysicallyBased(PhysicalProperties),
}

#[derive(Clone, Debug)]
pub struct MaterialDescriptor {
    pub name: String,
    pub kind: MaterialKind,
    pub texture: Option<Arc<Texture>>,
    pub color: Option<Color>,
}

impl MaterialDescriptor {
    pub fn basic(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: MaterialKind::Basic,
            texture: None,
            color: None,
        }
    }

    pub fn physical(name: &str, properties: PhysicalProperties) -> Self {
        Self {
            kind: MaterialKind::PhysicallyBased(properties),
            ..Self::basic(name)
        }
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn physical_properties(&self) -> Option<&PhysicalProperties> {
        match &self.kind {
            MaterialKind::Basic => None,
            MaterialKind::PhysicallyBased(properties) => Some(properties),
        }
    }

    pub fn display_color(&self) -> Color {
        self.color
            .or_else(|| self.texture.as_ref().map(|t| t.average_color()))
            .unwrap_or(Color::WHITE)
    }
}
