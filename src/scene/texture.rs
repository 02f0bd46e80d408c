use crate::assets::AssetHandle;
use crate::scene::material::Color;
use image::{DynamicImage, GenericImageView};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ColorSpace {
    #[default]
    Srgb,
}

#[derive(Debug)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl TextureData {
    pub fn from_image(image: DynamicImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: image.to_rgba8().into_raw(),
        }
    }

    pub fn solid(color: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            data: color.to_vec(),
        }
    }
}

/// A decoded texture, shared read-only between material descriptors.
///
/// Baked textures come out of the modelling tool already in glTF UV
/// orientation, so rows are stored top-down and never flipped.
#[derive(Debug)]
pub struct Texture {
    pub handle: AssetHandle,
    pub name: String,
    pub texture_data: TextureData,
    flip_y: bool,
    color_space: ColorSpace,
}

impl Texture {
    pub fn from_2d_data(handle: AssetHandle, name: &str, texture_data: TextureData) -> Self {
        Self {
            handle,
            name: name.to_string(),
            texture_data,
            flip_y: false,
            color_space: ColorSpace::Srgb,
        }
    }

    pub fn flip_y(&self) -> bool {
        self.flip_y
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub fn average_color(&self) -> Color {
        let texels = self.texture_data.data.chunks_exact(4);
        let count = texels.len();
        if count == 0 {
            return Color::WHITE;
        }

        let sum = texels.fold([0u64; 3], |mut acc, texel| {
            acc[0] += texel[0] as u64;
            acc[1] += texel[1] as u64;
            acc[2] += texel[2] as u64;
            acc
        });
        let scale = 1.0 / (count as f32 * 255.0);
        Color::new(
            sum[0] as f32 * scale,
            sum[1] as f32 * scale,
            sum[2] as f32 * scale,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn textures_are_srgb_and_unflipped() {
        let texture = Texture::from_2d_data(
            AssetHandle::default(),
            "baked.jpg",
            TextureData::solid([255, 0, 0, 255]),
        );
        assert!(!texture.flip_y());
        assert_eq!(texture.color_space(), ColorSpace::Srgb);
    }

    #[test]
    fn average_color_of_two_texels() {
        let texture = Texture::from_2d_data(
            AssetHandle::default(),
            "split",
            TextureData {
                width: 2,
                height: 1,
                data: vec![255, 0, 0, 255, 0, 0, 255, 255],
            },
        );
        let color = texture.average_color();
        assert!((color.r - 0.5).abs() < 1e-3);
        assert!(color.g.abs() < 1e-3);
        assert!((color.b - 0.5).abs() < 1e-3);
    }
}
