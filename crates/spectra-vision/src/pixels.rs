use image::{
    imageops::{self, FilterType},
    Rgb, RgbImage, RgbaImage,
};
use spectra_types::{
    geometry::{Point, Region, Size},
    Result,
};

use crate::vision_error;

/// Copy `region` out of `image`, clamped to the image bounds.
pub fn crop(image: &RgbImage, region: Region) -> RgbImage {
    imageops::crop_imm(image, region.x, region.y, region.width, region.height).to_image()
}

pub fn resize(image: &RgbImage, size: Size) -> RgbImage {
    if image.dimensions() == (size.width, size.height) {
        return image.clone();
    }
    imageops::resize(image, size.width, size.height, FilterType::Triangle)
}

pub fn solid_fill(color: Rgb<u8>, size: Size) -> RgbImage {
    RgbImage::from_pixel(size.width, size.height, color)
}

pub fn pixel_at(image: &RgbImage, point: Point) -> Result<Rgb<u8>> {
    image
        .get_pixel_checked(point.x, point.y)
        .copied()
        .ok_or_else(|| {
            vision_error(format!(
                "pixel ({}, {}) outside {}x{} image",
                point.x,
                point.y,
                image.width(),
                image.height()
            ))
        })
}

/// Alpha-composite a transparent `icon` onto an opaque `background` of the
/// same size.
pub fn overlay(background: &RgbImage, icon: &RgbaImage) -> Result<RgbImage> {
    if background.dimensions() != icon.dimensions() {
        return Err(vision_error(format!(
            "overlay size mismatch: background {:?}, icon {:?}",
            background.dimensions(),
            icon.dimensions()
        )));
    }
    let mut out = background.clone();
    for (dst, src) in out.pixels_mut().zip(icon.pixels()) {
        let alpha = src[3] as u32;
        for channel in 0..3 {
            let fg = src[channel] as u32;
            let bg = dst[channel] as u32;
            dst[channel] = ((fg * alpha + bg * (255 - alpha) + 127) / 255) as u8;
        }
    }
    Ok(out)
}
