//! Heatmap overlays on radiographs.

use std::path::Path;

use dxai_core::Heatmap;
use image::{ImageFormat, Rgb, RgbImage};

use crate::colormap::jet;
use crate::error::{Result, VizError};

/// Bilinear resize with pixel-centre alignment.
pub fn resize_heatmap(heatmap: &Heatmap, width: usize, height: usize) -> Heatmap {
    let (src_w, src_h) = (heatmap.width(), heatmap.height());
    if src_w == 0 || src_h == 0 || width == 0 || height == 0 {
        return Heatmap::zeros(width, height);
    }

    let scale_x = src_w as f32 / width as f32;
    let scale_y = src_h as f32 / height as f32;
    let at = |x: usize, y: usize| heatmap.values()[y * src_w + x];

    let mut values = Vec::with_capacity(width * height);
    for y in 0..height {
        let sy = ((y as f32 + 0.5) * scale_y - 0.5).clamp(0.0, (src_h - 1) as f32);
        let y0 = sy.floor() as usize;
        let y1 = (y0 + 1).min(src_h - 1);
        let ty = sy - y0 as f32;

        for x in 0..width {
            let sx = ((x as f32 + 0.5) * scale_x - 0.5).clamp(0.0, (src_w - 1) as f32);
            let x0 = sx.floor() as usize;
            let x1 = (x0 + 1).min(src_w - 1);
            let tx = sx - x0 as f32;

            let top = at(x0, y0) * (1.0 - tx) + at(x1, y0) * tx;
            let bottom = at(x0, y1) * (1.0 - tx) + at(x1, y1) * tx;
            values.push(top * (1.0 - ty) + bottom * ty);
        }
    }

    Heatmap::new(width, height, values).unwrap_or_else(|_| Heatmap::zeros(width, height))
}

/// Jet-coloured heatmap blended onto `image`: `clip(jet(heat) * alpha + image)`.
pub fn superimpose(image: &RgbImage, heatmap: &Heatmap, alpha: f32) -> RgbImage {
    let (width, height) = image.dimensions();
    let heat = resize_heatmap(heatmap, width as usize, height as usize);

    let mut out = RgbImage::new(width, height);
    for (x, y, pixel) in image.enumerate_pixels() {
        let value = heat.get(x as usize, y as usize).unwrap_or(0.0);
        let color = jet(value);
        let blended: [u8; 3] = std::array::from_fn(|c| {
            let v = f32::from(color[c]) * alpha + f32::from(pixel[c]);
            v.round().clamp(0.0, 255.0) as u8
        });
        out.put_pixel(x, y, Rgb(blended));
    }
    out
}

/// Image format for an output path, from its extension.
pub fn image_format(path: &Path) -> Result<ImageFormat> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
        "png" => Ok(ImageFormat::Png),
        _ => Err(VizError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Blend `heatmap` onto `image` and write it to `path`.
pub fn save_overlay(path: &Path, image: &RgbImage, heatmap: &Heatmap, alpha: f32) -> Result<()> {
    let format = image_format(path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    superimpose(image, heatmap, alpha).save_with_format(path, format)?;
    Ok(())
}
