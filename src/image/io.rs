//! I/O helpers for depth frames, masks, normal fields and JSON.
//!
//! - `load_depth_png`: read a 16-bit grayscale PNG (millimetres) into a [`DepthImage`].
//! - `save_depth_png`: write a [`DepthImage`] back as 16-bit grayscale.
//! - `save_mask_png`: write a [`Mask`] as an 8-bit grayscale PNG.
//! - `save_normals_png`: visualize a [`NormalField`] as RGB (`(n + 1) / 2`).
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{DepthImage, ImageView, Mask};
use crate::normals::NormalField;
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load a depth PNG. Anything but 16-bit grayscale is rejected.
pub fn load_depth_png(path: &Path) -> Result<DepthImage, String> {
    let decoded =
        image::open(path).map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    let DynamicImage::ImageLuma16(img) = decoded else {
        return Err(format!(
            "depth PNG must be 16-bit grayscale (millimetres), {} is {:?}",
            path.display(),
            decoded.color()
        ));
    };
    let w = img.width() as usize;
    let h = img.height() as usize;
    Ok(DepthImage::from_vec(w, h, img.into_raw()))
}

pub fn save_depth_png(depth: &DepthImage, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let image: ImageBuffer<Luma<u16>, Vec<u16>> =
        ImageBuffer::from_raw(depth.w as u32, depth.h as u32, depth.data.clone())
            .ok_or_else(|| "Failed to create depth image buffer".to_string())?;
    image
        .save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

pub fn save_mask_png(mask: &Mask, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let image = GrayImage::from_raw(mask.w as u32, mask.h as u32, mask.data.clone())
        .ok_or_else(|| "Failed to create mask image buffer".to_string())?;
    image
        .save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Invalid (zero) normals are rendered black.
pub fn save_normals_png(normals: &NormalField, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let mut out = RgbImage::new(normals.w as u32, normals.h as u32);
    for (y, row) in normals.rows().enumerate() {
        for (x, n) in row.iter().enumerate() {
            if n.norm_squared() == 0.0 {
                continue;
            }
            let to_u8 = |v: f32| ((v + 1.0) * 0.5 * 255.0).clamp(0.0, 255.0) as u8;
            out.put_pixel(x as u32, y as u32, Rgb([to_u8(n.x), to_u8(n.y), to_u8(n.z)]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
