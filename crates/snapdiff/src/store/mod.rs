use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::RgbaImage;

pub const DEFAULT_OUTPUT_DIR: &str = ".snapdiff/output";
pub const DIFFERENCE_SUFFIX: &str = "difference";
pub const MARKED_SUFFIX: &str = "marked";
pub const MASK_SUFFIX: &str = "mask";

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// `{out}/{id}.{suffix}.png`
pub fn output_path(out: &Path, id: &str, suffix: &str) -> PathBuf {
    out.join(format!("{id}.{suffix}.png"))
}

pub fn read_image(path: &Path) -> Result<RgbaImage> {
    let image = image::ImageReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read {}", path.display()))?
        .decode()
        .with_context(|| format!("Failed to decode {}", path.display()))?;
    Ok(image.to_rgba8())
}

pub fn write_output(out: &Path, id: &str, suffix: &str, image: &RgbaImage) -> Result<PathBuf> {
    let path = output_path(out, id, suffix);
    ensure_parent(&path)?;
    image
        .save_with_format(&path, image::ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Remove stale outputs of a previous failing run for this id.
pub fn clean_output(out: &Path, id: &str) {
    let _ = std::fs::remove_file(output_path(out, id, DIFFERENCE_SUFFIX));
    let _ = std::fs::remove_file(output_path(out, id, MARKED_SUFFIX));
    let _ = std::fs::remove_file(output_path(out, id, MASK_SUFFIX));
}

/// Recursively walk a directory, collecting all `.png` files as IDs
/// (relative path without the `.png` extension).
fn collect_png_ids(base: &Path, dir: &Path, ids: &mut BTreeSet<String>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_png_ids(base, &path, ids);
        } else if path.extension().is_some_and(|e| e == "png")
            && let Ok(rel) = path.strip_prefix(base)
        {
            let id = rel.with_extension("");
            ids.insert(id.to_string_lossy().into_owned());
        }
    }
}

pub fn list_png_ids(dir: &Path) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    collect_png_ids(dir, dir, &mut ids);
    ids
}

pub fn png_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}.png"))
}
