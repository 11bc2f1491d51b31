use std::path::Path;

use anyhow::{Context, Result};

use super::{CONFIG_DIR, CONFIG_FILE};

/// Hand-crafted config template with commented-out keys.
/// Used by `snapdiff init` instead of `toml::to_string_pretty()` so that
/// users can see the available knobs without uncommenting section headers.
const CONFIG_TEMPLATE: &str = r#"# ─────────────────────────────────────────────────────────
# Comparison: all fields optional.
# ─────────────────────────────────────────────────────────
[compare]
# type = "pixel-fuzzy"              # "exact" | "color-fuzzy" | "pixel-fuzzy"
# color_tolerance = 0.1             # max color distance per pixel (0.0-1.0)
# pixel_tolerance = 0.2             # max share of differing pixels per block
# block_size = 10                   # block edge length in pixels

# ─────────────────────────────────────────────────────────
# Difference marking: all fields optional.
# ─────────────────────────────────────────────────────────
[marker]
# style = "box"                     # "box" | "point"
# width = 10
# height = 10

# ─────────────────────────────────────────────────────────
# Masked regions are never reported as different.
# ─────────────────────────────────────────────────────────
[mask]
# image = "mask.png"                # opaque black pixels are masked

# [[mask.rect]]
# x = 0
# y = 0
# width = 100
# height = 20
"#;

pub fn config_file_exists() -> bool {
    Path::new(CONFIG_DIR).join(CONFIG_FILE).exists()
}

/// Write the hand-crafted config template into `dir`.
pub fn write_template_in(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(CONFIG_FILE);
    std::fs::write(&path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Used by `snapdiff init`.
pub fn write_template() -> Result<()> {
    write_template_in(Path::new(CONFIG_DIR))
}
