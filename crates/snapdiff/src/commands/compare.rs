use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use image::RgbaImage;
use serde_json::json;
use snapdiff::{Comparison, Mask};
use tracing::debug;

use crate::config::ResolvedRunConfig;
use crate::report::{Verdict, terminal};
use crate::store;

/// Where comparison outputs go and how they are reported.
pub struct OutputOptions<'a> {
    pub dir: &'a Path,
    pub json: bool,
}

/// Build the mask for one pair. Rectangles are laid over the mask image, or
/// over an empty mask spanning the canvas of both images when there is no
/// image.
fn build_mask(
    config: &ResolvedRunConfig,
    mask_image: Option<&RgbaImage>,
    reference: &RgbaImage,
    candidate: &RgbaImage,
) -> Result<Option<Mask>> {
    let mut mask = match mask_image {
        Some(img) => Mask::from_image(img),
        None if config.mask_rects.is_empty() => return Ok(None),
        None => Mask::new(
            reference.width().max(candidate.width()),
            reference.height().max(candidate.height()),
        ),
    };
    for rect in &config.mask_rects {
        mask.add_rect(*rect)?;
    }
    Ok(Some(mask))
}

/// Run one comparison, write its images, and classify it.
fn compare_pair(
    config: &ResolvedRunConfig,
    mask_image: Option<&RgbaImage>,
    reference_path: &Path,
    candidate_path: &Path,
    id: &str,
    out: &OutputOptions<'_>,
) -> Result<Verdict> {
    let reference = store::read_image(reference_path)?;
    let candidate = store::read_image(candidate_path)?;
    let mask = build_mask(config, mask_image, &reference, &candidate)?;

    let comparison: Comparison =
        snapdiff::compare(&reference, &candidate, mask.as_ref(), config.algorithm)
            .with_context(|| format!("Failed to compare {id}"))?;
    let result = &comparison.result;

    if out.json {
        println!("{}", json!({ "id": id, "result": result }));
    }

    if result.equal {
        store::clean_output(out.dir, id);
        return Ok(Verdict::Pass);
    }

    let regions = comparison.regions(config.marking)?;
    store::write_output(
        out.dir,
        id,
        store::DIFFERENCE_SUFFIX,
        &comparison.difference_map(),
    )?;
    if let Some(marked) = comparison.mark_differences(config.marking, config.marker_style)? {
        store::write_output(out.dir, id, store::MARKED_SUFFIX, &marked)?;
    }
    if let Some(mask) = &mask {
        store::write_output(out.dir, id, store::MASK_SUFFIX, &mask.to_image())?;
    } else {
        let _ = std::fs::remove_file(store::output_path(out.dir, id, store::MASK_SUFFIX));
    }

    let e = result.extents;
    Ok(Verdict::Fail {
        differences: result.differences.len(),
        regions: regions.len(),
        dimension_mismatch: result.resized.then_some((
            e.reference.0,
            e.reference.1,
            e.candidate.0,
            e.candidate.1,
        )),
    })
}

/// `snapdiff compare`: compare two images, or every PNG in a candidate
/// directory against the same relative path in a reference directory.
/// Returns exit code: 0 = all pass, 1 = any fail, missing or error.
pub fn compare(
    config: &ResolvedRunConfig,
    reference: &Path,
    candidate: &Path,
    out: &OutputOptions<'_>,
) -> Result<i32> {
    let mask_image = config
        .mask_image
        .as_deref()
        .map(store::read_image)
        .transpose()
        .context("Failed to load mask")?;
    debug!(algorithm = ?config.algorithm, marking = ?config.marking, "resolved settings");

    let pairs: Vec<String> = match (reference.is_dir(), candidate.is_dir()) {
        (false, false) => {
            let id = candidate
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .context("Candidate path has no file name")?;
            let t = Instant::now();
            let verdict = compare_pair(
                config,
                mask_image.as_ref(),
                reference,
                candidate,
                &id,
                out,
            )?;
            terminal::print_line(&id, &verdict, t.elapsed());
            return Ok(i32::from(!matches!(verdict, Verdict::Pass)));
        }
        (true, true) => store::list_png_ids(candidate).into_iter().collect(),
        _ => bail!("Reference and candidate must both be files or both be directories"),
    };

    let run_start = Instant::now();
    let mut passed = 0usize;
    let mut failed_names: Vec<String> = Vec::new();
    let mut missing_names: Vec<String> = Vec::new();
    let mut errored_names: Vec<String> = Vec::new();

    for id in &pairs {
        let t = Instant::now();
        let reference_path = store::png_path(reference, id);
        let verdict = if reference_path.exists() {
            compare_pair(
                config,
                mask_image.as_ref(),
                &reference_path,
                &store::png_path(candidate, id),
                id,
                out,
            )
            .unwrap_or_else(|e| Verdict::Error(format!("{e:#}")))
        } else {
            Verdict::Missing
        };

        match &verdict {
            Verdict::Pass => passed += 1,
            Verdict::Fail { .. } => failed_names.push(id.clone()),
            Verdict::Missing => missing_names.push(id.clone()),
            Verdict::Error(_) => errored_names.push(id.clone()),
        }
        terminal::print_line(id, &verdict, t.elapsed());
    }

    terminal::print_actionable_summary(&failed_names, &missing_names, &errored_names);
    terminal::print_summary(
        pairs.len(),
        passed,
        failed_names.len(),
        missing_names.len(),
        errored_names.len(),
        run_start.elapsed(),
    );

    if passed == pairs.len() { Ok(0) } else { Ok(1) }
}
