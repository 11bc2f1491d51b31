use std::time::Duration;

use super::Verdict;

pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

/// One result line, without the timing suffix.
pub fn format_line(name: &str, verdict: &Verdict) -> String {
    match verdict {
        Verdict::Pass => format!("  \x1b[32mPASS\x1b[0m  {name}"),
        Verdict::Fail {
            differences,
            regions,
            dimension_mismatch,
        } => {
            if let Some((rw, rh, cw, ch)) = dimension_mismatch {
                format!(
                    "  \x1b[31mFAIL\x1b[0m  {name}  (dimensions changed: {rw}x{rh} -> {cw}x{ch}, {differences} pixels)"
                )
            } else {
                format!(
                    "  \x1b[31mFAIL\x1b[0m  {name}  ({differences} pixels in {regions} region(s))"
                )
            }
        }
        Verdict::Missing => format!("  \x1b[33mMISS\x1b[0m  {name}  (no reference)"),
        Verdict::Error(msg) => format!("  \x1b[31m ERR\x1b[0m  {name}  ({msg})"),
    }
}

/// Print a single comparison result line.
pub fn print_line(name: &str, verdict: &Verdict, elapsed: Duration) {
    println!(
        "{}  \x1b[2m{}\x1b[0m",
        format_line(name, verdict),
        format_duration(elapsed)
    );
}

/// Print an actionable summary listing names grouped by verdict.
/// Only prints sections with at least one entry.
pub fn print_actionable_summary(failed: &[String], missing: &[String], errored: &[String]) {
    if failed.is_empty() && missing.is_empty() && errored.is_empty() {
        return;
    }

    println!();
    println!("Actionable images:");

    for (label, names) in [
        ("Failed", failed),
        ("Missing reference", missing),
        ("Errored", errored),
    ] {
        if !names.is_empty() {
            println!();
            println!("  {label} ({}):", names.len());
            for name in names {
                println!("    {name}");
            }
        }
    }
}

/// Print the final summary.
pub fn print_summary(
    total: usize,
    passed: usize,
    failed: usize,
    missing: usize,
    errored: usize,
    elapsed: Duration,
) {
    println!();
    print!(
        "Images:  {total} total, \x1b[32m{passed} passed\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
    );
    if missing > 0 {
        print!(", \x1b[33m{missing} missing\x1b[0m");
    }
    if errored > 0 {
        print!(", \x1b[31m{errored} errored\x1b[0m");
    }
    println!();
    println!("Time:    {}", format_duration(elapsed));
}
