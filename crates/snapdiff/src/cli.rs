use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{CompareConfig, MarkerConfig};
use crate::store;

#[derive(Parser)]
#[command(
    name = "snapdiff",
    about = "Visual regression comparison of reference and candidate images"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create .snapdiff/config.toml with default settings
    Init {
        /// Overwrite existing config
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Compare a candidate image (or directory of PNGs) against a reference (exit 0/1)
    Compare {
        /// Reference image or directory
        reference: PathBuf,
        /// Candidate image or directory
        candidate: PathBuf,
        /// Mask image; opaque black pixels are ignored (overrides config)
        #[arg(long)]
        mask: Option<PathBuf>,
        /// Config file (default: .snapdiff/config.toml)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Directory for difference, marked and mask images
        #[arg(long, short = 'o', default_value = store::DEFAULT_OUTPUT_DIR)]
        out: PathBuf,
        /// Print each comparison result as a JSON line
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        compare: CompareConfig,
        #[command(flatten)]
        marker: MarkerConfig,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AlgorithmKind;
    use snapdiff::MarkerStyle;

    #[test]
    fn compare_flags_parse() {
        let cli = Cli::try_parse_from([
            "snapdiff",
            "compare",
            "a.png",
            "b.png",
            "--algorithm",
            "color-fuzzy",
            "--color-tolerance",
            "0.05",
            "--marker",
            "point",
            "--mark-width",
            "3",
        ])
        .unwrap();
        let Command::Compare {
            reference,
            compare,
            marker,
            out,
            ..
        } = cli.command
        else {
            panic!("expected compare");
        };
        assert_eq!(reference, PathBuf::from("a.png"));
        assert_eq!(compare.algorithm, Some(AlgorithmKind::ColorFuzzy));
        assert_eq!(compare.color_tolerance, Some(0.05));
        assert_eq!(marker.style, Some(MarkerStyle::Point));
        assert_eq!(marker.width, Some(3));
        assert_eq!(out, PathBuf::from(store::DEFAULT_OUTPUT_DIR));
    }

    #[test]
    fn tolerance_out_of_range_is_rejected() {
        let parsed = Cli::try_parse_from([
            "snapdiff",
            "compare",
            "a.png",
            "b.png",
            "--pixel-tolerance",
            "1.2",
        ]);
        assert!(parsed.is_err());
    }
}
