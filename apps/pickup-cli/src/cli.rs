//! Argument definitions for the `pickup-barcode` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Render cafeteria pickup tokens as EAN-13 barcodes.
#[derive(Debug, Parser)]
#[command(name = "pickup-barcode", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render one token (12 or 13 digits) as standalone SVG.
    Render {
        /// Token digits; 12 digits get their check digit appended.
        token: String,

        #[command(flatten)]
        size: SizeArgs,

        /// Reject a 13th digit that is not the correct check digit.
        #[arg(long)]
        strict: bool,

        /// Print the symbol geometry as JSON instead of SVG.
        #[arg(long)]
        json: bool,

        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render every EAN-13 placeholder in an HTML document.
    Page {
        /// HTML file, or `-` for stdin.
        input: PathBuf,

        #[command(flatten)]
        size: SizeArgs,

        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check scanner input; exits with status 1 when invalid.
    Check {
        /// Raw scanner input (non-digits are ignored).
        input: String,
    },

    /// Print freshly generated tokens.
    Generate {
        /// How many tokens to print.
        #[arg(short, long, default_value_t = 1)]
        count: usize,
    },

    /// Print the 95-module pattern of a token.
    Pattern {
        /// Token digits (12 or 13).
        token: String,

        /// Reject a 13th digit that is not the correct check digit.
        #[arg(long)]
        strict: bool,
    },
}

/// Size overrides shared by rendering subcommands.
#[derive(Debug, Clone, Copy, Default, Args)]
pub struct SizeArgs {
    /// Pixels per module.
    #[arg(long)]
    pub module: Option<u32>,

    /// Bar height in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Quiet zone in pixels (default 10 × module).
    #[arg(long)]
    pub margin: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from([
            "pickup-barcode", "render", "400638133393", "--module", "3", "--strict",
        ])
        .unwrap();
        match cli.command {
            Command::Render { token, size, strict, json, output } => {
                assert_eq!(token, "400638133393");
                assert_eq!(size.module, Some(3));
                assert_eq!(size.height, None);
                assert!(strict);
                assert!(!json);
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_generate_default_count() {
        let cli = Cli::try_parse_from(["pickup-barcode", "generate"]).unwrap();
        assert!(matches!(cli.command, Command::Generate { count: 1 }));
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["pickup-barcode"]).is_err());
    }
}
