//! Subcommand implementations.
//!
//! Every command writes its result to the supplied writer so the binary can
//! point it at stdout or a file, and tests can point it at a buffer.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use pickup_core::scan::HtmlPage;
use pickup_core::token::normalize_scanned;
use pickup_core::{
    encode_with, is_valid, render_with, CheckDigitPolicy, PickupToken, RenderOptions, SvgSurface,
};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::cli::{Command, SizeArgs};
use crate::config::CliConfig;

/// Outcome of a command, mapped to the process exit status by `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// `check` found an invalid token.
    Invalid,
}

/// Dispatches a parsed command.
///
/// Output is built in memory and written only once the command succeeded,
/// so a failed render never truncates an existing `--output` file.
pub fn run(command: Command, config: &CliConfig) -> Result<Outcome> {
    let mut buf = Vec::new();
    let (outcome, output) = match command {
        Command::Render { token, size, strict, json, output } => {
            let policy = policy_for(strict, config);
            render_token(&token, &size.apply(config.render), policy, json, &mut buf)?;
            (Outcome::Success, output)
        }
        Command::Page { input, size, output } => {
            let markup = read_input(&input)?;
            render_html(&markup, &size.apply(config.render), &mut buf)?;
            (Outcome::Success, output)
        }
        Command::Check { input } => (check_input(&input, &mut buf)?, None),
        Command::Generate { count } => {
            generate_tokens(&mut rand::thread_rng(), count, config.token_attempts, &mut buf)?;
            (Outcome::Success, None)
        }
        Command::Pattern { token, strict } => {
            print_pattern(&token, policy_for(strict, config), &mut buf)?;
            (Outcome::Success, None)
        }
    };

    write_output(output.as_deref(), &buf)?;
    Ok(outcome)
}

impl SizeArgs {
    /// Overlays command-line flags onto configured options.
    pub fn apply(&self, base: RenderOptions) -> RenderOptions {
        RenderOptions {
            module: self.module.unwrap_or(base.module),
            height: self.height.unwrap_or(base.height),
            margin: self.margin.or(base.margin),
        }
    }
}

fn policy_for(strict: bool, config: &CliConfig) -> CheckDigitPolicy {
    if strict {
        CheckDigitPolicy::Strict
    } else {
        config.policy
    }
}

// =============================================================================
// Commands
// =============================================================================

/// Renders one token as SVG (or JSON geometry).
pub fn render_token(
    raw: &str,
    options: &RenderOptions,
    policy: CheckDigitPolicy,
    json: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let token = PickupToken::complete(raw.trim())
        .with_context(|| format!("cannot render token '{raw}'"))?;
    if token.as_str() != raw.trim() {
        info!(payload = %raw.trim(), token = %token, "Appended check digit");
    }

    let mut svg = SvgSurface::new();
    let symbol = render_with(&mut svg, token.as_str(), options, policy)
        .with_context(|| format!("cannot render token '{token}'"))?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &symbol)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", svg.to_markup())?;
    }
    Ok(())
}

/// Renders every placeholder of an HTML document.
pub fn render_html(markup: &str, options: &RenderOptions, out: &mut dyn Write) -> Result<()> {
    let mut page = HtmlPage::parse(markup);
    let report = page.rescan_with(options);
    if report.skipped > 0 {
        warn!(skipped = report.skipped, "Some placeholders were left unrendered");
    }
    out.write_all(page.to_html().as_bytes())?;
    Ok(())
}

/// Normalizes scanner input and reports whether it is a valid token.
pub fn check_input(raw: &str, out: &mut dyn Write) -> Result<Outcome> {
    let code = normalize_scanned(raw);
    if is_valid(&code) {
        writeln!(out, "valid {code}")?;
        Ok(Outcome::Success)
    } else {
        debug!(raw = %raw, normalized = %code, "Rejected scanner input");
        writeln!(out, "invalid {code}")?;
        Ok(Outcome::Invalid)
    }
}

/// Prints `count` tokens, unique within this call.
pub fn generate_tokens<R: Rng>(
    rng: &mut R,
    count: usize,
    attempts: usize,
    out: &mut dyn Write,
) -> Result<()> {
    let mut issued = HashSet::with_capacity(count);
    for _ in 0..count {
        let token = PickupToken::allocate(rng, attempts, |t| issued.contains(t))?;
        writeln!(out, "{token}")?;
        issued.insert(token);
    }
    Ok(())
}

/// Prints the module pattern of a token.
pub fn print_pattern(raw: &str, policy: CheckDigitPolicy, out: &mut dyn Write) -> Result<()> {
    let token = PickupToken::complete(raw.trim())?;
    let pattern = encode_with(token.as_str(), policy)?;
    writeln!(out, "{pattern}")?;
    Ok(())
}

// =============================================================================
// I/O Helpers
// =============================================================================

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_output(path: Option<&Path>, bytes: &[u8]) -> Result<()> {
    match path {
        Some(path) => {
            let mut file = fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            emit(&mut file, bytes).with_context(|| format!("failed to write {}", path.display()))
        }
        None => emit(&mut io::stdout().lock(), bytes).context("failed to write stdout"),
    }
}

/// Writes everything and flushes, surfacing errors a dropped writer would hide.
fn emit(out: &mut dyn Write, bytes: &[u8]) -> io::Result<()> {
    out.write_all(bytes)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Writer whose device is always full.
    struct FullDevice;

    impl Write for FullDevice {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "no space left on device"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Writer that accepts bytes but fails on flush.
    struct FailingFlush(Vec<u8>);

    impl Write for FailingFlush {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "flush failed"))
        }
    }

    fn output(f: impl FnOnce(&mut Vec<u8>)) -> String {
        let mut buf = Vec::new();
        f(&mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_size_args_override() {
        let base = RenderOptions { module: 2, height: 60, margin: Some(5) };
        let size = SizeArgs { module: Some(4), height: None, margin: None };
        assert_eq!(size.apply(base), RenderOptions { module: 4, height: 60, margin: Some(5) });
    }

    #[test]
    fn test_render_token_svg() {
        let options = RenderOptions::default();
        let svg = output(|buf| {
            render_token("400638133393", &options, CheckDigitPolicy::Lenient, false, buf).unwrap()
        });
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("EAN-13 4006381333931"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_render_token_json() {
        let options = RenderOptions::default();
        let json = output(|buf| {
            render_token("4006381333931", &options, CheckDigitPolicy::Lenient, true, buf).unwrap()
        });
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["height"], 78.0);
    }

    #[test]
    fn test_render_token_strict_rejects_mismatch() {
        let mut buf = Vec::new();
        let err = render_token(
            "4006381333932",
            &RenderOptions::default(),
            CheckDigitPolicy::Strict,
            false,
            &mut buf,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("Check digit mismatch"));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_render_html() {
        let html = output(|buf| {
            render_html(
                r#"<p><svg data-symbology="ean13" data-value="400638133393"></svg></p>"#,
                &RenderOptions::default(),
                buf,
            )
            .unwrap()
        });
        assert!(html.starts_with("<p><svg data-symbology=\"ean13\" data-value=\"4006381333931\""));
        assert!(html.ends_with("</svg></p>"));
    }

    #[test]
    fn test_check_input() {
        let mut buf = Vec::new();
        assert_eq!(check_input(" 4006381333931\n", &mut buf).unwrap(), Outcome::Success);
        assert_eq!(check_input("4006381333932", &mut buf).unwrap(), Outcome::Invalid);
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "valid 4006381333931\ninvalid 4006381333932\n"
        );
    }

    #[test]
    fn test_generate_tokens() {
        let mut rng = StdRng::seed_from_u64(1);
        let text = output(|buf| generate_tokens(&mut rng, 5, 8, buf).unwrap());
        let tokens: Vec<&str> = text.lines().collect();
        assert_eq!(tokens.len(), 5);
        assert!(tokens.iter().all(|t| is_valid(t)));
        let unique: HashSet<_> = tokens.iter().collect();
        assert_eq!(unique.len(), 5);
    }

    #[test]
    fn test_print_pattern() {
        let text =
            output(|buf| print_pattern("400638133393", CheckDigitPolicy::Lenient, buf).unwrap());
        assert_eq!(text.trim_end().len(), 95);
    }

    #[test]
    fn test_emit_reports_write_errors() {
        let err = emit(&mut FullDevice, b"<svg/>").unwrap_err();
        assert_eq!(err.to_string(), "no space left on device");
    }

    #[test]
    fn test_emit_reports_flush_errors() {
        let mut out = FailingFlush(Vec::new());
        assert!(emit(&mut out, b"<svg/>").is_err());
        assert_eq!(out.0, b"<svg/>");
    }

    #[test]
    fn test_run_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("token.svg");
        let command = Command::Render {
            token: "400638133393".to_string(),
            size: SizeArgs::default(),
            strict: false,
            json: false,
            output: Some(path.clone()),
        };

        assert_eq!(run(command, &CliConfig::default()).unwrap(), Outcome::Success);
        let svg = fs::read_to_string(&path).unwrap();
        assert!(svg.contains("EAN-13 4006381333931"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_run_failed_render_keeps_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keep.svg");
        fs::write(&path, "precious").unwrap();
        let command = Command::Render {
            token: "12345".to_string(),
            size: SizeArgs::default(),
            strict: false,
            json: false,
            output: Some(path.clone()),
        };

        assert!(run(command, &CliConfig::default()).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "precious");
    }

    #[test]
    fn test_run_reports_unwritable_output() {
        let dir = tempfile::tempdir().unwrap();
        let command = Command::Render {
            token: "4006381333931".to_string(),
            size: SizeArgs::default(),
            strict: false,
            json: false,
            output: Some(dir.path().join("missing").join("token.svg")),
        };

        let err = run(command, &CliConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to create"));
    }
}
