//! Output management and formatting.

use std::io::{self, IsTerminal};
use std::path::Path;

use clap::ValueEnum;
use console::Term;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;

use pyhex_core::domain::GenerationResult;

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::config::AppConfig;

/// Manages CLI output based on configuration.
pub struct OutputManager {
    resolved_format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
}

impl OutputManager {
    /// Build an `OutputManager` from parsed CLI flags and loaded config.
    ///
    /// An explicit `--output-format` wins over `output.format` from the
    /// config; `auto` resolves to Human on a TTY and Plain otherwise.
    pub fn new(args: &GlobalArgs, config: &AppConfig) -> Self {
        let requested = match args.output_format {
            OutputFormat::Auto => {
                OutputFormat::from_str(&config.output.format, true).unwrap_or(OutputFormat::Auto)
            }
            explicit => explicit,
        };
        let resolved_format = if requested == OutputFormat::Auto {
            if io::stdout().is_terminal() {
                OutputFormat::Human
            } else {
                OutputFormat::Plain
            }
        } else {
            requested
        };

        Self {
            resolved_format,
            quiet: args.quiet,
            no_color: args.no_color
                || config.output.no_color
                || resolved_format == OutputFormat::Plain,
            term: Term::stdout(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Generic message; suppressed in quiet mode.
    pub fn print(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.term.write_line(msg)
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2713} {msg}") // ✓
        } else {
            format!("{} {}", "\u{2713}".green().bold(), msg.green())
        };
        self.term.write_line(&line)
    }

    /// Error indicator: `✗ <msg>`.  *Not* suppressed in quiet mode.
    pub fn error(&self, msg: &str) -> io::Result<()> {
        let line = if self.no_color {
            format!("\u{2717} {msg}") // ✗
        } else {
            format!("{} {}", "\u{2717}".red().bold(), msg.red())
        };
        self.term.write_line(&line)
    }

    /// Warning indicator: `⚠ <msg>`.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}") // ⚠
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        self.term.write_line(&line)
    }

    /// Informational indicator: `ℹ <msg>`.
    pub fn info(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{2139} {msg}") // ℹ
        } else {
            format!("{} {}", "\u{2139}".blue().bold(), msg.blue())
        };
        self.term.write_line(&line)
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    /// Pretty-printed JSON document.  Printed even in quiet mode: callers
    /// only reach for it when JSON output was requested.
    pub fn json<T: Serialize>(&self, value: &T) -> io::Result<()> {
        let text = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        self.term.write_line(&text)
    }

    /// Print a generation result: a JSON document in JSON mode, otherwise
    /// one line per written file followed by warnings, errors and a summary.
    pub fn report(&self, title: &str, result: &GenerationResult) -> io::Result<()> {
        if self.is_json() {
            return self.json(result);
        }

        self.header(title)?;
        for path in &result.generated {
            self.file_line("+", path)?;
        }
        for path in &result.modified {
            self.file_line("~", path)?;
        }
        for warning in &result.warnings {
            self.warning(warning)?;
        }
        for error in &result.errors {
            self.error(error)?;
        }

        let summary = format!(
            "{} generated, {} modified, {} unchanged",
            result.generated.len(),
            result.modified.len(),
            result.skipped.len()
        );
        if result.success {
            self.success(&summary)
        } else {
            self.info(&summary)
        }
    }

    fn file_line(&self, marker: &str, path: &Path) -> io::Result<()> {
        let path = path.display().to_string();
        if self.no_color {
            self.print(&format!("  {marker} {path}"))
        } else {
            self.print(&format!("  {} {}", marker.green().bold(), path.dimmed()))
        }
    }

    /// A progress bar over `total` steps, hidden when output is quiet,
    /// machine-readable or not a terminal.
    pub fn progress(&self, total: u64) -> ProgressBar {
        if self.quiet || self.resolved_format != OutputFormat::Human || !self.term.is_term() {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total);
        let style = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// `true` if ANSI colours are enabled.
    pub fn supports_color(&self) -> bool {
        !self.no_color
    }

    /// `true` if quiet mode suppresses most output.
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    pub fn is_json(&self) -> bool {
        self.resolved_format == OutputFormat::Json
    }

    /// The resolved (non-Auto) output format.
    pub fn format(&self) -> OutputFormat {
        self.resolved_format
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    use crate::config::AppConfig;

    fn args(quiet: bool, no_color: bool, format: OutputFormat) -> GlobalArgs {
        GlobalArgs {
            verbose: 0,
            quiet,
            no_color,
            config: None,
            project_root: None,
            log_file: None,
            output_format: format,
        }
    }

    fn make_manager(quiet: bool, no_color: bool) -> OutputManager {
        // Human avoids TTY detection in tests.
        OutputManager::new(&args(quiet, no_color, OutputFormat::Human), &AppConfig::default())
    }

    #[test]
    fn quiet_suppresses_print() {
        let out = make_manager(true, true);
        assert!(out.print("hello").is_ok());
        assert!(out.is_quiet());
    }

    #[test]
    fn error_not_suppressed_in_quiet_mode() {
        let out = make_manager(true, true);
        assert!(out.error("something went wrong").is_ok());
    }

    #[test]
    fn no_color_flag_reported() {
        assert!(make_manager(false, false).supports_color());
        assert!(!make_manager(false, true).supports_color());
    }

    #[test]
    fn plain_format_disables_color() {
        let out = OutputManager::new(&args(false, false, OutputFormat::Plain), &AppConfig::default());
        assert!(!out.supports_color());
        assert_eq!(out.format(), OutputFormat::Plain);
    }

    #[test]
    fn config_format_applies_when_flag_is_auto() {
        let mut config = AppConfig::default();
        config.output.format = "json".into();
        let out = OutputManager::new(&args(false, false, OutputFormat::Auto), &config);
        assert!(out.is_json());

        let explicit = OutputManager::new(&args(false, false, OutputFormat::Human), &config);
        assert_eq!(explicit.format(), OutputFormat::Human);
    }

    #[test]
    fn progress_is_hidden_when_quiet_or_json() {
        assert!(make_manager(true, true).progress(3).is_hidden());
        let json = OutputManager::new(&args(false, true, OutputFormat::Json), &AppConfig::default());
        assert!(json.progress(3).is_hidden());
    }

    #[test]
    fn report_accepts_failed_results() {
        let mut result = GenerationResult::new();
        result.generated.push(PathBuf::from("src/core/Order/models.py"));
        result.add_warning("region 'custom' dropped");
        result.add_error("models.py.j2: unexpected end of template");
        assert!(make_manager(false, true).report("core/Order", &result).is_ok());
    }
}
