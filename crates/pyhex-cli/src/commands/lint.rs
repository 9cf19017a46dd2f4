//! `pyhex lint`: check preservation markers in every template.

use serde::Serialize;
use tracing::instrument;

use pyhex_adapters::LocalFilesystem;
use pyhex_core::application::{LintReport, TemplateLinter};

use crate::{
    cli::LintArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[derive(Serialize)]
struct JsonFinding {
    path: String,
    defects: Vec<String>,
}

#[derive(Serialize)]
struct JsonReport {
    checked: usize,
    findings: Vec<JsonFinding>,
}

impl From<&LintReport> for JsonReport {
    fn from(report: &LintReport) -> Self {
        Self {
            checked: report.checked,
            findings: report
                .findings
                .iter()
                .map(|f| JsonFinding {
                    path: f.path.display().to_string(),
                    defects: f.defects.iter().map(ToString::to_string).collect(),
                })
                .collect(),
        }
    }
}

#[instrument(skip_all)]
pub fn execute(args: LintArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let root = args.path.unwrap_or_else(|| config.template_root());
    let fs = LocalFilesystem::new();
    let report = TemplateLinter::new(&fs).lint_templates(&root)?;

    if output.is_json() {
        output.json(&JsonReport::from(&report))?;
    } else {
        for finding in &report.findings {
            output.error(&finding.path.display().to_string())?;
            for defect in &finding.defects {
                output.print(&format!("    {defect}"))?;
            }
        }
        if report.is_clean() {
            output.success(&format!("{} template(s) checked, no marker defects", report.checked))?;
        }
    }

    if report.is_clean() {
        Ok(())
    } else {
        Err(CliError::LintFailed {
            files: report.findings.len(),
            defects: report.defect_count(),
        })
    }
}
