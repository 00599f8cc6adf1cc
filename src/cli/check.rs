use anyhow::Result;
use log::info;
use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

use trfp::target::InvocationTarget;
use trfp::version::ToolVersion;
use trfp::RawFileParser;

/// Outcome of one installation check
#[derive(Debug, Clone)]
enum CheckStatus {
    Ok(String),
    Failed(String),
}

#[derive(Debug, Clone)]
struct Check {
    name: String,
    status: CheckStatus,
}

/// Installation report printed by `trfp check`
#[derive(Debug)]
struct CheckReport {
    target: String,
    checks: Vec<Check>,
}

impl CheckReport {
    fn new(target: &InvocationTarget) -> Self {
        let target = match target {
            InvocationTarget::Direct(direct) => direct.executable().join(" "),
            InvocationTarget::Container(container) => {
                format!("{} ({})", container.image(), container.runtime())
            }
        };
        Self {
            target,
            checks: Vec::new(),
        }
    }

    fn ok(&mut self, name: &str, detail: impl Into<String>) {
        self.checks.push(Check {
            name: name.to_string(),
            status: CheckStatus::Ok(detail.into()),
        });
    }

    fn failed(&mut self, name: &str, detail: impl Into<String>) {
        self.checks.push(Check {
            name: name.to_string(),
            status: CheckStatus::Failed(detail.into()),
        });
    }

    fn has_failures(&self) -> bool {
        self.checks
            .iter()
            .any(|c| matches!(c.status, CheckStatus::Failed(_)))
    }

    #[cfg(feature = "colorized_output")]
    fn format_colored(&self) -> String {
        use console::Emoji;

        static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
        static FAIL: Emoji<'_, '_> = Emoji("✗", "[FAIL]");

        let mut output = String::new();
        output.push_str(&format!("{}\n", style("ThermoRawFileParser check").bold().cyan()));
        output.push_str(&format!("{}: {}\n\n", style("Target").bold(), self.target));

        for check in &self.checks {
            match &check.status {
                CheckStatus::Ok(detail) => output.push_str(&format!(
                    "{} {}: {}\n",
                    style(OK).green(),
                    check.name,
                    detail
                )),
                CheckStatus::Failed(detail) => output.push_str(&format!(
                    "{} {}: {}\n",
                    style(FAIL).red(),
                    check.name,
                    style(detail).red()
                )),
            }
        }

        output.push('\n');
        if self.has_failures() {
            output.push_str(&format!("{}\n", style("Check FAILED").red().bold()));
        } else {
            output.push_str(&format!("{}\n", style("Check PASSED").green().bold()));
        }
        output
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ThermoRawFileParser check")?;
        writeln!(f, "Target: {}", self.target)?;
        writeln!(f)?;
        for check in &self.checks {
            match &check.status {
                CheckStatus::Ok(detail) => writeln!(f, "[OK] {}: {}", check.name, detail)?,
                CheckStatus::Failed(detail) => writeln!(f, "[FAIL] {}: {}", check.name, detail)?,
            }
        }
        writeln!(f)?;
        if self.has_failures() {
            writeln!(f, "Check FAILED")
        } else {
            writeln!(f, "Check PASSED")
        }
    }
}

/// Print the tool's version string
pub fn run_version(parser: &RawFileParser) -> Result<()> {
    println!("{}", parser.version()?);
    Ok(())
}

/// Report whether the tool starts and satisfies the version requirement.
pub fn run_check(parser: &RawFileParser) -> Result<()> {
    let report = build_report(parser);

    #[cfg(feature = "colorized_output")]
    {
        println!("{}", report.format_colored());
    }

    #[cfg(not(feature = "colorized_output"))]
    {
        println!("{}", report);
    }

    if report.has_failures() {
        std::process::exit(1);
    }
    Ok(())
}

fn build_report(parser: &RawFileParser) -> CheckReport {
    let mut report = CheckReport::new(parser.target());
    let requirement = parser.requirement();

    let banner = match parser.version() {
        Ok(banner) => {
            report.ok("Tool starts", "--version answered");
            banner
        }
        Err(e) => {
            report.failed("Tool starts", e.to_string());
            return report;
        }
    };

    let installed: ToolVersion = match banner.parse() {
        Ok(version) => {
            report.ok("Version", format!("{}", version));
            version
        }
        Err(e) => {
            report.failed("Version", e.to_string());
            return report;
        }
    };

    info!("Checking {} against {}", installed, requirement);
    if requirement.matches(&installed) {
        report.ok("Requirement", format!("{} satisfies {}", installed, requirement));
    } else {
        report.failed(
            "Requirement",
            format!("{} does not satisfy {}", installed, requirement),
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_text() {
        let mut report = CheckReport::new(&InvocationTarget::direct("mono trfp.exe"));
        report.ok("Tool starts", "--version answered");
        report.failed("Requirement", "1.2.0 does not satisfy >=1.3.3");

        let text = report.to_string();
        assert!(text.contains("Target: mono trfp.exe"));
        assert!(text.contains("[OK] Tool starts"));
        assert!(text.contains("[FAIL] Requirement"));
        assert!(text.contains("Check FAILED"));
        assert!(report.has_failures());
    }

    #[test]
    fn test_container_target_label() {
        let report = CheckReport::new(&InvocationTarget::container("trfp:1.4.3"));
        assert_eq!(report.target, "trfp:1.4.3 (docker)");
        assert!(!report.has_failures());
    }
}
