use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;

/// Sentinel report body for a run where no rows survived preprocessing.
pub const NO_ERROR_LOGS_FOUND: &str = "No error logs found";

/// Fixed recommendations appended verbatim to every report.
const RECOMMENDATIONS_TEMPLATE: &str = r#"## Recommended Next Steps

**Immediate (0-24h):**
- Acknowledge the incident and page the owning team for the affected component
- Apply the immediate actions listed in the analysis segments above
- Capture a snapshot of current logs and metrics before they rotate

**Short-term (1-7 days):**
- Implement the per-segment fixes and verify error rates return to baseline
- Add or tune alerting for the failure signatures identified above
- Write up the incident timeline while context is fresh

**Long-term (1-4 weeks):**
- Schedule the structural fixes from the analysis into the team backlog
- Review capacity, retries, and timeout budgets around the affected component
- Run a blameless postmortem and track its action items to closure
"#;

/// Assemble the final markdown incident report: metadata header, one section
/// per analysis in order, then the static recommendations. Pure string
/// concatenation of fixed templates, so the output is well-formed markdown by
/// construction.
pub fn compile_report(
    analyses: &[String],
    total_logs: usize,
    source: &str,
    engine: &str,
) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");

    let mut report = format!(
        r#"# Incident Root Cause Report

**Generated:** {}
**Source File:** {}
**Total Logs Analyzed:** {}
**Analysis Engine:** {}

---

"#,
        timestamp, source, total_logs, engine
    );

    for (i, analysis) in analyses.iter().enumerate() {
        report.push_str(&format!("## Segment {} Analysis\n\n{}\n\n---\n\n", i + 1, analysis));
    }

    report.push_str(RECOMMENDATIONS_TEMPLATE);
    report
}

/// Default output path: report file named with the generation timestamp.
pub fn default_report_path() -> PathBuf {
    PathBuf::from(format!(
        "incident_report_{}.md",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

pub fn save_report(content: &str, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output_path, content)?;
    Ok(())
}
