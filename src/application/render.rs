//! # Render
//!
//! Plain-text views of a plan preview and an apply report, shared by the CLI
//! and the terminal UI.

use crate::domain::plan::PreviewEntry;
use crate::infrastructure::applier::{ApplyReport, OpOutcome};

/// Format a preview as a list of operation headers, each followed by its indented
/// content excerpt.
pub fn render_preview(entries: &[PreviewEntry]) -> String {
    if entries.is_empty() {
        return "(no changes)".to_string();
    }

    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            "[{}] {} {}\n",
            entry.status,
            entry.op.to_uppercase(),
            entry.path
        ));
        if let Some(content) = &entry.content_preview {
            for line in content.lines() {
                out.push_str("    ");
                out.push_str(line);
                out.push('\n');
            }
        }
    }
    out
}

/// One line per operation, then the summary.
pub fn render_report(report: &ApplyReport) -> String {
    let mut out = String::new();
    for entry in &report.entries {
        let mark = match entry.outcome {
            OpOutcome::Applied => "ok  ",
            OpOutcome::Failed(_) => "FAIL",
        };
        out.push_str(&format!("{mark} {entry}\n"));
    }
    out.push_str(&format!(
        "{}/{} applied\n",
        report.applied_count(),
        report.entries.len()
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::plan::{Operation, Plan};
    use crate::infrastructure::applier::{FailReason, OpReport};

    #[test]
    fn test_preview_lists_every_change() {
        let plan = Plan::new(
            vec![
                Operation::create("a.txt", "one\ntwo\nthree"),
                Operation::delete("old.txt"),
            ],
            "",
        );
        let text = render_preview(&plan.preview(2));
        assert!(text.contains("[prepared] CREATE a.txt"));
        assert!(text.contains("    one\n    two\n"));
        assert!(!text.contains("three"));
        assert!(text.contains("[prepared] DELETE old.txt"));
    }

    #[test]
    fn test_empty_preview() {
        assert_eq!(render_preview(&[]), "(no changes)");
    }

    #[test]
    fn test_report_marks_failures() {
        let report = ApplyReport {
            entries: vec![
                OpReport {
                    operation: Operation::create("a.txt", "x"),
                    outcome: OpOutcome::Applied,
                },
                OpReport {
                    operation: Operation::delete("../x"),
                    outcome: OpOutcome::Failed(FailReason::PathEscape),
                },
            ],
        };
        let text = render_report(&report);
        assert!(text.starts_with("ok   create a.txt: applied\n"));
        assert!(text.contains("FAIL delete ../x:"));
        assert!(text.ends_with("1/2 applied\n"));
    }
}
