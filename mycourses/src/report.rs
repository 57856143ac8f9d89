//! Console rendering of summaries.

use std::io::{self, Write};

use crate::Summary;

const RULE_WIDTH: usize = 60;

/// Write `summary` as plain text to `out`.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn render(summary: &Summary, out: &mut impl Write) -> io::Result<()> {
    let rule = "=".repeat(RULE_WIDTH);

    writeln!(out, "\n{rule}")?;
    writeln!(out, "{}", summary.heading)?;
    writeln!(out, "{rule}")?;

    if summary.is_empty() {
        writeln!(out, "\n(nothing to show)")?;
    }

    let width = summary
        .entries
        .iter()
        .map(|e| e.label.chars().count())
        .max()
        .unwrap_or(0);

    for entry in &summary.entries {
        let mut lines = entry.value.lines();
        let first = lines.next().unwrap_or("");
        writeln!(out, "{:>width$}: {first}", entry.label)?;

        for line in lines {
            writeln!(out, "{:>width$}  {line}", "")?;
        }
    }

    writeln!(out, "{rule}")
}

/// Print `summary` to standard output.
pub fn print(summary: &Summary) {
    let stdout = io::stdout();
    let _ = render(summary, &mut stdout.lock());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(summary: &Summary) -> String {
        let mut out = Vec::new();
        render(summary, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn empty_summary_renders_heading_only() {
        let text = rendered(&Summary::default());
        assert!(text.contains("(nothing to show)"));
    }

    #[test]
    fn labels_are_aligned() {
        let mut summary = Summary::new("PAGE CONTENT");
        summary.push("Page Title", "Course: X").push("Section", "Week 1");

        let text = rendered(&summary);
        assert!(text.contains("PAGE CONTENT\n"));
        assert!(text.contains("Page Title: Course: X\n"));
        assert!(text.contains("   Section: Week 1\n"));
    }

    #[test]
    fn multiline_values_are_indented() {
        let mut summary = Summary::new("EVENTS");
        summary.push("Notes", "first\nsecond");

        let text = rendered(&summary);
        assert!(text.contains("Notes: first\n       second\n"));
    }
}
