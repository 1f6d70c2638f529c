// hppguard/src/ui/pollution_summary.rs
//! Renders the list of collapsed parameters after a run.

use std::io::{self, Write};

use owo_colors::OwoColorize;

/// One block of the summary: a label (`document`, `query`, `body`) and the
/// paths that were collapsed there and not whitelisted.
#[derive(Debug, Clone, Copy)]
pub struct SummaryEntry<'a> {
    pub label: &'a str,
    pub polluted_keys: &'a [String],
}

/// Prints the summary. Entries with no keys are skipped.
pub fn print_summary<W: Write>(entries: &[SummaryEntry<'_>], writer: &mut W, supports_color: bool) -> io::Result<()> {
    let total: usize = entries.iter().map(|e| e.polluted_keys.len()).sum();
    if total == 0 {
        let msg = "No parameter pollution detected.";
        if supports_color {
            writeln!(writer, "{}", msg.green())?;
        } else {
            writeln!(writer, "{}", msg)?;
        }
        return Ok(());
    }

    if supports_color {
        writeln!(writer, "{}", "Pollution Summary:".bold().underline())?;
    } else {
        writeln!(writer, "Pollution Summary:")?;
    }

    for entry in entries.iter().filter(|e| !e.polluted_keys.is_empty()) {
        let count = entry.polluted_keys.len();
        if supports_color {
            writeln!(writer, "  {}: {} collapsed parameter(s)", entry.label.cyan(), count.yellow())?;
        } else {
            writeln!(writer, "  {}: {} collapsed parameter(s)", entry.label, count)?;
        }
        // Keys come from untrusted input; never let them drive the terminal.
        for key in entry.polluted_keys {
            writeln!(writer, "    - {}", key.escape_debug())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_keys_per_label() {
        let query = vec!["id".to_string(), "user.role".to_string()];
        let body: Vec<String> = Vec::new();
        let mut buffer = Vec::new();
        print_summary(
            &[
                SummaryEntry { label: "query", polluted_keys: &query },
                SummaryEntry { label: "body", polluted_keys: &body },
            ],
            &mut buffer,
            false,
        )
        .unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(
            text,
            "Pollution Summary:\n  query: 2 collapsed parameter(s)\n    - id\n    - user.role\n"
        );
    }

    #[test]
    fn control_characters_in_keys_are_escaped() {
        let keys = vec!["\u{1b}[31mred".to_string()];
        let mut buffer = Vec::new();
        print_summary(&[SummaryEntry { label: "query", polluted_keys: &keys }], &mut buffer, false).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        assert!(!text.contains('\u{1b}'));
        assert!(text.contains("    - \\u{1b}[31mred\n"));
    }

    #[test]
    fn reports_clean_runs() {
        let mut buffer = Vec::new();
        print_summary(&[], &mut buffer, false).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "No parameter pollution detected.\n");
    }
}
