use super::styling::{emphasis, failed, passed, pending};

/// Prints a job report to stdout, colouring the status prefix of each line.
///
/// Colours are only emitted when stdout is a terminal, so piped output keeps the plain
/// report text.
pub fn print_report(report: &str) {
    for line in report.lines() {
        println!("{}", colorize_line(line));
    }
}

fn colorize_line(line: &str) -> String {
    let styled = [
        ("PASS:", passed("PASS:")),
        ("FAIL:", failed("FAIL:")),
        ("WARN:", pending("WARN:")),
    ]
    .into_iter()
    .find_map(|(prefix, styled)| {
        line.strip_prefix(prefix)
            .map(|rest| format!("{styled}{rest}"))
    });

    styled.unwrap_or_else(|| {
        if line.is_empty() {
            String::new()
        } else {
            emphasis(line).to_string()
        }
    })
}
