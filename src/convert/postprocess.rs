use std::sync::LazyLock;

use regex::Regex;

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("BLANK_RUNS should compile"));

/// Right-trims every line, collapses runs of blank lines to one, trims the
/// document and ends it with exactly one newline.
pub fn normalize_whitespace(markdown: &str) -> String {
    let trimmed_lines = markdown
        .split('\n')
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    let collapsed = BLANK_RUNS.replace_all(&trimmed_lines, "\n\n");
    format!("{}\n", collapsed.trim())
}
