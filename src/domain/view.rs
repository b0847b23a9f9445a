//! What to show around a task: its context headers and display block

use std::ops::Range;

use super::line::{parse_line, LineKind};

/// Returns the nearest header preceding `index` as `(line, level)`
fn governing_header<S: AsRef<str>>(lines: &[S], index: usize) -> Option<(usize, u8)> {
    let index = index.min(lines.len());

    lines[..index]
        .iter()
        .enumerate()
        .rev()
        .find_map(|(i, line)| parse_line(line.as_ref()).header_level().map(|level| (i, level)))
}

/// Returns the two nearest headers above `index`, joined as `"outer - inner"`.
///
/// `None` when the task has no header above it.
pub fn find_context_headers<S: AsRef<str>>(lines: &[S], index: usize) -> Option<String> {
    let index = index.min(lines.len());
    let mut headers = Vec::with_capacity(2);

    for line in lines[..index].iter().rev() {
        if let LineKind::Header { text, .. } = parse_line(line.as_ref()) {
            headers.push(text);
            if headers.len() == 2 {
                break;
            }
        }
    }

    if headers.is_empty() {
        return None;
    }

    headers.reverse();
    Some(headers.join(" - "))
}

/// Computes the block of lines to show for the task at `index`.
///
/// The block starts at the nearest preceding header (or the start of the
/// file) and ends before the next task or the next header at or above the
/// governing level.
pub fn find_display_range<S: AsRef<str>>(lines: &[S], index: usize) -> Range<usize> {
    let (start, governing_level) = governing_header(lines, index).unwrap_or((0, 0));

    let end = lines
        .iter()
        .enumerate()
        .skip(index + 1)
        .find(|(_, line)| match parse_line(line.as_ref()) {
            LineKind::Task { .. } => true,
            LineKind::Header { level, .. } => level <= governing_level,
            LineKind::Plain => false,
        })
        .map(|(i, _)| i)
        .unwrap_or(lines.len());

    start..end.max(start)
}

/// Returns the display block for the task at `index`, without trailing blank lines
pub fn display_lines<S: AsRef<str>>(lines: &[S], index: usize) -> Vec<String> {
    let range = find_display_range(lines, index);
    let mut block: Vec<String> = lines[range].iter().map(|l| l.as_ref().to_string()).collect();

    while block.last().is_some_and(|l| l.trim().is_empty()) {
        block.pop();
    }

    block
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &[&str] = &[
        "# Project",
        "intro",
        "## Backend",
        "- [x] Schema",
        "- [ ] API",
        "  details for the API",
        "",
        "### Notes",
        "more notes",
        "## Frontend",
        "- [ ] Page",
        "",
        "",
    ];

    #[test]
    fn context_joins_two_nearest_headers() {
        assert_eq!(find_context_headers(DOC, 4), Some("Project - Backend".to_string()));
        assert_eq!(find_context_headers(DOC, 10), Some("Notes - Frontend".to_string()));
    }

    #[test]
    fn context_with_single_header() {
        assert_eq!(find_context_headers(DOC, 1), Some("Project".to_string()));
    }

    #[test]
    fn context_without_headers() {
        assert_eq!(find_context_headers(&["- [ ] A"], 0), None);
    }

    #[test]
    fn display_range_skips_deeper_headers() {
        // "### Notes" is below the governing level 2, so the block runs on
        // until "## Frontend".
        assert_eq!(find_display_range(DOC, 4), 2..9);
    }

    #[test]
    fn display_range_runs_to_end_of_file() {
        assert_eq!(find_display_range(DOC, 10), 9..13);
        assert_eq!(display_lines(DOC, 10), vec!["## Frontend", "- [ ] Page"]);
    }

    #[test]
    fn display_range_without_header_starts_at_file_start() {
        let lines = ["note", "- [ ] A", "detail", "- [ ] B"];
        assert_eq!(find_display_range(&lines, 1), 0..3);
        assert_eq!(display_lines(&lines, 1), vec!["note", "- [ ] A", "detail"]);
    }

    #[test]
    fn display_includes_earlier_lines_under_header() {
        assert_eq!(
            display_lines(DOC, 4),
            vec![
                "## Backend",
                "- [x] Schema",
                "- [ ] API",
                "  details for the API",
                "",
                "### Notes",
                "more notes",
            ]
        );
    }
}
