use once_cell::sync::Lazy;
use regex::Regex;

use super::inline::{TextMode, render_inline};

/// `| --- | :---: | ---: |`
static SEPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\|(?:[ \t]*:?-+:?[ \t]*\|)+$").expect("table separator pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    None,
    Left,
    Center,
    Right,
}

impl Align {
    fn from_separator(cell: &str) -> Self {
        match (cell.starts_with(':'), cell.ends_with(':')) {
            (true, true) => Align::Center,
            (true, false) => Align::Left,
            (false, true) => Align::Right,
            (false, false) => Align::None,
        }
    }

    fn class_attr(self) -> &'static str {
        match self {
            Align::None => "",
            Align::Left => " class=\"align-left\"",
            Align::Center => " class=\"align-center\"",
            Align::Right => " class=\"align-right\"",
        }
    }
}

/// Try to read a pipe table at the start of `lines`.
///
/// A table is a header row, a separator row and at least one body row, each
/// wrapped in pipes. Returns the rendered table and the number of lines used.
pub(crate) fn parse_table(lines: &[&str]) -> Option<(String, usize)> {
    let header = lines.first().map(|line| line.trim())?;
    if !is_row(header) {
        return None;
    }
    let separator = lines.get(1).map(|line| line.trim())?;
    if !SEPARATOR.is_match(separator) {
        return None;
    }

    let body: Vec<&str> = lines[2..]
        .iter()
        .map(|line| line.trim())
        .take_while(|line| is_row(line))
        .collect();
    if body.is_empty() {
        return None;
    }

    let aligns: Vec<Align> = split_cells(separator)
        .into_iter()
        .map(Align::from_separator)
        .collect();

    let mut html = String::from("<div class=\"table-wrapper\"><table class=\"writeup-table\"><thead><tr>");
    push_cells(&mut html, "th", header, &aligns);
    html.push_str("</tr></thead><tbody>");
    for row in &body {
        html.push_str("<tr>");
        push_cells(&mut html, "td", row, &aligns);
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table></div>");

    Some((html, body.len() + 2))
}

fn is_row(line: &str) -> bool {
    line.len() >= 2 && line.starts_with('|') && line.ends_with('|')
}

/// Cells between the outer pipes; empty cells are kept.
fn split_cells(row: &str) -> Vec<&str> {
    let inner = &row[1..row.len() - 1];
    inner.split('|').map(str::trim).collect()
}

fn push_cells(html: &mut String, tag: &str, row: &str, aligns: &[Align]) {
    for (idx, cell) in split_cells(row).into_iter().enumerate() {
        let align = aligns.get(idx).copied().unwrap_or(Align::None);
        html.push('<');
        html.push_str(tag);
        html.push_str(align.class_attr());
        html.push('>');
        html.push_str(&render_inline(cell, TextMode::Escaped));
        html.push_str("</");
        html.push_str(tag);
        html.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_header_and_body() {
        let lines = ["| Port | Service |", "|------|---------|", "| 22 | ssh |", "| 80 | **http** |"];
        let (html, used) = parse_table(&lines).expect("table");

        assert_eq!(used, 4);
        assert_eq!(
            html,
            "<div class=\"table-wrapper\"><table class=\"writeup-table\"><thead><tr><th>Port</th><th>Service</th></tr></thead>\
<tbody><tr><td>22</td><td>ssh</td></tr><tr><td>80</td><td><strong>http</strong></td></tr></tbody></table></div>"
        );
    }

    #[test]
    fn stops_at_first_non_row_line() {
        let lines = ["| a |", "| - |", "| 1 |", "after", "| 2 |"];
        let (_, used) = parse_table(&lines).expect("table");
        assert_eq!(used, 3);
    }

    #[test]
    fn needs_separator_and_body() {
        assert!(parse_table(&["| a | b |", "| 1 | 2 |"]).is_none());
        assert!(parse_table(&["| a | b |", "|---|---|"]).is_none());
        assert!(parse_table(&["a | b", "---|---", "1 | 2"]).is_none());
    }

    #[test]
    fn cells_are_escaped_and_empty_cells_kept() {
        let lines = ["| x | y | z |", "|:--|:-:|--:|", "| <script> |  | a & b |"];
        let (html, _) = parse_table(&lines).expect("table");

        assert!(html.contains("<th class=\"align-left\">x</th><th class=\"align-center\">y</th><th class=\"align-right\">z</th>"));
        assert!(html.contains(
            "<td class=\"align-left\">&lt;script&gt;</td><td class=\"align-center\"></td><td class=\"align-right\">a &amp; b</td>"
        ));
    }

    #[test]
    fn autolink_markup_survives_cell_escaping() {
        let lines = [
            "| who | where |",
            "|---|---|",
            "| <span class=\"user-mention\">@alice</span> | <a href=\"https://x/ctf/ab12\" class=\"autolink autolink-ctf\">🎯 CTF</a> |",
        ];
        let (html, _) = parse_table(&lines).expect("table");

        assert!(html.contains(
            "<td><span class=\"user-mention\">@alice</span></td><td><a href=\"https://x/ctf/ab12\" class=\"autolink autolink-ctf\">🎯 CTF</a></td>"
        ));
    }
}
