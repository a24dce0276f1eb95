//! Positional line diff.
//!
//! Lines are compared index by index with no alignment or move detection, so one
//! inserted line turns every following line into a remove/add pair.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    Unchanged(String),
    Removed(String),
    Added(String),
}

impl DiffLine {
    pub fn text(&self) -> &str {
        match self {
            DiffLine::Unchanged(text) | DiffLine::Removed(text) | DiffLine::Added(text) => text,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            DiffLine::Unchanged(_) => "  ",
            DiffLine::Removed(_) => "- ",
            DiffLine::Added(_) => "+ ",
        }
    }

    pub fn render(&self) -> String {
        format!("{}{}", self.prefix(), self.text())
    }
}

fn split_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

pub fn line_diff(original: &str, candidate: &str) -> Vec<DiffLine> {
    let original = split_lines(original);
    let candidate = split_lines(candidate);
    let max = original.len().max(candidate.len());

    let mut out = Vec::with_capacity(max);
    for i in 0..max {
        let o = original.get(i).copied().unwrap_or_default();
        let n = candidate.get(i).copied().unwrap_or_default();

        if o == n {
            out.push(DiffLine::Unchanged(o.to_string()));
            continue;
        }
        if !o.is_empty() {
            out.push(DiffLine::Removed(o.to_string()));
        }
        if !n.is_empty() {
            out.push(DiffLine::Added(n.to_string()));
        }
    }
    out
}

pub fn render_lines(lines: &[DiffLine]) -> Vec<String> {
    lines.iter().map(DiffLine::render).collect()
}

pub fn render_diff(lines: &[DiffLine]) -> String {
    render_lines(lines).join("\n")
}

#[cfg(test)]
#[path = "tests/diff_tests.rs"]
mod tests;
