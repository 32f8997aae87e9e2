//! Per-request search result assembly and rendering.

/// Matches for one grep request, grouped by source in registry order.
#[derive(Debug, Default)]
pub struct SearchReport {
    sections: Vec<(String, Vec<String>)>,
    total: usize,
}

impl SearchReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one source's matches. Sections must be pushed in registry
    /// order; a zero-match source is still recorded so its header appears
    /// in the response.
    pub fn push_section(&mut self, name: &str, lines: Vec<String>) {
        self.total += lines.len();
        self.sections.push((name.to_string(), lines));
    }

    /// Total matched lines across all sources.
    pub fn total_matches(&self) -> usize {
        self.total
    }

    pub fn sections(&self) -> &[(String, Vec<String>)] {
        &self.sections
    }

    /// Render the plain-text response body: a summary line, then a header
    /// per source followed by its matched lines verbatim, one per line.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(64);
        out.push_str(&format!("Found {} matches:\n", self.total));
        for (name, lines) in &self.sections {
            out.push_str(name);
            out.push_str(":\n");
            for line in lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_summary_and_sections_in_order() {
        let mut report = SearchReport::new();
        report.push_section("error", vec!["ERROR: disk full".into()]);
        report.push_section("info", vec![]);

        assert_eq!(report.total_matches(), 1);
        assert_eq!(
            report.render(),
            "Found 1 matches:\nerror:\nERROR: disk full\ninfo:\n"
        );
    }

    #[test]
    fn empty_report_renders_summary_only() {
        let report = SearchReport::new();
        assert_eq!(report.render(), "Found 0 matches:\n");
    }

    #[test]
    fn total_sums_across_sections() {
        let mut report = SearchReport::new();
        report.push_section("a", vec!["x".into(), "y".into()]);
        report.push_section("b", vec!["z".into()]);
        assert_eq!(report.total_matches(), 3);
        assert!(report.render().starts_with("Found 3 matches:\n"));
    }
}
