//! Splits Finalizer output into summary and template.

/// Delimiter line opening the summary section.
pub const SUMMARY_DELIMITER: &str = "===== SUMMARY =====";
/// Delimiter line opening the template section.
pub const TEMPLATE_DELIMITER: &str = "===== TEMPLATE =====";

const SUMMARY_NAMES: [&str; 2] = ["SUMMARY", "沉淀者总结"];
const TEMPLATE_NAMES: [&str; 2] = ["TEMPLATE", "万能模板"];

/// Summary and template extracted from Finalizer output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizerSections {
    /// Text stored as `final_result`.
    pub summary: String,
    /// Text stored as `template`.
    pub template: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Summary,
    Template,
}

impl FinalizerSections {
    /// Parses `text`.
    ///
    /// A delimiter is a line of the form `=== NAME ===` (three or more `=`),
    /// matched case-insensitively. Text before any delimiter counts as
    /// summary when no summary delimiter is present. A section that ends up
    /// empty, or is missing altogether, falls back to the whole trimmed text.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut preamble = Vec::new();
        let mut summary = Vec::new();
        let mut template = Vec::new();
        let mut current = Section::Preamble;
        let mut saw_summary = false;

        for line in text.lines() {
            match delimiter(line) {
                Some(Section::Summary) => {
                    current = Section::Summary;
                    saw_summary = true;
                }
                Some(section) => current = section,
                None => match current {
                    Section::Preamble => preamble.push(line),
                    Section::Summary => summary.push(line),
                    Section::Template => template.push(line),
                },
            }
        }

        let whole = text.trim();
        let summary_lines = if saw_summary { summary } else { preamble };
        Self {
            summary: non_empty_or(&summary_lines, whole),
            template: non_empty_or(&template, whole),
        }
    }
}

fn non_empty_or(lines: &[&str], fallback: &str) -> String {
    let joined = lines.join("\n");
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        fallback.to_owned()
    } else {
        trimmed.to_owned()
    }
}

fn delimiter(line: &str) -> Option<Section> {
    let trimmed = line.trim();
    if !(trimmed.starts_with("===") && trimmed.ends_with("===")) {
        return None;
    }
    let name = trimmed.trim_matches('=').trim().to_uppercase();
    if SUMMARY_NAMES.contains(&name.as_str()) {
        Some(Section::Summary)
    } else if TEMPLATE_NAMES.contains(&name.as_str()) {
        Some(Section::Template)
    } else {
        None
    }
}
