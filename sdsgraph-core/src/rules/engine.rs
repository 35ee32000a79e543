use crate::ghs::{SectionTitle, SubsectionTitle};
use regex::Regex;

/// Ordered subsection patterns for one section context, plus the fallback title.
#[derive(Debug, Clone)]
pub struct SubsectionRules {
    pub rules: Vec<(Regex, SubsectionTitle)>,
    pub default: SubsectionTitle,
}

impl SubsectionRules {
    /// A context with no patterns of its own; everything lands in the section default.
    pub fn default_only(section: SectionTitle) -> Self {
        Self {
            rules: Vec::new(),
            default: section.default_subsection(),
        }
    }
}

/// True when `pattern` matches at the very start of `text` (prefix match,
/// the rest of the text may be anything).
pub fn matches_at_start(pattern: &Regex, text: &str) -> bool {
    pattern.find(text).is_some_and(|m| m.start() == 0)
}

/// Classification rules for one supplier family.
///
/// Implementors provide the pattern tables; detection and discrimination are
/// provided on top of them and are pure functions of their input.
pub trait SdsRules: Send + Sync {
    /// Structural patterns that recognise a section header line.
    fn section_identifiers(&self) -> &[Regex];

    /// Ordered header patterns, first match wins.
    fn section_discriminators(&self) -> &[(Regex, SectionTitle)];

    /// Structural patterns that recognise a subsection header line.
    fn subsection_identifiers(&self) -> &[Regex];

    /// Subsection table for a section context. Must cover every context,
    /// `SectionTitle::Unknown` included.
    fn subsection_rules(&self, section: SectionTitle) -> &SubsectionRules;

    fn name(&self) -> &str;

    fn is_section(&self, text: &str) -> bool {
        self.section_identifiers()
            .iter()
            .any(|p| matches_at_start(p, text))
    }

    /// None when no discriminator matches; the assembler tags such sections as unknown.
    fn discriminate_section(&self, text: &str) -> Option<SectionTitle> {
        self.section_discriminators()
            .iter()
            .find(|(p, _)| matches_at_start(p, text))
            .map(|(_, title)| *title)
    }

    fn is_subsection(&self, text: &str) -> bool {
        self.subsection_identifiers()
            .iter()
            .any(|p| matches_at_start(p, text))
    }

    /// Always yields a title: unanchored search over the section's own table,
    /// falling back to the section default.
    fn discriminate_subsection(&self, text: &str, section: SectionTitle) -> SubsectionTitle {
        let table = self.subsection_rules(section);
        table
            .rules
            .iter()
            .find(|(p, _)| p.is_match(text))
            .map(|(_, title)| *title)
            .unwrap_or(table.default)
    }
}
