//! Section/key/value document
//!
//! Lines are trimmed. Blank lines and lines starting with `;` or `#` are
//! skipped. `key=value` splits on the first `=`. Keys before the first
//! section header and lines without `=` are ignored and reported as
//! warnings. Section and key lookups ignore ASCII case.

use openracing_errors::ConfigurationError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    entries: Vec<(String, String)>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Last value written for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn insert(&mut self, key: String, value: String) {
        self.entries.push((key, value));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    sections: Vec<Section>,
    warnings: Vec<ConfigurationError>,
}

impl IniDocument {
    pub fn parse(text: &str) -> Self {
        let mut document = IniDocument::default();
        let mut current: Option<usize> = None;

        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current = Some(document.section_index_or_insert(name.trim()));
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                document.warn(number, "expected key=value");
                continue;
            };
            let Some(section) = current.and_then(|i| document.sections.get_mut(i)) else {
                document.warn(number, "key outside of a section");
                continue;
            };
            section.insert(key.trim().to_string(), value.trim().to_string());
        }

        document
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.name.eq_ignore_ascii_case(name))
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.section(section).and_then(|s| s.get(key))
    }

    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Lines that were skipped as malformed.
    pub fn warnings(&self) -> &[ConfigurationError] {
        &self.warnings
    }

    fn section_index_or_insert(&mut self, name: &str) -> usize {
        if let Some(index) = self
            .sections
            .iter()
            .position(|section| section.name.eq_ignore_ascii_case(name))
        {
            return index;
        }
        self.sections.push(Section::new(name));
        self.sections.len().saturating_sub(1)
    }

    fn warn(&mut self, zero_based_line: usize, reason: &str) {
        self.warnings.push(ConfigurationError::Malformed {
            line: zero_based_line.saturating_add(1),
            reason: reason.to_string(),
        });
    }
}
