//! INI-like settings store
//!
//! Groups of ordered `key=value` entries, loaded from and flushed to a text
//! file. Comments (`#` or `;`) and blank lines survive a load/save cycle so hand-edited
//! files keep their annotations. String values use the common key-file
//! escapes (`\s`, `\n`, `\t`, `\r`, `\\`).

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use log::warn;

use crate::models::ParseError;

#[derive(Debug, Clone, PartialEq)]
enum Line {
    Entry { key: String, value: String },
    /// Comment or blank line, kept verbatim
    Verbatim(String),
}

#[derive(Debug, Clone, PartialEq)]
struct Group {
    name: String,
    lines: Vec<Line>,
}

impl Group {
    fn entry_index(&self, key: &str) -> Option<usize> {
        // Later duplicates override earlier ones
        self.lines
            .iter()
            .rposition(|line| matches!(line, Line::Entry { key: k, .. } if k == key))
    }
}

/// Group name → (key → raw string value)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyFile {
    /// Comments above the first group
    header: Vec<String>,
    groups: Vec<Group>,
}

impl KeyFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse key-file text. Lines that are neither comments, group headers
    /// nor entries inside a group are dropped and reported.
    pub fn parse(text: &str) -> (Self, Vec<ParseError>) {
        let mut file = KeyFile::new();
        let mut errors = Vec::new();
        let mut current: Option<usize> = None;

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim_start();

            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                match current {
                    Some(group) => file.groups[group].lines.push(Line::Verbatim(raw.to_string())),
                    None => file.header.push(raw.to_string()),
                }
                continue;
            }

            if line.starts_with('[') {
                match line.trim_end().strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                    Some(name) if !name.is_empty() => {
                        current = Some(file.group_index_or_insert(name));
                    }
                    _ => errors.push(ParseError::MalformedLine {
                        line: index + 1,
                        content: raw.to_string(),
                    }),
                }
                continue;
            }

            match (current, line.split_once('=')) {
                (Some(group), Some((key, value))) if !key.trim().is_empty() => {
                    let group = &mut file.groups[group];
                    let key = key.trim().to_string();
                    let value = value.trim().to_string();
                    match group.entry_index(&key) {
                        Some(i) => group.lines[i] = Line::Entry { key, value },
                        None => group.lines.push(Line::Entry { key, value }),
                    }
                }
                _ => errors.push(ParseError::MalformedLine {
                    line: index + 1,
                    content: raw.to_string(),
                }),
            }
        }

        (file, errors)
    }

    /// Read and parse a file; malformed lines are logged and skipped
    pub fn load(path: &Path) -> io::Result<Self> {
        let text = fs::read_to_string(path)?;
        let (file, errors) = Self::parse(&text);
        for error in errors {
            warn!("Ignoring {} in {}", error, path.display());
        }
        Ok(file)
    }

    /// Write the whole store to `path`, replacing its contents
    pub fn save(&self, path: &Path) -> io::Result<()> {
        fs::write(path, self.to_string())
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g.name == group)
    }

    pub fn has_key(&self, group: &str, key: &str) -> bool {
        self.get(group, key).is_some()
    }

    /// Raw value as written in the file
    pub fn get(&self, group: &str, key: &str) -> Option<&str> {
        let group = self.groups.iter().find(|g| g.name == group)?;
        match &group.lines[group.entry_index(key)?] {
            Line::Entry { value, .. } => Some(value.as_str()),
            Line::Verbatim(_) => None,
        }
    }

    /// Value with string escapes resolved
    pub fn get_string(&self, group: &str, key: &str) -> Option<String> {
        self.get(group, key).map(unescape)
    }

    /// Finite floating-point value; `None` if missing or unparsable
    pub fn get_double(&self, group: &str, key: &str) -> Option<f64> {
        self.get(group, key).and_then(parse_double)
    }

    /// `true`/`false` value; `None` if missing or anything else
    pub fn get_bool(&self, group: &str, key: &str) -> Option<bool> {
        match self.get(group, key)? {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// Store a raw value, creating the group and key as needed
    pub fn set(&mut self, group: &str, key: &str, value: impl Into<String>) {
        let value = value.into();
        let index = self.group_index_or_insert(group);
        let group = &mut self.groups[index];
        match group.entry_index(key) {
            Some(i) => {
                group.lines[i] = Line::Entry {
                    key: key.to_string(),
                    value,
                }
            }
            None => {
                // Keep new entries above trailing blank lines and comments
                let at = group
                    .lines
                    .iter()
                    .rposition(|line| matches!(line, Line::Entry { .. }))
                    .map_or(group.lines.len(), |i| i + 1);
                group.lines.insert(
                    at,
                    Line::Entry {
                        key: key.to_string(),
                        value,
                    },
                );
            }
        }
    }

    pub fn set_string(&mut self, group: &str, key: &str, value: &str) {
        self.set(group, key, escape(value));
    }

    pub fn set_double(&mut self, group: &str, key: &str, value: f64) {
        self.set(group, key, value.to_string());
    }

    pub fn set_integer(&mut self, group: &str, key: &str, value: i64) {
        self.set(group, key, value.to_string());
    }

    pub fn set_bool(&mut self, group: &str, key: &str, value: bool) {
        self.set(group, key, if value { "true" } else { "false" });
    }

    /// Remove every entry for `key`; returns whether anything was removed
    pub fn remove_key(&mut self, group: &str, key: &str) -> bool {
        let Some(group) = self.groups.iter_mut().find(|g| g.name == group) else {
            return false;
        };
        let before = group.lines.len();
        group
            .lines
            .retain(|line| !matches!(line, Line::Entry { key: k, .. } if k == key));
        group.lines.len() != before
    }

    fn group_index_or_insert(&mut self, name: &str) -> usize {
        match self.groups.iter().position(|g| g.name == name) {
            Some(index) => index,
            None => {
                self.groups.push(Group {
                    name: name.to_string(),
                    lines: Vec::new(),
                });
                self.groups.len() - 1
            }
        }
    }
}

impl fmt::Display for KeyFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.header {
            writeln!(f, "{}", line)?;
        }

        // Header comments attach directly to the first group
        let mut previous_blank = true;
        for group in &self.groups {
            if !previous_blank {
                writeln!(f)?;
            }
            writeln!(f, "[{}]", group.name)?;
            previous_blank = false;

            for line in &group.lines {
                match line {
                    Line::Entry { key, value } => {
                        writeln!(f, "{}={}", key, value)?;
                        previous_blank = false;
                    }
                    Line::Verbatim(text) => {
                        writeln!(f, "{}", text)?;
                        previous_blank = text.trim().is_empty();
                    }
                }
            }
        }

        Ok(())
    }
}

/// Parse a stored number the way the settings file expects: surrounding
/// whitespace allowed, non-finite values rejected.
pub fn parse_double(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for (i, c) in value.chars().enumerate() {
        match c {
            ' ' if i == 0 => escaped.push_str("\\s"),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn unescape(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            unescaped.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => unescaped.push(' '),
            Some('n') => unescaped.push('\n'),
            Some('t') => unescaped.push('\t'),
            Some('r') => unescaped.push('\r'),
            Some('\\') => unescaped.push('\\'),
            Some(other) => {
                unescaped.push('\\');
                unescaped.push(other);
            }
            None => unescaped.push('\\'),
        }
    }
    unescaped
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
# redshift settings
[redshift]
temp-day=5500
not an entry
temp-night = 4500

[manual]
lat=45.38
";

    #[test]
    fn test_parse_groups_and_entries() {
        let (file, errors) = KeyFile::parse(SAMPLE);

        assert_eq!(file.get("redshift", "temp-day"), Some("5500"));
        assert_eq!(file.get("redshift", "temp-night"), Some("4500"));
        assert_eq!(file.get_double("manual", "lat"), Some(45.38));
        assert!(file.has_group("manual"));
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ParseError::MalformedLine { line: 4, .. }));
    }

    #[test]
    fn test_semicolon_comments_survive() {
        let text = "; global\n[redshift]\n; day profile\ntemp-day=5500\n";
        let (mut file, errors) = KeyFile::parse(text);

        assert!(errors.is_empty());
        file.set("redshift", "temp-day", "6000");
        assert_eq!(
            file.to_string(),
            "; global\n[redshift]\n; day profile\ntemp-day=6000\n"
        );
    }

    #[test]
    fn test_entries_outside_group_are_rejected() {
        let (file, errors) = KeyFile::parse("orphan=1\n[g]\nk=v\n");

        assert_eq!(errors.len(), 1);
        assert!(!file.has_key("g", "orphan"));
        assert_eq!(file.get("g", "k"), Some("v"));
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let (file, _) = KeyFile::parse("[g]\nk=1\nk=2\n");
        assert_eq!(file.get("g", "k"), Some("2"));
    }

    #[test]
    fn test_repeated_group_headers_merge() {
        let (file, _) = KeyFile::parse("[a]\nx=1\n[b]\ny=2\n[a]\nz=3\n");
        assert_eq!(file.get("a", "x"), Some("1"));
        assert_eq!(file.get("a", "z"), Some("3"));
        assert_eq!(file.to_string().matches("[a]").count(), 1);
    }

    #[test]
    fn test_set_replaces_in_place_and_keeps_comments() {
        let (mut file, _) = KeyFile::parse(SAMPLE);
        file.set("redshift", "temp-day", "6000");
        file.set("redshift", "fade", "1");

        let text = file.to_string();
        assert!(text.starts_with("# redshift settings\n[redshift]\ntemp-day=6000\n"));
        assert!(text.contains("temp-night=4500\nfade=1\n\n[manual]"));
        assert!(text.contains("[manual]\nlat=45.38"));
    }

    #[test]
    fn test_new_groups_are_separated_by_blank_line() {
        let mut file = KeyFile::new();
        file.set("redshift", "temp-day", "5000");
        file.set("manual", "lat", "1.00");

        assert_eq!(file.to_string(), "[redshift]\ntemp-day=5000\n\n[manual]\nlat=1.00\n");
    }

    #[test]
    fn test_remove_key() {
        let (mut file, _) = KeyFile::parse("[redshift]\nadjustment-method=randr\n");
        assert!(file.remove_key("redshift", "adjustment-method"));
        assert!(!file.remove_key("redshift", "adjustment-method"));
        assert!(!file.remove_key("missing", "adjustment-method"));
        assert_eq!(file.get("redshift", "adjustment-method"), None);
    }

    #[test]
    fn test_string_escapes_survive() {
        let mut file = KeyFile::new();
        file.set_string("g", "k", " leading\tand\\slash\n");

        assert_eq!(file.get("g", "k"), Some("\\sleading\\tand\\\\slash\\n"));
        assert_eq!(file.get_string("g", "k").as_deref(), Some(" leading\tand\\slash\n"));
    }

    #[test]
    fn test_parse_double_rejects_garbage() {
        assert_eq!(parse_double(" 0.5 "), Some(0.5));
        assert_eq!(parse_double("0.1:0.2:0.3"), None);
        assert_eq!(parse_double("inf"), None);
        assert_eq!(parse_double("NaN"), None);
        assert_eq!(parse_double(""), None);
    }

    #[test]
    fn test_get_bool() {
        let (file, _) = KeyFile::parse("[Desktop Entry]\nHidden=true\nOther=yes\n");
        assert_eq!(file.get_bool("Desktop Entry", "Hidden"), Some(true));
        assert_eq!(file.get_bool("Desktop Entry", "Other"), None);
        assert_eq!(file.get_bool("Desktop Entry", "Missing"), None);
    }
}
