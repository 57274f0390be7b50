//! Line-preserving model of a `KEY=value` environment file.

/// One environment update. `None` is written as an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub key: String,
    pub value: Option<String>,
}

impl EnvVar {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    /// A key with no value, e.g. a secret the user must fill in.
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    /// `raw` holds the original text until the value is changed.
    Entry {
        key: String,
        value: String,
        raw: Option<String>,
    },
    /// Comments, blanks and anything unparseable, kept verbatim.
    Verbatim(String),
}

/// Ordered environment file contents.
///
/// Keys keep their first position forever; merges only change values or
/// append new keys after the last existing one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EnvRecord {
    lines: Vec<Line>,
}

impl EnvRecord {
    pub fn parse(content: &str) -> Self {
        let lines = content
            .lines()
            .map(|raw| {
                let trimmed = raw.trim_start();
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    return Line::Verbatim(raw.to_string());
                }
                match raw.split_once('=') {
                    Some((key, value)) if !key.trim().is_empty() => Line::Entry {
                        key: key.trim().to_string(),
                        value: value.to_string(),
                        raw: Some(raw.to_string()),
                    },
                    _ => Line::Verbatim(raw.to_string()),
                }
            })
            .collect();

        Self { lines }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match line {
            Line::Entry { key: k, value, .. } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Keys in file order.
    pub fn keys(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                Line::Entry { key, .. } => Some(key.as_str()),
                Line::Verbatim(_) => None,
            })
            .collect()
    }

    /// Apply updates: overwrite in place, append unknown keys in order.
    ///
    /// Returns `true` if the record changed.
    pub fn merge(&mut self, updates: &[EnvVar]) -> bool {
        let mut changed = false;

        for update in updates {
            let value = update.value.clone().unwrap_or_default();

            let existing = self.lines.iter_mut().find_map(|line| match line {
                Line::Entry { key, value, raw } if *key == update.key => Some((value, raw)),
                _ => None,
            });

            match existing {
                Some((current, raw)) => {
                    if *current != value {
                        *current = value;
                        *raw = None;
                        changed = true;
                    }
                }
                None => {
                    let at = self
                        .lines
                        .iter()
                        .rposition(|line| matches!(line, Line::Entry { .. }))
                        .map_or(self.lines.len(), |idx| idx + 1);
                    self.lines.insert(
                        at,
                        Line::Entry {
                            key: update.key.clone(),
                            value,
                            raw: None,
                        },
                    );
                    changed = true;
                }
            }
        }

        changed
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            match line {
                Line::Entry { raw: Some(raw), .. } => out.push_str(raw),
                Line::Entry { key, value, raw: None } => {
                    out.push_str(key);
                    out.push('=');
                    out.push_str(value);
                }
                Line::Verbatim(raw) => out.push_str(raw),
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_merges_into_empty_file_keep_insertion_order() {
        let mut record = EnvRecord::parse("");
        record.merge(&[EnvVar::new("DB_PATH", "x")]);
        record.merge(&[EnvVar::new("DB_PORT", "5432")]);

        assert_eq!(record.render(), "DB_PATH=x\nDB_PORT=5432\n");
    }

    #[test]
    fn existing_keys_are_overwritten_in_place() {
        let mut record = EnvRecord::parse("A=1\nB=2\nC=3\n");
        record.merge(&[EnvVar::new("B", "20"), EnvVar::new("D", "4")]);

        assert_eq!(record.render(), "A=1\nB=20\nC=3\nD=4\n");
    }

    #[test]
    fn comments_and_blank_lines_survive() {
        let content = "# project settings\nPROJECT_NAME=demo\n\n# trailing note\n";
        let mut record = EnvRecord::parse(content);
        record.merge(&[EnvVar::new("DEBUG", "true")]);

        assert_eq!(
            record.render(),
            "# project settings\nPROJECT_NAME=demo\nDEBUG=true\n\n# trailing note\n"
        );
    }

    #[test]
    fn none_values_render_empty() {
        let mut record = EnvRecord::default();
        record.merge(&[EnvVar::empty("SENTRY_DSN")]);
        assert_eq!(record.render(), "SENTRY_DSN=\n");
        assert_eq!(record.get("SENTRY_DSN"), Some(""));
    }

    #[test]
    fn identical_merge_is_idempotent() {
        let updates = [EnvVar::new("REDIS_URL", "redis://localhost:6379/0")];
        let mut record = EnvRecord::parse("APP=1\n");
        assert!(record.merge(&updates));
        let once = record.render();
        assert!(!record.merge(&updates));
        assert_eq!(record.render(), once);
    }

    #[test]
    fn disjoint_merges_commute_on_content() {
        let left = [EnvVar::new("A", "1")];
        let right = [EnvVar::new("B", "2")];

        let mut ab = EnvRecord::default();
        ab.merge(&left);
        ab.merge(&right);
        let mut ba = EnvRecord::default();
        ba.merge(&right);
        ba.merge(&left);

        for key in ["A", "B"] {
            assert_eq!(ab.get(key), ba.get(key));
        }
        assert_eq!(ab.keys().len(), ba.keys().len());
    }

    #[test]
    fn untouched_lines_keep_their_spacing() {
        let mut record = EnvRecord::parse("KEY =v\n  OTHER=1\nPORT = 1\n");
        record.merge(&[EnvVar::new("KEY", "v"), EnvVar::new("PORT", "2"), EnvVar::new("NEW", "x")]);

        assert_eq!(record.get("KEY"), Some("v"));
        assert_eq!(record.render(), "KEY =v\n  OTHER=1\nPORT=2\nNEW=x\n");
    }

    #[test]
    fn values_are_not_unquoted() {
        let record = EnvRecord::parse("TITLE=\"My App\"\nURL=a=b\n");
        assert_eq!(record.get("TITLE"), Some("\"My App\""));
        assert_eq!(record.get("URL"), Some("a=b"));
    }
}
