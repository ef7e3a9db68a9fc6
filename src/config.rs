//! Scan configuration.
//!
//! A configuration file controls how sources are decoded, which files a
//! directory scan picks up, and how per-file failures are handled.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Declared encoding of the source files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
pub enum Charset {
    #[default]
    #[serde(rename = "utf-8", alias = "utf8", alias = "UTF-8")]
    Utf8,
    #[serde(rename = "utf-16le", alias = "UTF-16LE")]
    Utf16Le,
    #[serde(rename = "utf-16be", alias = "UTF-16BE")]
    Utf16Be,
    #[serde(rename = "latin1", alias = "iso-8859-1", alias = "ISO-8859-1")]
    Latin1,
}

impl Charset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Utf16Le => "utf-16le",
            Charset::Utf16Be => "utf-16be",
            Charset::Latin1 => "latin1",
        }
    }

    /// Decode raw bytes, replacing invalid sequences and dropping a
    /// leading byte-order mark.
    pub fn decode(&self, bytes: &[u8]) -> String {
        let text = match self {
            Charset::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Charset::Utf16Le | Charset::Utf16Be => {
                let units = bytes.chunks(2).map(|pair| {
                    let (a, b) = (pair[0], pair.get(1).copied().unwrap_or(0));
                    if *self == Charset::Utf16Le {
                        u16::from_le_bytes([a, b])
                    } else {
                        u16::from_be_bytes([a, b])
                    }
                });
                char::decode_utf16(units)
                    .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect()
            }
            Charset::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        };
        match text.strip_prefix('\u{FEFF}') {
            Some(rest) => rest.to_string(),
            None => text,
        }
    }
}

impl std::fmt::Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Charset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(Charset::Utf8),
            "utf-16le" => Ok(Charset::Utf16Le),
            "utf-16be" => Ok(Charset::Utf16Be),
            "latin1" | "iso-8859-1" => Ok(Charset::Latin1),
            other => anyhow::bail!("unsupported charset {:?}", other),
        }
    }
}

/// Top-level scan configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Configuration {
    #[serde(default)]
    pub charset: Charset,
    /// Abort the scan on the first file that fails (default: false)
    #[serde(default)]
    pub fail_fast: bool,
    /// Marker that exempts a comment line from reporting (default: NOSONAR)
    #[serde(default = "default_suppression_tag")]
    pub suppression_tag: String,
    /// Drop the comment block preceding the first code token (default: true)
    #[serde(default = "default_true")]
    pub ignore_header_comments: bool,
    #[serde(default = "default_file_suffix")]
    pub file_suffix: String,
    /// Glob patterns for paths skipped by directory scans (e.g., "**/obj/**")
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Lex and parse files concurrently before walking them (default: false)
    #[serde(default)]
    pub parallel: bool,
}

fn default_true() -> bool {
    true
}

fn default_suppression_tag() -> String {
    "NOSONAR".to_string()
}

fn default_file_suffix() -> String {
    ".cs".to_string()
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            charset: Charset::Utf8,
            fail_fast: false,
            suppression_tag: default_suppression_tag(),
            ignore_header_comments: true,
            file_suffix: default_file_suffix(),
            excluded_paths: Vec::new(),
            parallel: false,
        }
    }
}

impl Configuration {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: Configuration = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }
        let mut builder = globset::GlobSetBuilder::new();
        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                builder.add(glob);
            }
        }
        match builder.build() {
            Ok(set) => set.is_match(path),
            Err(_) => false,
        }
    }

    /// Whether a directory entry is a source file this scan should pick up.
    pub fn accepts(&self, path: &Path) -> bool {
        let name = path.file_name().map(|n| n.to_string_lossy());
        match name {
            Some(name) => name.ends_with(&self.file_suffix) && !self.is_path_excluded(path),
            None => false,
        }
    }
}

/// Validate a configuration for correctness.
pub fn validate(config: &Configuration) -> anyhow::Result<()> {
    if config.suppression_tag.trim().is_empty() {
        anyhow::bail!("suppression_tag must not be empty");
    }

    if config.file_suffix.is_empty() {
        anyhow::bail!("file_suffix must not be empty");
    }

    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_configuration() {
        let yaml = r#"
charset: utf-16le
fail_fast: true
suppression_tag: "NOLINT"
excluded_paths:
  - "**/obj/**"
"#;
        let config: Configuration = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.charset, Charset::Utf16Le);
        assert!(config.fail_fast);
        assert_eq!(config.suppression_tag, "NOLINT");
        assert!(config.ignore_header_comments);
        assert_eq!(config.file_suffix, ".cs");
        assert_eq!(config.excluded_paths.len(), 1);
    }

    #[test]
    fn test_defaults_round_trip_through_yaml() {
        let yaml = Configuration::default().to_yaml().unwrap();
        let parsed: Configuration = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.suppression_tag, "NOSONAR");
        assert_eq!(parsed.charset, Charset::Utf8);
        assert!(!parsed.parallel);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Configuration::default();
        assert!(validate(&config).is_ok());
        config.excluded_paths.push("[".to_string());
        assert!(validate(&config).is_err());
        let config = Configuration {
            suppression_tag: "  ".to_string(),
            ..Configuration::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_accepts_suffix_and_exclusions() {
        let config = Configuration {
            excluded_paths: vec!["**/Generated/**".to_string()],
            ..Configuration::default()
        };
        assert!(config.accepts(Path::new("src/Foo.cs")));
        assert!(!config.accepts(Path::new("src/Foo.vb")));
        assert!(!config.accepts(Path::new("src/Generated/Foo.cs")));
    }

    #[test]
    fn test_decode_charsets() {
        assert_eq!(Charset::Utf8.decode(b"\xEF\xBB\xBFab"), "ab");
        assert_eq!(Charset::Utf16Le.decode(&[0xFF, 0xFE, b'a', 0, b'b', 0]), "ab");
        assert_eq!(Charset::Utf16Be.decode(&[0, b'a', 0, b'b']), "ab");
        assert_eq!(Charset::Latin1.decode(&[b'c', 0xE9]), "cé");
        assert_eq!("UTF-8".parse::<Charset>().unwrap(), Charset::Utf8);
        assert!("ebcdic".parse::<Charset>().is_err());
    }
}
