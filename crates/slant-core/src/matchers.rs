use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// What kind of organization a matcher's suffixes indicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherCategory {
    Corporate,
    Maritime,
    Media,
}

impl std::fmt::Display for MatcherCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatcherCategory::Corporate => write!(f, "corporate"),
            MatcherCategory::Maritime => write!(f, "maritime"),
            MatcherCategory::Media => write!(f, "media"),
        }
    }
}

/// One entity matcher: a capitalized phrase ending in one of `suffixes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    pub category: MatcherCategory,
    pub suffixes: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MatchersFile {
    pub matchers: Vec<MatcherConfig>,
}

/// The built-in matcher list, applied in this order.
#[must_use]
pub fn default_matchers() -> Vec<MatcherConfig> {
    let build = |category, suffixes: &[&str]| MatcherConfig {
        category,
        suffixes: suffixes.iter().map(|s| (*s).to_string()).collect(),
    };

    vec![
        build(
            MatcherCategory::Corporate,
            &[
                "Corporation",
                "Corp",
                "Incorporated",
                "Inc",
                "Ltd",
                "LLC",
                "PLC",
                "Company",
                "Co.",
                "Group",
                "Holdings",
            ],
        ),
        build(
            MatcherCategory::Maritime,
            &[
                "Seafood",
                "Fishing",
                "Marine",
                "Ocean",
                "International",
                "Shipping",
                "Logistics",
                "Transit",
            ],
        ),
        build(
            MatcherCategory::Media,
            &["News", "Media", "Times", "Post", "Herald", "Tribune", "Daily", "Buoy"],
        ),
    ]
}

/// Load and validate an entity matcher list from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_matchers(path: &Path) -> Result<Vec<MatcherConfig>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::MatchersFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let file: MatchersFile =
        serde_yaml::from_str(&content).map_err(ConfigError::MatchersFileParse)?;

    validate_matchers(&file.matchers)?;

    Ok(file.matchers)
}

fn validate_matchers(matchers: &[MatcherConfig]) -> Result<(), ConfigError> {
    if matchers.is_empty() {
        return Err(ConfigError::MatchersValidation(
            "at least one matcher is required".to_string(),
        ));
    }

    for (idx, matcher) in matchers.iter().enumerate() {
        if matcher.suffixes.is_empty() {
            return Err(ConfigError::MatchersValidation(format!(
                "matcher {idx} ({}) has no suffixes",
                matcher.category
            )));
        }

        let mut seen = HashSet::new();
        for suffix in &matcher.suffixes {
            if suffix.trim().is_empty() || suffix.chars().any(char::is_whitespace) {
                return Err(ConfigError::MatchersValidation(format!(
                    "matcher {idx} ({}) has an empty or multi-word suffix '{suffix}'",
                    matcher.category
                )));
            }
            if !seen.insert(suffix.as_str()) {
                return Err(ConfigError::MatchersValidation(format!(
                    "matcher {idx} ({}) lists suffix '{suffix}' twice",
                    matcher.category
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_yaml(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    #[test]
    fn shipped_matchers_file_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
            .join("matchers.yaml");
        assert!(path.exists(), "matchers.yaml missing at {path:?}");
        assert_eq!(load_matchers(&path).unwrap(), default_matchers());
    }

    #[test]
    fn default_matchers_are_valid() {
        assert!(validate_matchers(&default_matchers()).is_ok());
    }

    #[test]
    fn default_matchers_keep_category_order() {
        let categories: Vec<MatcherCategory> =
            default_matchers().iter().map(|m| m.category).collect();
        assert_eq!(
            categories,
            vec![
                MatcherCategory::Corporate,
                MatcherCategory::Maritime,
                MatcherCategory::Media
            ]
        );
    }

    #[test]
    fn loads_matchers_from_yaml() {
        let file = write_yaml(
            "matchers:\n  - category: corporate\n    suffixes: [Inc, Ltd]\n  - category: media\n    suffixes: [Gazette]\n",
        );
        let matchers = load_matchers(file.path()).unwrap();
        assert_eq!(matchers.len(), 2);
        assert_eq!(matchers[0].category, MatcherCategory::Corporate);
        assert_eq!(matchers[1].suffixes, vec!["Gazette".to_string()]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_matchers(Path::new("/nonexistent/matchers.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::MatchersFileIo { .. }));
    }

    #[test]
    fn unknown_category_is_parse_error() {
        let file = write_yaml("matchers:\n  - category: sports\n    suffixes: [FC]\n");
        let err = load_matchers(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::MatchersFileParse(_)));
    }

    #[test]
    fn empty_matcher_list_is_rejected() {
        let file = write_yaml("matchers: []\n");
        let err = load_matchers(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::MatchersValidation(_)));
    }

    #[test]
    fn multi_word_suffix_is_rejected() {
        let matchers = vec![MatcherConfig {
            category: MatcherCategory::Corporate,
            suffixes: vec!["and Sons".to_string()],
        }];
        assert!(validate_matchers(&matchers).is_err());
    }

    #[test]
    fn duplicate_suffix_is_rejected() {
        let matchers = vec![MatcherConfig {
            category: MatcherCategory::Media,
            suffixes: vec!["News".to_string(), "News".to_string()],
        }];
        assert!(validate_matchers(&matchers).is_err());
    }
}
