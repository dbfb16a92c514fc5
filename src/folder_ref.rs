//! Folder arguments: the `default` keyword, raw IDs, or Drive URLs.

use regex::Regex;
use std::sync::LazyLock;

use crate::config::Config;
use crate::error::{DriveError, Result};

/// Keyword selecting the configured default folder.
pub const DEFAULT_KEYWORD: &str = "default";

static FOLDER_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/drive/(?:u/\d+/)?folders/([a-zA-Z0-9_-]+)")
        .expect("Invalid folder URL regex")
});

static OPEN_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/open\?id=([a-zA-Z0-9_-]+)")
        .expect("Invalid open URL regex")
});

/// A folder named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderRef {
    /// The configured default folder.
    Default,
    /// An explicit folder ID.
    Id(String),
}

impl FolderRef {
    /// Parse `default`, a folder URL, or a literal folder ID.
    pub fn parse(value: &str) -> Result<Self> {
        if value == DEFAULT_KEYWORD {
            return Ok(Self::Default);
        }
        extract_folder_id(value).map(Self::Id)
    }

    /// The folder ID this reference stands for.
    pub fn resolve<'a>(&'a self, config: &'a Config) -> &'a str {
        match self {
            Self::Default => &config.default_folder_id,
            Self::Id(id) => id,
        }
    }
}

/// Extract a folder ID from a Drive URL; any other value is taken as the ID itself.
///
/// Recognized URLs:
/// - `https://drive.google.com/drive/folders/<ID>`
/// - `https://drive.google.com/drive/u/1/folders/<ID>`
/// - `https://drive.google.com/open?id=<ID>`
///
/// Only an empty value is rejected.
///
/// ```
/// use drive_service::folder_ref::extract_folder_id;
///
/// let id = extract_folder_id("https://drive.google.com/drive/u/1/folders/1U0J1W").unwrap();
/// assert_eq!(id, "1U0J1W");
/// ```
pub fn extract_folder_id(url_or_id: &str) -> Result<String> {
    if url_or_id.trim().is_empty() {
        return Err(DriveError::InvalidFolderRef(url_or_id.to_string()));
    }

    for regex in [&*FOLDER_URL_REGEX, &*OPEN_URL_REGEX] {
        if let Some(id) = regex.captures(url_or_id.trim()).and_then(|c| c.get(1)) {
            return Ok(id.as_str().to_string());
        }
    }

    Ok(url_or_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::from_toml_str(
            r#"
            application_name = "app"
            tokens_directory_path = "tokens"
            credentials_file_path = "credentials.json"
            default_folder_id = "defaultFolder42"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_default_keyword_resolves_to_configured_folder() {
        let config = config();
        let folder = FolderRef::parse("default").unwrap();
        assert_eq!(folder, FolderRef::Default);
        assert_eq!(folder.resolve(&config), "defaultFolder42");
    }

    #[test]
    fn test_default_and_explicit_id_resolve_identically() {
        let config = config();
        let by_keyword = FolderRef::parse("default").unwrap();
        let by_id = FolderRef::parse(&config.default_folder_id).unwrap();
        assert_eq!(by_keyword.resolve(&config), by_id.resolve(&config));
    }

    #[test]
    fn test_raw_id_is_kept_literally() {
        let config = config();
        let folder = FolderRef::parse("1abc-XYZ_9").unwrap();
        assert_eq!(folder.resolve(&config), "1abc-XYZ_9");
    }

    #[test]
    fn test_keyword_must_match_exactly() {
        assert_eq!(
            FolderRef::parse("Default").unwrap(),
            FolderRef::Id("Default".to_string())
        );
        assert_eq!(
            FolderRef::parse(" default ").unwrap(),
            FolderRef::Id(" default ".to_string())
        );
    }

    #[test]
    fn test_other_values_pass_through_unchanged() {
        let config = config();
        for value in ["abc/123", "a b", "0B-legacy.id", "https://example.com/folders/123"] {
            let folder = FolderRef::parse(value).unwrap();
            assert_eq!(folder.resolve(&config), value);
        }
    }

    #[test]
    fn test_folder_urls() {
        assert_eq!(
            extract_folder_id("https://drive.google.com/drive/folders/1abc123XYZ?usp=sharing").unwrap(),
            "1abc123XYZ"
        );
        assert_eq!(
            extract_folder_id("https://drive.google.com/drive/u/1/folders/1U0J1W").unwrap(),
            "1U0J1W"
        );
        assert_eq!(
            extract_folder_id("https://drive.google.com/open?id=1abc123XYZ").unwrap(),
            "1abc123XYZ"
        );
    }

    #[test]
    fn test_empty_values_are_rejected() {
        assert!(extract_folder_id("").is_err());
        assert!(matches!(
            FolderRef::parse("   "),
            Err(DriveError::InvalidFolderRef(_))
        ));
    }
}
