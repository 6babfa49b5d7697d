//! Transformation options.
//!
//! Options are plain data with serde defaults, so a TOML file only has to
//! name what it changes:
//!
//! ```toml
//! empty_element_suffix = ">"
//! tab_width = 4
//! allow_raw_markup = false
//!
//! [predefined_links]
//! home = "https://example.com/"
//!
//! [limits]
//! bracket_depth = 8
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Error;
use crate::limits::NestingLimits;

/// Options that shape one engine's output.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Closing text of void elements (`<br`, `<hr`, `<img`): `" />"` for
    /// XHTML, `">"` for HTML.
    pub empty_element_suffix: String,
    /// Column multiple for tab expansion and the indentation unit of code
    /// blocks and outdenting.
    pub tab_width: usize,
    /// Pass raw HTML blocks and inline tags through untouched.
    pub allow_raw_markup: bool,
    /// Keep character references such as `&copy;` intact.
    pub allow_entities: bool,
    /// Link definitions available to every document, keyed by label.
    pub predefined_links: BTreeMap<String, String>,
    /// Titles for predefined links, keyed by label.
    pub predefined_titles: BTreeMap<String, String>,
    /// Nesting bounds of the bracket, paren and HTML block matchers.
    pub limits: NestingLimits,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            empty_element_suffix: " />".to_owned(),
            tab_width: 4,
            allow_raw_markup: true,
            allow_entities: true,
            predefined_links: BTreeMap::new(),
            predefined_titles: BTreeMap::new(),
            limits: NestingLimits::default(),
        }
    }
}

/// Command-line settings that override loaded options.
///
/// Only `Some` values (and `true` flags) override.
#[derive(Debug, Default)]
pub struct Overrides {
    pub html: bool,
    pub tab_width: Option<usize>,
    pub no_markup: bool,
    pub no_entities: bool,
}

impl Options {
    /// HTML output preset: void elements close with `>`.
    pub fn html() -> Self {
        Self {
            empty_element_suffix: ">".to_owned(),
            ..Self::default()
        }
    }

    /// Parse options from TOML text and validate them.
    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        let options: Options = toml::from_str(text)?;
        options.validate()?;
        Ok(options)
    }

    /// Read options from a TOML file and validate them.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading options");
        Self::from_toml_str(&text)
    }

    /// Apply command-line overrides.
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if overrides.html {
            self.empty_element_suffix = ">".to_owned();
        }
        if let Some(tab_width) = overrides.tab_width {
            self.tab_width = tab_width;
        }
        if overrides.no_markup {
            self.allow_raw_markup = false;
        }
        if overrides.no_entities {
            self.allow_entities = false;
        }
    }

    /// Reject options no transformation can run with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.tab_width == 0 {
            return Err(Error::InvalidOptions("tab_width must be at least 1".to_owned()));
        }
        if !self.empty_element_suffix.contains('>') {
            return Err(Error::InvalidOptions(format!(
                "empty_element_suffix {:?} must contain '>'",
                self.empty_element_suffix
            )));
        }
        if let Some(field) = self.limits.first_zero() {
            return Err(Error::InvalidOptions(format!("limits.{field} must be at least 1")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::default();
        assert_eq!(options.empty_element_suffix, " />");
        assert_eq!(options.tab_width, 4);
        assert!(options.allow_raw_markup);
        assert!(options.allow_entities);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_html_preset() {
        assert_eq!(Options::html().empty_element_suffix, ">");
    }

    #[test]
    fn test_from_toml_partial() {
        let options = Options::from_toml_str(
            r#"
            tab_width = 8
            allow_entities = false

            [predefined_links]
            home = "/index.html"

            [limits]
            bracket_depth = 3
            "#,
        )
        .unwrap();
        assert_eq!(options.tab_width, 8);
        assert!(!options.allow_entities);
        assert!(options.allow_raw_markup);
        assert_eq!(options.predefined_links["home"], "/index.html");
        assert_eq!(options.limits.bracket_depth, 3);
        assert_eq!(options.limits.url_paren_depth, 4);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = Options::from_toml_str("no_such_option = 1").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_zero_tab_width_is_rejected() {
        let err = Options::from_toml_str("tab_width = 0").unwrap_err();
        assert!(matches!(err, Error::InvalidOptions(_)));
    }

    #[test]
    fn test_suffix_without_closer_is_rejected() {
        let options = Options {
            empty_element_suffix: String::new(),
            ..Options::default()
        };
        assert!(matches!(options.validate(), Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let err = Options::from_toml_str("[limits]\nhtml_block_nesting = 0").unwrap_err();
        assert!(err.to_string().contains("limits.html_block_nesting"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Options::load(Path::new("/nonexistent/hashmark.toml")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_overrides() {
        let mut options = Options::default();
        options.apply_overrides(&Overrides {
            html: true,
            tab_width: Some(2),
            no_markup: true,
            no_entities: false,
        });
        assert_eq!(options.empty_element_suffix, ">");
        assert_eq!(options.tab_width, 2);
        assert!(!options.allow_raw_markup);
        assert!(options.allow_entities);
    }
}
