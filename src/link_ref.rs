//! Link definitions, keyed by normalized label.

use rustc_hash::FxHashMap;

use crate::options::Options;

/// A link definition (URL + optional title).
///
/// `title` is `Some("")` for an explicitly empty title, which still renders
/// a `title` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDef {
    pub url: String,
    pub title: Option<String>,
}

/// Store of link definitions for one transformation.
#[derive(Debug, Default)]
pub struct LinkRefStore {
    defs: Vec<LinkDef>,
    by_label: FxHashMap<String, usize>,
}

impl LinkRefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the predefined links of `options`.
    pub fn with_predefined(options: &Options) -> Self {
        let mut store = Self::new();
        for (label, url) in &options.predefined_links {
            let title = options.predefined_titles.get(label).cloned();
            store.insert(
                normalize_label(label),
                LinkDef {
                    url: url.clone(),
                    title,
                },
            );
        }
        store
    }

    /// Add a definition. A later definition replaces an earlier one.
    pub fn insert(&mut self, label: String, def: LinkDef) {
        if let Some(&idx) = self.by_label.get(&label) {
            self.defs[idx] = def;
            return;
        }
        let idx = self.defs.len();
        self.defs.push(def);
        self.by_label.insert(label, idx);
    }

    /// Look up an already normalized label.
    pub fn get(&self, label: &str) -> Option<&LinkDef> {
        self.by_label.get(label).map(|&idx| &self.defs[idx])
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

/// Normalize a link label: a line break (with one optional space before
/// it) becomes a single space, then the label is lowercased.
pub fn normalize_label(label: &str) -> String {
    let mut joined = String::with_capacity(label.len());
    let mut rest = label;
    while let Some(nl) = rest.find('\n') {
        let line = &rest[..nl];
        joined.push_str(line.strip_suffix(' ').unwrap_or(line));
        joined.push(' ');
        rest = &rest[nl + 1..];
    }
    joined.push_str(rest);
    joined.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def(url: &str) -> LinkDef {
        LinkDef {
            url: url.to_owned(),
            title: None,
        }
    }

    #[test]
    fn test_later_definition_wins() {
        let mut store = LinkRefStore::new();
        store.insert("a".to_owned(), def("/first"));
        store.insert("a".to_owned(), def("/second"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a").map(|d| d.url.as_str()), Some("/second"));
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("Foo Bar"), "foo bar");
        assert_eq!(normalize_label("foo\nbar"), "foo bar");
        assert_eq!(normalize_label("foo \nbar"), "foo bar");
        assert_eq!(normalize_label("foo  \nbar"), "foo  bar");
        assert_eq!(normalize_label("ÄRGER"), "ärger");
    }

    #[test]
    fn test_predefined_links() {
        let mut options = Options::default();
        options.predefined_links.insert("Home".to_owned(), "/".to_owned());
        options.predefined_titles.insert("Home".to_owned(), "Start".to_owned());
        let store = LinkRefStore::with_predefined(&options);
        let home = store.get("home").unwrap();
        assert_eq!(home.url, "/");
        assert_eq!(home.title.as_deref(), Some("Start"));
    }
}
