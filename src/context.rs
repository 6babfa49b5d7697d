//! Per-transformation state.

use crate::escape;
use crate::link_ref::LinkRefStore;
use crate::options::Options;
use crate::render::HtmlWriter;
use crate::vault::{FragmentKind, Vault};

/// State threaded through every pass of one transformation.
///
/// A fresh context is built per call, which is what lets one
/// [`crate::Markdown`] engine serve many transformations at once.
pub struct Context<'o> {
    pub options: &'o Options,
    pub vault: Vault,
    pub links: LinkRefStore,
    /// Depth of list processing; a list opens anywhere a line starts once
    /// this is non-zero.
    pub list_level: usize,
    /// Set while anchor text is processed so links never nest.
    pub in_anchor: bool,
}

impl<'o> Context<'o> {
    /// `options` must have passed [`Options::validate`].
    pub fn new(options: &'o Options) -> Self {
        Self {
            options,
            vault: Vault::new(),
            links: LinkRefStore::with_predefined(options),
            list_level: 0,
            in_anchor: false,
        }
    }

    #[inline]
    pub fn tab_width(&self) -> usize {
        self.options.tab_width
    }

    /// A writer using the configured void element suffix.
    #[inline]
    pub fn writer(&self) -> HtmlWriter<'o> {
        HtmlWriter::new(&self.options.empty_element_suffix)
    }

    #[inline]
    pub fn protect(&mut self, fragment: &str) -> String {
        self.vault.protect(fragment, FragmentKind::Generic)
    }

    #[inline]
    pub fn protect_block(&mut self, fragment: &str) -> String {
        self.vault.protect(fragment, FragmentKind::Block)
    }

    #[inline]
    pub fn protect_separator(&mut self, fragment: &str) -> String {
        self.vault.protect(fragment, FragmentKind::Inline)
    }

    #[inline]
    pub fn encode_attribute(&self, text: &str) -> String {
        escape::encode_attribute(text, self.options.allow_entities)
    }

    #[inline]
    pub fn encode_amps_and_angles(&self, text: &str) -> String {
        escape::encode_amps_and_angles(text, self.options.allow_entities)
    }
}
