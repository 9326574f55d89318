//! Language facet listing.
//!
//! The index reports which language codes it has seen. The listing is only
//! used to pre-populate the language filter; the compiler accepts any
//! subset of it (or codes outside it) without validation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skysift_core::TransportError;

/// The `/langs` response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageFacets {
    /// Codes that appear in indexed posts.
    #[serde(default)]
    pub seen: Vec<String>,

    /// Codes the index knows how to analyse.
    #[serde(default)]
    pub known: Vec<String>,
}

impl LanguageFacets {
    /// Preferred codes that the index has seen, in preference order.
    pub fn default_selection(&self, preferred: &[String]) -> Vec<String> {
        let mut selection: Vec<String> = Vec::new();
        for code in preferred {
            if self.seen.contains(code) && !selection.contains(code) {
                selection.push(code.clone());
            }
        }
        selection
    }

    /// Every seen code: the default selection first, the rest sorted.
    pub fn options(&self, preferred: &[String]) -> Vec<String> {
        let mut options = self.default_selection(preferred);
        let mut rest: Vec<String> = self
            .seen
            .iter()
            .filter(|code| !options.contains(code))
            .cloned()
            .collect();
        rest.sort();
        rest.dedup();
        options.extend(rest);
        options
    }
}

/// Source of the language facet listing.
#[async_trait]
pub trait LanguageSource: Send + Sync {
    /// Fetch the listing.
    async fn languages(&self) -> Result<LanguageFacets, TransportError>;
}
