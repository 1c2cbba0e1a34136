//! Resolution of document ids to display titles and edit links.

use crate::store::DocumentStore;
use crate::types::{DocumentId, PageDetail};
use std::sync::Arc;

/// Default edit-link pattern, relative to the site root.
pub const DEFAULT_EDIT_LINK: &str = "/wp-admin/post.php?post={id}&action=edit";

/// Maps document ids to presentation metadata.
pub trait PresentationResolver: Send + Sync {
    fn title_of(&self, id: DocumentId) -> String;
    fn edit_link_of(&self, id: DocumentId) -> String;

    /// Both halves of the projection, HTML-escaped for display.
    fn page_detail(&self, id: DocumentId) -> PageDetail {
        PageDetail {
            id,
            title: html_escape::encode_text(&self.title_of(id)).into_owned(),
            link: html_escape::encode_double_quoted_attribute(&self.edit_link_of(id)).into_owned(),
        }
    }
}

/// An edit-link pattern with an `{id}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditLinkTemplate(String);

impl EditLinkTemplate {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self(pattern.into())
    }

    pub fn render(&self, id: DocumentId) -> String {
        self.0.replace("{id}", &id.to_string())
    }
}

impl Default for EditLinkTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_EDIT_LINK)
    }
}

/// Resolves titles through the document store.
pub struct StorePresentation {
    store: Arc<dyn DocumentStore>,
    links: EditLinkTemplate,
}

impl StorePresentation {
    pub fn new(store: Arc<dyn DocumentStore>, links: EditLinkTemplate) -> Self {
        Self { store, links }
    }
}

impl PresentationResolver for StorePresentation {
    fn title_of(&self, id: DocumentId) -> String {
        match self.store.document(id) {
            Ok(Some(document)) => document.title,
            Ok(None) => String::new(),
            Err(e) => {
                tracing::warn!("Could not resolve title of document {}: {}", id, e);
                String::new()
            }
        }
    }

    fn edit_link_of(&self, id: DocumentId) -> String {
        self.links.render(id)
    }
}
