//! Binds section mappings onto every matching document element.

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::directive::BindingDirective;
use crate::document::Document;
use crate::format::{self, FormatFailure};
use crate::frame::SectionMapping;

/// Result of binding one mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindOutcome {
    /// Elements whose content was written
    pub updated: usize,
    /// Indexed elements whose field was absent from the mapping
    pub skipped: usize,
    /// Elements whose value could not be rendered
    pub failures: Vec<FormatFailure>,
}

impl BindOutcome {
    /// Fold another outcome into this one
    pub fn merge(&mut self, other: BindOutcome) {
        self.updated += other.updated;
        self.skipped += other.skipped;
        self.failures.extend(other.failures);
    }
}

#[derive(Debug, Clone)]
struct IndexedElement {
    id: String,
    directive: BindingDirective,
}

/// Which document state the index was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IndexKey {
    document: usize,
    revision: u64,
}

impl IndexKey {
    fn of<D: Document + ?Sized>(document: &D) -> Self {
        Self {
            document: (document as *const D).cast::<()>() as usize,
            revision: document.revision(),
        }
    }
}

/// Cached id index over a document.
///
/// The index holds every element whose id carries a directive, in document
/// order. It is rebuilt when the document's revision changes or a different
/// document is bound.
#[derive(Debug, Clone, Default)]
pub struct Binder {
    index: Vec<IndexedElement>,
    indexed: Option<IndexKey>,
}

impl Binder {
    /// Create a binder with an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the index if the document changed since the last build
    pub fn refresh<D: Document + ?Sized>(&mut self, document: &D) {
        let key = IndexKey::of(document);
        if self.indexed == Some(key) {
            return;
        }

        let mut seen = HashSet::new();
        self.index = document
            .element_ids()
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .filter_map(|id| {
                BindingDirective::parse(&id).map(|directive| IndexedElement { id, directive })
            })
            .collect();
        self.indexed = Some(key);

        debug!(
            revision = key.revision,
            bound_elements = self.index.len(),
            "Rebuilt display binding index"
        );
    }

    /// Write every field of `mapping` into the element bound to it.
    ///
    /// Only writes the document accepted count as updated.
    pub fn bind_all<D: Document + ?Sized>(
        &mut self,
        document: &mut D,
        mapping: &SectionMapping,
    ) -> BindOutcome {
        self.refresh(&*document);

        let mut outcome = BindOutcome::default();
        for element in &self.index {
            match format::apply(document, &element.id, &element.directive, mapping) {
                Ok(Some(true)) => outcome.updated += 1,
                Ok(Some(false)) => {
                    debug!(element = %element.id, "Document rejected binding write");
                }
                Ok(None) => outcome.skipped += 1,
                Err(error) => {
                    warn!(element = %element.id, %error, "Skipping binding");
                    outcome.failures.push(FormatFailure {
                        element_id: element.id.clone(),
                        error,
                    });
                }
            }
        }
        outcome
    }

    /// Number of elements carrying a directive
    pub fn bound_elements(&self) -> usize {
        self.index.len()
    }

    /// Directive selected for an element id, if indexed
    pub fn directive_for(&self, id: &str) -> Option<&BindingDirective> {
        self.index
            .iter()
            .find(|element| element.id == id)
            .map(|element| &element.directive)
    }
}
