//! The display surface that bindings write into.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// A document whose elements can be looked up by id and rewritten.
///
/// Implementations change [`Document::revision`] whenever the set or order of
/// element ids changes, so binders can cache their id index between frames.
pub trait Document {
    /// Ids of every element that has one, in document order.
    fn element_ids(&self) -> Vec<String>;

    /// Replace the displayed content of the element with this id.
    ///
    /// Returns `false` if no element carries the id.
    fn set_content(&mut self, id: &str, content: &str) -> bool;

    /// Structural revision counter.
    fn revision(&self) -> u64;
}

/// One display element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Element id
    pub id: String,
    /// Current displayed content
    pub content: String,
}

/// Process-wide source of layout revisions, so two tables with different
/// layouts never report the same revision.
fn next_revision() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

/// An ordered, in-memory table of display elements.
///
/// Lookups by id resolve to the first element carrying that id.
#[derive(Debug, Clone, Default)]
pub struct ElementTable {
    elements: Vec<Element>,
    by_id: HashMap<String, usize>,
    revision: u64,
}

impl ElementTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table of empty elements
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for id in ids {
            table.push(id, "");
        }
        table
    }

    /// Append an element at the end of the document
    pub fn push(&mut self, id: impl Into<String>, content: impl Into<String>) {
        let id = id.into();
        let index = self.elements.len();
        self.by_id.entry(id.clone()).or_insert(index);
        self.elements.push(Element {
            id,
            content: content.into(),
        });
        self.revision = next_revision();
    }

    /// Remove every element with this id. Returns how many were removed.
    pub fn remove(&mut self, id: &str) -> usize {
        let before = self.elements.len();
        self.elements.retain(|element| element.id != id);
        let removed = before - self.elements.len();
        if removed > 0 {
            self.reindex();
            self.revision = next_revision();
        }
        removed
    }

    /// Displayed content of the first element with this id
    pub fn content(&self, id: &str) -> Option<&str> {
        self.by_id
            .get(id)
            .map(|&index| self.elements[index].content.as_str())
    }

    /// Elements in document order
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether the table has no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn reindex(&mut self) {
        self.by_id.clear();
        for (index, element) in self.elements.iter().enumerate() {
            self.by_id.entry(element.id.clone()).or_insert(index);
        }
    }
}

impl Document for ElementTable {
    fn element_ids(&self) -> Vec<String> {
        self.elements
            .iter()
            .filter(|element| !element.id.is_empty())
            .map(|element| element.id.clone())
            .collect()
    }

    fn set_content(&mut self, id: &str, content: &str) -> bool {
        let Some(&index) = self.by_id.get(id) else {
            return false;
        };
        let element = &mut self.elements[index];
        element.content.clear();
        element.content.push_str(content);
        true
    }

    fn revision(&self) -> u64 {
        self.revision
    }
}
