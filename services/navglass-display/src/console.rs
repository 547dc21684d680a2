//! Terminal rendition of a display layout.

use navglass_binding::{Document, ElementTable};
use tracing::info;

/// Layout whose element updates are written to the log.
#[derive(Debug, Default)]
pub struct ConsoleDocument {
    table: ElementTable,
}

impl ConsoleDocument {
    pub fn new(table: ElementTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ElementTable {
        &self.table
    }
}

impl Document for ConsoleDocument {
    fn element_ids(&self) -> Vec<String> {
        self.table.element_ids()
    }

    fn set_content(&mut self, id: &str, content: &str) -> bool {
        match self.table.content(id) {
            None => return false,
            Some(current) if current != content => {
                info!(element = id, value = content, "Display updated");
            }
            Some(_) => {}
        }
        self.table.set_content(id, content)
    }

    fn revision(&self) -> u64 {
        self.table.revision()
    }
}
