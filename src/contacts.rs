//! Merging contact lists exported from different services.
//!
//! Contacts are keyed by their exact display name. The first record seen
//! for a name fixes its position in the output; later records with the
//! same name only contribute their platform accounts, appended in arrival
//! order and never de-duplicated.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{MementoError, Result};
use crate::logging::OperationTimer;
use crate::models::Contact;

/// Insertion-ordered accumulator of contacts keyed by name
#[derive(Debug, Default, Clone)]
pub struct ContactMerger {
    index: HashMap<String, usize>,
    contacts: Vec<Contact>,
}

impl ContactMerger {
    /// Create an empty merger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one source's contacts into the accumulated set
    pub fn merge(&mut self, source: impl IntoIterator<Item = Contact>) {
        for contact in source {
            if let Some(&slot) = self.index.get(&contact.name) {
                self.contacts[slot].platforms.extend(contact.platforms);
            } else {
                self.index.insert(contact.name.clone(), self.contacts.len());
                self.contacts.push(contact);
            }
        }
    }

    /// Number of distinct names seen so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    /// True before any contact has been merged
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Merged contacts in first-seen order
    #[must_use]
    pub fn into_contacts(self) -> Vec<Contact> {
        self.contacts
    }
}

/// Read one contacts file: a JSON array of contact records.
pub fn load_contacts(path: &Path) -> Result<Vec<Contact>> {
    let file = File::open(path).map_err(|e| MementoError::io(path, e))?;
    let contacts = serde_json::from_reader(BufReader::new(file))?;
    Ok(contacts)
}

/// Merge every source in order. The first unreadable source aborts the
/// merge and is named in the error.
pub fn merge_files<P: AsRef<Path>>(sources: &[P]) -> Result<Vec<Contact>> {
    let timer = OperationTimer::new("combine_contacts");
    let mut merger = ContactMerger::new();

    for source in sources {
        let source = source.as_ref();
        let contacts = load_contacts(source).map_err(|err| MementoError::ContactSource {
            file: PathBuf::from(source),
            source: Box::new(err),
        })?;
        debug!(file = %source.display(), contacts = contacts.len(), "loaded contacts source");
        merger.merge(contacts);
    }

    info!(
        sources = sources.len(),
        contacts = merger.len(),
        "merged contact sources"
    );
    crate::metrics::record_contacts_merged(merger.len());
    timer.finish();
    Ok(merger.into_contacts())
}

/// Write contacts as a JSON array indented by two spaces, with a trailing newline.
pub fn write_pretty<W: Write>(mut writer: W, contacts: &[Contact]) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, contacts)?;
    writeln!(writer).map_err(|e| MementoError::io("<output>", e))?;
    Ok(())
}
