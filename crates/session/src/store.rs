//! Message store: append-only ledger of everything the connection has
//! received.
//!
//! Written only by the reader loop, read concurrently by any number of
//! command callers. Entries are never removed - the ledger lives as long
//! as the connection and doubles as a diagnostic record.

use parking_lot::RwLock;

use crate::protocol::{CdpMessage, CdpResponse, CommandId};

pub struct MessageStore {
    entries: RwLock<Vec<CdpMessage>>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn append(&self, message: CdpMessage) {
        self.entries.write().push(message);
    }

    /// Scans for the response matching `id`. Correlation is by id, never
    /// by position - the browser may reorder responses across targets.
    pub fn response_for(&self, id: CommandId) -> Option<CdpResponse> {
        self.entries.read().iter().find_map(|message| match message {
            CdpMessage::Response(response) if response.id == id => Some(response.clone()),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for MessageStore {
    fn default() -> Self {
        Self::new()
    }
}
