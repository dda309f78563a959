//! Participant roster.
//!
//! Tracks which realtime connection registered under which student name so
//! the sidebar can list participants and the teacher can remove one.
//! Entries are keyed by connection, not by name: the same name may be
//! registered from two tabs.

use std::collections::BTreeMap;

use classpoll_types::{ConnectionId, Participant};

/// Connection-to-name registry.
#[derive(Debug, Default)]
pub struct Roster {
    entries: BTreeMap<ConnectionId, String>,
}

impl Roster {
    /// An empty roster.
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Register (or rename) a connection.
    pub fn register(&mut self, connection: ConnectionId, name: &str) {
        self.entries.insert(connection, name.to_owned());
    }

    /// Drop a connection. Returns the name it was registered under.
    pub fn unregister(&mut self, connection: ConnectionId) -> Option<String> {
        self.entries.remove(&connection)
    }

    /// Remove the oldest connection registered as `name`.
    pub fn remove_by_name(&mut self, name: &str) -> Option<ConnectionId> {
        let connection = self
            .entries
            .iter()
            .find_map(|(conn, registered)| (registered == name).then_some(*conn))?;
        self.entries.remove(&connection);
        Some(connection)
    }

    /// Everyone registered, in connection order.
    pub fn participants(&self) -> Vec<Participant> {
        self.entries
            .values()
            .map(|name| Participant { name: name.clone() })
            .collect()
    }
}
