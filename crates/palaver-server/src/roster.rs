//! Connection roster: username → mailbox routing.
//!
//! The roster is the single shared piece of server state. It maps each
//! connected username to the sender side of that connection's outbound
//! mailbox. Usernames are unique; registration fails on a duplicate.
//!
//! Lock discipline: the internal mutex is only held to copy senders out;
//! all channel sends happen after the lock is released, so no await ever
//! holds it.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::mpsc;

/// One user's outbound mailbox: complete wire lines, terminator included.
pub type Mailbox = mpsc::Sender<String>;

/// Shared routing table of connected users.
///
/// Cheap to clone; all clones see the same table. Listing is sorted by
/// username (`BTreeMap`), which makes the `users` reply deterministic.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    users: Arc<Mutex<BTreeMap<String, Mailbox>>>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, Mailbox>> {
        self.users.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a user. Returns `false` if the username is already taken.
    pub fn register(&self, username: &str, mailbox: Mailbox) -> bool {
        let mut users = self.lock();
        if users.contains_key(username) {
            return false;
        }
        users.insert(username.to_string(), mailbox);
        true
    }

    /// Remove a user. Returns `false` if the user was not registered.
    pub fn remove(&self, username: &str) -> bool {
        self.lock().remove(username).is_some()
    }

    /// Mailbox of a single user, if connected.
    pub fn mailbox(&self, username: &str) -> Option<Mailbox> {
        self.lock().get(username).cloned()
    }

    /// Connected usernames in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// Mailboxes of every connected user (for broadcast).
    pub fn mailboxes(&self) -> Vec<Mailbox> {
        self.lock().values().cloned().collect()
    }

    /// Number of connected users.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mailbox() -> Mailbox {
        mpsc::channel(1).0
    }

    #[test]
    fn register_rejects_duplicates() {
        let roster = Roster::new();
        assert!(roster.register("alice", mailbox()));
        assert!(!roster.register("alice", mailbox()));
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn names_are_sorted() {
        let roster = Roster::new();
        roster.register("carol", mailbox());
        roster.register("alice", mailbox());
        roster.register("bob", mailbox());
        assert_eq!(roster.names(), ["alice", "bob", "carol"]);
    }

    #[test]
    fn remove_frees_the_name() {
        let roster = Roster::new();
        roster.register("alice", mailbox());
        assert!(roster.remove("alice"));
        assert!(!roster.remove("alice"));
        assert!(roster.is_empty());
        assert!(roster.register("alice", mailbox()));
    }

    #[test]
    fn clones_share_state() {
        let roster = Roster::new();
        let clone = roster.clone();
        roster.register("alice", mailbox());
        assert_eq!(clone.names(), ["alice"]);
    }

    #[test]
    fn mailbox_lookup() {
        let roster = Roster::new();
        roster.register("alice", mailbox());
        assert!(roster.mailbox("alice").is_some());
        assert!(roster.mailbox("bob").is_none());
    }
}
