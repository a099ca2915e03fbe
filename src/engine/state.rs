use std::collections::{HashMap, HashSet};

use crate::types::{Badge, Notification, NotificationId};

// ---------------------------------------------------------------------------
// Response ordering
// ---------------------------------------------------------------------------

/// Monotonic sequence numbers for one kind of read request.
///
/// Responses are applied in arrival order, but one that was issued before the
/// newest already-applied response is stale and must be dropped.
#[derive(Debug, Default)]
pub struct Sequencer {
    issued: u64,
    applied: u64,
}

impl Sequencer {
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Returns `true` when the response tagged `seq` should be applied.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied {
            return false;
        }
        self.applied = seq;
        true
    }

    /// Highest sequence number applied so far.
    pub fn applied(&self) -> u64 {
        self.applied
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Point-in-time copy of the engine state.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub notifications: Vec<Notification>,
    pub unread_count: u64,
    pub polling: bool,
}

impl Snapshot {
    pub fn ids(&self) -> Vec<&str> {
        self.notifications.iter().map(|n| n.id.as_str()).collect()
    }

    pub fn badge(&self) -> Badge {
        Badge::from_count(self.unread_count)
    }
}

// ---------------------------------------------------------------------------
// Sync state
// ---------------------------------------------------------------------------

/// Client-side view of the server's notifications.
///
/// `known` is newest first and never holds two entries with the same id.
/// `unread_count` is whatever the server last reported.
#[derive(Debug, Default)]
pub struct SyncState {
    known: Vec<Notification>,
    unread_count: u64,
    /// Pushed entries not yet adopted by a list reload, with the generation
    /// their expiry timer was armed for.
    transient: HashMap<NotificationId, u64>,
    next_generation: u64,
    pub(crate) list_seq: Sequencer,
    pub(crate) count_seq: Sequencer,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.known
    }

    pub fn unread_count(&self) -> u64 {
        self.unread_count
    }

    /// Unread entries among the known list. May differ from `unread_count`,
    /// which also covers notifications never fetched.
    pub fn local_unread(&self) -> usize {
        self.known.iter().filter(|n| !n.is_read).count()
    }

    pub fn get(&self, id: &NotificationId) -> Option<&Notification> {
        self.known.iter().find(|n| &n.id == id)
    }

    /// Replace the whole list with a fetched page, keeping server order.
    ///
    /// Duplicate ids inside the page keep their first occurrence. Pushed
    /// entries present in the page are adopted and no longer expire.
    pub fn replace_list(&mut self, page: Vec<Notification>) -> &[Notification] {
        let mut seen = HashSet::with_capacity(page.len());
        let mut known = Vec::with_capacity(page.len());
        for n in page {
            if seen.insert(n.id.clone()) {
                known.push(n);
            } else {
                tracing::debug!("state: dropping duplicate id {} in page", n.id);
            }
        }
        self.known = known;
        self.transient.clear();
        &self.known
    }

    pub fn set_unread_count(&mut self, count: u64) -> Badge {
        self.unread_count = count;
        Badge::from_count(count)
    }

    /// Set the read flag of one entry; returns the previous flag, or `None`
    /// when the id is unknown.
    pub fn set_read(&mut self, id: &NotificationId, is_read: bool) -> Option<bool> {
        let entry = self.known.iter_mut().find(|n| &n.id == id)?;
        let previous = entry.is_read;
        entry.is_read = is_read;
        Some(previous)
    }

    /// Flip every known entry to read. Returns the ids that were unread.
    pub fn mark_all_read(&mut self) -> Vec<NotificationId> {
        self.known
            .iter_mut()
            .filter(|n| !n.is_read)
            .map(|n| {
                n.is_read = true;
                n.id.clone()
            })
            .collect()
    }

    /// Identifies the list currently held; changes whenever a loaded page is
    /// applied.
    pub fn list_epoch(&self) -> u64 {
        self.list_seq.applied()
    }

    /// Undo an optimistic flip made while `epoch` was the list epoch.
    ///
    /// Nothing is restored once a newer page has replaced the list, since the
    /// server's flags win. Entries that disappeared or were marked unread in
    /// the meantime are skipped. Returns the ids actually restored.
    pub fn restore_unread(
        &mut self,
        ids: &[NotificationId],
        epoch: u64,
    ) -> Vec<NotificationId> {
        if epoch != self.list_epoch() {
            return Vec::new();
        }
        let wanted: HashSet<&NotificationId> = ids.iter().collect();
        self.known
            .iter_mut()
            .filter(|n| n.is_read && wanted.contains(&n.id))
            .map(|n| {
                n.is_read = false;
                n.id.clone()
            })
            .collect()
    }

    /// Prepend a pushed notification, replacing any entry with the same id.
    ///
    /// Returns the generation to hand to `expire`.
    pub fn push(&mut self, notification: Notification) -> u64 {
        self.known.retain(|n| n.id != notification.id);
        self.next_generation += 1;
        let generation = self.next_generation;
        self.transient.insert(notification.id.clone(), generation);
        self.known.insert(0, notification);
        generation
    }

    /// Drop a pushed entry whose display window ended.
    ///
    /// No-op if it was adopted by a reload or pushed again since.
    pub fn expire(&mut self, id: &NotificationId, generation: u64) -> bool {
        if self.transient.get(id) != Some(&generation) {
            return false;
        }
        self.transient.remove(id);
        self.known.retain(|n| &n.id != id);
        true
    }

    /// Remove a pushed entry that the list has not adopted yet.
    pub fn dismiss(&mut self, id: &NotificationId) -> bool {
        if self.transient.remove(id).is_none() {
            return false;
        }
        self.known.retain(|n| &n.id != id);
        true
    }

    pub fn snapshot(&self, polling: bool) -> Snapshot {
        Snapshot {
            notifications: self.known.clone(),
            unread_count: self.unread_count,
            polling,
        }
    }
}
