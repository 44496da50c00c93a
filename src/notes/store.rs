//! Append-only temporal versioning for curator notes.
//!
//! Each note owns a chain of versions ordered by `valid_from`. Creating a
//! version closes the currently open one (sets its `valid_to`) and inserts
//! a fresh open version; the two steps happen under one per-note lock so a
//! committed chain never holds two open versions. Closed versions are never
//! mutated — editing an active note always appends.
//!
//! The canonical "current version" is the open one (`valid_to = None`).
//! Because close-then-insert uses a single timestamp clamped to be no
//! earlier than the latest `valid_from`, the open version is always also
//! the most recent by time, so the two characterizations cannot diverge.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use anyhow::{anyhow, bail};
use chrono::{DateTime, Utc};
use hashbrown::HashMap;
use log::debug;

use crate::data_structs::note::{Note, NoteKey, NoteVersion};
use crate::data_structs::typedef::{ChromId, PosType};
use crate::repo::NoteLookup;

/// Field overrides for [`NoteVersionStore::amend_current_version`]. Unset
/// fields keep the amended version's value.
#[derive(Debug, Clone, Default)]
pub struct AmendFields {
    pub content:  Option<String>,
    pub creator:  Option<String>,
    pub comment:  Option<String>,
    pub valid_to: Option<DateTime<Utc>>,
}

/// A note's version history, most-recent-first, with an edit count summary.
#[derive(Debug, Clone)]
pub struct NoteHistory {
    pub versions:   Vec<NoteVersion>,
    pub edit_count: usize,
}

/// In-memory note store with per-note serialization.
///
/// The outer map is only locked long enough to fetch or insert a chain
/// handle; chain mutations lock that note's own mutex, so operations on
/// different notes proceed in parallel while `create_version` calls on one
/// note are mutually exclusive.
pub struct NoteVersionStore {
    chains:          RwLock<HashMap<NoteKey, Arc<Mutex<Note>>>>,
    next_note_id:    AtomicU64,
    next_version_id: AtomicU64,
}

impl Default for NoteVersionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteVersionStore {
    pub fn new() -> Self {
        Self {
            chains:          RwLock::new(HashMap::new()),
            next_note_id:    AtomicU64::new(1),
            next_version_id: AtomicU64::new(1),
        }
    }

    fn chain_handle(
        &self,
        key: &NoteKey,
    ) -> Arc<Mutex<Note>> {
        if let Some(chain) = self
            .chains
            .read()
            .expect("note map lock poisoned")
            .get(key)
        {
            return Arc::clone(chain);
        }
        let mut chains = self.chains.write().expect("note map lock poisoned");
        Arc::clone(chains.entry(key.clone()).or_insert_with(|| {
            let note_id = self.next_note_id.fetch_add(1, Ordering::Relaxed);
            Arc::new(Mutex::new(Note {
                note_id,
                key: key.clone(),
                versions: Vec::new(),
            }))
        }))
    }

    fn existing_handle(
        &self,
        key: &NoteKey,
    ) -> Option<Arc<Mutex<Note>>> {
        self.chains
            .read()
            .expect("note map lock poisoned")
            .get(key)
            .map(Arc::clone)
    }

    /// Appends a new open version to the note's chain, closing the prior
    /// open version first. The note is created implicitly on its first
    /// version. Both steps commit atomically under the note's lock; if the
    /// lock is poisoned the whole call fails and the chain is untouched.
    pub fn create_version(
        &self,
        key: &NoteKey,
        content: &str,
        creator: &str,
        comment: Option<&str>,
    ) -> anyhow::Result<NoteVersion> {
        let handle = self.chain_handle(key);
        let mut note = handle
            .lock()
            .map_err(|_| anyhow!("Note chain lock poisoned for {}", key.locus_label()))?;
        let version = Self::append_version(
            &mut note,
            &self.next_version_id,
            content,
            creator,
            comment,
        );
        debug!(
            "note {}: committed version {} ({} total)",
            note.note_id,
            version.version_id,
            note.versions.len()
        );
        Ok(version)
    }

    fn append_version(
        note: &mut Note,
        version_ids: &AtomicU64,
        content: &str,
        creator: &str,
        comment: Option<&str>,
    ) -> NoteVersion {
        // One timestamp for both the close and the insert, clamped strictly
        // past the chain's latest so `valid_from` is unique per chain even
        // when the clock does not advance between calls.
        let mut now = Utc::now();
        if let Some(last) = note.versions.last() {
            if now <= last.valid_from {
                now = last.valid_from + chrono::Duration::nanoseconds(1);
            }
        }
        for open in note.versions.iter_mut().filter(|v| v.is_open()) {
            open.valid_to = Some(now);
        }
        let version = NoteVersion {
            version_id: version_ids.fetch_add(1, Ordering::Relaxed),
            content:    content.to_string(),
            creator:    creator.to_string(),
            comment:    comment.map(str::to_string),
            valid_from: now,
            valid_to:   None,
        };
        note.versions.push(version.clone());
        version
    }

    /// Amends the version identified by `version_id`.
    ///
    /// When the target is still open and `fields.valid_to` is unset, the
    /// call is a content edit on an active version: it appends a new version
    /// via the close-then-insert path instead of mutating in place, so the
    /// audit trail survives. An explicit `valid_to` updates the target
    /// directly, retiring it without superseding content. Amending a closed
    /// version without a `valid_to` is rejected.
    pub fn amend_current_version(
        &self,
        version_id: u64,
        fields: AmendFields,
    ) -> anyhow::Result<NoteVersion> {
        let handle = self
            .find_chain_with_version(version_id)
            .ok_or_else(|| anyhow!("No note version with id {}", version_id))?;
        let mut note = handle
            .lock()
            .map_err(|_| anyhow!("Note chain lock poisoned"))?;

        if let Some(valid_to) = fields.valid_to {
            let target = note
                .versions
                .iter_mut()
                .find(|v| v.version_id == version_id)
                .ok_or_else(|| anyhow!("Version {} vanished mid-amend", version_id))?;
            target.valid_to = Some(valid_to);
            return Ok(target.clone());
        }

        let target = note
            .versions
            .iter()
            .find(|v| v.version_id == version_id)
            .ok_or_else(|| anyhow!("Version {} vanished mid-amend", version_id))?;
        if !target.is_open() {
            bail!(
                "Version {} is closed; committed versions are never edited",
                version_id
            );
        }

        let content = fields.content.unwrap_or_else(|| target.content.clone());
        let creator = fields.creator.unwrap_or_else(|| target.creator.clone());
        let comment = fields.comment.or_else(|| target.comment.clone());
        Ok(Self::append_version(
            &mut note,
            &self.next_version_id,
            &content,
            &creator,
            comment.as_deref(),
        ))
    }

    fn find_chain_with_version(
        &self,
        version_id: u64,
    ) -> Option<Arc<Mutex<Note>>> {
        let chains = self.chains.read().expect("note map lock poisoned");
        for chain in chains.values() {
            let holds = chain
                .lock()
                .map(|note| note.versions.iter().any(|v| v.version_id == version_id))
                .unwrap_or(false);
            if holds {
                return Some(Arc::clone(chain));
            }
        }
        None
    }

    /// Snapshot of a note and its full chain.
    pub fn get(
        &self,
        key: &NoteKey,
    ) -> Option<Note> {
        let handle = self.existing_handle(key)?;
        let note = handle.lock().ok()?;
        if note.versions.is_empty() {
            None
        }
        else {
            Some(note.clone())
        }
    }

    /// The open (current) version of the note, if any.
    pub fn current_version(
        &self,
        key: &NoteKey,
    ) -> Option<NoteVersion> {
        let note = self.get(key)?;
        let current = note.current_version().cloned();
        if let Some(current) = current.as_ref() {
            debug_assert_eq!(
                Some(current.version_id),
                note.history().first().map(|v| v.version_id),
                "open version must be the most recent by time"
            );
        }
        current
    }

    /// Full history, most recent first.
    pub fn history(
        &self,
        key: &NoteKey,
    ) -> Option<NoteHistory> {
        let note = self.get(key)?;
        let versions: Vec<NoteVersion> =
            note.history().into_iter().cloned().collect();
        Some(NoteHistory {
            edit_count: note.edit_count(),
            versions,
        })
    }
}

impl NoteLookup for NoteVersionStore {
    /// Locus lookup used by the annotation joiner. Notes match on
    /// (chromosome, start, stop, alt allele); the reference allele is part
    /// of note identity but not of the lookup key.
    fn find_by_locus(
        &self,
        chrom: ChromId,
        start: PosType,
        stop: PosType,
        allele: &str,
    ) -> Option<Note> {
        let chains = self.chains.read().expect("note map lock poisoned");
        let mut hits: Vec<Note> = chains
            .iter()
            .filter(|(key, _)| {
                key.chrom == chrom
                    && key.start == start
                    && key.stop == stop
                    && key.alt.as_str() == allele
            })
            .filter_map(|(_, chain)| chain.lock().ok().map(|note| note.clone()))
            .filter(|note| !note.versions.is_empty())
            .collect();
        hits.sort_by_key(|note| note.note_id);
        hits.into_iter().next()
    }
}
