//! Curator notes and their temporal version chains.
//!
//! A note is identified by its variant locus `(chrom, start, stop, ref,
//! alt)` and owns an ordered chain of versions. Versions carry a validity
//! window: `valid_from` is set when the version is created and `valid_to`
//! when it is superseded or retired. A committed chain has exactly one open
//! version (`valid_to = None`) and it is the chronologically latest.

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data_structs::coords::chrom_to_name;
use crate::data_structs::typedef::{ChromId, PosType, VpSmallStr};
use crate::data_structs::variant::NoteColumns;

/// Locus identity of a note.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteKey {
    pub chrom: ChromId,
    pub start: PosType,
    pub stop:  PosType,
    pub r#ref: VpSmallStr,
    pub alt:   VpSmallStr,
}

impl NoteKey {
    pub fn new(
        chrom: ChromId,
        start: PosType,
        stop: PosType,
        r#ref: &str,
        alt: &str,
    ) -> Self {
        Self {
            chrom,
            start,
            stop,
            r#ref: r#ref.into(),
            alt: alt.into(),
        }
    }

    /// `chrN:start-stop` locus label.
    pub fn locus_label(&self) -> String {
        format!("{}:{}-{}", chrom_to_name(self.chrom), self.start, self.stop)
    }

    /// `ref->alt` allele label.
    pub fn allele_label(&self) -> String {
        format!("{}->{}", self.r#ref, self.alt)
    }
}

/// One committed revision of a note's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteVersion {
    pub version_id: u64,
    pub content:    String,
    pub creator:    String,
    pub comment:    Option<String>,
    pub valid_from: DateTime<Utc>,
    pub valid_to:   Option<DateTime<Utc>>,
}

impl NoteVersion {
    pub fn is_open(&self) -> bool {
        self.valid_to.is_none()
    }
}

impl Display for NoteVersion {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "CN=\"{}\"|BY={}|CM={}|FR={}|TO={}|ID={}",
            self.content,
            self.creator,
            self.comment.as_deref().unwrap_or(""),
            self.valid_from.to_rfc3339(),
            self.valid_to
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "None".to_string()),
            self.version_id,
        )
    }
}

/// A note and its full version chain, ascending by `valid_from`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub note_id:  u64,
    pub key:      NoteKey,
    pub versions: Vec<NoteVersion>,
}

impl Note {
    /// The open version. The store guarantees this is also the
    /// max-`valid_from` version of the chain.
    pub fn current_version(&self) -> Option<&NoteVersion> {
        self.versions.iter().find(|v| v.is_open())
    }

    /// Versions most-recent-first.
    pub fn history(&self) -> Vec<&NoteVersion> {
        let mut ordered: Vec<&NoteVersion> = self.versions.iter().collect();
        ordered.sort_by(|a, b| b.valid_from.cmp(&a.valid_from));
        ordered
    }

    /// Number of committed edits (versions beyond the first).
    pub fn edit_count(&self) -> usize {
        self.versions.len().saturating_sub(1)
    }

    /// Renders the columns attached to an annotated variant row.
    pub fn to_columns(&self) -> NoteColumns {
        NoteColumns {
            note_id:      self.note_id.to_string(),
            chr_pos:      self.key.locus_label(),
            ref_alt:      self.key.allele_label(),
            note_history: self
                .current_version()
                .map(|v| v.to_string())
                .unwrap_or_default(),
        }
    }
}

impl Display for Note {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(
            f,
            "Note: {}|{}->{}",
            self.note_id,
            self.key.locus_label(),
            self.key.alt
        )
    }
}
