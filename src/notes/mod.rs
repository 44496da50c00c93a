//! The temporal version store for curator notes.

mod store;

pub use store::{AmendFields, NoteHistory, NoteVersionStore};
