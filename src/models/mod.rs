//! Data models for the sync engine.
//!
//! Records are opaque JSON documents; only `id` (and, for workers, the identity fields)
//! are ever inspected.

mod collection;
mod language;
mod record;
mod user;

pub use collection::*;
pub use language::*;
pub use record::*;
pub use user::*;
