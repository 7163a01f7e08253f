//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod supabase;
mod blob;

#[cfg(test)]
pub(crate) mod memory;

#[cfg(test)]
mod tests;

pub use traits::{EntityKind, Gateway, RowKey};
pub use db::SqliteGateway;
pub use supabase::{eq_filter, SupabaseGateway};
pub use blob::{random_suffix, PhotoUpload};
