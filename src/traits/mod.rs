//! Trait definitions for CLC resources.
//!
//! Top-level resources implement [`Get`] and [`List`]; server-scoped
//! collections implement [`Collection`] over [`Keyed`] members.

mod collection;
mod get;
mod list;

pub use collection::{Collection, Keyed};
pub use get::Get;
pub use list::List;
