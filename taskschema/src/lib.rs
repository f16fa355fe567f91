//! Schema reconciliation and value synthesis for agent task schemas.
//!
//! Task input and output schemas are merged across extraction passes
//! ([`merge_schemas`]), turned into placeholder or example values
//! ([`synthesize`]), and edited field by field from value key paths
//! ([`set_field_type`]). [`classify`] decides how each node is rendered.

mod classify;
mod edit;
mod errors;
mod field_type;
mod file;
mod key_path;
mod merge;
mod node;
mod refs;
mod store;
mod synthesize;

pub use classify::*;
pub use edit::*;
pub use errors::*;
pub use field_type::*;
pub use file::*;
pub use key_path::*;
pub use merge::*;
pub use node::*;
pub use refs::*;
pub use store::*;
pub use synthesize::*;
