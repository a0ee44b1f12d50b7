//! Reference documentation for constructor parameters, rendered from the
//! constraints that validate them.
//!
//! ```text
//! Check ──render──▶ "* *name*: int in [0, 10] _(default: 5)_"
//! ClassSchema ────▶ "=== Name" block
//! Registry ───────▶ prelude + blocks + epilogue
//! ```
pub mod check;
pub mod render;
pub mod schema;
pub mod error;
pub mod path_de;
pub mod logging;
pub mod cli;

pub use check::{Check, DefaultValue, EnumValue, ItemType, KeyType, ListCheck};
pub use error::{RenderError, SchemaError};
pub use render::{render_param, type_string};
pub use schema::{render_document, ClassSchema, Frame, Param, Registry};
