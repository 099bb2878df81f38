//! Template option parsing.
//!
//! Templates declare their options at runtime, so flags are resolved against
//! a schema handed in per call rather than a fixed command definition:
//! - `schema` - `ParamDef` / `ParamKind`, as read from the catalog
//! - `value` - `OptionValue` and type inference for untyped values
//! - `resolver` - the token scan itself

mod resolver;
mod schema;
mod value;

pub use resolver::{ParsedOptions, resolve, short_flags};
pub use schema::{ParamDef, ParamKind};
pub use value::OptionValue;
