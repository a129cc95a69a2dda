//! # autodsl-derive
//!
//! The `#[derive(AutoDsl)]` procedural macro behind the `autodsl` crate.
//! Use it through `autodsl::AutoDsl`; the generated code refers to the
//! runtime as `::autodsl`.
//!
//! ## Example
//!
//! ```rust,ignore
//! use autodsl::AutoDsl;
//!
//! #[derive(AutoDsl)]
//! pub struct Rating {
//!     pub stars: u8,
//! }
//!
//! #[derive(AutoDsl)]
//! pub struct Scores {
//!     pub points: f64,
//!     #[auto_dsl(nested)]
//!     pub rating: Option<Rating>,
//! }
//!
//! let scores = scores(|s| {
//!     s.points(5.0);
//!     s.rating(|r| {
//!         r.stars(5);
//!     });
//! })
//! .unwrap();
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod field;
mod generate;
mod parse;

/// Derives a nested-block DSL for the annotated struct.
///
/// This macro generates:
/// - A builder struct named `{StructName}Builder`
/// - One entry point per field on the builder (see below)
/// - `impl autodsl::Dsl` with the shape's cached descriptor
/// - `impl autodsl::ShapeBuilder` whose `finalize` validates and assembles
///   the struct
/// - A free function named after the struct in snake case
///   (`Person` -> `person`) taking the configuration block
///
/// ## Field Handling
///
/// - **Required fields**: non-`Option<T>` fields must be set before finalize
/// - **Optional fields**: `Option<T>` fields may be left unset
/// - **Nested fields** (`#[auto_dsl(nested)]`): `field(|b| ...)` builds the
///   child in place, `set_field(value)` assigns a finished one
/// - **Repeated fields** (`Vec<T>`, or `#[auto_dsl(repeated)]`):
///   `field(|c| ...)` opens the collection, `set_field(container)` assigns a
///   whole one; with `nested`, `add_field(item)` appends a finished element
///   and `add_field_with(|b| ...)` builds one in place
///
/// ## Options
///
/// Struct level: `function = "name"`, `rename = "Name"`,
/// `exclusive(a, b, ...)`.
///
/// Field level: `nested`, `repeated`, `scalar`, `required`, `into`,
/// `collection = AdapterType`.
#[proc_macro_derive(AutoDsl, attributes(auto_dsl))]
pub fn derive_auto_dsl(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate::impl_auto_dsl(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.to_compile_error().into(),
    }
}
