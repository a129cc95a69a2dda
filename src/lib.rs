//! # autodsl
//!
//! Nested construction blocks for plain structs, with required-field and
//! mutual-exclusion checks when the value is finalized.
//!
//! ## Example
//!
//! ```rust
//! use autodsl::{AutoDsl, DslError, StructuralError};
//!
//! #[derive(AutoDsl, Debug)]
//! pub struct Location {
//!     pub lat: f64,
//!     pub lng: f64,
//! }
//!
//! #[derive(AutoDsl, Debug)]
//! pub struct Person {
//!     #[auto_dsl(into)]
//!     pub name: String,
//!     pub age: u32,
//!     #[auto_dsl(nested)]
//!     pub home: Option<Location>,
//!     #[auto_dsl(nested)]
//!     pub friends: Option<Vec<Person>>,
//! }
//!
//! let me = person(|p| {
//!     p.name("Juan").age(34);
//!     p.home(|l| {
//!         l.lat(100.0).lng(100.0);
//!     });
//!     p.friends(|f| {
//!         f.add_with(|p| {
//!             p.name("Arturo").age(30);
//!         });
//!     });
//! })
//! .unwrap();
//! assert_eq!(me.friends.map(|f| f.len()), Some(1));
//!
//! let err = person(|p| {
//!     p.name("Pepe");
//! })
//! .unwrap_err();
//! assert!(matches!(
//!     err,
//!     DslError::Structural(StructuralError::MissingField { field: "age", .. })
//! ));
//! ```

pub mod collection;
pub mod dsl;
mod error;
pub mod schema;
pub mod state;
pub mod validate;

pub use autodsl_derive::AutoDsl;
pub use collection::{
    resolve_adapter, AdapterRef, CollectionAdapter, CollectionBuilder, DequeAdapter,
    LinkedListAdapter, SequenceAdapter,
};
pub use dsl::{build, Dsl, ShapeBuilder};
pub use error::{DslError, DslResult, SchemaError, StructuralError};
pub use schema::{
    ElementRef, ExclusiveGroup, FieldDescriptor, FieldKind, ShapeDeclaration, ShapeDescriptor,
    ShapeRef,
};
pub use state::{BuilderState, Slot};

// Not part of the public API.
#[doc(hidden)]
pub mod __private {
    pub use std::sync::OnceLock;
}
