//! The DSL entry point and the traits generated builders implement.

use tracing::debug;

use crate::error::{DslResult, SchemaError};
use crate::schema::ShapeDescriptor;
use crate::state::BuilderState;

/// A shape that can be assembled through a configuration block.
///
/// Implemented by `#[derive(AutoDsl)]`. A hand-written implementation
/// declares its descriptor with [`ShapeDescriptor::declare`] and caches it
/// with [`cached`](crate::schema::cached).
pub trait Dsl: Sized {
    /// Name used in the descriptor and in error messages.
    const SHAPE_NAME: &'static str;

    type Builder: ShapeBuilder<Output = Self>;

    /// The shape's descriptor, derived on first use and shared afterwards.
    fn shape() -> Result<&'static ShapeDescriptor, SchemaError>;

    /// Same as [`build::<Self>`](build).
    fn dsl(block: impl FnOnce(&mut Self::Builder)) -> DslResult<Self> {
        build::<Self>(block)
    }
}

/// Mutable scratch structure behind a configuration block.
pub trait ShapeBuilder: Sized {
    type Output;

    fn from_state(state: BuilderState) -> Self;

    fn state(&self) -> &BuilderState;

    /// Validates the accumulated slots and moves them into the instance.
    /// Consumes the builder, so it runs at most once.
    fn finalize(self) -> DslResult<Self::Output>;
}

/// Builds one `T`: allocates a builder, runs `block` against it, finalizes.
pub fn build<T: Dsl>(block: impl FnOnce(&mut T::Builder)) -> DslResult<T> {
    let shape = T::shape()?;
    debug!(shape = shape.name(), "dsl block started");
    let mut builder = T::Builder::from_state(BuilderState::new(shape));
    block(&mut builder);
    builder.finalize()
}
