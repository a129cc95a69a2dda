//! Per-invocation builder state.
//!
//! Generated builders keep their typed values in their own fields and track
//! what has happened to each slot in a [`BuilderState`]. The validator reads
//! only this state, so it works the same for every shape.

use tracing::trace;

use crate::collection::{CollectionAdapter, CollectionBuilder};
use crate::dsl::{build, Dsl};
use crate::error::{DslError, StructuralError};
use crate::schema::ShapeDescriptor;
use crate::validate;

/// Lifecycle of one field slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Unset,
    /// Assigned directly; later assignments overwrite it.
    Value,
    /// A nested block is running.
    Nesting,
    /// A nested block closed successfully.
    Nested,
    /// A repeated block is running.
    Collecting,
    /// Holds a collection. `sealed` once a repeated block has closed.
    Collection { len: usize, sealed: bool },
}

impl Slot {
    /// Whether the slot holds a value a finished instance can use.
    pub fn is_set(&self) -> bool {
        matches!(self, Slot::Value | Slot::Nested | Slot::Collection { .. })
    }

    /// Closed by a block; no further writes are accepted.
    pub fn is_sealed(&self) -> bool {
        matches!(self, Slot::Nested | Slot::Collection { sealed: true, .. })
    }
}

/// Slot bookkeeping for one builder. Owned by exactly one invocation.
///
/// Methods taking a slot `index` expect the position of a field in the
/// shape's declaration order, as generated builders pass it.
///
/// # Panics
///
/// Every method taking an `index` panics if it is not a field position of
/// [`shape`](Self::shape).
#[derive(Debug)]
pub struct BuilderState {
    shape: &'static ShapeDescriptor,
    slots: Vec<Slot>,
    failure: Option<DslError>,
}

impl BuilderState {
    pub fn new(shape: &'static ShapeDescriptor) -> Self {
        BuilderState {
            shape,
            slots: vec![Slot::Unset; shape.fields().len()],
            failure: None,
        }
    }

    pub fn shape(&self) -> &'static ShapeDescriptor {
        self.shape
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Slot {
        self.slots[index]
    }

    pub fn slot_named(&self, field: &str) -> Option<Slot> {
        self.shape.field_index(field).map(|index| self.slots[index])
    }

    /// First failure recorded while the configuration block ran.
    pub fn failure(&self) -> Option<&DslError> {
        self.failure.as_ref()
    }

    /// Records a failure unless an earlier one is already pending.
    pub fn fail(&mut self, err: DslError) {
        trace!(shape = self.shape.name(), error = %err, "builder failure recorded");
        if self.failure.is_none() {
            self.failure = Some(err);
        }
    }

    /// Every invariant the current state breaks, in reporting order.
    pub fn violations(&self) -> Vec<StructuralError> {
        validate::violations(self)
    }

    fn field_name(&self, index: usize) -> &'static str {
        self.shape.fields()[index].name()
    }

    /// A block skipped because the invocation already failed.
    fn skip_after_failure(&self, index: usize) -> bool {
        if self.failure.is_none() {
            return false;
        }
        trace!(shape = self.shape.name(), field = self.field_name(index), "block skipped after failure");
        true
    }

    fn reject_sealed(&mut self, index: usize) -> bool {
        if !self.slots[index].is_sealed() {
            return false;
        }
        let err = StructuralError::SlotReassigned {
            shape: self.shape.name(),
            field: self.field_name(index),
        };
        self.fail(err.into());
        true
    }

    /// Marks a direct assignment. Returns `false`, and records a failure,
    /// when the slot was already closed by a block.
    pub fn record_value(&mut self, index: usize) -> bool {
        if self.reject_sealed(index) {
            return false;
        }
        trace!(shape = self.shape.name(), field = self.field_name(index), "slot assigned");
        self.slots[index] = Slot::Value;
        true
    }

    /// Runs a nested block for slot `index` and returns the finished child.
    ///
    /// Returns `None` when the slot was already closed or the child failed;
    /// the failure is kept and reported by finalize. Once any failure is
    /// recorded, `block` is not run.
    pub fn run_nested<T: Dsl>(
        &mut self,
        index: usize,
        block: impl FnOnce(&mut T::Builder),
    ) -> Option<T> {
        if self.skip_after_failure(index) || self.reject_sealed(index) {
            return None;
        }
        let previous = self.slots[index];
        self.slots[index] = Slot::Nesting;
        match build::<T>(block) {
            Ok(child) => {
                trace!(shape = self.shape.name(), field = self.field_name(index), "nested block closed");
                self.slots[index] = Slot::Nested;
                Some(child)
            }
            Err(err) => {
                self.slots[index] = previous;
                let err = err.within(self.shape.name(), self.field_name(index));
                self.fail(err);
                None
            }
        }
    }

    /// Runs a repeated block for slot `index`, continuing `current` if the
    /// slot already holds elements added through the shorthand. Like
    /// [`run_nested`](Self::run_nested), `block` is not run once the
    /// invocation has failed.
    pub fn run_collection<T, A>(
        &mut self,
        index: usize,
        adapter: A,
        current: Option<A::Container>,
        block: impl FnOnce(&mut CollectionBuilder<T, A>),
    ) -> Option<A::Container>
    where
        A: CollectionAdapter<T>,
    {
        if self.skip_after_failure(index) || self.reject_sealed(index) {
            return current;
        }
        let previous = self.slots[index];
        let mut collection = match (current, previous) {
            (Some(container), Slot::Collection { .. }) => CollectionBuilder::resume(adapter, container),
            _ => CollectionBuilder::new(adapter),
        };
        self.slots[index] = Slot::Collecting;
        block(&mut collection);
        match collection.finish() {
            Ok((container, len)) => {
                trace!(shape = self.shape.name(), field = self.field_name(index), len, "repeated block closed");
                self.slots[index] = Slot::Collection { len, sealed: true };
                Some(container)
            }
            Err(err) => {
                self.slots[index] = previous;
                let err = err.within(self.shape.name(), self.field_name(index));
                self.fail(err);
                None
            }
        }
    }

    /// Appends one element to the collection in slot `index`, creating the
    /// container through `adapter` on first use.
    pub fn append_item<T, A>(
        &mut self,
        index: usize,
        adapter: A,
        current: Option<A::Container>,
        item: T,
    ) -> A::Container
    where
        A: CollectionAdapter<T>,
    {
        let sealed = matches!(self.slots[index], Slot::Collection { sealed: true, .. });
        let mut container = current.unwrap_or_else(|| adapter.create());
        adapter.append(&mut container, item);
        self.slots[index] = Slot::Collection {
            len: adapter.len(&container),
            sealed,
        };
        container
    }

    /// Builds one element in place and appends it to slot `index`.
    ///
    /// A failed element is recorded against the slot and `current` is
    /// handed back unchanged. Nothing runs once the invocation has failed.
    pub fn append_with<T, A>(
        &mut self,
        index: usize,
        adapter: A,
        current: Option<A::Container>,
        block: impl FnOnce(&mut T::Builder),
    ) -> Option<A::Container>
    where
        T: Dsl,
        A: CollectionAdapter<T>,
    {
        if self.skip_after_failure(index) {
            return current;
        }
        match build::<T>(block) {
            Ok(item) => Some(self.append_item(index, adapter, current, item)),
            Err(err) => {
                let err = err.within(self.shape.name(), self.field_name(index));
                self.fail(err);
                current
            }
        }
    }
}
