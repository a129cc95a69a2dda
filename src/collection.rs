//! Collection adapters for repeated fields.
//!
//! A repeated field is filled through a [`CollectionAdapter`], a small
//! strategy object that creates an empty container and appends to it. The
//! adapter is chosen per field when the shape is declared; fields without an
//! explicit choice use [`SequenceAdapter`] (a `Vec`).

use std::collections::{LinkedList, VecDeque};
use std::marker::PhantomData;

use tracing::trace;

use crate::dsl::{build, Dsl};
use crate::error::{DslError, DslResult};
use crate::schema::{FieldDescriptor, FieldKind};

/// Descriptor-level name of an adapter and the container it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterRef {
    pub name: &'static str,
    pub container: &'static str,
}

impl AdapterRef {
    pub const DEFAULT: AdapterRef = SequenceAdapter::REF;
}

/// Creates and fills the container behind a repeated field.
///
/// Implementations must append in insertion order.
pub trait CollectionAdapter<T> {
    type Container;

    fn create(&self) -> Self::Container;

    fn append(&self, container: &mut Self::Container, item: T);

    /// Number of elements currently held by `container`.
    fn len(&self, container: &Self::Container) -> usize;

    fn describe(&self) -> AdapterRef;
}

/// The adapter a repeated field ends up with: its declared one, or the
/// default. `None` for fields that are not repeated.
pub fn resolve_adapter(field: &FieldDescriptor) -> Option<AdapterRef> {
    match field.kind() {
        FieldKind::Repeated { adapter, .. } => Some(adapter.unwrap_or(AdapterRef::DEFAULT)),
        FieldKind::Scalar | FieldKind::Nested(_) => None,
    }
}

/// Descriptor of adapter `A` used for elements of type `T`.
pub fn describe<T, A>() -> AdapterRef
where
    A: CollectionAdapter<T> + Default,
{
    A::default().describe()
}

/// Default adapter: an insertion-ordered `Vec`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SequenceAdapter;

impl SequenceAdapter {
    pub const REF: AdapterRef = AdapterRef {
        name: "SequenceAdapter",
        container: "Vec",
    };
}

impl<T> CollectionAdapter<T> for SequenceAdapter {
    type Container = Vec<T>;

    fn create(&self) -> Vec<T> {
        Vec::new()
    }

    fn append(&self, container: &mut Vec<T>, item: T) {
        container.push(item);
    }

    fn len(&self, container: &Vec<T>) -> usize {
        container.len()
    }

    fn describe(&self) -> AdapterRef {
        Self::REF
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LinkedListAdapter;

impl LinkedListAdapter {
    pub const REF: AdapterRef = AdapterRef {
        name: "LinkedListAdapter",
        container: "LinkedList",
    };
}

impl<T> CollectionAdapter<T> for LinkedListAdapter {
    type Container = LinkedList<T>;

    fn create(&self) -> LinkedList<T> {
        LinkedList::new()
    }

    fn append(&self, container: &mut LinkedList<T>, item: T) {
        container.push_back(item);
    }

    fn len(&self, container: &LinkedList<T>) -> usize {
        container.len()
    }

    fn describe(&self) -> AdapterRef {
        Self::REF
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DequeAdapter;

impl DequeAdapter {
    pub const REF: AdapterRef = AdapterRef {
        name: "DequeAdapter",
        container: "VecDeque",
    };
}

impl<T> CollectionAdapter<T> for DequeAdapter {
    type Container = VecDeque<T>;

    fn create(&self) -> VecDeque<T> {
        VecDeque::new()
    }

    fn append(&self, container: &mut VecDeque<T>, item: T) {
        container.push_back(item);
    }

    fn len(&self, container: &VecDeque<T>) -> usize {
        container.len()
    }

    fn describe(&self) -> AdapterRef {
        Self::REF
    }
}

/// Receiver of a repeated-field block: the collection in progress.
///
/// Elements are appended with [`add`](Self::add) and friends. The first
/// failed element (see [`try_add`](Self::try_add)) is kept and aborts the
/// enclosing build once the block closes.
pub struct CollectionBuilder<T, A: CollectionAdapter<T>> {
    adapter: A,
    container: A::Container,
    failure: Option<DslError>,
    _element: PhantomData<fn(T)>,
}

impl<T, A: CollectionAdapter<T>> CollectionBuilder<T, A> {
    pub fn new(adapter: A) -> Self {
        let container = adapter.create();
        CollectionBuilder::resume(adapter, container)
    }

    /// Continues filling a container that may already hold elements.
    pub fn resume(adapter: A, container: A::Container) -> Self {
        CollectionBuilder {
            adapter,
            container,
            failure: None,
            _element: PhantomData,
        }
    }

    pub fn add(&mut self, item: impl Into<T>) -> &mut Self {
        if self.failure.is_none() {
            self.adapter.append(&mut self.container, item.into());
        }
        self
    }

    pub fn add_all<I>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<T>,
    {
        for item in items {
            self.add(item);
        }
        self
    }

    /// Appends the outcome of another DSL invocation, keeping its error if
    /// it failed.
    pub fn try_add(&mut self, item: DslResult<T>) -> &mut Self {
        match item {
            Ok(item) => self.add(item),
            Err(err) => {
                trace!(index = self.len(), error = %err, "collection element rejected");
                if self.failure.is_none() {
                    self.failure = Some(err);
                }
                self
            }
        }
    }

    pub fn len(&self) -> usize {
        self.adapter.len(&self.container)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn failure(&self) -> Option<&DslError> {
        self.failure.as_ref()
    }

    pub fn adapter(&self) -> AdapterRef {
        self.adapter.describe()
    }

    /// Closes the block, yielding the container and its length.
    pub fn finish(self) -> DslResult<(A::Container, usize)> {
        match self.failure {
            Some(err) => Err(err),
            None => {
                let len = self.adapter.len(&self.container);
                Ok((self.container, len))
            }
        }
    }
}

impl<T: Dsl, A: CollectionAdapter<T>> CollectionBuilder<T, A> {
    /// Builds one element of a shape type in place and appends it.
    ///
    /// Once an element has failed, later blocks are not run.
    pub fn add_with(&mut self, block: impl FnOnce(&mut T::Builder)) -> &mut Self {
        if self.failure.is_some() {
            return self;
        }
        let item = build::<T>(block);
        self.try_add(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StructuralError;
    use crate::schema::ElementRef;

    #[test]
    fn test_resolve_adapter_defaults_to_sequence() {
        let plain = FieldDescriptor::repeated("tags", "Vec<String>", ElementRef::value("String"));
        assert_eq!(resolve_adapter(&plain), Some(SequenceAdapter::REF));

        let custom = plain.clone().with_adapter(DequeAdapter::REF);
        assert_eq!(resolve_adapter(&custom), Some(DequeAdapter::REF));

        let scalar = FieldDescriptor::scalar("name", "String");
        assert_eq!(resolve_adapter(&scalar), None);
    }

    #[test]
    fn test_describe_matches_adapter() {
        assert_eq!(describe::<u8, SequenceAdapter>(), AdapterRef::DEFAULT);
        assert_eq!(describe::<u8, LinkedListAdapter>().container, "LinkedList");
        assert_eq!(describe::<u8, DequeAdapter>().name, "DequeAdapter");
    }

    #[test]
    fn test_adapters_keep_insertion_order() {
        let mut seq = CollectionBuilder::<u32, SequenceAdapter>::new(SequenceAdapter);
        seq.add(3u32).add(1u32).add(2u32);
        let (vec, len) = seq.finish().unwrap();
        assert_eq!(vec, vec![3, 1, 2]);
        assert_eq!(len, 3);

        let mut list = CollectionBuilder::<u32, LinkedListAdapter>::new(LinkedListAdapter);
        list.add_all([3u32, 1, 2]);
        let (list, _) = list.finish().unwrap();
        assert_eq!(list.into_iter().collect::<Vec<_>>(), vec![3, 1, 2]);

        let mut deque = CollectionBuilder::<u32, DequeAdapter>::new(DequeAdapter);
        deque.add_all(vec![3u32, 1, 2]);
        let (deque, _) = deque.finish().unwrap();
        assert_eq!(deque, VecDeque::from(vec![3, 1, 2]));
    }

    #[test]
    fn test_add_converts_into_element() {
        let mut names = CollectionBuilder::<String, SequenceAdapter>::new(SequenceAdapter);
        names.add("Hello").add(String::from("World"));
        assert_eq!(names.len(), 2);
        assert_eq!(names.adapter(), SequenceAdapter::REF);
        let (names, _) = names.finish().unwrap();
        assert_eq!(names, vec!["Hello", "World"]);
    }

    #[test]
    fn test_try_add_keeps_first_failure() {
        let first: DslError = StructuralError::MissingField {
            shape: "Person",
            field: "age",
        }
        .into();
        let second: DslError = StructuralError::MissingField {
            shape: "Person",
            field: "name",
        }
        .into();

        let mut items = CollectionBuilder::<u32, SequenceAdapter>::new(SequenceAdapter);
        items.add(1u32).try_add(Err(first.clone())).try_add(Err(second)).add(2u32);
        assert_eq!(items.len(), 1);
        assert_eq!(items.failure(), Some(&first));
        assert_eq!(items.finish().unwrap_err(), first);
    }

    #[test]
    fn test_resume_counts_existing_elements() {
        let mut items = CollectionBuilder::<u32, SequenceAdapter>::resume(SequenceAdapter, vec![7, 7, 7]);
        assert_eq!(items.len(), 3);
        items.add(8u32);
        assert!(!items.is_empty());
        assert_eq!(items.finish().unwrap(), (vec![7, 7, 7, 8], 4));
    }
}
