//! Field-level description of a buildable shape.
//!
//! A [`ShapeDescriptor`] is produced once per shape, either by the
//! `#[derive(AutoDsl)]` expansion or by hand through
//! [`ShapeDescriptor::declare`], and is shared read-only afterwards. Every
//! builder of that shape points at the same descriptor.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use tracing::debug;

use crate::collection::AdapterRef;
use crate::dsl::Dsl;
use crate::error::SchemaError;

/// Lazily resolves a shape's cached descriptor.
pub type ShapeLookup = fn() -> Result<&'static ShapeDescriptor, SchemaError>;

/// Storage for a shape's descriptor, initialised on first use.
pub type ShapeCell = OnceLock<Result<ShapeDescriptor, SchemaError>>;

/// Derives a descriptor into `cell` the first time it is asked for and hands
/// out the cached result afterwards, including a cached failure.
pub fn cached(
    cell: &'static ShapeCell,
    derive: impl FnOnce() -> Result<ShapeDescriptor, SchemaError>,
) -> Result<&'static ShapeDescriptor, SchemaError> {
    cell.get_or_init(|| {
        let derived = derive();
        match &derived {
            Ok(shape) => debug!(shape = shape.name(), fields = shape.fields().len(), "derived shape"),
            Err(err) => debug!(error = %err, "shape declaration rejected"),
        }
        derived
    })
    .as_ref()
    .map_err(Clone::clone)
}

/// Reference to another shape, resolved on demand so shapes may refer to
/// themselves.
#[derive(Clone, Copy)]
pub struct ShapeRef {
    name: &'static str,
    lookup: ShapeLookup,
}

impl ShapeRef {
    pub const fn new(name: &'static str, lookup: ShapeLookup) -> Self {
        ShapeRef { name, lookup }
    }

    pub fn of<T: Dsl>() -> Self {
        ShapeRef::new(T::SHAPE_NAME, T::shape)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn resolve(&self) -> Result<&'static ShapeDescriptor, SchemaError> {
        (self.lookup)()
    }
}

impl fmt::Debug for ShapeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ShapeRef").field(&self.name).finish()
    }
}

impl PartialEq for ShapeRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ShapeRef {}

/// Element type of a repeated field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementRef {
    pub type_name: &'static str,
    /// Set when the element is itself a buildable shape.
    pub shape: Option<ShapeRef>,
}

impl ElementRef {
    pub const fn value(type_name: &'static str) -> Self {
        ElementRef {
            type_name,
            shape: None,
        }
    }

    pub const fn shape(type_name: &'static str, shape: ShapeRef) -> Self {
        ElementRef {
            type_name,
            shape: Some(shape),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Scalar,
    Nested(ShapeRef),
    Repeated {
        element: ElementRef,
        adapter: Option<AdapterRef>,
    },
}

/// One field of a shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    name: &'static str,
    type_name: &'static str,
    kind: FieldKind,
    required: bool,
    nullable: bool,
}

impl FieldDescriptor {
    /// A required plain value.
    pub fn scalar(name: &'static str, type_name: &'static str) -> Self {
        FieldDescriptor {
            name,
            type_name,
            kind: FieldKind::Scalar,
            required: true,
            nullable: false,
        }
    }

    /// A required field holding another shape.
    pub fn nested(name: &'static str, type_name: &'static str, shape: ShapeRef) -> Self {
        FieldDescriptor {
            kind: FieldKind::Nested(shape),
            ..FieldDescriptor::scalar(name, type_name)
        }
    }

    /// A required collection, backed by the default adapter unless
    /// [`with_adapter`](Self::with_adapter) picks another one.
    pub fn repeated(name: &'static str, type_name: &'static str, element: ElementRef) -> Self {
        FieldDescriptor {
            kind: FieldKind::Repeated {
                element,
                adapter: None,
            },
            ..FieldDescriptor::scalar(name, type_name)
        }
    }

    /// Marks the field optional; its storage is assumed to hold absence.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self.nullable = true;
        self
    }

    /// Makes the field mandatory even if its storage could hold absence.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Overrides whether the declared storage can represent absence.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Picks the collection adapter of a repeated field. Ignored for other
    /// kinds.
    pub fn with_adapter(mut self, adapter: AdapterRef) -> Self {
        if let FieldKind::Repeated { adapter: slot, .. } = &mut self.kind {
            *slot = Some(adapter);
        }
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_repeated(&self) -> bool {
        matches!(self.kind, FieldKind::Repeated { .. })
    }

    pub fn is_nested(&self) -> bool {
        matches!(self.kind, FieldKind::Nested(_))
    }
}

/// Fields of which at most one may be set on a finished value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusiveGroup {
    members: Vec<&'static str>,
    indices: Vec<usize>,
}

impl ExclusiveGroup {
    pub fn members(&self) -> &[&'static str] {
        &self.members
    }

    /// Slot positions of the members, in the same order as [`members`](Self::members).
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn contains(&self, field: &str) -> bool {
        self.members.iter().any(|member| *member == field)
    }
}

/// Immutable description of a buildable shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeDescriptor {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
    exclusive: Vec<ExclusiveGroup>,
}

impl ShapeDescriptor {
    /// Starts a declaration. Nothing is checked until
    /// [`ShapeDeclaration::finish`].
    pub fn declare(name: &'static str) -> ShapeDeclaration {
        ShapeDeclaration {
            name,
            fields: Vec::new(),
            exclusive: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    pub fn exclusive_groups(&self) -> &[ExclusiveGroup] {
        &self.exclusive
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|field| field.required)
    }
}

impl fmt::Display for ShapeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {{", self.name)?;
        for field in &self.fields {
            let presence = if field.required { "required" } else { "optional" };
            write!(f, "    {}: {} ({}", field.name, field.type_name, presence)?;
            match &field.kind {
                FieldKind::Scalar => {}
                FieldKind::Nested(shape) => write!(f, ", nested {}", shape.name())?,
                FieldKind::Repeated { element, adapter } => {
                    let adapter = adapter.unwrap_or(AdapterRef::DEFAULT);
                    write!(f, ", repeated {} via {}", element.type_name, adapter.name)?;
                }
            }
            writeln!(f, ")")?;
        }
        for group in &self.exclusive {
            writeln!(f, "    exclusive({})", group.members.join(", "))?;
        }
        write!(f, "}}")
    }
}

/// A shape under construction. Produced by [`ShapeDescriptor::declare`].
#[derive(Debug, Clone)]
pub struct ShapeDeclaration {
    name: &'static str,
    fields: Vec<FieldDescriptor>,
    exclusive: Vec<Vec<&'static str>>,
}

impl ShapeDeclaration {
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn scalar(self, name: &'static str, type_name: &'static str) -> Self {
        self.field(FieldDescriptor::scalar(name, type_name))
    }

    pub fn optional_scalar(self, name: &'static str, type_name: &'static str) -> Self {
        self.field(FieldDescriptor::scalar(name, type_name).optional())
    }

    pub fn nested(self, name: &'static str, type_name: &'static str, shape: ShapeRef) -> Self {
        self.field(FieldDescriptor::nested(name, type_name, shape))
    }

    /// Declares a required repeated field using the default adapter.
    pub fn repeated(self, name: &'static str, type_name: &'static str, element: ElementRef) -> Self {
        self.field(FieldDescriptor::repeated(name, type_name, element))
    }

    /// Declares a group of fields of which at most one may be set.
    pub fn exclusive(mut self, members: &[&'static str]) -> Self {
        self.exclusive.push(members.to_vec());
        self
    }

    /// Checks the declaration and freezes it into a descriptor.
    pub fn finish(self) -> Result<ShapeDescriptor, SchemaError> {
        let shape = self.name;
        if shape.is_empty() {
            return Err(SchemaError::EmptyShapeName);
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err(SchemaError::EmptyFieldName { shape });
            }
            if !seen.insert(field.name) {
                return Err(SchemaError::DuplicateField {
                    shape,
                    field: field.name,
                });
            }
            if let FieldKind::Repeated { element, .. } = &field.kind {
                if element.type_name.is_empty() {
                    return Err(SchemaError::MissingElementType {
                        shape,
                        field: field.name,
                    });
                }
            }
            if !field.required && !field.nullable {
                return Err(SchemaError::AbsenceNotRepresentable {
                    shape,
                    field: field.name,
                    type_name: field.type_name,
                });
            }
        }

        let mut exclusive = Vec::with_capacity(self.exclusive.len());
        for members in self.exclusive {
            if members.len() < 2 {
                return Err(SchemaError::DegenerateExclusiveGroup {
                    shape,
                    count: members.len(),
                });
            }
            let mut indices = Vec::with_capacity(members.len());
            for &member in &members {
                let index = self
                    .fields
                    .iter()
                    .position(|field| field.name == member)
                    .ok_or(SchemaError::UnknownExclusiveMember {
                        shape,
                        field: member,
                    })?;
                if indices.contains(&index) {
                    return Err(SchemaError::RepeatedExclusiveMember {
                        shape,
                        field: member,
                    });
                }
                if self.fields[index].required {
                    return Err(SchemaError::RequiredExclusiveMember {
                        shape,
                        field: member,
                    });
                }
                indices.push(index);
            }
            exclusive.push(ExclusiveGroup { members, indices });
        }

        Ok(ShapeDescriptor {
            name: shape,
            fields: self.fields,
            exclusive,
        })
    }
}
