use thiserror::Error;

/// A shape declaration that cannot be turned into a descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("shape name must not be empty")]
    EmptyShapeName,

    #[error("shape `{shape}` declares a field with an empty name")]
    EmptyFieldName { shape: &'static str },

    #[error("shape `{shape}` declares field `{field}` more than once")]
    DuplicateField {
        shape: &'static str,
        field: &'static str,
    },

    #[error("repeated field `{shape}.{field}` declares no element type")]
    MissingElementType {
        shape: &'static str,
        field: &'static str,
    },

    #[error("optional field `{shape}.{field}` has type `{type_name}`, which cannot represent absence")]
    AbsenceNotRepresentable {
        shape: &'static str,
        field: &'static str,
        type_name: &'static str,
    },

    #[error("exclusive group on `{shape}` references unknown field `{field}`")]
    UnknownExclusiveMember {
        shape: &'static str,
        field: &'static str,
    },

    #[error("exclusive group on `{shape}` lists `{field}` twice")]
    RepeatedExclusiveMember {
        shape: &'static str,
        field: &'static str,
    },

    #[error("exclusive group on `{shape}` needs at least two fields, got {count}")]
    DegenerateExclusiveGroup { shape: &'static str, count: usize },

    #[error("field `{shape}.{field}` is required and cannot belong to an exclusive group")]
    RequiredExclusiveMember {
        shape: &'static str,
        field: &'static str,
    },
}

/// A built value that breaks one of its shape's invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("{shape}: required field `{field}` was never set")]
    MissingField {
        shape: &'static str,
        field: &'static str,
    },

    #[error("{shape}: fields {} are mutually exclusive", .fields.join(", "))]
    ExclusiveConflict {
        shape: &'static str,
        fields: Vec<&'static str>,
    },

    #[error("{shape}: field `{field}` was already closed and cannot be assigned again")]
    SlotReassigned {
        shape: &'static str,
        field: &'static str,
    },

    #[error("{shape}.{field}: {source}")]
    Nested {
        shape: &'static str,
        field: &'static str,
        #[source]
        source: Box<StructuralError>,
    },
}

impl StructuralError {
    /// Wraps a child's failure with the parent slot it was being built for.
    pub fn nested(shape: &'static str, field: &'static str, source: StructuralError) -> Self {
        StructuralError::Nested {
            shape,
            field,
            source: Box::new(source),
        }
    }

    /// The innermost error, with every `Nested` layer peeled off.
    pub fn root_cause(&self) -> &StructuralError {
        let mut current = self;
        while let StructuralError::Nested { source, .. } = current {
            current = &**source;
        }
        current
    }

    /// Dotted path from the outermost shape down to the failing field,
    /// e.g. `Person.address.zip_code`.
    pub fn path(&self) -> String {
        let mut segments = Vec::new();
        let mut current = self;
        loop {
            match current {
                StructuralError::Nested {
                    shape,
                    field,
                    source,
                } => {
                    if segments.is_empty() {
                        segments.push(*shape);
                    }
                    segments.push(*field);
                    current = &**source;
                }
                StructuralError::MissingField { shape, field }
                | StructuralError::SlotReassigned { shape, field } => {
                    if segments.is_empty() {
                        segments.push(*shape);
                    }
                    segments.push(*field);
                    break;
                }
                StructuralError::ExclusiveConflict { shape, .. } => {
                    if segments.is_empty() {
                        segments.push(*shape);
                    }
                    break;
                }
            }
        }
        segments.join(".")
    }
}

/// Everything a DSL invocation can fail with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DslError {
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("structural error: {0}")]
    Structural(#[from] StructuralError),
}

impl DslError {
    /// Re-attributes a child invocation's failure to the parent slot.
    /// Schema errors pass through untouched.
    pub fn within(self, shape: &'static str, field: &'static str) -> Self {
        match self {
            DslError::Structural(inner) => {
                DslError::Structural(StructuralError::nested(shape, field, inner))
            }
            schema @ DslError::Schema(_) => schema,
        }
    }

    pub fn as_structural(&self) -> Option<&StructuralError> {
        match self {
            DslError::Structural(err) => Some(err),
            DslError::Schema(_) => None,
        }
    }
}

pub type DslResult<T> = Result<T, DslError>;
