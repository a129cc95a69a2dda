//! Field analysis and type introspection.
//!
//! Classifies each struct field as a plain value, a nested shape or a
//! repeated collection, and reads the field-level `#[auto_dsl(...)]` options.

use quote::ToTokens;
use syn::ext::IdentExt;
use syn::{Field, GenericArgument, PathArguments, Type};

/// How the builder exposes a field.
#[derive(Clone)]
pub enum FieldRole {
    /// Settable slot, last write wins.
    Scalar,
    /// Another shape, filled through a nested block.
    Nested,
    /// A collection filled through a repeated block.
    Repeated {
        element: Type,
        /// Adapter type named with `collection = ...`; the default adapter
        /// is used when absent.
        adapter: Option<syn::Path>,
        /// The element is itself a shape.
        nested: bool,
    },
}

/// Information about a field extracted for builder generation.
#[derive(Clone)]
pub struct FieldInfo {
    /// The field's identifier
    pub name: syn::Ident,
    /// The field's type as declared
    pub ty: Type,
    /// Whether this field is wrapped in Option<T>
    pub is_optional: bool,
    /// The inner type T if this is Option<T>, otherwise None
    pub inner_type: Option<Type>,
    /// Must be set before finalize.
    pub required: bool,
    /// Setter accepts `impl Into<T>`.
    pub into: bool,
    pub role: FieldRole,
}

#[derive(Default)]
struct FieldOptions {
    nested: bool,
    repeated: bool,
    scalar: bool,
    required: bool,
    into: bool,
    collection: Option<syn::Path>,
}

impl FieldInfo {
    /// Analyzes a field and extracts information needed for builder generation.
    pub fn from_field(field: &Field) -> syn::Result<Self> {
        let name = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new_spanned(field, "Field must have a name"))?;

        let ty = field.ty.clone();
        let (is_optional, inner_type) = extract_option_inner_type(&ty);
        let options = field_options(field)?;

        if options.scalar && (options.nested || options.repeated || options.collection.is_some()) {
            return Err(syn::Error::new_spanned(
                field,
                "`scalar` cannot be combined with `nested`, `repeated` or `collection`",
            ));
        }
        if options.required && !is_optional {
            return Err(syn::Error::new_spanned(
                field,
                "`required` only applies to `Option<_>` fields; other fields are required already",
            ));
        }

        let storage = inner_type.as_ref().unwrap_or(&ty);
        let repeated = options.repeated
            || options.collection.is_some()
            || (!options.scalar && container_name(storage).as_deref() == Some("Vec"));

        let role = if repeated {
            let element = first_type_argument(storage).ok_or_else(|| {
                syn::Error::new_spanned(
                    &field.ty,
                    "repeated field needs a container with an element type, e.g. `Vec<T>`",
                )
            })?;
            if options.collection.is_none() && container_name(storage).as_deref() != Some("Vec") {
                return Err(syn::Error::new_spanned(
                    &field.ty,
                    "only `Vec` uses the default adapter; pick one with `#[auto_dsl(collection = ...)]`",
                ));
            }
            FieldRole::Repeated {
                element,
                adapter: options.collection,
                nested: options.nested,
            }
        } else if options.nested {
            FieldRole::Nested
        } else {
            FieldRole::Scalar
        };

        if options.into && !matches!(role, FieldRole::Scalar) {
            return Err(syn::Error::new_spanned(
                field,
                "`into` only applies to plain value fields",
            ));
        }

        Ok(FieldInfo {
            name,
            ty,
            is_optional,
            inner_type,
            required: !is_optional || options.required,
            into: options.into,
            role,
        })
    }

    /// The type held by the builder slot and passed to direct setters.
    ///
    /// For Option<T> fields, this returns T (unwrapped).
    /// For other fields, this returns the original type.
    pub fn storage_type(&self) -> &Type {
        if let Some(inner) = &self.inner_type {
            inner
        } else {
            &self.ty
        }
    }

    /// Field name without a raw-identifier prefix.
    pub fn plain_name(&self) -> String {
        self.name.unraw().to_string()
    }
}

fn field_options(field: &Field) -> syn::Result<FieldOptions> {
    let mut options = FieldOptions::default();
    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("auto_dsl")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("nested") {
                options.nested = true;
            } else if meta.path.is_ident("repeated") {
                options.repeated = true;
            } else if meta.path.is_ident("scalar") {
                options.scalar = true;
            } else if meta.path.is_ident("required") {
                options.required = true;
            } else if meta.path.is_ident("into") {
                options.into = true;
            } else if meta.path.is_ident("collection") {
                options.collection = Some(meta.value()?.parse()?);
            } else {
                return Err(meta.error(
                    "unsupported auto_dsl field option; expected `nested`, `repeated`, `scalar`, `required`, `into` or `collection`",
                ));
            }
            Ok(())
        })?;
    }
    Ok(options)
}

/// Renders a type the way it is written, without token spacing.
pub fn type_label(ty: &Type) -> String {
    ty.to_token_stream().to_string().replace(' ', "")
}

/// Checks if a type is `Option<T>` and extracts the inner type T.
///
/// Returns (is_option, inner_type) where:
/// - is_option is true if the type is Option<T>
/// - inner_type is Some(T) if the type is Option<T>, None otherwise
fn extract_option_inner_type(ty: &Type) -> (bool, Option<Type>) {
    if container_name(ty).as_deref() == Some("Option") {
        if let Some(inner_ty) = first_type_argument(ty) {
            return (true, Some(inner_ty));
        }
    }
    (false, None)
}

/// Last path segment of a type, e.g. `LinkedList` for
/// `std::collections::LinkedList<T>`.
fn container_name(ty: &Type) -> Option<String> {
    if let Type::Path(type_path) = ty {
        if type_path.qself.is_none() {
            if let Some(segment) = type_path.path.segments.last() {
                return Some(segment.ident.to_string());
            }
        }
    }
    None
}

fn first_type_argument(ty: &Type) -> Option<Type> {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if let PathArguments::AngleBracketed(args) = &segment.arguments {
                return args.args.iter().find_map(|arg| match arg {
                    GenericArgument::Type(inner_ty) => Some(inner_ty.clone()),
                    _ => None,
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn first_field(tokens: proc_macro2::TokenStream) -> syn::Result<FieldInfo> {
        let input: syn::DeriveInput = syn::parse2(tokens).unwrap();
        match input.data {
            syn::Data::Struct(data) => FieldInfo::from_field(data.fields.iter().next().unwrap()),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_detect_option_type() {
        let ty: Type = syn::parse2(quote! { Option<String> }).unwrap();
        let (is_option, inner) = extract_option_inner_type(&ty);
        assert!(is_option);
        assert!(inner.is_some());
    }

    #[test]
    fn test_detect_non_option_type() {
        let ty: Type = syn::parse2(quote! { String }).unwrap();
        let (is_option, inner) = extract_option_inner_type(&ty);
        assert!(!is_option);
        assert!(inner.is_none());
    }

    #[test]
    fn test_container_name_uses_last_segment() {
        let ty: Type = syn::parse2(quote! { std::collections::LinkedList<Stamp> }).unwrap();
        assert_eq!(container_name(&ty).as_deref(), Some("LinkedList"));
        assert_eq!(type_label(&ty), "std::collections::LinkedList<Stamp>");
    }

    #[test]
    fn test_required_scalar() {
        let info = first_field(quote! {
            struct Test {
                pub name: String
            }
        })
        .unwrap();
        assert_eq!(info.name, "name");
        assert!(info.required);
        assert!(!info.is_optional);
        assert!(matches!(info.role, FieldRole::Scalar));
    }

    #[test]
    fn test_optional_nested() {
        let info = first_field(quote! {
            struct Test {
                #[auto_dsl(nested)]
                address: Option<Address>
            }
        })
        .unwrap();
        assert!(!info.required);
        assert!(matches!(info.role, FieldRole::Nested));
        assert_eq!(type_label(info.storage_type()), "Address");
    }

    #[test]
    fn test_vec_is_repeated_by_default() {
        let info = first_field(quote! {
            struct Test {
                items: Vec<String>
            }
        })
        .unwrap();
        match info.role {
            FieldRole::Repeated {
                element,
                adapter,
                nested,
            } => {
                assert_eq!(type_label(&element), "String");
                assert!(adapter.is_none());
                assert!(!nested);
            }
            _ => panic!("expected a repeated field"),
        }
    }

    #[test]
    fn test_scalar_opt_out() {
        let info = first_field(quote! {
            struct Test {
                #[auto_dsl(scalar)]
                keys: Vec<String>
            }
        })
        .unwrap();
        assert!(matches!(info.role, FieldRole::Scalar));
    }

    #[test]
    fn test_collection_override() {
        let info = first_field(quote! {
            struct Test {
                #[auto_dsl(nested, collection = autodsl::LinkedListAdapter)]
                stamps: Option<LinkedList<Stamp>>
            }
        })
        .unwrap();
        match info.role {
            FieldRole::Repeated {
                element,
                adapter,
                nested,
            } => {
                assert_eq!(type_label(&element), "Stamp");
                assert!(adapter.is_some());
                assert!(nested);
            }
            _ => panic!("expected a repeated field"),
        }
    }

    #[test]
    fn test_non_vec_container_needs_adapter() {
        let err = first_field(quote! {
            struct Test {
                #[auto_dsl(repeated)]
                stamps: LinkedList<Stamp>
            }
        });
        assert!(err.is_err());
    }

    #[test]
    fn test_repeated_without_element_type() {
        let err = first_field(quote! {
            struct Test {
                #[auto_dsl(repeated)]
                items: Bag
            }
        });
        let message = err.err().unwrap().to_string();
        assert!(message.contains("element type"));
    }

    #[test]
    fn test_conflicting_options() {
        assert!(first_field(quote! {
            struct Test {
                #[auto_dsl(scalar, nested)]
                items: Vec<String>
            }
        })
        .is_err());

        assert!(first_field(quote! {
            struct Test {
                #[auto_dsl(required)]
                name: String
            }
        })
        .is_err());

        assert!(first_field(quote! {
            struct Test {
                #[auto_dsl(into, nested)]
                home: Location
            }
        })
        .is_err());
    }

    #[test]
    fn test_required_option() {
        let info = first_field(quote! {
            struct Test {
                #[auto_dsl(required, into)]
                nickname: Option<String>
            }
        })
        .unwrap();
        assert!(info.required);
        assert!(info.is_optional);
        assert!(info.into);
    }
}
