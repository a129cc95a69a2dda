//! Parsing and validation of the annotated struct.
//!
//! Checks that the input is a non-generic struct with named fields and reads
//! the struct-level `#[auto_dsl(...)]` options.

use syn::{Data, DeriveInput, Fields, Ident, LitStr};

/// Struct-level options.
#[derive(Default)]
pub struct ShapeOptions {
    /// Name of the generated entry function.
    pub function: Option<Ident>,
    /// Name recorded in the descriptor and in error messages.
    pub rename: Option<String>,
    /// Groups of fields of which at most one may be set.
    pub exclusive: Vec<Vec<Ident>>,
}

/// Validates that the input is a struct with named fields and no generics.
pub fn validate_struct(input: &DeriveInput) -> syn::Result<()> {
    match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(_) => {}
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(
                    input,
                    "AutoDsl can only be derived for structs with named fields, not tuple structs",
                ))
            }
            Fields::Unit => {
                return Err(syn::Error::new_spanned(
                    input,
                    "AutoDsl cannot be derived for unit structs",
                ))
            }
        },
        Data::Enum(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "AutoDsl can only be derived for structs, not enums",
            ))
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                input,
                "AutoDsl can only be derived for structs, not unions",
            ))
        }
    }

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "AutoDsl does not support generic structs",
        ));
    }
    Ok(())
}

/// Extracts the named fields from a struct.
///
/// Assumes the input has already been validated with `validate_struct()`.
pub fn extract_fields(
    input: &DeriveInput,
) -> syn::Result<&syn::punctuated::Punctuated<syn::Field, syn::token::Comma>> {
    match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields_named) => Ok(&fields_named.named),
            _ => Err(syn::Error::new_spanned(input, "Expected named fields")),
        },
        _ => Err(syn::Error::new_spanned(input, "Expected a struct")),
    }
}

/// Reads every `#[auto_dsl(...)]` attribute on the struct itself.
pub fn shape_options(input: &DeriveInput) -> syn::Result<ShapeOptions> {
    let mut options = ShapeOptions::default();
    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("auto_dsl")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("function") {
                let name: LitStr = meta.value()?.parse()?;
                options.function = Some(name.parse()?);
                Ok(())
            } else if meta.path.is_ident("rename") {
                let name: LitStr = meta.value()?.parse()?;
                if name.value().is_empty() {
                    return Err(meta.error("shape name must not be empty"));
                }
                options.rename = Some(name.value());
                Ok(())
            } else if meta.path.is_ident("exclusive") {
                let mut group = Vec::new();
                meta.parse_nested_meta(|member| {
                    let ident = member
                        .path
                        .get_ident()
                        .cloned()
                        .ok_or_else(|| member.error("expected a field name"))?;
                    group.push(ident);
                    Ok(())
                })?;
                options.exclusive.push(group);
                Ok(())
            } else {
                Err(meta.error("unsupported auto_dsl option; expected `function`, `rename` or `exclusive`"))
            }
        })?;
    }
    Ok(options)
}

/// Converts a type name to the snake case used for the entry function.
pub fn snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Checks exclusive groups against the parsed fields: members must exist,
/// be optional, appear once, and a group needs at least two of them.
pub fn check_exclusive(
    groups: &[Vec<Ident>],
    fields: &[crate::field::FieldInfo],
    input: &DeriveInput,
) -> syn::Result<()> {
    for group in groups {
        if group.len() < 2 {
            let span = group.first().map(|ident| ident.span()).unwrap_or_else(|| input.ident.span());
            return Err(syn::Error::new(
                span,
                "an exclusive group needs at least two fields",
            ));
        }
        for (i, member) in group.iter().enumerate() {
            if group[..i].contains(member) {
                return Err(syn::Error::new(member.span(), "field listed twice in exclusive group"));
            }
            let field = fields
                .iter()
                .find(|field| field.name == *member)
                .ok_or_else(|| syn::Error::new(member.span(), format!("no field named `{}`", member)))?;
            if field.required {
                return Err(syn::Error::new(
                    member.span(),
                    format!(
                        "`{}` is required and cannot be part of an exclusive group; declare it as `Option<_>`",
                        member
                    ),
                ));
            }
        }
    }
    Ok(())
}
