//! Code generation for the DSL builder.
//!
//! This module uses the `quote` crate to generate the builder struct, the
//! per-field entry points, the `Dsl`/`ShapeBuilder` impls and the free
//! entry function.

use crate::field::{type_label, FieldInfo, FieldRole};
use crate::parse::{check_exclusive, extract_fields, shape_options, snake_case, validate_struct};
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::ext::IdentExt;
use syn::DeriveInput;

/// Generates the complete DSL implementation for a struct.
pub fn impl_auto_dsl(input: &DeriveInput) -> syn::Result<TokenStream> {
    validate_struct(input)?;

    let fields = extract_fields(input)?;
    let field_infos = fields
        .iter()
        .map(FieldInfo::from_field)
        .collect::<syn::Result<Vec<_>>>()?;

    let options = shape_options(input)?;
    check_exclusive(&options.exclusive, &field_infos, input)?;

    let struct_name = &input.ident;
    let builder_name = format_ident!("{}Builder", struct_name);
    let vis = &input.vis;
    let shape_name = options
        .rename
        .clone()
        .unwrap_or_else(|| struct_name.to_string());
    let function_name = options
        .function
        .clone()
        .unwrap_or_else(|| format_ident!("{}", snake_case(&struct_name.to_string())));

    let builder_struct = generate_builder_struct(&builder_name, &field_infos, vis);
    let entry_points = generate_entry_points(&field_infos);
    let dsl_impl = generate_dsl_impl(struct_name, &builder_name, &shape_name, &field_infos, &options.exclusive);
    let shape_builder_impl = generate_shape_builder_impl(struct_name, &builder_name, &shape_name, &field_infos);

    Ok(quote! {
        #builder_struct

        impl #builder_name {
            #entry_points
        }

        #dsl_impl

        #shape_builder_impl

        #vis fn #function_name(
            block: impl ::std::ops::FnOnce(&mut #builder_name),
        ) -> ::autodsl::DslResult<#struct_name> {
            ::autodsl::build::<#struct_name>(block)
        }
    })
}

/// Generates the builder struct definition.
fn generate_builder_struct(
    builder_name: &syn::Ident,
    field_infos: &[FieldInfo],
    vis: &syn::Visibility,
) -> TokenStream {
    let builder_fields = field_infos.iter().map(|field| {
        let name = &field.name;
        let storage = field.storage_type();
        quote! { #name: ::std::option::Option<#storage> }
    });

    quote! {
        #vis struct #builder_name {
            __state: ::autodsl::BuilderState,
            #(#builder_fields,)*
        }
    }
}

/// Generates setters and block entry points for each field.
fn generate_entry_points(field_infos: &[FieldInfo]) -> TokenStream {
    let methods = field_infos.iter().enumerate().map(|(index, field)| {
        let name = &field.name;
        let storage = field.storage_type();
        let plain = field.plain_name();
        let set_name = format_ident!("set_{}", plain);

        let direct_setter = quote! {
            pub fn #set_name(&mut self, value: #storage) -> &mut Self {
                if self.__state.record_value(#index) {
                    self.#name = ::std::option::Option::Some(value);
                }
                self
            }
        };

        match &field.role {
            FieldRole::Scalar if field.into => quote! {
                pub fn #name(&mut self, value: impl ::std::convert::Into<#storage>) -> &mut Self {
                    if self.__state.record_value(#index) {
                        self.#name = ::std::option::Option::Some(value.into());
                    }
                    self
                }
            },
            FieldRole::Scalar => quote! {
                pub fn #name(&mut self, value: #storage) -> &mut Self {
                    if self.__state.record_value(#index) {
                        self.#name = ::std::option::Option::Some(value);
                    }
                    self
                }
            },
            FieldRole::Nested => quote! {
                pub fn #name(
                    &mut self,
                    block: impl ::std::ops::FnOnce(&mut <#storage as ::autodsl::Dsl>::Builder),
                ) -> &mut Self {
                    if let ::std::option::Option::Some(value) =
                        self.__state.run_nested::<#storage>(#index, block)
                    {
                        self.#name = ::std::option::Option::Some(value);
                    }
                    self
                }

                #direct_setter
            },
            FieldRole::Repeated {
                element,
                adapter,
                nested,
            } => {
                let adapter = adapter_type(adapter.as_ref());
                let add_item = nested.then(|| {
                    let add_name = format_ident!("add_{}", plain);
                    let add_with_name = format_ident!("add_{}_with", plain);
                    quote! {
                        pub fn #add_with_name(
                            &mut self,
                            block: impl ::std::ops::FnOnce(&mut <#element as ::autodsl::Dsl>::Builder),
                        ) -> &mut Self {
                            let current = self.#name.take();
                            self.#name = self.__state.append_with::<#element, #adapter>(
                                #index,
                                <#adapter as ::std::default::Default>::default(),
                                current,
                                block,
                            );
                            self
                        }

                        pub fn #add_name(&mut self, value: #element) -> &mut Self {
                            let current = self.#name.take();
                            self.#name = ::std::option::Option::Some(
                                self.__state.append_item::<#element, #adapter>(
                                    #index,
                                    <#adapter as ::std::default::Default>::default(),
                                    current,
                                    value,
                                ),
                            );
                            self
                        }
                    }
                });
                quote! {
                    pub fn #name(
                        &mut self,
                        block: impl ::std::ops::FnOnce(&mut ::autodsl::CollectionBuilder<#element, #adapter>),
                    ) -> &mut Self {
                        let current = self.#name.take();
                        self.#name = self.__state.run_collection::<#element, #adapter>(
                            #index,
                            <#adapter as ::std::default::Default>::default(),
                            current,
                            block,
                        );
                        self
                    }

                    #direct_setter

                    #add_item
                }
            }
        }
    });

    quote! {
        #(#methods)*
    }
}

/// Generates `impl Dsl`, including the cached descriptor.
fn generate_dsl_impl(
    struct_name: &syn::Ident,
    builder_name: &syn::Ident,
    shape_name: &str,
    field_infos: &[FieldInfo],
    exclusive: &[Vec<syn::Ident>],
) -> TokenStream {
    let descriptors = field_infos.iter().map(field_descriptor);
    let groups = exclusive.iter().map(|group| {
        let members = group.iter().map(|member| member.unraw().to_string());
        quote! { .exclusive(&[#(#members),*]) }
    });

    quote! {
        impl ::autodsl::Dsl for #struct_name {
            const SHAPE_NAME: &'static str = #shape_name;

            type Builder = #builder_name;

            fn shape() -> ::std::result::Result<&'static ::autodsl::ShapeDescriptor, ::autodsl::SchemaError> {
                static SHAPE: ::autodsl::schema::ShapeCell = ::autodsl::__private::OnceLock::new();
                ::autodsl::schema::cached(&SHAPE, || {
                    ::autodsl::ShapeDescriptor::declare(#shape_name)
                        #(.field(#descriptors))*
                        #(#groups)*
                        .finish()
                })
            }
        }
    }
}

/// Generates the `FieldDescriptor` expression for one field.
fn field_descriptor(field: &FieldInfo) -> TokenStream {
    let name = field.plain_name();
    let storage = field.storage_type();
    let type_name = type_label(storage);

    let base = match &field.role {
        FieldRole::Scalar => quote! {
            ::autodsl::FieldDescriptor::scalar(#name, #type_name)
        },
        FieldRole::Nested => quote! {
            ::autodsl::FieldDescriptor::nested(#name, #type_name, ::autodsl::ShapeRef::of::<#storage>())
        },
        FieldRole::Repeated {
            element,
            adapter,
            nested,
        } => {
            let element_name = type_label(element);
            let element_ref = if *nested {
                quote! { ::autodsl::ElementRef::shape(#element_name, ::autodsl::ShapeRef::of::<#element>()) }
            } else {
                quote! { ::autodsl::ElementRef::value(#element_name) }
            };
            let with_adapter = adapter.as_ref().map(|adapter| {
                quote! { .with_adapter(::autodsl::collection::describe::<#element, #adapter>()) }
            });
            quote! {
                ::autodsl::FieldDescriptor::repeated(#name, #type_name, #element_ref) #with_adapter
            }
        }
    };

    match (field.is_optional, field.required) {
        (true, true) => quote! { #base.optional().required() },
        (true, false) => quote! { #base.optional() },
        (false, _) => base,
    }
}

/// Generates `impl ShapeBuilder`, whose `finalize` validates and assembles
/// the instance.
fn generate_shape_builder_impl(
    struct_name: &syn::Ident,
    builder_name: &syn::Ident,
    shape_name: &str,
    field_infos: &[FieldInfo],
) -> TokenStream {
    let names: Vec<_> = field_infos.iter().map(|field| &field.name).collect();
    let assignments = field_infos.iter().map(|field| {
        let name = &field.name;
        let plain = field.plain_name();
        if field.is_optional {
            // Optional fields: pass through as-is (already Option<T>)
            quote! { #name }
        } else {
            quote! { #name: ::autodsl::validate::require(#name, #shape_name, #plain)? }
        }
    });

    quote! {
        impl ::autodsl::ShapeBuilder for #builder_name {
            type Output = #struct_name;

            fn from_state(state: ::autodsl::BuilderState) -> Self {
                #builder_name {
                    __state: state,
                    #(#names: ::std::option::Option::None,)*
                }
            }

            fn state(&self) -> &::autodsl::BuilderState {
                &self.__state
            }

            fn finalize(self) -> ::autodsl::DslResult<#struct_name> {
                let #builder_name { __state, #(#names,)* } = self;
                ::autodsl::validate::finalize(__state)?;
                ::std::result::Result::Ok(#struct_name {
                    #(#assignments,)*
                })
            }
        }
    }
}

fn adapter_type(adapter: Option<&syn::Path>) -> TokenStream {
    match adapter {
        Some(path) => quote! { #path },
        None => quote! { ::autodsl::SequenceAdapter },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn expand(tokens: TokenStream) -> syn::Result<String> {
        let input: DeriveInput = syn::parse2(tokens).unwrap();
        impl_auto_dsl(&input).map(|tokens| tokens.to_string())
    }

    #[test]
    fn test_impl_generates_builder_and_entry_function() {
        let code = expand(quote! {
            pub struct Person {
                pub name: String,
                pub age: u32,
            }
        })
        .unwrap();

        assert!(code.contains("pub struct PersonBuilder"));
        assert!(code.contains("pub fn person"));
        assert!(code.contains("impl :: autodsl :: Dsl for Person"));
        assert!(code.contains("impl :: autodsl :: ShapeBuilder for PersonBuilder"));
    }

    #[test]
    fn test_impl_with_nested_and_repeated_fields() {
        let code = expand(quote! {
            pub struct Person {
                pub name: String,
                #[auto_dsl(nested)]
                pub address: Option<Address>,
                #[auto_dsl(nested)]
                pub friends: Option<Vec<Person>>,
            }
        })
        .unwrap();

        assert!(code.contains("fn set_address"));
        assert!(code.contains("run_nested :: < Address >"));
        assert!(code.contains("fn add_friends"));
        assert!(code.contains("fn add_friends_with"));
        assert!(code.contains("append_with :: < Person , :: autodsl :: SequenceAdapter >"));
        assert!(code.contains("CollectionBuilder < Person , :: autodsl :: SequenceAdapter >"));
    }

    #[test]
    fn test_impl_uses_declared_adapter() {
        let code = expand(quote! {
            pub struct Parcel {
                pub items: Vec<String>,
                #[auto_dsl(nested, collection = LinkedListAdapter)]
                pub stamps: Option<LinkedList<Stamp>>,
            }
        })
        .unwrap();

        assert!(code.contains("CollectionBuilder < Stamp , LinkedListAdapter >"));
        assert!(code.contains("with_adapter"));
        // `items` holds plain strings, so no shorthand is generated for it.
        assert!(!code.contains("add_items"));
    }

    #[test]
    fn test_impl_honours_function_and_exclusive_options() {
        let code = expand(quote! {
            #[auto_dsl(function = "new_address", exclusive(location, landmark))]
            pub struct Address {
                pub street: String,
                #[auto_dsl(nested)]
                pub location: Option<Location>,
                pub landmark: Option<String>,
            }
        })
        .unwrap();

        assert!(code.contains("fn new_address"));
        assert!(code.contains("\"location\" , \"landmark\""));
    }

    #[test]
    fn test_impl_rejects_required_exclusive_member() {
        let err = expand(quote! {
            #[auto_dsl(exclusive(street, landmark))]
            pub struct Address {
                pub street: String,
                pub landmark: Option<String>,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("required"));
    }

    #[test]
    fn test_impl_rejects_unknown_exclusive_member() {
        let err = expand(quote! {
            #[auto_dsl(exclusive(landmark, location))]
            pub struct Address {
                pub landmark: Option<String>,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("location"));
    }

    #[test]
    fn test_impl_rejects_enum() {
        let result = expand(quote! {
            pub enum TestEnum {
                Variant1,
                Variant2,
            }
        });
        assert!(result.is_err());
    }
}
