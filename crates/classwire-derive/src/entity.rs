use proc_macro2::TokenStream;
use quote::{format_ident, quote, quote_spanned};
use syn::spanned::Spanned;
use syn::{parse, Data, DeriveInput, Error, Field, Fields, FieldsNamed, Ident, Result};

use crate::attrs::{option_inner, type_label, EntityAttrs, FieldAttrs};

pub fn derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    match parse(input).and_then(|ast| impl_entity(&ast)) {
        Ok(tokens) => tokens,
        Err(error) => error.to_compile_error(),
    }
    .into()
}

fn named_fields(ast: &DeriveInput) -> Result<&FieldsNamed> {
    match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(fields),
            Fields::Unnamed(_) | Fields::Unit => Err(Error::new_spanned(
                &ast.ident,
                "`Entity` can only be derived for structs with named fields.",
            )),
        },
        Data::Enum(data) => Err(Error::new(
            data.enum_token.span,
            "`Entity` cannot be derived for enums; use `WireEnum` for field enums.",
        )),
        Data::Union(data) => Err(Error::new(
            data.union_token.span,
            "`Entity` cannot be derived for unions.",
        )),
    }
}

/// Accessor functions and table row for one declared field.
fn field_entry(type_name: &Ident, position: usize, field: &Field) -> Result<(TokenStream, TokenStream)> {
    let attrs = FieldAttrs::parse(&field.attrs)?;
    let Some(ident) = &field.ident else {
        return Err(Error::new_spanned(field, "expected a named field"));
    };
    let field_name = ident.to_string();
    let getter = format_ident!("__classwire_get_{}", position);
    let setter = format_ident!("__classwire_set_{}", position);

    if attrs.skip {
        let functions = quote! {
            fn #getter(
                _entity: &dyn ::classwire_codec::Entity,
            ) -> ::core::option::Option<&dyn ::core::any::Any> {
                ::core::option::Option::None
            }

            fn #setter(
                _entity: &mut dyn ::classwire_codec::Entity,
                _value: ::std::boxed::Box<dyn ::core::any::Any>,
            ) -> ::classwire_codec::Result<()> {
                ::core::result::Result::Err(::classwire_codec::CodecError::TypeMismatch {
                    expected: "no value for a skipped field",
                })
            }
        };
        let row = quote! {
            ::classwire_codec::FieldDescriptor {
                name: #field_name,
                value_type: ::classwire_codec::ValueType::Plain {
                    type_id: ::core::any::TypeId::of::<()>,
                    type_name: "skipped",
                },
                transient: true,
                get: #getter,
                set: #setter,
            }
        };
        return Ok((functions, row));
    }

    let nullable = option_inner(&field.ty);
    let inner = nullable.unwrap_or(&field.ty);
    let inner_label = type_label(inner);

    let read = if nullable.is_some() {
        quote! { entity.#ident.as_ref().map(|value| value as &dyn ::core::any::Any) }
    } else {
        quote! { ::core::option::Option::Some(&entity.#ident as &dyn ::core::any::Any) }
    };
    let assign = if nullable.is_some() {
        quote! { entity.#ident = ::core::option::Option::Some(*value); }
    } else {
        quote! { entity.#ident = *value; }
    };
    let value_type = if attrs.ordinal {
        quote! {
            ::classwire_codec::ValueType::Enum(
                <#inner as ::classwire_codec::WireEnum>::enum_descriptor
            )
        }
    } else {
        quote! {
            ::classwire_codec::ValueType::Plain {
                type_id: ::core::any::TypeId::of::<#inner>,
                type_name: #inner_label,
            }
        }
    };

    // enum fields without `#[wire(ordinal)]` fail here instead of at the first append
    let codec_check = if attrs.ordinal {
        quote_spanned! {inner.span()=>
            const _: fn() = || {
                fn wire_enum<T: ::classwire_codec::WireEnum>() {}
                wire_enum::<#inner>();
            };
        }
    } else {
        quote_spanned! {inner.span()=>
            const _: fn() = || {
                fn wire_value<T: ::classwire_codec::WireValue>() {}
                wire_value::<#inner>();
            };
        }
    };

    let functions = quote! {
        #codec_check

        fn #getter(
            entity: &dyn ::classwire_codec::Entity,
        ) -> ::core::option::Option<&dyn ::core::any::Any> {
            let entity = entity.downcast_ref::<#type_name>()?;
            #read
        }

        fn #setter(
            entity: &mut dyn ::classwire_codec::Entity,
            value: ::std::boxed::Box<dyn ::core::any::Any>,
        ) -> ::classwire_codec::Result<()> {
            let entity = entity.downcast_mut::<#type_name>().ok_or(
                ::classwire_codec::CodecError::TypeMismatch {
                    expected: ::core::stringify!(#type_name),
                },
            )?;
            let value = value.downcast::<#inner>().map_err(|_| {
                ::classwire_codec::CodecError::TypeMismatch { expected: #inner_label }
            })?;
            #assign
            ::core::result::Result::Ok(())
        }
    };
    let row = quote! {
        ::classwire_codec::FieldDescriptor {
            name: #field_name,
            value_type: #value_type,
            transient: false,
            get: #getter,
            set: #setter,
        }
    };
    Ok((functions, row))
}

fn impl_entity(ast: &DeriveInput) -> Result<TokenStream> {
    let type_name = &ast.ident;
    if !ast.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &ast.generics,
            "`Entity` cannot be derived for generic structs.",
        ));
    }

    let attrs = EntityAttrs::parse(&ast.attrs)?;
    let fields = named_fields(ast)?;

    let (functions, rows): (Vec<_>, Vec<_>) = fields
        .named
        .iter()
        .enumerate()
        .map(|(position, field)| field_entry(type_name, position, field))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .unzip();
    let field_count = rows.len();

    let class_name = match &attrs.name {
        Some(name) => quote! { #name },
        None => quote! { ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#type_name)) },
    };
    let version = match &attrs.version {
        Some(version) => quote! { #version },
        None => quote! { 0 },
    };
    let aliases = &attrs.aliases;

    Ok(quote! {
        const _: () = {
            #(#functions)*

            fn __classwire_construct() -> ::std::boxed::Box<dyn ::classwire_codec::Entity> {
                ::std::boxed::Box::new(<#type_name as ::core::default::Default>::default())
            }

            static __CLASSWIRE_FIELDS: [::classwire_codec::FieldDescriptor; #field_count] = [
                #(#rows),*
            ];

            static __CLASSWIRE_DESCRIPTOR: ::classwire_codec::EntityDescriptor =
                ::classwire_codec::EntityDescriptor {
                    name: #class_name,
                    version: #version,
                    aliases: &[#(#aliases),*],
                    fields: &__CLASSWIRE_FIELDS,
                    constructor: ::core::option::Option::Some(__classwire_construct),
                };

            impl ::classwire_codec::Entity for #type_name {
                fn descriptor(&self) -> &'static ::classwire_codec::EntityDescriptor {
                    &__CLASSWIRE_DESCRIPTOR
                }

                fn as_any(&self) -> &dyn ::core::any::Any {
                    self
                }

                fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                    self
                }

                fn into_any(
                    self: ::std::boxed::Box<Self>,
                ) -> ::std::boxed::Box<dyn ::core::any::Any> {
                    self
                }
            }

            impl ::classwire_codec::EntityType for #type_name {
                fn entity_descriptor() -> &'static ::classwire_codec::EntityDescriptor {
                    &__CLASSWIRE_DESCRIPTOR
                }
            }
        };
    })
}
