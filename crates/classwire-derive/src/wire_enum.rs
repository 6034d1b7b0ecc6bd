use proc_macro2::TokenStream;
use quote::quote;
use syn::{parse, Data, DataEnum, DeriveInput, Error, Fields, Result};

pub fn derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    match parse(input).and_then(|ast| impl_wire_enum(&ast)) {
        Ok(tokens) => tokens,
        Err(error) => error.to_compile_error(),
    }
    .into()
}

fn unit_variants(ast: &DeriveInput) -> Result<&DataEnum> {
    let Data::Enum(data) = &ast.data else {
        return Err(Error::new_spanned(
            &ast.ident,
            "`WireEnum` can only be derived for enums.",
        ));
    };
    if data.variants.is_empty() {
        return Err(Error::new_spanned(
            &ast.ident,
            "`WireEnum` needs at least one variant.",
        ));
    }
    if let Some(variant) = data
        .variants
        .iter()
        .find(|variant| !matches!(variant.fields, Fields::Unit))
    {
        return Err(Error::new_spanned(
            variant,
            "`WireEnum` variants cannot carry fields.",
        ));
    }
    Ok(data)
}

fn impl_wire_enum(ast: &DeriveInput) -> Result<TokenStream> {
    let type_name = &ast.ident;
    if !ast.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &ast.generics,
            "`WireEnum` cannot be derived for generic enums.",
        ));
    }

    let data = unit_variants(ast)?;
    let variants: Vec<_> = data.variants.iter().map(|variant| &variant.ident).collect();
    let ordinals: Vec<usize> = (0..variants.len()).collect();
    let len = variants.len();

    Ok(quote! {
        const _: () = {
            static __CLASSWIRE_ENUM: ::classwire_codec::EnumDescriptor =
                ::classwire_codec::EnumDescriptor {
                    name: ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#type_name)),
                    len: #len,
                    ordinal_of: ::classwire_codec::erased_ordinal::<#type_name>,
                    from_ordinal: ::classwire_codec::erased_constant::<#type_name>,
                };

            impl ::classwire_codec::WireEnum for #type_name {
                fn enum_descriptor() -> &'static ::classwire_codec::EnumDescriptor {
                    &__CLASSWIRE_ENUM
                }

                fn ordinal(&self) -> usize {
                    match self {
                        #(Self::#variants => #ordinals,)*
                    }
                }

                fn from_ordinal(ordinal: usize) -> ::core::option::Option<Self> {
                    match ordinal {
                        #(#ordinals => ::core::option::Option::Some(Self::#variants),)*
                        _ => ::core::option::Option::None,
                    }
                }
            }
        };
    })
}
