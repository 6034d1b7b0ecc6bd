use syn::{
    Attribute, Expr, GenericArgument, LitStr, PathArguments, Result, Type, TypePath,
};

/// Options from `#[entity(...)]` on the struct.
#[derive(Default)]
pub struct EntityAttrs {
    pub name: Option<LitStr>,
    pub version: Option<Expr>,
    pub aliases: Vec<LitStr>,
}

impl EntityAttrs {
    pub fn parse(attributes: &[Attribute]) -> Result<Self> {
        let mut parsed = Self::default();
        for attribute in attributes.iter().filter(|a| a.path().is_ident("entity")) {
            attribute.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    parsed.name = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("version") {
                    parsed.version = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("alias") {
                    parsed.aliases.push(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("expected `name`, `version` or `alias`"));
                }
                Ok(())
            })?;
        }
        Ok(parsed)
    }
}

/// Options from `#[wire(...)]` on a field.
#[derive(Default)]
pub struct FieldAttrs {
    pub skip: bool,
    pub ordinal: bool,
}

impl FieldAttrs {
    pub fn parse(attributes: &[Attribute]) -> Result<Self> {
        let mut parsed = Self::default();
        for attribute in attributes.iter().filter(|a| a.path().is_ident("wire")) {
            attribute.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    parsed.skip = true;
                } else if meta.path.is_ident("ordinal") {
                    parsed.ordinal = true;
                } else {
                    return Err(meta.error("expected `skip` or `ordinal`"));
                }
                Ok(())
            })?;
        }
        Ok(parsed)
    }
}

/// The `T` of an `Option<T>` field type.
pub fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(TypePath { qself: None, path }) = ty else {
        return None;
    };
    let segment = path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(arguments) = &segment.arguments else {
        return None;
    };
    if arguments.args.len() != 1 {
        return None;
    }
    match arguments.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

/// Compact display name of a type, e.g. `Vec<Option<i32>>`.
pub fn type_label(ty: &Type) -> String {
    quote::quote!(#ty).to_string().replace(' ', "")
}
