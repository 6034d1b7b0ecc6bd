//! This crate provides classwire's derive macros.
mod attrs;
mod entity;
mod wire_enum;

/// Generates the field table and [`Entity`] implementation for a struct.
///
/// The struct must have named fields, no generic parameters, and implement
/// `Default` and `Debug`. Fields are numbered in declaration order starting
/// at 1; `Option<T>` fields are omitted from the wire when `None`.
///
/// Struct attributes: `#[entity(name = "...", version = N, alias = "...")]`.
/// Field attributes: `#[wire(skip)]` for transient fields, `#[wire(ordinal)]`
/// for fields whose type implements `WireEnum`.
///
/// Every other field type must implement `WireValue`; an enum field missing
/// `#[wire(ordinal)]` is a compile error.
///
/// [`Entity`]: https://docs.rs/classwire-codec/latest/classwire_codec/entity/trait.Entity.html
#[proc_macro_derive(Entity, attributes(entity, wire))]
pub fn derive_entity(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    entity::derive(input)
}

/// Generates ordinal mapping for a fieldless enum, in declaration order.
#[proc_macro_derive(WireEnum)]
pub fn derive_wire_enum(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    wire_enum::derive(input)
}
