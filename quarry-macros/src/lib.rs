mod decode_entity;
mod decode_field;

use decode_entity::decode_entity;
use decode_field::decode_field;
use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{ItemStruct, parse_macro_input};

/// Implements `quarry::Entity`: a static schema descriptor plus the by-name field accessors.
///
/// ```ignore
/// #[derive(Default, Entity)]
/// #[quarry(table_name = "users")]
/// struct User {
///     id: i64,
///     #[quarry(column = "nick_name")]
///     first_name: String,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(quarry))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    if !item.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &item.generics,
            "Entity cannot be derived for generic types",
        )
        .to_compile_error()
        .into();
    }
    let name = &item.ident;
    let type_name = name.to_string();
    let entity = decode_entity(&item);
    let table_name = &entity.table_name;
    let shape = format_ident!("{}", entity.shape);
    let fields: Vec<_> = item
        .fields
        .iter()
        .enumerate()
        .map(|(i, f)| decode_field(i, f))
        .collect();
    let field_defs = fields.iter().map(|f| {
        let member = &f.member;
        let name_lit = f.name_lit();
        let tag = &f.tag;
        let ty = f.ty_tokens();
        quote! {
            ::quarry::FieldDef {
                name: #name_lit,
                tag: #tag,
                value: <#ty as ::quarry::AsValue>::as_empty_value(),
                offset: ::std::mem::offset_of!(#name, #member),
                read: ::quarry::read_at::<#ty>,
                write: ::quarry::write_at::<#ty>,
            }
        }
    });
    let read_arms = fields.iter().map(|f| {
        let member = &f.member;
        let name_lit = f.name_lit();
        quote! {
            #name_lit => Some(::quarry::AsValue::as_value(::std::clone::Clone::clone(&self.#member))),
        }
    });
    let write_arms = fields.iter().map(|f| {
        let member = &f.member;
        let name_lit = f.name_lit();
        quote! {
            #name_lit => {
                self.#member = ::quarry::AsValue::try_from_value(value)?;
                Ok(())
            }
        }
    });
    quote! {
        unsafe impl ::quarry::Entity for #name {
            fn entity_def() -> &'static ::quarry::EntityDef {
                static DEF: ::std::sync::LazyLock<::quarry::EntityDef> =
                    ::std::sync::LazyLock::new(|| ::quarry::EntityDef {
                        name: #type_name,
                        table_name: #table_name,
                        shape: ::quarry::EntityShape::#shape,
                        fields: vec![#(#field_defs),*].into_boxed_slice(),
                    });
                &DEF
            }

            fn field(&self, name: &str) -> Option<::quarry::Value> {
                match name {
                    #(#read_arms)*
                    _ => None,
                }
            }

            #[allow(unused_variables)]
            fn set_field(&mut self, name: &str, value: ::quarry::Value) -> ::quarry::Result<()> {
                match name {
                    #(#write_arms)*
                    _ => Err(::quarry::Error::UnknownField(name.to_string())),
                }
            }
        }
    }
    .into()
}
