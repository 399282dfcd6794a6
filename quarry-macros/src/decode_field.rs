use proc_macro2::{Span, TokenStream};
use quote::ToTokens;
use syn::{Field, Index, LitStr, Member, Type};

pub(crate) struct FieldMetadata {
    pub(crate) member: Member,
    /// Logical name: the identifier, or the position for tuple structs.
    pub(crate) name: String,
    pub(crate) ty: Type,
    /// Annotation content handed to the registry, `key=value` pairs separated by commas.
    pub(crate) tag: String,
}

impl FieldMetadata {
    pub(crate) fn name_lit(&self) -> LitStr {
        LitStr::new(&self.name, Span::call_site())
    }

    pub(crate) fn ty_tokens(&self) -> TokenStream {
        self.ty.to_token_stream()
    }
}

pub(crate) fn decode_field(index: usize, field: &Field) -> FieldMetadata {
    let (member, name) = match &field.ident {
        Some(ident) => (Member::Named(ident.clone()), ident.to_string()),
        None => (Member::Unnamed(Index::from(index)), index.to_string()),
    };
    let mut column = None;
    let mut tag = None;
    for attr in &field.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("quarry") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `quarry`, use it like: `#[quarry(column = \"my_column\")]`");
        };
        let _ = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("column") {
                let Ok(v) = arg.value().and_then(|v| v.parse::<LitStr>()) else {
                    panic!(
                        "Error while parsing `column`, use it like: `#[quarry(column = \"my_column\")]`"
                    );
                };
                column = Some(v.value());
            } else if arg.path.is_ident("tag") {
                let Ok(v) = arg.value().and_then(|v| v.parse::<LitStr>()) else {
                    panic!("Error while parsing `tag`, use it like: `#[quarry(tag = \"column=my_column\")]`");
                };
                tag = Some(v.value());
            } else {
                panic!(
                    "Unknown attribute `{}` on field `{}`, use `column` or `tag`",
                    arg.path.to_token_stream(),
                    name
                );
            }
            Ok(())
        });
    }
    let tag = match (column, tag) {
        (Some(..), Some(..)) => {
            panic!("Field `{name}` declares both `column` and `tag`, keep only one of them")
        }
        (Some(column), None) => format!("column={column}"),
        (None, Some(tag)) => tag,
        (None, None) => String::new(),
    };
    FieldMetadata {
        member,
        name,
        ty: field.ty.clone(),
        tag,
    }
}
