use syn::{Fields, ItemStruct, LitStr};

pub(crate) struct EntityMetadata {
    /// Empty when the table name is derived from the type name.
    pub(crate) table_name: String,
    pub(crate) shape: &'static str,
}

pub(crate) fn decode_entity(item: &ItemStruct) -> EntityMetadata {
    let mut metadata = EntityMetadata {
        table_name: String::new(),
        shape: match item.fields {
            Fields::Named(..) => "Named",
            Fields::Unnamed(..) => "Tuple",
            Fields::Unit => "Unit",
        },
    };
    for attr in &item.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("quarry") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!("Error while parsing `quarry`, use it like: `#[quarry(table_name = \"users\")]`");
        };
        let _ = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("table_name") {
                let Ok(v) = arg.value().and_then(|v| v.parse::<LitStr>()) else {
                    panic!(
                        "Error while parsing `table_name`, use it like: `#[quarry(table_name = \"users\")]`"
                    );
                };
                metadata.table_name = v.value();
            } else {
                panic!(
                    "Unknown attribute `{}` on the struct, only `table_name` is accepted",
                    quote::ToTokens::to_token_stream(&arg.path)
                );
            }
            Ok(())
        });
    }
    metadata
}
