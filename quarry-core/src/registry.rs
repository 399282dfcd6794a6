use crate::{Entity, EntityShape, Error, Field, Model, Result};
use std::{
    any::TypeId,
    collections::HashMap,
    sync::{Arc, LazyLock, PoisonError, RwLock},
};

/// Customization applied to a freshly parsed [`Model`] by [`Registry::register`].
pub type ModelOption = Box<dyn FnOnce(&mut Model) -> Result<()> + Send>;

/// Overrides the table name unconditionally.
pub fn with_table_name(table_name: impl Into<String>) -> ModelOption {
    let table_name = table_name.into();
    Box::new(move |model| {
        model.table_name = table_name;
        Ok(())
    })
}

/// Overrides the column name of an existing field.
pub fn with_column_name(field: impl Into<String>, column: impl Into<String>) -> ModelOption {
    let field = field.into();
    let column = column.into();
    Box::new(move |model| {
        let Some(&index) = model.field_map.get(field.as_str()) else {
            return Err(Error::UnknownField(field));
        };
        model.fields[index].column = column;
        model.index();
        Ok(())
    })
}

/// Process wide cache of entity models, keyed by type.
///
/// Concurrent first lookups of the same type may parse it more than once, the last store wins
/// and all of them produce the same model.
#[derive(Default, Debug)]
pub struct Registry {
    models: RwLock<HashMap<TypeId, Arc<Model>>>,
}

static GLOBAL: LazyLock<Arc<Registry>> = LazyLock::new(Default::default);

impl Registry {
    pub fn new() -> Self {
        Default::default()
    }

    /// The registry shared by every [`Db`](crate::Db) that was not given its own.
    pub fn global() -> Arc<Registry> {
        GLOBAL.clone()
    }

    /// Cached model of `E`, parsing it on first use.
    pub fn get<E: Entity>(&self) -> Result<Arc<Model>> {
        let cached = self
            .models
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<E>())
            .cloned();
        match cached {
            Some(model) => Ok(model),
            None => self.register::<E>([]),
        }
    }

    /// Parses `E`, applies `options` in order and stores the result, replacing any cached model.
    pub fn register<E: Entity>(
        &self,
        options: impl IntoIterator<Item = ModelOption>,
    ) -> Result<Arc<Model>> {
        let mut model = parse_model::<E>()?;
        for option in options {
            option(&mut model)?;
        }
        let model = Arc::new(model);
        self.models
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(TypeId::of::<E>(), model.clone());
        log::trace!("Registered model `{}` for {}", model.table_name, E::entity_def().name);
        Ok(model)
    }
}

fn parse_model<E: Entity>() -> Result<Model> {
    let def = E::entity_def();
    if def.shape != EntityShape::Named {
        return Err(Error::StructOnly(def.name));
    }
    let table_name = if def.table_name.is_empty() {
        underscore_name(def.name)
    } else {
        def.table_name.to_string()
    };
    let fields = def
        .fields
        .iter()
        .map(|field| {
            let tag = parse_tag(field.tag)?;
            let column = match tag.get("column") {
                Some(column) if !column.is_empty() => column.to_string(),
                _ => underscore_name(field.name),
            };
            Ok(Field {
                name: field.name,
                column,
                value: field.value.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Model::new(table_name, TypeId::of::<E>(), fields))
}

/// Splits `key=value` pairs separated by commas. An empty tag has no pairs.
pub fn parse_tag(tag: &str) -> Result<HashMap<&str, &str>> {
    if tag.is_empty() {
        return Ok(HashMap::new());
    }
    tag.split(',')
        .map(|pair| {
            let mut segments = pair.split('=');
            match (segments.next(), segments.next(), segments.next()) {
                (Some(key), Some(value), None) => Ok((key.trim(), value.trim())),
                _ => Err(Error::InvalidTagContent(pair.to_string())),
            }
        })
        .collect()
}

/// Inserts `_` before every non leading uppercase letter and lowercases everything:
/// `FirstName` becomes `first_name`.
pub fn underscore_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i != 0 {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
