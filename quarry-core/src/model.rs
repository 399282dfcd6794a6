use crate::Value;
use std::{any::TypeId, collections::HashMap};

/// Resolved mapping of an entity type to its table.
#[derive(Debug, Clone)]
pub struct Model {
    pub table_name: String,
    pub(crate) type_id: TypeId,
    pub(crate) fields: Vec<Field>,
    pub(crate) field_map: HashMap<&'static str, usize>,
    pub(crate) column_map: HashMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct Field {
    /// Rust field name.
    pub name: &'static str,
    pub column: String,
    /// NULL prototype of the field type.
    pub value: Value,
}

impl Model {
    pub(crate) fn new(table_name: String, type_id: TypeId, fields: Vec<Field>) -> Self {
        let mut model = Self {
            table_name,
            type_id,
            fields,
            field_map: Default::default(),
            column_map: Default::default(),
        };
        model.index();
        model
    }

    pub(crate) fn index(&mut self) {
        self.field_map = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name, i))
            .collect();
        self.column_map = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.column.clone(), i))
            .collect();
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Lookup by Rust field name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.field_map.get(name).map(|i| &self.fields[*i])
    }

    /// Lookup by column name.
    pub fn column(&self, column: &str) -> Option<&Field> {
        self.column_map.get(column).map(|i| &self.fields[*i])
    }

    pub fn is_model_of(&self, type_id: TypeId) -> bool {
        self.type_id == type_id
    }
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.column == other.column
            && self.value.same_type(&other.value)
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.table_name == other.table_name
            && self.type_id == other.type_id
            && self.fields == other.fields
            && self.field_map == other.field_map
            && self.column_map == other.column_map
    }
}
