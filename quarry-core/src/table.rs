use crate::{Column, Entity, Model, Predicate, Registry, Result};
use std::sync::Arc;

/// Source of a select statement: an entity table or a join of references.
#[derive(Debug, Clone)]
pub enum TableReference {
    Table(Table),
    Join(Join),
}

impl TableReference {
    /// Column qualified by this reference.
    pub fn c(&self, name: impl Into<String>) -> Column {
        Column::of(self.clone(), name)
    }
}

/// Table of an entity type, possibly different from the one being selected.
#[derive(Debug, Clone)]
pub struct Table {
    pub(crate) entity: &'static str,
    pub(crate) resolve: fn(&Registry) -> Result<Arc<Model>>,
    pub(crate) alias: Option<String>,
}

impl Table {
    pub fn of<E: Entity>() -> Self {
        Self {
            entity: E::entity_def().name,
            resolve: Registry::get::<E>,
            alias: None,
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Column of this table, written as `alias.column` when the table is aliased.
    pub fn c(&self, name: impl Into<String>) -> Column {
        Column::of(TableReference::Table(self.clone()), name)
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }
}

#[derive(Debug, Clone)]
pub struct Join {
    pub(crate) left: Box<TableReference>,
    pub(crate) right: Box<TableReference>,
    pub(crate) kind: &'static str,
    pub(crate) using: Vec<String>,
    pub(crate) on: Vec<Predicate>,
}

/// Join waiting for its `ON` or `USING` condition.
#[derive(Debug, Clone)]
pub struct JoinBuilder {
    left: TableReference,
    right: TableReference,
    kind: &'static str,
}

impl JoinBuilder {
    pub fn on(self, predicates: impl IntoIterator<Item = Predicate>) -> Join {
        Join {
            left: Box::new(self.left),
            right: Box::new(self.right),
            kind: self.kind,
            using: Vec::new(),
            on: predicates.into_iter().collect(),
        }
    }

    pub fn using(self, fields: impl IntoIterator<Item = impl Into<String>>) -> Join {
        Join {
            left: Box::new(self.left),
            right: Box::new(self.right),
            kind: self.kind,
            using: fields.into_iter().map(Into::into).collect(),
            on: Vec::new(),
        }
    }
}

/// Combinators available on every table reference.
pub trait Joinable: Into<TableReference> + Sized {
    fn join(self, right: impl Into<TableReference>) -> JoinBuilder {
        JoinBuilder {
            left: self.into(),
            right: right.into(),
            kind: "JOIN",
        }
    }

    fn left_join(self, right: impl Into<TableReference>) -> JoinBuilder {
        JoinBuilder {
            left: self.into(),
            right: right.into(),
            kind: "LEFT JOIN",
        }
    }

    fn right_join(self, right: impl Into<TableReference>) -> JoinBuilder {
        JoinBuilder {
            left: self.into(),
            right: right.into(),
            kind: "RIGHT JOIN",
        }
    }
}

impl Joinable for Table {}
impl Joinable for Join {}
impl Joinable for TableReference {}

impl From<Table> for TableReference {
    fn from(value: Table) -> Self {
        TableReference::Table(value)
    }
}

impl From<Join> for TableReference {
    fn from(value: Join) -> Self {
        TableReference::Join(value)
    }
}
