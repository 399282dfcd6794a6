use crate::{
    Assignable, Builder, Db, Entity, Error, Field, Query, QueryBuilder, QueryKind, Result,
    RowsAffected, Session, Upsert,
};
use std::sync::Arc;

/// `INSERT` statement for one or more `T`.
pub struct Inserter<S, T> {
    db: Db<S>,
    values: Vec<T>,
    columns: Vec<String>,
    upsert: Option<Upsert>,
}

impl<S: Session, T: Entity> Inserter<S, T> {
    pub fn new(db: &Db<S>) -> Self {
        Self {
            db: db.clone(),
            values: Vec::new(),
            columns: Vec::new(),
            upsert: None,
        }
    }

    pub fn values(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.values.extend(values);
        self
    }

    /// Restricts the inserted fields, every field of `T` in declaration order by default.
    pub fn columns(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Starts the insert-or-update clause.
    pub fn on_duplicate_key(self) -> UpsertBuilder<S, T> {
        UpsertBuilder {
            inserter: self,
            conflict_columns: Vec::new(),
        }
    }

    pub async fn exec(self) -> Result<RowsAffected> {
        let db = self.db.clone();
        let model = db.model::<T>()?;
        db.dispatch(QueryKind::Insert, Arc::new(self), model, db.exec_handler())
            .await?
            .into_affected()
    }
}

impl<S: Session, T: Entity> QueryBuilder for Inserter<S, T> {
    fn build(&self) -> Result<Query> {
        if self.values.is_empty() {
            return Err(Error::InsertZeroRow);
        }
        let model = self.db.model::<T>()?;
        let fields = if self.columns.is_empty() {
            model.fields.iter().collect::<Vec<_>>()
        } else {
            self.columns
                .iter()
                .map(|name| {
                    model
                        .field(name)
                        .ok_or_else(|| Error::UnknownField(name.clone()))
                })
                .collect::<Result<Vec<&Field>>>()?
        };
        let mut builder = Builder::new(self.db.registry(), self.db.dialect(), &model);
        builder.push_str("INSERT INTO ");
        builder.quote(&model.table_name);
        builder.push('(');
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                builder.push(',');
            }
            builder.quote(&field.column);
        }
        builder.push_str(") VALUES ");
        let mapper = self.db.value_mapper();
        for (i, entity) in self.values.iter().enumerate() {
            if i > 0 {
                builder.push(',');
            }
            let reader = mapper.reader(&model, entity);
            builder.push('(');
            for (j, field) in fields.iter().enumerate() {
                if j > 0 {
                    builder.push(',');
                }
                builder.push('?');
                builder.add_arg(reader.field(field.name)?);
            }
            builder.push(')');
        }
        if let Some(upsert) = &self.upsert {
            self.db.dialect().build_upsert(&mut builder, upsert)?;
        }
        Ok(builder.finish())
    }
}

/// Insert-or-update clause under construction.
pub struct UpsertBuilder<S, T> {
    inserter: Inserter<S, T>,
    conflict_columns: Vec<String>,
}

impl<S: Session, T: Entity> UpsertBuilder<S, T> {
    /// Fields identifying the conflict, used by the `ON CONFLICT` dialects.
    pub fn conflict_columns(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.conflict_columns = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn update(self, assigns: impl IntoIterator<Item = impl Into<Assignable>>) -> Inserter<S, T> {
        let mut inserter = self.inserter;
        inserter.upsert = Some(Upsert {
            assigns: assigns.into_iter().map(Into::into).collect(),
            conflict_columns: self.conflict_columns,
        });
        inserter
    }
}
