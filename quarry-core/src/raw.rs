use crate::{
    Db, Entity, Query, QueryBuilder, QueryKind, Result, RowsAffected, Session, Value,
};
use std::{marker::PhantomData, sync::Arc};

/// Literal statement going through the same pipeline and mapping as the built ones.
///
/// `T` is the entity the rows are mapped into by [`get`](RawQuerier::get) and
/// [`get_multi`](RawQuerier::get_multi). The SQL is sent as is, placeholders included.
pub struct RawQuerier<S, T> {
    db: Db<S>,
    sql: String,
    args: Vec<Value>,
    _entity: PhantomData<fn() -> T>,
}

impl<S: Session, T: Entity> RawQuerier<S, T> {
    pub fn new(db: &Db<S>, sql: impl Into<String>, args: impl IntoIterator<Item = Value>) -> Self {
        Self {
            db: db.clone(),
            sql: sql.into(),
            args: args.into_iter().collect(),
            _entity: PhantomData,
        }
    }

    pub async fn exec(self) -> Result<RowsAffected> {
        let db = self.db.clone();
        let model = db.model::<T>()?;
        db.dispatch(QueryKind::Raw, Arc::new(self), model, db.exec_handler())
            .await?
            .into_affected()
    }

    pub async fn get(self) -> Result<T> {
        let db = self.db.clone();
        let model = db.model::<T>()?;
        db.dispatch(QueryKind::Raw, Arc::new(self), model, db.get_handler::<T>())
            .await?
            .into_entity()
    }

    pub async fn get_multi(self) -> Result<Vec<T>> {
        let db = self.db.clone();
        let model = db.model::<T>()?;
        db.dispatch(
            QueryKind::Raw,
            Arc::new(self),
            model,
            db.get_multi_handler::<T>(),
        )
        .await?
        .into_entity()
    }
}

impl<S: Session, T: Entity> QueryBuilder for RawQuerier<S, T> {
    fn build(&self) -> Result<Query> {
        Ok(Query::new(self.sql.clone(), self.args.clone()))
    }
}
