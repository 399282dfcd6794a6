use crate::{
    Builder, Db, Entity, Predicate, Query, QueryBuilder, QueryKind, Result, RowsAffected, Session,
};
use std::{marker::PhantomData, sync::Arc};

/// `DELETE` statement on the table of `T`.
pub struct Deleter<S, T> {
    db: Db<S>,
    wheres: Vec<Predicate>,
    _entity: PhantomData<fn() -> T>,
}

impl<S: Session, T: Entity> Deleter<S, T> {
    pub fn new(db: &Db<S>) -> Self {
        Self {
            db: db.clone(),
            wheres: Vec::new(),
            _entity: PhantomData,
        }
    }

    pub fn where_(mut self, predicates: impl IntoIterator<Item = Predicate>) -> Self {
        self.wheres.extend(predicates);
        self
    }

    pub async fn exec(self) -> Result<RowsAffected> {
        let db = self.db.clone();
        let model = db.model::<T>()?;
        db.dispatch(QueryKind::Delete, Arc::new(self), model, db.exec_handler())
            .await?
            .into_affected()
    }
}

impl<S: Session, T: Entity> QueryBuilder for Deleter<S, T> {
    fn build(&self) -> Result<Query> {
        let model = self.db.model::<T>()?;
        let mut builder = Builder::new(self.db.registry(), self.db.dialect(), &model);
        builder.push_str("DELETE FROM ");
        builder.quote(&model.table_name);
        builder.build_condition(" WHERE ", &self.wheres)?;
        Ok(builder.finish())
    }
}
