use crate::{
    Deleter, Dialect, Entity, Error, Handler, Inserter, Middleware, Model, MySqlDialect,
    QueryBuilder, QueryContext, QueryKind, QueryOutput, QueryResult, RawQuerier, Registry, Result,
    Rows, Selector, Session, Value, ValueMapper, chain,
};
use futures::{FutureExt, future::BoxFuture};
use std::sync::Arc;

/// State shared by every statement created from the same [`Db`].
struct Core {
    registry: Arc<Registry>,
    dialect: Arc<dyn Dialect>,
    mapper: ValueMapper,
    middlewares: Vec<Middleware>,
}

/// Session plus the configuration the statements are built and executed with.
///
/// Cloning is cheap, clones share the session and the configuration.
pub struct Db<S> {
    core: Arc<Core>,
    session: Arc<S>,
}

impl<S> Clone for Db<S> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
            session: self.session.clone(),
        }
    }
}

impl<S: Session> Db<S> {
    /// Database with the default configuration: MySQL dialect, offset value mapper, global
    /// registry and no middleware.
    pub fn new(session: S) -> Self {
        Self::builder(session).build()
    }

    pub fn builder(session: S) -> DbBuilder<S> {
        DbBuilder {
            session,
            registry: None,
            dialect: Arc::new(MySqlDialect),
            mapper: ValueMapper::default(),
            middlewares: Vec::new(),
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.core.dialect.as_ref()
    }

    pub fn registry(&self) -> &Registry {
        &self.core.registry
    }

    pub fn value_mapper(&self) -> ValueMapper {
        self.core.mapper
    }

    /// Database sharing this session and configuration, with `middleware` appended to the chain.
    pub fn with_middleware(&self, middleware: Middleware) -> Self {
        let mut middlewares = self.core.middlewares.clone();
        middlewares.push(middleware);
        Self {
            core: Arc::new(Core {
                registry: self.core.registry.clone(),
                dialect: self.core.dialect.clone(),
                mapper: self.core.mapper,
                middlewares,
            }),
            session: self.session.clone(),
        }
    }

    pub fn select<T: Entity>(&self) -> Selector<S, T> {
        Selector::new(self)
    }

    pub fn insert<T: Entity>(&self) -> Inserter<S, T> {
        Inserter::new(self)
    }

    pub fn delete<T: Entity>(&self) -> Deleter<S, T> {
        Deleter::new(self)
    }

    pub fn raw<T: Entity>(
        &self,
        sql: impl Into<String>,
        args: impl IntoIterator<Item = Value>,
    ) -> RawQuerier<S, T> {
        RawQuerier::new(self, sql, args)
    }

    pub(crate) fn model<T: Entity>(&self) -> Result<Arc<Model>> {
        self.core.registry.get::<T>()
    }

    /// Runs a statement through the middleware chain around `terminal`.
    pub(crate) async fn dispatch(
        &self,
        kind: QueryKind,
        builder: Arc<dyn QueryBuilder>,
        model: Arc<Model>,
        terminal: Handler,
    ) -> QueryResult {
        let context = QueryContext {
            kind,
            builder,
            model,
        };
        chain(&self.core.middlewares, terminal)(context).await
    }

    /// Terminal handler mapping the first row into a `T`.
    pub(crate) fn get_handler<T: Entity>(&self) -> Handler {
        let session = self.session.clone();
        let mapper = self.core.mapper;
        Arc::new(move |context: QueryContext| -> BoxFuture<'static, QueryResult> {
            let session = session.clone();
            async move {
                let mut rows = query(session.as_ref(), &context).await?;
                if !rows.next()? {
                    return Err(Error::NoRows);
                }
                let mut entity = T::default();
                mapper
                    .writer(&context.model, &mut entity)
                    .set_columns(&mut rows)?;
                Ok(QueryOutput::Entity(Box::new(entity)))
            }
            .boxed()
        })
    }

    /// Terminal handler mapping every row, an empty result is not an error.
    pub(crate) fn get_multi_handler<T: Entity>(&self) -> Handler {
        let session = self.session.clone();
        let mapper = self.core.mapper;
        Arc::new(move |context: QueryContext| -> BoxFuture<'static, QueryResult> {
            let session = session.clone();
            async move {
                let mut rows = query(session.as_ref(), &context).await?;
                let mut entities = Vec::<T>::new();
                while rows.next()? {
                    let mut entity = T::default();
                    mapper
                        .writer(&context.model, &mut entity)
                        .set_columns(&mut rows)?;
                    entities.push(entity);
                }
                Ok(QueryOutput::Entity(Box::new(entities)))
            }
            .boxed()
        })
    }

    pub(crate) fn exec_handler(&self) -> Handler {
        let session = self.session.clone();
        Arc::new(move |context: QueryContext| -> BoxFuture<'static, QueryResult> {
            let session = session.clone();
            async move {
                let query = context.builder.build()?;
                log::debug!("{query}");
                let result = session
                    .exec_context(&query.sql, &query.args)
                    .await
                    .inspect_err(|e| {
                        log::error!("Error while executing the {} statement: {e:#}", context.kind)
                    })?;
                Ok(QueryOutput::Affected(result))
            }
            .boxed()
        })
    }
}

async fn query<S: Session>(session: &S, context: &QueryContext) -> Result<S::Rows> {
    let query = context.builder.build()?;
    log::debug!("{query}");
    session
        .query_context(&query.sql, &query.args)
        .await
        .inspect_err(|e| log::error!("Error while running the {} query: {e:#}", context.kind))
}

/// Configures a [`Db`].
pub struct DbBuilder<S> {
    session: S,
    registry: Option<Arc<Registry>>,
    dialect: Arc<dyn Dialect>,
    mapper: ValueMapper,
    middlewares: Vec<Middleware>,
}

impl<S: Session> DbBuilder<S> {
    pub fn dialect(mut self, dialect: impl Dialect + 'static) -> Self {
        self.dialect = Arc::new(dialect);
        self
    }

    pub fn value_mapper(mut self, mapper: ValueMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Uses a private registry instead of the process wide one.
    pub fn registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Appends a middleware, the first one appended is the outermost.
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middlewares.push(middleware);
        self
    }

    pub fn middlewares(mut self, middlewares: impl IntoIterator<Item = Middleware>) -> Self {
        self.middlewares.extend(middlewares);
        self
    }

    pub fn build(self) -> Db<S> {
        Db {
            core: Arc::new(Core {
                registry: self.registry.unwrap_or_else(Registry::global),
                dialect: self.dialect,
                mapper: self.mapper,
                middlewares: self.middlewares,
            }),
            session: Arc::new(self.session),
        }
    }
}
