mod as_value;
mod assign;
mod builder;
mod db;
mod deleter;
mod dialect;
mod entity;
mod error;
mod expression;
mod inserter;
mod middleware;
pub mod middlewares;
mod model;
mod query;
mod raw;
mod registry;
mod selector;
mod session;
mod table;
mod util;
mod value;
mod valuer;

pub use ::anyhow::Context;
pub use as_value::*;
pub use assign::*;
pub use builder::*;
pub use db::*;
pub use deleter::*;
pub use dialect::*;
pub use entity::*;
pub use error::*;
pub use expression::*;
pub use inserter::*;
pub use middleware::*;
pub use model::*;
pub use query::*;
pub use raw::*;
pub use registry::*;
pub use selector::*;
pub use session::*;
pub use table::*;
pub use value::*;
pub use valuer::*;
pub use ::futures::future;
