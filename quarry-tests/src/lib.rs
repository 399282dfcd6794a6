mod policies;
mod raw;
mod simple;
mod types;
mod upsert;

use log::LevelFilter;
use policies::policies;
use quarry::{Db, Session};
use raw::raw;
use simple::simple;
use std::env;
use types::types;
use upsert::upsert;

pub use simple::TestModel;

pub fn init_logs() {
    let mut logger = env_logger::builder();
    logger
        .is_test(true)
        .format_file(true)
        .format_line_number(true);
    if env::var("RUST_LOG").is_err() {
        logger.filter_level(LevelFilter::Warn);
    }
    let _ = logger.try_init();
}

/// Runs the whole suite against `db`, which must use a dialect with insert-or-update support.
pub async fn execute_tests<S: Session>(db: Db<S>) {
    simple(&db).await;
    types(&db).await;
    upsert(&db).await;
    raw(&db).await;
    policies(&db).await;
}

#[macro_export]
macro_rules! silent_logs {
    ($($code:tt)+) => {{
        let level = log::max_level();
        log::set_max_level(log::LevelFilter::Off);
        let result = { $($code)+ };
        log::set_max_level(level);
        result
    }};
}
