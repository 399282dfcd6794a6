use crate::simple::{TestModel, people, reset_test_model};
use quarry::{
    Db, Error, Query, Session, col,
    middlewares::{no_delete, query_log, rate_limit, safe_dml},
};
use std::sync::{Arc, Mutex};

pub async fn policies<S: Session>(db: &Db<S>) {
    reset_test_model(db).await;
    db.insert::<TestModel>()
        .values(people())
        .exec()
        .await
        .expect("Failed to insert the people");

    // Unfiltered deletes are refused, filtered ones go through
    let guarded = db.with_middleware(safe_dml::MiddlewareBuilder::new().build());
    let result = crate::silent_logs! {
        guarded.delete::<TestModel>().exec().await
    };
    assert!(matches!(result, Err(Error::Policy(..))), "{result:?}");
    let result = crate::silent_logs! {
        guarded.raw::<TestModel>("update `test_model` set `age` = 0", []).exec().await
    };
    assert!(matches!(result, Err(Error::Policy(..))), "{result:?}");
    let result = guarded
        .delete::<TestModel>()
        .where_([col("id").eq(12_i64)])
        .exec()
        .await
        .expect("Failed to delete Tom");
    assert_eq!(result.rows_affected, 1);

    // No deletes at all
    let guarded = db.with_middleware(no_delete::MiddlewareBuilder::new().build());
    let result = crate::silent_logs! {
        guarded
            .delete::<TestModel>()
            .where_([col("id").eq(13_i64)])
            .exec()
            .await
    };
    assert!(matches!(result, Err(Error::Policy(..))), "{result:?}");
    let remaining = guarded
        .select::<TestModel>()
        .get_multi()
        .await
        .expect("Reads are not affected by the delete policy");
    assert_eq!(remaining.len(), 2);

    // Logged statements, in the order they ran
    let logged = Arc::new(Mutex::new(Vec::<String>::new()));
    let logging = db.with_middleware(
        query_log::MiddlewareBuilder::new()
            .log_func({
                let logged = logged.clone();
                move |query: &Query| logged.lock().unwrap().push(query.sql.clone())
            })
            .build(),
    );
    logging
        .select::<TestModel>()
        .where_([col("id").eq(13_i64)])
        .get()
        .await
        .expect("Failed to find Ann");
    logging
        .raw::<TestModel>("SELECT * FROM `test_model`", [])
        .get_multi()
        .await
        .expect("Failed to query everyone");
    assert_eq!(
        *logged.lock().unwrap(),
        [
            "SELECT * FROM `test_model` WHERE `id` = ?;",
            "SELECT * FROM `test_model`",
        ]
    );

    // Concurrent statements queue behind the limit
    let limited = db.with_middleware(rate_limit::MiddlewareBuilder::new(1).wait(true).build());
    let (a, b, c) = tokio::join!(
        limited.select::<TestModel>().where_([col("id").eq(13_i64)]).get(),
        limited.select::<TestModel>().where_([col("id").eq(14_i64)]).get(),
        limited.select::<TestModel>().get_multi(),
    );
    assert_eq!(a.expect("Failed to find Ann").first_name, "Ann");
    assert_eq!(b.expect("Failed to find Bob").first_name, "Bob");
    assert_eq!(c.expect("Failed to query everyone").len(), 2);
}
