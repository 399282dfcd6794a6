use crate::simple::{TestModel, people, reset_test_model};
use indoc::indoc;
use quarry::{Db, Error, Session, Value};

pub async fn raw<S: Session>(db: &Db<S>) {
    reset_test_model(db).await;
    db.insert::<TestModel>()
        .values(people())
        .exec()
        .await
        .expect("Failed to insert the people");

    let mut found = db
        .raw::<TestModel>(
            indoc! {"
                SELECT `id`, `first_name`, `age`
                FROM `test_model`
                WHERE `age` > ? AND `last_name` IS NOT NULL
            "},
            [Value::Int32(Some(10))],
        )
        .get_multi()
        .await
        .expect("Failed to run the raw query");
    found.sort_by_key(|v| v.id);
    assert_eq!(
        found.iter().map(|v| v.first_name.as_str()).collect::<Vec<_>>(),
        ["Tom", "Bob"]
    );
    assert!(found.iter().all(|v| v.last_name.is_none()));

    let result = db
        .raw::<TestModel>(
            "UPDATE `test_model` SET `age` = `age` + 1 WHERE `age` < ?",
            [Value::Int32(Some(30))],
        )
        .exec()
        .await
        .expect("Failed to run the raw update");
    assert_eq!(result.rows_affected, 2);

    let ann = db
        .raw::<TestModel>(
            "SELECT * FROM `test_model` WHERE `first_name` = ?",
            [Value::Varchar(Some("Ann".into()))],
        )
        .get()
        .await
        .expect("Failed to find Ann");
    assert_eq!(ann.age, 28);

    // A column the model does not know about
    let result = db
        .raw::<TestModel>("SELECT `id`, `first_name` AS `nickname` FROM `test_model`", [])
        .get()
        .await;
    assert!(
        matches!(result, Err(Error::UnknownColumn(ref name)) if name == "nickname"),
        "{result:?}"
    );

    // Driver failures come back as errors
    let result = crate::silent_logs! {
        db.raw::<TestModel>("SELECT * FROM `missing_table`", []).get().await
    };
    assert!(result.is_err());
}
