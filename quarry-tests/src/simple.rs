use quarry::{Db, Entity, Error, Session, col, count, max};

#[derive(Debug, Default, Clone, PartialEq, Entity)]
pub struct TestModel {
    pub id: i64,
    pub first_name: String,
    pub age: i8,
    pub last_name: Option<String>,
}

pub(crate) async fn reset_test_model<S: Session>(db: &Db<S>) {
    db.raw::<TestModel>(
        "CREATE TABLE IF NOT EXISTS `test_model` (\
         `id` INTEGER PRIMARY KEY, \
         `first_name` TEXT NOT NULL, \
         `age` INTEGER NOT NULL, \
         `last_name` TEXT)",
        [],
    )
    .exec()
    .await
    .expect("Failed to create the test_model table");
    db.raw::<TestModel>("DELETE FROM `test_model`", [])
        .exec()
        .await
        .expect("Failed to clear the test_model table");
}

pub(crate) fn people() -> [TestModel; 3] {
    [
        TestModel {
            id: 12,
            first_name: "Tom".into(),
            age: 18,
            last_name: Some("Jerry".into()),
        },
        TestModel {
            id: 13,
            first_name: "Ann".into(),
            age: 27,
            last_name: None,
        },
        TestModel {
            id: 14,
            first_name: "Bob".into(),
            age: 45,
            last_name: Some("Builder".into()),
        },
    ]
}

pub async fn simple<S: Session>(db: &Db<S>) {
    reset_test_model(db).await;
    let [tom, ann, bob] = people();

    // Insert and read back
    let result = db
        .insert::<TestModel>()
        .values([tom.clone()])
        .exec()
        .await
        .expect("Failed to insert Tom");
    assert_eq!(result.rows_affected, 1);
    let found = db
        .select::<TestModel>()
        .where_([col("id").eq(tom.id)])
        .get()
        .await
        .expect("Failed to find Tom");
    assert_eq!(found, tom);

    // Nothing matches
    let result = db
        .select::<TestModel>()
        .where_([col("id").eq(99_i64)])
        .get()
        .await;
    assert!(matches!(result, Err(Error::NoRows)), "{result:?}");

    // Many rows at once
    let result = db
        .insert::<TestModel>()
        .values([ann.clone(), bob.clone()])
        .exec()
        .await
        .expect("Failed to insert Ann and Bob");
    assert_eq!(result.rows_affected, 2);
    let mut young = db
        .select::<TestModel>()
        .where_([col("age").lt(30)])
        .get_multi()
        .await
        .expect("Failed to query the young ones");
    young.sort_by_key(|v| v.id);
    assert_eq!(young, [tom.clone(), ann.clone()]);
    let none = db
        .select::<TestModel>()
        .where_([col("age").lt(0)])
        .get_multi()
        .await
        .expect("Failed to query nobody");
    assert!(none.is_empty());

    // Subset of the columns, the other fields keep their defaults
    let partial = db
        .select::<TestModel>()
        .select([col("first_name"), col("id")])
        .where_([col("first_name").eq("Bob")])
        .get()
        .await
        .expect("Failed to query Bob");
    assert_eq!(
        partial,
        TestModel {
            id: 14,
            first_name: "Bob".into(),
            ..Default::default()
        }
    );

    // Aggregates mapped through their alias
    let oldest = db
        .select::<TestModel>()
        .select([max("age").alias("age"), count("id").alias("id")])
        .get()
        .await
        .expect("Failed to compute the aggregates");
    assert_eq!(oldest.age, 45);
    assert_eq!(oldest.id, 3);

    // Filters combined
    let found = db
        .select::<TestModel>()
        .where_([col("age").lt(50).and(col("first_name").eq("Ann").or(col("id").eq(14_i64)))])
        .get_multi()
        .await
        .expect("Failed to query with combined filters");
    assert_eq!(found.len(), 2);

    // Delete
    let result = db
        .delete::<TestModel>()
        .where_([col("id").eq(tom.id)])
        .exec()
        .await
        .expect("Failed to delete Tom");
    assert_eq!(result.rows_affected, 1);
    let result = db
        .select::<TestModel>()
        .where_([col("id").eq(tom.id)])
        .get()
        .await;
    assert!(matches!(result, Err(Error::NoRows)));
}
