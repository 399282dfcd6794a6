use crate::simple::{TestModel, people, reset_test_model};
use quarry::{Assignable, Db, Session, assign, col};

pub async fn upsert<S: Session>(db: &Db<S>) {
    reset_test_model(db).await;
    let [tom, ann, _] = people();
    db.insert::<TestModel>()
        .values([tom.clone(), ann.clone()])
        .exec()
        .await
        .expect("Failed to insert Tom and Ann");

    let renamed = TestModel {
        first_name: "Thomas".into(),
        last_name: Some("Cat".into()),
        ..tom.clone()
    };
    db.insert::<TestModel>()
        .values([renamed])
        .on_duplicate_key()
        .conflict_columns(["id"])
        .update([Assignable::from(assign("age", 30_i8)), col("last_name").into()])
        .exec()
        .await
        .expect("Failed to upsert Tom");

    let found = db
        .select::<TestModel>()
        .where_([col("id").eq(tom.id)])
        .get()
        .await
        .expect("Failed to find Tom");
    assert_eq!(
        found,
        TestModel {
            age: 30,
            last_name: Some("Cat".into()),
            ..tom
        },
        "Only the assigned columns change"
    );

    let all = db
        .select::<TestModel>()
        .get_multi()
        .await
        .expect("Failed to query everyone");
    assert_eq!(all.len(), 2);
    assert!(all.contains(&ann));
}
