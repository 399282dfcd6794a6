use quarry::{Db, Entity, Session, col};
use rust_decimal::Decimal;
use time::{Date, Month, PrimitiveDateTime, Time};
use uuid::Uuid;

#[derive(Debug, Default, Clone, PartialEq, Entity)]
#[quarry(table_name = "all_types")]
pub struct AllTypes {
    #[quarry(column = "uid")]
    pub id: Uuid,
    pub flag: bool,
    pub small: i16,
    pub unsigned: u32,
    pub ratio: f32,
    pub amount: Decimal,
    pub day: Option<Date>,
    pub at: Option<Time>,
    pub stamp: Option<PrimitiveDateTime>,
    pub payload: Vec<u8>,
    pub note: Option<String>,
}

pub async fn types<S: Session>(db: &Db<S>) {
    db.raw::<AllTypes>(
        "CREATE TABLE IF NOT EXISTS `all_types` (\
         `uid` TEXT PRIMARY KEY, \
         `flag` INTEGER, \
         `small` INTEGER, \
         `unsigned` INTEGER, \
         `ratio` REAL, \
         `amount` REAL, \
         `day` TEXT, \
         `at` TEXT, \
         `stamp` TEXT, \
         `payload` BLOB, \
         `note` TEXT)",
        [],
    )
    .exec()
    .await
    .expect("Failed to create the all_types table");
    db.raw::<AllTypes>("DELETE FROM `all_types`", [])
        .exec()
        .await
        .expect("Failed to clear the all_types table");

    let day = Date::from_calendar_date(2024, Month::February, 29).expect("Invalid date");
    let at = Time::from_hms_milli(12, 30, 45, 500).expect("Invalid time");
    let full = AllTypes {
        id: Uuid::new_v4(),
        flag: true,
        small: -1234,
        unsigned: 4_000_000_000,
        ratio: 1.5,
        amount: Decimal::new(12550, 2),
        day: Some(day),
        at: Some(at),
        stamp: Some(PrimitiveDateTime::new(day, at)),
        payload: vec![0, 1, 2, 255],
        note: Some("full".into()),
    };
    let sparse = AllTypes {
        id: Uuid::new_v4(),
        ..Default::default()
    };
    db.insert::<AllTypes>()
        .values([full.clone(), sparse.clone()])
        .exec()
        .await
        .expect("Failed to insert the all_types rows");

    let found = db
        .select::<AllTypes>()
        .where_([col("id").eq(full.id)])
        .get()
        .await
        .expect("Failed to find the full row");
    assert_eq!(found, full);

    let found = db
        .select::<AllTypes>()
        .where_([col("id").eq(sparse.id)])
        .get()
        .await
        .expect("Failed to find the sparse row");
    assert_eq!(found, sparse);

    // Only some columns inserted, the others are NULL and stay out of the select list
    let id = Uuid::new_v4();
    db.insert::<AllTypes>()
        .columns(["id", "flag", "note"])
        .values([AllTypes {
            id,
            flag: true,
            note: Some("partial".into()),
            ..Default::default()
        }])
        .exec()
        .await
        .expect("Failed to insert the partial row");
    let found = db
        .select::<AllTypes>()
        .select([col("id"), col("flag"), col("note")])
        .where_([col("id").eq(id)])
        .get()
        .await
        .expect("Failed to find the partial row");
    assert_eq!(
        found,
        AllTypes {
            id,
            flag: true,
            note: Some("partial".into()),
            ..Default::default()
        }
    );
}
