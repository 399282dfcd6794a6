mod mock;

#[cfg(test)]
mod tests {
    use crate::mock::MockSession;
    use quarry::{
        Assignable, Db, Entity, Error, Joinable, QueryBuilder, SqliteDialect, StandardDialect,
        Table, TableReference, Value, assign, avg, col, count, max, not, raw,
    };

    #[derive(Debug, Default, Clone, PartialEq, Entity)]
    struct TestModel {
        id: i64,
        first_name: String,
        age: i8,
        last_name: Option<String>,
    }

    #[derive(Debug, Default, Clone, Entity)]
    #[quarry(table_name = "orders")]
    struct Order {
        id: i64,
        #[quarry(column = "buyer")]
        buyer_id: i64,
        total: f64,
    }

    fn entity() -> TestModel {
        TestModel {
            id: 12,
            first_name: "Tom".into(),
            age: 18,
            last_name: Some("Jerry".into()),
        }
    }

    fn mysql() -> Db<MockSession> {
        Db::new(MockSession::new())
    }

    fn sqlite() -> Db<MockSession> {
        Db::builder(MockSession::new()).dialect(SqliteDialect).build()
    }

    #[test]
    fn select_all() {
        let query = mysql().select::<TestModel>().build().unwrap();
        assert_eq!(query.sql, "SELECT * FROM `test_model`;");
        assert!(query.args.is_empty());
    }

    #[test]
    fn select_columns_and_where() {
        let query = mysql()
            .select::<TestModel>()
            .select([col("Id"), col("first_name").alias("name")])
            .where_([col("age").eq(18).and(col("first_name").eq("Tom"))])
            .build();
        assert!(matches!(query, Err(Error::UnknownField(ref f)) if f == "Id"));

        let query = mysql()
            .select::<TestModel>()
            .select([col("id"), col("first_name").alias("name")])
            .where_([col("age").eq(18).and(col("first_name").eq("Tom"))])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "SELECT `id`,`first_name` AS `name` FROM `test_model` WHERE (`age` = ?) AND (`first_name` = ?);"
        );
        assert_eq!(
            query.args,
            [Value::Int32(Some(18)), Value::Varchar(Some("Tom".into()))]
        );
    }

    #[test]
    fn where_folding() {
        let db = mysql();
        let query = db
            .select::<TestModel>()
            .where_([col("age").lt(30)])
            .where_([col("first_name").eq("Tom"), not(col("id").eq(1_i64))])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "SELECT * FROM `test_model` WHERE ((`age` < ?) AND (`first_name` = ?)) AND (NOT (`id` = ?));"
        );
        assert_eq!(
            query.args,
            [
                Value::Int32(Some(30)),
                Value::Varchar(Some("Tom".into())),
                Value::Int64(Some(1)),
            ]
        );

        let query = db
            .select::<TestModel>()
            .where_([col("age").eq(18).or(col("age").lt(10)).and(col("id").eq(3))])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "SELECT * FROM `test_model` WHERE ((`age` = ?) OR (`age` < ?)) AND (`id` = ?);"
        );
    }

    #[test]
    fn unknown_field_aborts_build() {
        let result = mysql()
            .select::<TestModel>()
            .where_([col("NoSuchField").eq(1)])
            .build();
        assert!(matches!(result, Err(Error::UnknownField(ref f)) if f == "NoSuchField"));
    }

    #[test]
    fn raw_expressions() {
        let query = mysql()
            .select::<TestModel>()
            .select([raw("COUNT(DISTINCT `first_name`)", [])])
            .where_([
                raw("`age` < ?", [Value::Int32(Some(18))]).as_predicate(),
                col("id").eq(raw("`age` + ?", [Value::Int32(Some(1))])),
            ])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "SELECT COUNT(DISTINCT `first_name`) FROM `test_model` WHERE ((`age` < ?)) AND (`id` = (`age` + ?));"
        );
        assert_eq!(query.args, [Value::Int32(Some(18)), Value::Int32(Some(1))]);
    }

    #[test]
    fn aggregates() {
        let query = mysql()
            .select::<TestModel>()
            .select([avg("age").alias("avg_age"), count("id"), max("age")])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "SELECT AVG(`age`) AS `avg_age`,COUNT(`id`),MAX(`age`) FROM `test_model`;"
        );
        let result = mysql()
            .select::<TestModel>()
            .where_([col("age").eq(avg("age"))])
            .build();
        assert!(matches!(result, Err(Error::UnsupportedExpression(..))));
    }

    #[test]
    fn aliased_and_joined_tables() {
        let db = mysql();
        let orders = Table::of::<Order>().alias("o");
        let query = db
            .select::<Order>()
            .select([orders.c("buyer_id"), orders.c("total").alias("amount")])
            .from(orders.clone())
            .where_([orders.c("total").lt(100.0)])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "SELECT `o`.`buyer`,`o`.`total` AS `amount` FROM `orders` AS `o` WHERE `o`.`total` < ?;"
        );

        let people = Table::of::<TestModel>().alias("p");
        let query = db
            .select::<TestModel>()
            .select([people.c("first_name"), orders.c("total")])
            .from(people.clone().join(orders.clone()).on([people.c("id").eq(orders.c("buyer_id"))]))
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "SELECT `p`.`first_name`,`o`.`total` FROM (`test_model` AS `p` JOIN `orders` AS `o` ON `p`.`id` = `o`.`buyer`);"
        );

        let query = db
            .select::<TestModel>()
            .from(
                Table::of::<TestModel>()
                    .left_join(Table::of::<Order>())
                    .using(["id"])
                    .right_join(Table::of::<TestModel>().alias("t"))
                    .using(["id", "age"]),
            )
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "SELECT * FROM ((`test_model` LEFT JOIN `orders` USING (`id`)) \
             RIGHT JOIN `test_model` AS `t` USING (`id`,`age`));"
        );

        let join = Table::of::<TestModel>().join(Table::of::<Order>()).using(["id"]);
        let result = db
            .select::<TestModel>()
            .select([TableReference::from(join).c("id")])
            .build();
        assert!(matches!(result, Err(Error::UnsupportedTable(..))));
    }

    #[test]
    fn insert_single() {
        let query = mysql().insert::<TestModel>().values([entity()]).build().unwrap();
        assert_eq!(
            query.sql,
            "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?);"
        );
        assert_eq!(
            query.args,
            [
                Value::Int64(Some(12)),
                Value::Varchar(Some("Tom".into())),
                Value::Int8(Some(18)),
                Value::Varchar(Some("Jerry".into())),
            ]
        );
    }

    #[test]
    fn insert_multiple_and_columns() {
        let mut second = entity();
        second.id = 13;
        second.last_name = None;
        let query = mysql()
            .insert::<TestModel>()
            .values([entity(), second])
            .columns(["id", "last_name"])
            .build()
            .unwrap();
        assert_eq!(
            query.sql,
            "INSERT INTO `test_model`(`id`,`last_name`) VALUES (?,?),(?,?);"
        );
        assert_eq!(
            query.args,
            [
                Value::Int64(Some(12)),
                Value::Varchar(Some("Jerry".into())),
                Value::Int64(Some(13)),
                Value::Varchar(None),
            ]
        );

        let result = mysql()
            .insert::<TestModel>()
            .values([entity()])
            .columns(["id", "middle_name"])
            .build();
        assert!(matches!(result, Err(Error::UnknownField(ref f)) if f == "middle_name"));
    }

    #[test]
    fn insert_zero_rows() {
        let result = mysql().insert::<TestModel>().values([]).build();
        assert!(matches!(result, Err(Error::InsertZeroRow)));
    }

    #[test]
    fn upsert_per_dialect() {
        let duplicate = mysql()
            .insert::<TestModel>()
            .values([entity()])
            .on_duplicate_key()
            .update([Assignable::from(assign("age", 19_i8)), col("first_name").into()])
            .build()
            .unwrap();
        assert_eq!(
            duplicate.sql,
            "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?) \
             ON DUPLICATE KEY UPDATE `age`=?,`first_name`=VALUES(`first_name`);"
        );
        assert_eq!(duplicate.args.len(), 5);
        assert_eq!(duplicate.args[4], Value::Int8(Some(19)));

        let conflict = sqlite()
            .insert::<TestModel>()
            .values([entity()])
            .on_duplicate_key()
            .conflict_columns(["id"])
            .update([Assignable::from(assign("age", 19_i8)), col("first_name").into()])
            .build()
            .unwrap();
        assert_eq!(
            conflict.sql,
            "INSERT INTO `test_model`(`id`,`first_name`,`age`,`last_name`) VALUES (?,?,?,?) \
             ON CONFLICT(`id`) DO UPDATE SET `age`=?,`first_name`=excluded.`first_name`;"
        );
        assert_eq!(conflict.args, duplicate.args);
        assert_ne!(conflict.sql, duplicate.sql);

        let result = sqlite()
            .insert::<TestModel>()
            .values([entity()])
            .on_duplicate_key()
            .update([Table::of::<TestModel>().c("age")])
            .build();
        assert!(matches!(result, Err(Error::UnsupportedAssignable(..))));
    }

    #[test]
    #[should_panic]
    fn standard_dialect_has_no_upsert() {
        let db = Db::builder(MockSession::new())
            .dialect(StandardDialect)
            .build();
        let _ = db
            .insert::<TestModel>()
            .values([entity()])
            .on_duplicate_key()
            .update([col("age")])
            .build();
    }

    #[test]
    fn standard_dialect_quotes() {
        let db = Db::builder(MockSession::new())
            .dialect(StandardDialect)
            .build();
        let query = db
            .select::<TestModel>()
            .where_([col("age").eq(1)])
            .build()
            .unwrap();
        assert_eq!(query.sql, r#"SELECT * FROM "test_model" WHERE "age" = ?;"#);
    }

    #[test]
    fn delete() {
        let db = mysql();
        let query = db.delete::<TestModel>().build().unwrap();
        assert_eq!(query.sql, "DELETE FROM `test_model`;");
        let query = db
            .delete::<TestModel>()
            .where_([col("id").eq(12_i64)])
            .build()
            .unwrap();
        assert_eq!(query.sql, "DELETE FROM `test_model` WHERE `id` = ?;");
        assert_eq!(query.args, [Value::Int64(Some(12))]);
    }

    #[test]
    fn build_is_repeatable() {
        let selector = mysql()
            .select::<TestModel>()
            .where_([col("id").eq(1_i64)]);
        let first = selector.build().unwrap();
        let second = selector.build().unwrap();
        assert_eq!(first, second);
    }
}
