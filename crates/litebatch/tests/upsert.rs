use litebatch::prelude::*;
use litebatch::{QueryContext, QueryHook};
use std::sync::{Arc, Mutex};

/// Keeps `(sql, param_count)` for every statement.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<(String, usize)>>>);

impl Captured {
    fn take(&self) -> Vec<(String, usize)> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

impl QueryHook for Captured {
    fn before_query(&self, ctx: &QueryContext) -> litebatch::HookAction {
        self.0
            .lock()
            .unwrap()
            .push((ctx.sql.clone(), ctx.param_count));
        litebatch::HookAction::Continue
    }
}

fn people_db() -> (Connection, Captured) {
    let captured = Captured::default();
    let conn = Connection::open_in_memory()
        .unwrap()
        .with_hook(captured.clone());
    conn.execute_batch(
        "CREATE TABLE people (id INTEGER PRIMARY KEY, job TEXT NOT NULL UNIQUE, age INTEGER, name TEXT);
         INSERT INTO people (job, age, name) VALUES ('Speaker', 30, 'Bob');",
    )
    .unwrap();
    (conn, captured)
}

fn people_count(conn: &Connection) -> u64 {
    Select::new("people").count(conn).unwrap()
}

#[test]
fn presenter_added_and_speaker_updated() {
    let (conn, _) = people_db();
    assert_eq!(people_count(&conn), 1);

    let mut upsert = Upsert::new("people").key("job").fields(["job", "age", "name"]);
    upsert
        .values([Value::from("Presenter"), 45.into(), "Ann".into()])
        .values([Value::from("Speaker"), 32.into(), "Bob".into()]);
    let result = upsert.execute(&conn).unwrap();

    assert_eq!(result.rows_affected, 2);
    assert!(result.last_insert_id.is_some());
    assert_eq!(people_count(&conn), 2);

    let ages: Vec<i64> = Select::new("people")
        .fields(["age"])
        .filter(Condition::eq("job", "Speaker").unwrap())
        .fetch_all(&conn, |row| row.get(0))
        .unwrap();
    assert_eq!(ages, vec![32]);
}

#[test]
fn thousand_rows_in_one_statement() {
    let (conn, captured) = people_db();
    captured.take();

    let mut upsert = Upsert::new("people").key("job").fields(["job", "age", "name"]);
    for i in 0..1000 {
        upsert.values([
            Value::from(format!("job-{i}")),
            Value::from(i),
            Value::from(format!("name-{i}")),
        ]);
    }
    upsert.execute(&conn).unwrap();

    let statements = captured.take();
    assert_eq!(statements.len(), 1);
    let (sql, params) = &statements[0];
    assert_eq!(*params, 1);
    assert_eq!(sql.matches(":db_insert_placeholder_").count(), 1);
    assert!(sql.contains("json_each(:db_insert_placeholder_0)"));
    assert_eq!(people_count(&conn), 1001);

    let row: Vec<Vec<Value>> = Select::new("people")
        .fields(["age", "name"])
        .filter(Condition::eq("job", "job-999").unwrap())
        .fetch_values(&conn)
        .unwrap();
    assert_eq!(row, vec![vec![Value::from(999), Value::from("name-999")]]);
}

#[test]
fn reuse_after_batched_execute() {
    let (conn, captured) = people_db();
    let mut upsert = Upsert::new("people").key("job").fields(["job", "age", "name"]);
    for i in 0..75 {
        upsert.values([Value::from(format!("j{i}")), Value::from(i), Value::from("x")]);
    }
    upsert.execute(&conn).unwrap();
    assert_eq!(upsert.row_count(), 0);

    captured.take();
    upsert.values([Value::from("j0"), Value::from(100), Value::from("y")]);
    upsert.execute(&conn).unwrap();

    let statements = captured.take();
    assert_eq!(statements[0].1, 3);
    assert!(statements[0].0.contains(" VALUES "));
    assert_eq!(people_count(&conn), 76);
}

#[test]
fn batched_round_trip_of_mixed_values() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE mixed (k UNIQUE, t, i, r, n)")
        .unwrap();

    let mut expected = Vec::new();
    let mut upsert = Upsert::new("mixed").key("k").fields(["k", "t", "i", "r", "n"]);
    for k in 0..60i64 {
        let row = vec![
            Value::from(k),
            Value::from(format!("text \"{k}\" é ✓")),
            Value::from(k * 1_000_000_007),
            Value::from(k as f64 + 0.5),
            Value::from(None::<i64>),
        ];
        upsert.values(row.clone());
        expected.push(row);
    }
    upsert.execute(&conn).unwrap();

    let stored = Select::new("mixed")
        .fields(["k", "t", "i", "r", "n"])
        .order_by("k", Order::Asc)
        .fetch_values(&conn)
        .unwrap();
    assert_eq!(stored, expected);
}

#[test]
fn keyword_table_and_columns() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(r#"CREATE TABLE "select" (id INTEGER PRIMARY KEY, "update" TEXT)"#)
        .unwrap();

    let mut upsert = Upsert::new("select").key("id").fields(["id", "update"]);
    upsert.values([Value::from(1), Value::from("direct")]);
    upsert.execute(&conn).unwrap();

    for id in 1..=60 {
        upsert.values([Value::from(id), Value::from(format!("batched {id}"))]);
    }
    upsert.execute(&conn).unwrap();

    let first: Vec<String> = Select::new("select")
        .fields(["update"])
        .filter(Condition::eq("id", 1).unwrap())
        .fetch_all(&conn, |row| row.get(0))
        .unwrap();
    assert_eq!(first, vec!["batched 1".to_string()]);
    assert_eq!(Select::new("select").count(&conn).unwrap(), 60);
}

#[test]
fn punctuated_field_names_in_both_modes() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE t (k UNIQUE, its, firstname)")
        .unwrap();

    let mut upsert = Upsert::new("t").key("k").fields(["k", "it's", "first name"]);
    upsert
        .values([Value::from(0), Value::from("direct"), Value::from("a")])
        .values([Value::from(1), Value::from("direct"), Value::from("b")]);
    assert_eq!(upsert.execute(&conn).unwrap().rows_affected, 2);

    for k in 0..60 {
        upsert.values([
            Value::from(k),
            Value::from(format!("it's {k}")),
            Value::from(format!("name {k}")),
        ]);
    }
    assert_eq!(upsert.execute(&conn).unwrap().rows_affected, 60);

    let rows = Select::new("t")
        .fields(["its", "firstname"])
        .filter(Condition::in_list("k", vec![0, 59]).unwrap())
        .order_by("k", Order::Asc)
        .fetch_values(&conn)
        .unwrap();
    assert_eq!(
        rows,
        vec![
            vec![Value::from("it's 0"), Value::from("name 0")],
            vec![Value::from("it's 59"), Value::from("name 59")],
        ]
    );
    assert_eq!(Select::new("t").count(&conn).unwrap(), 60);
}

#[test]
fn default_fields_take_table_default() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch("CREATE TABLE tags (name TEXT PRIMARY KEY, source TEXT DEFAULT 'import')")
        .unwrap();

    let mut upsert = Upsert::new("tags")
        .key("name")
        .use_defaults(["source"])
        .fields(["name"]);
    upsert.values(["rust"]).values(["sqlite"]);
    upsert.execute(&conn).unwrap();

    let sources: Vec<String> = Select::new("tags")
        .fields(["source"])
        .fetch_all(&conn, |row| row.get(0))
        .unwrap();
    assert_eq!(sources, vec!["import".to_string(), "import".to_string()]);
}

#[test]
fn table_prefix_from_config() {
    let config = litebatch::ConnectionConfig::new().table_prefix("app_");
    let conn = Connection::open_in_memory_with_config(config).unwrap();
    conn.execute_batch("CREATE TABLE app_people (job TEXT UNIQUE, age INTEGER)")
        .unwrap();

    let mut upsert = Upsert::new("people").key("job").fields(["job", "age"]);
    upsert.values([Value::from("Host"), Value::from(50)]);
    upsert.execute(&conn).unwrap();
    assert_eq!(Select::new("people").count(&conn).unwrap(), 1);
}

#[test]
fn constraint_errors_keep_the_batch() {
    let (conn, _) = people_db();
    let mut upsert = Upsert::new("people").key("job").fields(["job", "age", "name"]);
    upsert.values([Value::Null, Value::from(1), Value::from("nobody")]);

    let err = upsert.execute(&conn).unwrap_err();
    assert!(matches!(err, BatchError::NotNullViolation(_)), "{err:?}");
    assert_eq!(upsert.row_count(), 1);
}

#[test]
fn transaction_commit_and_rollback() {
    let (mut conn, _) = people_db();

    {
        let tx = conn.transaction().unwrap();
        let mut upsert = Upsert::new("people").key("job").fields(["job", "age", "name"]);
        for i in 0..55 {
            upsert.values([Value::from(format!("tmp{i}")), Value::from(i), Value::from("t")]);
        }
        upsert.execute(&tx).unwrap();
        assert_eq!(Select::new("people").count(&tx).unwrap(), 56);
        tx.rollback().unwrap();
    }
    assert_eq!(people_count(&conn), 1);

    {
        let tx = conn.transaction().unwrap();
        let mut upsert = Upsert::new("people").key("job").fields(["job", "age", "name"]);
        upsert.values([Value::from("Host"), Value::from(1), Value::from("h")]);
        upsert.execute(&tx).unwrap();
        tx.commit().unwrap();
    }
    assert_eq!(people_count(&conn), 2);
}
