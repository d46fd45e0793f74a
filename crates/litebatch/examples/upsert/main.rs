//! Upsert a small and a large batch into an in-memory database.
//!
//! Run with: `cargo run -p litebatch --example upsert`

use colored::Colorize;
use litebatch::prelude::*;
use litebatch::{QueryContext, QueryHook};

struct PrintSql;

impl QueryHook for PrintSql {
    fn before_query(&self, ctx: &QueryContext) -> litebatch::HookAction {
        let preview: String = ctx.sql.chars().take(120).collect();
        let label = format!("[{:?}, {} params]", ctx.query_type, ctx.param_count);
        println!("  {} {}", label.dimmed(), preview);
        litebatch::HookAction::Continue
    }
}

fn section(title: &str) {
    println!();
    println!("{}", title.bold().cyan());
}

fn success(msg: &str) {
    println!("  {} {}", "✓".green().bold(), msg);
}

fn main() -> BatchResult<()> {
    let conn = Connection::open_in_memory()?.with_hook(PrintSql);
    conn.execute_batch(
        "CREATE TABLE people (job TEXT PRIMARY KEY, age INTEGER, name TEXT);
         INSERT INTO people VALUES ('Speaker', 30, 'Bob');",
    )?;

    section("Small batch (one placeholder per value)");
    let mut upsert = Upsert::new("people").key("job").fields(["job", "age", "name"]);
    upsert
        .values([Value::from("Presenter"), 45.into(), "Ann".into()])
        .values([Value::from("Speaker"), 32.into(), "Bob".into()]);
    let small = upsert.execute(&conn)?;
    success(&format!("{} rows written", small.rows_affected));

    section("Large batch (one JSON placeholder)");
    for i in 0..1000 {
        upsert.values([
            Value::from(format!("guest-{i}")),
            Value::from(20 + i % 50),
            Value::from(format!("Guest {i}")),
        ]);
    }
    let large = upsert.execute(&conn)?;
    success(&format!("{} rows written", large.rows_affected));

    section("Lookup");
    let speakers = Select::new("people")
        .fields(["name", "age"])
        .filter(Condition::in_list("job", vec!["Speaker", "Presenter"])?)
        .order_by("name", Order::Asc)
        .fetch_values(&conn)?;
    for row in &speakers {
        println!("  {row:?}");
    }
    success(&format!("{} people in total", Select::new("people").count(&conn)?));
    Ok(())
}
