use rusqlite::Connection;

const SCHEMA: &str = include_str!("schema.sql");

pub fn run(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)?;

    // Migration: add goal_weight column if it doesn't exist (databases created
    // before goal tracking shipped)
    let has_goal_weight: bool = conn
        .prepare("SELECT COUNT(*) FROM pragma_table_info('users') WHERE name='goal_weight'")?
        .query_row([], |row| row.get::<_, i32>(0))
        .map(|c| c > 0)
        .unwrap_or(false);

    if !has_goal_weight {
        conn.execute_batch("ALTER TABLE users ADD COLUMN goal_weight REAL DEFAULT NULL;")?;
    }

    Ok(())
}
