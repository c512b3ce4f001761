//! Database migrations

use rusqlite::Connection;

pub const SCHEMA_VERSION: i32 = 2;

pub fn run_migrations(conn: &Connection) -> Result<(), rusqlite::Error> {
    let current_version: i32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;

    tracing::info!(
        "Database schema version: {} (target: {})",
        current_version,
        SCHEMA_VERSION
    );

    if current_version < 1 {
        tracing::info!("Running migration v1: initial schema");
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS module_progress (
                user_id TEXT NOT NULL,
                module_id TEXT NOT NULL,
                content_viewed_at TEXT,
                explanation_read_at TEXT,
                task_passed_at TEXT,
                challenge_completed_at TEXT,
                PRIMARY KEY (user_id, module_id)
            );

            CREATE TABLE IF NOT EXISTS collected_rewards (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                module_id TEXT NOT NULL,
                reward_id TEXT NOT NULL,
                xp_earned INTEGER NOT NULL,
                collected_at TEXT NOT NULL,
                UNIQUE (user_id, module_id, reward_id)
            );

            CREATE TABLE IF NOT EXISTS user_stats (
                user_id TEXT PRIMARY KEY,
                total_xp INTEGER NOT NULL DEFAULT 0,
                level INTEGER NOT NULL DEFAULT 1,
                streak_days INTEGER NOT NULL DEFAULT 0,
                last_activity TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_rewards_user ON collected_rewards(user_id);
            CREATE INDEX IF NOT EXISTS idx_progress_user ON module_progress(user_id);
            "#,
        )?;
    }

    if current_version < 2 {
        tracing::info!("Running migration v2: goals table");
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS goals (
                user_id TEXT NOT NULL,
                goal_id TEXT NOT NULL,
                title TEXT NOT NULL,
                set_at TEXT NOT NULL,
                achieved_at TEXT,
                PRIMARY KEY (user_id, goal_id)
            );

            CREATE INDEX IF NOT EXISTS idx_goals_user ON goals(user_id);
            "#,
        )?;
    }

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tracing::info!("Database schema up to date (version {})", SCHEMA_VERSION);

    Ok(())
}
