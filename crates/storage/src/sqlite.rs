//! SQLite storage implementation

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use schatzkarte_core::{
    level_for_xp, CollectedReward, ConditionState, ModuleId, ModuleProgress, ProgressFlag,
    UserStats,
};

use crate::traits::ProgressStore;
use crate::{migrations, Result, StorageError};

pub struct Storage {
    conn: Arc<Mutex<Connection>>,
}

fn lock_conn(mutex: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    mutex
        .lock()
        .map_err(|e: PoisonError<_>| StorageError::Unavailable(format!("lock poisoned: {e}")))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| StorageError::DataCorruption {
            context: format!("timestamp column: {raw}"),
            source: Box::new(e),
        })
}

fn parse_opt_timestamp(raw: Option<String>) -> Result<Option<DateTime<Utc>>> {
    raw.as_deref().map(parse_timestamp).transpose()
}

fn parse_opt_date(raw: Option<String>) -> Result<Option<NaiveDate>> {
    raw.as_deref()
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| StorageError::DataCorruption {
                context: format!("last_activity column: {s}"),
                source: Box::new(e),
            })
        })
        .transpose()
}

/// Column holding the first-set timestamp for a flag.
const fn flag_column(flag: ProgressFlag) -> &'static str {
    match flag {
        ProgressFlag::ContentViewed => "content_viewed_at",
        ProgressFlag::ExplanationRead => "explanation_read_at",
        ProgressFlag::TaskPassed => "task_passed_at",
        ProgressFlag::ChallengeCompleted => "challenge_completed_at",
    }
}

impl Storage {
    pub fn new(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path).map_err(StorageError::from)?;
        let storage = Self { conn: Arc::new(Mutex::new(conn)) };

        let conn = lock_conn(&storage.conn)?;
        migrations::run_migrations(&conn)
            .map_err(|e| StorageError::Migration(e.to_string()))?;
        drop(conn);

        Ok(storage)
    }

    /// Stats row with zeroed defaults when the user has no row yet.
    fn read_stats(conn: &Connection, user_id: &str) -> Result<UserStats> {
        let row = conn
            .query_row(
                "SELECT total_xp, level, streak_days, last_activity
                 FROM user_stats WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, u32>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, u32>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((total_xp, level, streak_days, last_activity)) => Ok(UserStats {
                total_xp,
                level,
                streak_days,
                last_activity: parse_opt_date(last_activity)?,
            }),
            None => Ok(UserStats { level: 1, ..UserStats::default() }),
        }
    }

    fn read_progress_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, [Option<String>; 4])> {
        Ok((
            row.get(0)?,
            [row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?],
        ))
    }

    fn progress_from_columns(columns: [Option<String>; 4]) -> Result<ModuleProgress> {
        let [viewed, read, passed, challenge] = columns;
        Ok(ModuleProgress {
            content_viewed: parse_opt_timestamp(viewed)?,
            explanation_read: parse_opt_timestamp(read)?,
            task_passed: parse_opt_timestamp(passed)?,
            challenge_completed: parse_opt_timestamp(challenge)?,
        })
    }
}

impl ProgressStore for Storage {
    fn get_progress(
        &self,
        user_id: &str,
        module_id: &ModuleId,
    ) -> Result<Option<ModuleProgress>> {
        let conn = lock_conn(&self.conn)?;
        let row = conn
            .query_row(
                "SELECT module_id, content_viewed_at, explanation_read_at,
                        task_passed_at, challenge_completed_at
                 FROM module_progress WHERE user_id = ?1 AND module_id = ?2",
                params![user_id, module_id.as_str()],
                Self::read_progress_row,
            )
            .optional()?;
        row.map(|(_, columns)| Self::progress_from_columns(columns)).transpose()
    }

    fn get_all_progress(&self, user_id: &str) -> Result<HashMap<ModuleId, ModuleProgress>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT module_id, content_viewed_at, explanation_read_at,
                    task_passed_at, challenge_completed_at
             FROM module_progress WHERE user_id = ?1",
        )?;
        let rows: Vec<(String, [Option<String>; 4])> = stmt
            .query_map(params![user_id], Self::read_progress_row)?
            .collect::<rusqlite::Result<_>>()?;

        let mut progress = HashMap::with_capacity(rows.len());
        for (module_id, columns) in rows {
            progress.insert(ModuleId::from(module_id), Self::progress_from_columns(columns)?);
        }
        Ok(progress)
    }

    fn set_flag(
        &self,
        user_id: &str,
        module_id: &ModuleId,
        flag: ProgressFlag,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let column = flag_column(flag);
        let conn = lock_conn(&self.conn)?;

        let already_set: Option<Option<String>> = conn
            .query_row(
                &format!(
                    "SELECT {column} FROM module_progress WHERE user_id = ?1 AND module_id = ?2"
                ),
                params![user_id, module_id.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        if matches!(already_set, Some(Some(_))) {
            return Ok(false);
        }

        // COALESCE keeps the first timestamp if a concurrent writer got there.
        conn.execute(
            &format!(
                "INSERT INTO module_progress (user_id, module_id, {column})
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT (user_id, module_id)
                 DO UPDATE SET {column} = COALESCE({column}, excluded.{column})"
            ),
            params![user_id, module_id.as_str(), at.to_rfc3339()],
        )?;
        Ok(true)
    }

    fn has_collected(
        &self,
        user_id: &str,
        module_id: &ModuleId,
        reward_id: &str,
    ) -> Result<bool> {
        let conn = lock_conn(&self.conn)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM collected_rewards
             WHERE user_id = ?1 AND module_id = ?2 AND reward_id = ?3",
            params![user_id, module_id.as_str(), reward_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn insert_collected(
        &self,
        user_id: &str,
        module_id: &ModuleId,
        reward_id: &str,
        xp: u32,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut conn = lock_conn(&self.conn)?;
        let tx = conn.transaction()?;

        // The unique constraint makes concurrent duplicates race to exactly
        // one inserted row; INSERT OR IGNORE turns the loser into a no-op.
        let inserted = tx.execute(
            "INSERT OR IGNORE INTO collected_rewards
             (user_id, module_id, reward_id, xp_earned, collected_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![user_id, module_id.as_str(), reward_id, xp, at.to_rfc3339()],
        )?;
        if inserted == 0 {
            tx.commit()?;
            return Ok(false);
        }

        let current_xp: u32 = {
            tx.execute(
                "INSERT OR IGNORE INTO user_stats (user_id, total_xp, level) VALUES (?1, 0, 1)",
                params![user_id],
            )?;
            tx.query_row(
                "SELECT total_xp FROM user_stats WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )?
        };
        let new_total = current_xp + xp;
        tx.execute(
            "UPDATE user_stats SET total_xp = ?1, level = ?2 WHERE user_id = ?3",
            params![new_total, level_for_xp(new_total), user_id],
        )?;

        tx.commit()?;
        Ok(true)
    }

    fn collected_rewards(&self, user_id: &str) -> Result<Vec<CollectedReward>> {
        let conn = lock_conn(&self.conn)?;
        let mut stmt = conn.prepare(
            "SELECT module_id, reward_id, xp_earned, collected_at
             FROM collected_rewards WHERE user_id = ?1 ORDER BY id",
        )?;
        let rows: Vec<(String, String, u32, String)> = stmt
            .query_map(params![user_id], |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
            })?
            .collect::<rusqlite::Result<_>>()?;

        rows.into_iter()
            .map(|(module_id, reward_id, xp_earned, collected_at)| {
                Ok(CollectedReward {
                    module_id,
                    reward_id,
                    xp_earned,
                    collected_at: parse_timestamp(&collected_at)?,
                })
            })
            .collect()
    }

    fn get_stats(&self, user_id: &str) -> Result<UserStats> {
        let conn = lock_conn(&self.conn)?;
        Self::read_stats(&conn, user_id)
    }

    fn record_activity(&self, user_id: &str, today: NaiveDate) -> Result<UserStats> {
        let conn = lock_conn(&self.conn)?;
        let mut stats = Self::read_stats(&conn, user_id)?;

        stats.streak_days =
            schatzkarte_core::advance_streak(stats.streak_days, stats.last_activity, today);
        stats.last_activity = Some(today);

        conn.execute(
            "INSERT INTO user_stats (user_id, total_xp, level, streak_days, last_activity)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (user_id)
             DO UPDATE SET streak_days = excluded.streak_days,
                           last_activity = excluded.last_activity",
            params![
                user_id,
                stats.total_xp,
                stats.level,
                stats.streak_days,
                today.format("%Y-%m-%d").to_string(),
            ],
        )?;
        Ok(stats)
    }

    fn recompute_stats(&self, user_id: &str) -> Result<UserStats> {
        let mut conn = lock_conn(&self.conn)?;
        let tx = conn.transaction()?;

        let ledger_sum: u32 = tx.query_row(
            "SELECT COALESCE(SUM(xp_earned), 0) FROM collected_rewards WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        tx.execute(
            "INSERT INTO user_stats (user_id, total_xp, level) VALUES (?1, ?2, ?3)
             ON CONFLICT (user_id)
             DO UPDATE SET total_xp = excluded.total_xp, level = excluded.level",
            params![user_id, ledger_sum, level_for_xp(ledger_sum)],
        )?;
        tx.commit()?;

        Self::read_stats(&conn, user_id)
    }

    fn record_goal_set(
        &self,
        user_id: &str,
        goal_id: &str,
        title: &str,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = lock_conn(&self.conn)?;
        conn.execute(
            "INSERT OR IGNORE INTO goals (user_id, goal_id, title, set_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, goal_id, title, at.to_rfc3339()],
        )?;
        Ok(())
    }

    fn record_goal_achieved(&self, user_id: &str, goal_id: &str, at: DateTime<Utc>) -> Result<()> {
        let conn = lock_conn(&self.conn)?;
        let updated = conn.execute(
            "UPDATE goals SET achieved_at = COALESCE(achieved_at, ?1)
             WHERE user_id = ?2 AND goal_id = ?3",
            params![at.to_rfc3339(), user_id, goal_id],
        )?;
        if updated == 0 {
            return Err(StorageError::NotFound { entity: "goal", id: goal_id.to_owned() });
        }
        Ok(())
    }

    fn condition_state(&self, user_id: &str) -> Result<ConditionState> {
        let conn = lock_conn(&self.conn)?;
        let (goals_set, goals_achieved): (u32, u32) = conn.query_row(
            "SELECT COUNT(*), COUNT(achieved_at) FROM goals WHERE user_id = ?1",
            params![user_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let stats = Self::read_stats(&conn, user_id)?;
        Ok(ConditionState { goals_set, goals_achieved, streak_days: stats.streak_days })
    }
}
