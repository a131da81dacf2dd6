//! SQLite-based storage for users, study plans, and daily schedules.
//!
//! Provides persistent storage for:
//! - Study plans and their day-by-day schedule entries
//! - The append-only progress log
//! - Key-value store for application state

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::data_dir;
use crate::adjuster::EntryAdjustment;
use crate::error::{Result, StoreError};
use crate::plan::{Difficulty, PlanStatus, ProgressRecord, ScheduleEntry, StudyPlan};

// === Helper Functions ===

/// Format a calendar date for database storage
fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a calendar date from database string with fallback to today
fn parse_date_fallback(date_str: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").unwrap_or_else(|_| Utc::now().date_naive())
}

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Build a StudyPlan from a database row
fn row_to_plan(row: &rusqlite::Row) -> Result<StudyPlan, rusqlite::Error> {
    let exam_date_str: String = row.get(3)?;
    let difficulty_str: String = row.get(5)?;
    let status_str: String = row.get(8)?;
    let created_at_str: String = row.get(9)?;

    Ok(StudyPlan {
        id: row.get(0)?,
        user_id: row.get(1)?,
        subject: row.get(2)?,
        exam_date: parse_date_fallback(&exam_date_str),
        daily_hours: row.get(4)?,
        difficulty: Difficulty::parse(&difficulty_str),
        total_hours: row.get(6)?,
        completed_hours: row.get(7)?,
        status: PlanStatus::parse(&status_str),
        created_at: parse_datetime_fallback(&created_at_str),
    })
}

/// Build a ScheduleEntry from a database row
fn row_to_entry(row: &rusqlite::Row) -> Result<ScheduleEntry, rusqlite::Error> {
    let study_date_str: String = row.get(2)?;
    let created_at_str: String = row.get(9)?;

    Ok(ScheduleEntry {
        id: row.get(0)?,
        plan_id: row.get(1)?,
        study_date: parse_date_fallback(&study_date_str),
        subject: row.get(3)?,
        planned_hours: row.get(4)?,
        actual_hours: row.get(5)?,
        completed: row.get(6)?,
        missed: row.get(7)?,
        notes: row.get(8)?,
        created_at: parse_datetime_fallback(&created_at_str),
    })
}

/// Build a ProgressRecord from a database row
fn row_to_progress(row: &rusqlite::Row) -> Result<ProgressRecord, rusqlite::Error> {
    let date_str: String = row.get(2)?;
    let created_at_str: String = row.get(6)?;

    Ok(ProgressRecord {
        id: row.get(0)?,
        plan_id: row.get(1)?,
        date: parse_date_fallback(&date_str),
        subject: row.get(3)?,
        hours_completed: row.get(4)?,
        notes: row.get(5)?,
        created_at: parse_datetime_fallback(&created_at_str),
    })
}

/// SQLite database for study-plan storage.
///
/// Stores users, plans, schedule entries, and the progress log.
pub struct PlannerDb {
    conn: Connection,
}

impl PlannerDb {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/studyplan/studyplan.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("studyplan.db");
        Self::open_at(path)
    }

    /// Open the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    #[cfg(test)]
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StoreError::from)?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| StoreError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS users (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS study_plans (
                id              TEXT PRIMARY KEY,
                user_id         INTEGER NOT NULL,
                subject         TEXT NOT NULL,
                exam_date       TEXT NOT NULL,
                daily_hours     REAL NOT NULL,
                difficulty      TEXT NOT NULL DEFAULT 'medium',
                total_hours     REAL NOT NULL DEFAULT 0,
                completed_hours REAL NOT NULL DEFAULT 0,
                status          TEXT NOT NULL DEFAULT 'active',
                created_at      TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users (id)
            );

            CREATE TABLE IF NOT EXISTS schedule_entries (
                id            TEXT PRIMARY KEY,
                plan_id       TEXT NOT NULL,
                study_date    TEXT NOT NULL,
                subject       TEXT NOT NULL,
                planned_hours REAL NOT NULL,
                actual_hours  REAL NOT NULL DEFAULT 0,
                completed     INTEGER NOT NULL DEFAULT 0,
                missed        INTEGER NOT NULL DEFAULT 0,
                notes         TEXT,
                created_at    TEXT NOT NULL,
                FOREIGN KEY (plan_id) REFERENCES study_plans (id)
            );

            CREATE TABLE IF NOT EXISTS progress_log (
                id              TEXT PRIMARY KEY,
                plan_id         TEXT NOT NULL,
                date            TEXT NOT NULL,
                subject         TEXT NOT NULL,
                hours_completed REAL NOT NULL DEFAULT 0,
                notes           TEXT,
                created_at      TEXT NOT NULL,
                FOREIGN KEY (plan_id) REFERENCES study_plans (id)
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            -- Create indexes for common query patterns
            CREATE INDEX IF NOT EXISTS idx_study_plans_user_status ON study_plans(user_id, status);
            CREATE INDEX IF NOT EXISTS idx_schedule_entries_plan_date ON schedule_entries(plan_id, study_date);
            CREATE INDEX IF NOT EXISTS idx_progress_log_plan_date ON progress_log(plan_id, date);",
        )?;
        Ok(())
    }

    // === Users ===

    /// Create a new user row, returning its id.
    pub fn create_user(&self) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO users (created_at) VALUES (?1)",
            params![Utc::now().to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    // === Study Plans ===

    /// Create a new study plan.
    pub fn create_plan(&self, plan: &StudyPlan) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO study_plans (
                id, user_id, subject, exam_date, daily_hours, difficulty,
                total_hours, completed_hours, status, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                plan.id,
                plan.user_id,
                plan.subject,
                format_date(plan.exam_date),
                plan.daily_hours,
                plan.difficulty.as_str(),
                plan.total_hours,
                plan.completed_hours,
                plan.status.as_str(),
                plan.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a plan by ID.
    pub fn get_plan(&self, id: &str) -> Result<Option<StudyPlan>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, subject, exam_date, daily_hours, difficulty,
                    total_hours, completed_hours, status, created_at
             FROM study_plans WHERE id = ?1",
        )?;
        stmt.query_row(params![id], |row| row_to_plan(row)).optional()
    }

    /// List a user's active plans, newest first.
    pub fn list_active_plans(&self, user_id: i64) -> Result<Vec<StudyPlan>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, subject, exam_date, daily_hours, difficulty,
                    total_hours, completed_hours, status, created_at
             FROM study_plans
             WHERE user_id = ?1 AND status = 'active'
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| row_to_plan(row))?;

        let mut plans = Vec::new();
        for row in rows {
            plans.push(row?);
        }
        Ok(plans)
    }

    /// Set a plan's lifecycle status.
    pub fn update_plan_status(
        &self,
        id: &str,
        status: PlanStatus,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE study_plans SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;
        Ok(())
    }

    /// Add to a plan's completed-hours rollup.
    pub fn add_completed_hours(&self, id: &str, hours: f64) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE study_plans SET completed_hours = completed_hours + ?2 WHERE id = ?1",
            params![id, hours],
        )?;
        Ok(())
    }

    // === Schedule Entries ===

    fn insert_entry(&self, entry: &ScheduleEntry) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO schedule_entries (
                id, plan_id, study_date, subject, planned_hours, actual_hours,
                completed, missed, notes, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                entry.id,
                entry.plan_id,
                format_date(entry.study_date),
                entry.subject,
                entry.planned_hours,
                entry.actual_hours,
                if entry.completed { 1 } else { 0 },
                if entry.missed { 1 } else { 0 },
                entry.notes,
                entry.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Insert a batch of schedule entries in a single transaction.
    pub fn create_schedule_entries(
        &self,
        entries: &[ScheduleEntry],
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        let result: Result<(), rusqlite::Error> = (|| {
            for entry in entries {
                self.insert_entry(entry)?;
            }
            Ok(())
        })();
        match result {
            Ok(()) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(())
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err)
            }
        }
    }

    /// Get a schedule entry by ID.
    pub fn get_schedule_entry(&self, id: &str) -> Result<Option<ScheduleEntry>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, plan_id, study_date, subject, planned_hours, actual_hours,
                    completed, missed, notes, created_at
             FROM schedule_entries WHERE id = ?1",
        )?;
        stmt.query_row(params![id], |row| row_to_entry(row)).optional()
    }

    /// Get a plan's schedule entries ordered by date, optionally for a
    /// single date.
    pub fn get_schedule_entries(
        &self,
        plan_id: &str,
        date: Option<NaiveDate>,
    ) -> Result<Vec<ScheduleEntry>, rusqlite::Error> {
        let mut entries = Vec::new();
        match date {
            Some(date) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, plan_id, study_date, subject, planned_hours, actual_hours,
                            completed, missed, notes, created_at
                     FROM schedule_entries
                     WHERE plan_id = ?1 AND study_date = ?2
                     ORDER BY study_date",
                )?;
                let rows = stmt.query_map(params![plan_id, format_date(date)], |row| {
                    row_to_entry(row)
                })?;
                for row in rows {
                    entries.push(row?);
                }
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, plan_id, study_date, subject, planned_hours, actual_hours,
                            completed, missed, notes, created_at
                     FROM schedule_entries
                     WHERE plan_id = ?1
                     ORDER BY study_date",
                )?;
                let rows = stmt.query_map(params![plan_id], |row| row_to_entry(row))?;
                for row in rows {
                    entries.push(row?);
                }
            }
        }
        Ok(entries)
    }

    /// Flag an entry as missed.
    pub fn mark_entry_missed(&self, id: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE schedule_entries SET missed = 1 WHERE id = ?1",
            params![id],
        )?;
        Ok(())
    }

    /// Flag an entry as completed with the hours actually studied.
    pub fn mark_entry_completed(
        &self,
        id: &str,
        actual_hours: f64,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE schedule_entries SET completed = 1, actual_hours = ?2 WHERE id = ?1",
            params![id, actual_hours],
        )?;
        Ok(())
    }

    /// Rewrite an entry's planned hours.
    pub fn update_entry_planned_hours(
        &self,
        id: &str,
        hours: f64,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "UPDATE schedule_entries SET planned_hours = ?2 WHERE id = ?1",
            params![id, hours],
        )?;
        Ok(())
    }

    // === Progress Log ===

    /// Append a progress record.
    pub fn record_progress(&self, record: &ProgressRecord) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO progress_log (
                id, plan_id, date, subject, hours_completed, notes, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id,
                record.plan_id,
                format_date(record.date),
                record.subject,
                record.hours_completed,
                record.notes,
                record.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a plan's progress records ordered by study date.
    pub fn get_progress(&self, plan_id: &str) -> Result<Vec<ProgressRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, plan_id, date, subject, hours_completed, notes, created_at
             FROM progress_log
             WHERE plan_id = ?1
             ORDER BY date",
        )?;
        let rows = stmt.query_map(params![plan_id], |row| row_to_progress(row))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Sum the hours logged for a plan.
    pub fn sum_completed_hours(&self, plan_id: &str) -> Result<f64, rusqlite::Error> {
        self.conn.query_row(
            "SELECT COALESCE(SUM(hours_completed), 0) FROM progress_log WHERE plan_id = ?1",
            params![plan_id],
            |row| row.get(0),
        )
    }

    // === Transactional Composites ===

    /// Mark an entry missed and rewrite the later entries' planned hours in
    /// a single transaction.
    pub fn apply_missed_day_adjustment(
        &self,
        missed_entry_id: &str,
        adjustments: &[EntryAdjustment],
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        let result: Result<(), rusqlite::Error> = (|| {
            self.mark_entry_missed(missed_entry_id)?;
            for adjustment in adjustments {
                self.update_entry_planned_hours(&adjustment.entry_id, adjustment.new_hours)?;
            }
            Ok(())
        })();
        match result {
            Ok(()) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(())
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err)
            }
        }
    }

    /// Complete an entry, append its progress record, and roll the hours up
    /// into the plan, in a single transaction.
    pub fn apply_entry_completion(
        &self,
        entry_id: &str,
        actual_hours: f64,
        record: &ProgressRecord,
    ) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        let result: Result<(), rusqlite::Error> = (|| {
            self.mark_entry_completed(entry_id, actual_hours)?;
            self.record_progress(record)?;
            self.add_completed_hours(&record.plan_id, record.hours_completed)?;
            Ok(())
        })();
        match result {
            Ok(()) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(())
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err)
            }
        }
    }

    // === Key-Value Store ===

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}
