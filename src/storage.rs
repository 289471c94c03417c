use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use parking_lot::Mutex;
use rand::{distributions::Alphanumeric, Rng};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::profile::{Profile, Settings};

const SETTINGS_KEY: &str = "settings";
const PROFILE_KEY: &str = "profile";

#[derive(Debug, Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone)]
pub struct Options {
    pub path: Option<PathBuf>,
}

impl Store {
    pub fn open(opts: Options) -> Result<Self> {
        let path = if let Some(path) = opts.path {
            path
        } else {
            default_path().context("storage: resolve default path")?
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("storage: create directory {}", parent.display()))?;
        }

        let conn = Connection::open(&path)
            .with_context(|| format!("storage: open database at {}", path.display()))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .context("storage: set WAL")?;
        conn.pragma_update(None, "busy_timeout", 5000)
            .context("storage: set busy timeout")?;
        migrate(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn close(self) -> Result<()> {
        let conn = Arc::try_unwrap(self.conn)
            .map_err(|_| anyhow!("storage: connection still in use"))?
            .into_inner();
        conn.close()
            .map_err(|(_, err)| err)
            .context("storage: close connection")
    }

    /// The user id sent with every sync call. Generated on first use and
    /// reused afterwards.
    pub fn identity(&self) -> Result<Identity> {
        let conn = self.conn.lock();
        let existing = conn
            .query_row(
                "SELECT user_id, created_at FROM identity WHERE id = 1",
                [],
                |row| {
                    let created: i64 = row.get(1)?;
                    Ok(Identity {
                        user_id: row.get(0)?,
                        created_at: Utc
                            .timestamp_opt(created, 0)
                            .single()
                            .unwrap_or_else(Utc::now),
                    })
                },
            )
            .optional()
            .context("storage: query identity")?;
        if let Some(identity) = existing {
            return Ok(identity);
        }

        let now = Utc::now();
        let identity = Identity {
            user_id: generate_user_id(now),
            created_at: now,
        };
        conn.execute(
            "INSERT INTO identity (id, user_id, created_at) VALUES (1, ?1, ?2)",
            params![identity.user_id, identity.created_at.timestamp()],
        )
        .context("storage: insert identity")?;
        tracing::info!(user_id = %identity.user_id, "generated new user id");
        Ok(identity)
    }

    pub fn load_settings(&self) -> Result<Option<Settings>> {
        self.get_json(SETTINGS_KEY)
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.put_json(SETTINGS_KEY, settings)
    }

    pub fn load_profile(&self) -> Result<Option<Profile>> {
        self.get_json(PROFILE_KEY)
    }

    pub fn save_profile(&self, profile: &Profile) -> Result<()> {
        self.put_json(PROFILE_KEY, profile)
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let conn = self.conn.lock();
        let raw: Option<String> = conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("storage: query preference {key}"))?;
        raw.map(|value| {
            serde_json::from_str(&value)
                .with_context(|| format!("storage: decode preference {key}"))
        })
        .transpose()
    }

    fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let encoded = serde_json::to_string(value)
            .with_context(|| format!("storage: encode preference {key}"))?;
        let conn = self.conn.lock();
        conn.execute(
            r#"
INSERT INTO preferences (key, value, updated_at)
VALUES (?1, ?2, ?3)
ON CONFLICT(key) DO UPDATE SET
  value = excluded.value,
  updated_at = excluded.updated_at
"#,
            params![key, encoded, Utc::now().timestamp()],
        )
        .with_context(|| format!("storage: write preference {key}"))?;
        Ok(())
    }
}

fn generate_user_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(9)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect();
    format!("user_{}_{suffix}", now.timestamp_millis())
}

fn migrate(conn: &Connection) -> Result<()> {
    conn.execute(
        r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
  version INTEGER PRIMARY KEY,
  applied_at INTEGER NOT NULL
)
"#,
        [],
    )?;

    let current: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    let migrations = migrations();
    for (idx, sql) in migrations.iter().enumerate() {
        let version = (idx + 1) as i64;
        if version <= current {
            continue;
        }
        conn.execute_batch(sql)?;
        conn.execute(
            "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
            params![
                version,
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or(Duration::from_secs(0))
                    .as_secs() as i64,
            ],
        )?;
    }
    Ok(())
}

fn migrations() -> Vec<&'static str> {
    vec![r#"
CREATE TABLE IF NOT EXISTS identity (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  user_id TEXT NOT NULL,
  created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS preferences (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL,
  updated_at INTEGER NOT NULL
);
"#]
}

pub fn default_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("goshorts").join("state.db"))
}
