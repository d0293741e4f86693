//! MySQL-backed [`HabitStore`] on a sqlx connection pool.
//!
//! Schema: `users(id, phone_number, time_zone)`, `habits(id, user_id)`,
//! `logs(id, habit_id, created_at)`. `created_at` is written in UTC; the
//! session time zone is left at sqlx's `+00:00` default so `TIMESTAMP`
//! columns come back in UTC as well.

use std::time::Duration;

use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use tracing::{debug, info};

use nudge_core::config::DatabaseConfig;
use nudge_core::{LogInstant, User, UserId};

use crate::error::StorageError;
use crate::traits::HabitStore;

const LIST_USERS_SQL: &str = "SELECT CAST(id AS SIGNED) AS id, time_zone, phone_number
     FROM users
     WHERE phone_number IS NOT NULL AND phone_number <> ''
     ORDER BY id";

const LIST_LOGS_SQL: &str = "SELECT l.created_at
     FROM logs l
     INNER JOIN habits h ON l.habit_id = h.id
     WHERE h.user_id = ? AND l.created_at >= ? AND l.created_at < ?
     ORDER BY l.created_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    time_zone: Option<String>,
    phone_number: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            timezone: row.time_zone.unwrap_or_default(),
            phone_number: row.phone_number,
        }
    }
}

/// Pooled MySQL store. Construct once at startup and [`close`](Self::close)
/// when the run is over.
#[derive(Debug, Clone)]
pub struct MySqlHabitStore {
    pool: MySqlPool,
}

impl MySqlHabitStore {
    /// Open the pool and establish the first connection.
    ///
    /// Fails fast when the database is unreachable, before any user is
    /// evaluated.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StorageError> {
        let options = connect_options(config)?;
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await?;

        info!(db = %config.redacted_target(), "MySQL connected");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("MySQL pool closed");
    }
}

/// Connection options from a `DATABASE_URL` or from individual parts.
pub fn connect_options(config: &DatabaseConfig) -> Result<MySqlConnectOptions, StorageError> {
    if let Some(url) = &config.url {
        return url
            .parse::<MySqlConnectOptions>()
            .map_err(|e| StorageError::InvalidUrl(e.to_string()));
    }

    let host = config
        .host
        .as_deref()
        .ok_or_else(|| StorageError::NotConfigured("DB_HOST not set".into()))?;
    let username = config
        .username
        .as_deref()
        .ok_or_else(|| StorageError::NotConfigured("DB_USER not set".into()))?;
    let database = config
        .database
        .as_deref()
        .ok_or_else(|| StorageError::NotConfigured("DB_NAME not set".into()))?;

    let mut options = MySqlConnectOptions::new()
        .host(host)
        .port(config.port)
        .username(username)
        .database(database);
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    Ok(options)
}

#[async_trait::async_trait]
impl HabitStore for MySqlHabitStore {
    async fn list_users_with_phone(&self) -> Result<Vec<User>, StorageError> {
        let rows = sqlx::query_as::<_, UserRow>(LIST_USERS_SQL)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn list_log_instants(
        &self,
        user_id: UserId,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<LogInstant>, StorageError> {
        let rows = sqlx::query_scalar::<_, NaiveDateTime>(LIST_LOGS_SQL)
            .bind(user_id)
            .bind(from.naive_utc())
            .bind(to.naive_utc())
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(LogInstant::from_naive_utc).collect())
    }

    fn backend_name(&self) -> &str {
        "mysql"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts_config() -> DatabaseConfig {
        DatabaseConfig {
            url: None,
            host: Some("db.internal".into()),
            port: 3307,
            username: Some("nudge".into()),
            password: Some("secret".into()),
            database: Some("habits".into()),
            max_connections: 2,
            acquire_timeout_secs: 1,
        }
    }

    #[test]
    fn options_from_parts() {
        let options = connect_options(&parts_config()).unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 3307);
        assert_eq!(options.get_username(), "nudge");
        assert_eq!(options.get_database(), Some("habits"));
    }

    #[test]
    fn url_takes_precedence_over_parts() {
        let mut config = parts_config();
        config.url = Some("mysql://other:pw@url-host:3306/otherdb".into());
        let options = connect_options(&config).unwrap();
        assert_eq!(options.get_host(), "url-host");
        assert_eq!(options.get_database(), Some("otherdb"));
    }

    #[test]
    fn malformed_url_is_rejected() {
        let mut config = parts_config();
        config.url = Some("not a url".into());
        assert!(matches!(
            connect_options(&config),
            Err(StorageError::InvalidUrl(_))
        ));
    }

    #[test]
    fn missing_parts_are_reported() {
        let mut config = parts_config();
        config.host = None;
        let err = connect_options(&config).unwrap_err();
        assert!(err.to_string().contains("DB_HOST"));
    }

    #[test]
    fn null_timezone_reads_as_empty() {
        let user = User::from(UserRow {
            id: 7,
            time_zone: None,
            phone_number: "+15550001111".into(),
        });
        assert_eq!(user.id, 7);
        assert_eq!(user.timezone, "");
    }

    #[tokio::test]
    async fn unreachable_database_fails_connect() {
        let mut config = parts_config();
        config.host = Some("127.0.0.1".into());
        config.port = 1;
        let result = MySqlHabitStore::connect(&config).await;
        assert!(matches!(result, Err(StorageError::Database(_))));
    }
}
