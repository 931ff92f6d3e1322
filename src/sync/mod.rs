//! Best-effort mirroring of day records to a remote backend. The local store
//! is authoritative; the remote copy is an upsert keyed by `(user_id, log_date)`
//! and a failed or hung mirror never affects local usability.

use std::{env, sync::Arc};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{header, Client};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{diary::entities::DayRecord, utils::time::date_key};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteSync: Send + Sync + 'static {
    async fn upsert_day(&self, date: NaiveDate, record: &DayRecord) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct RemoteConfig {
    pub base_url: String,
    pub api_key: String,
    pub user_id: String,
}

impl RemoteConfig {
    /// Mirroring is opt-in: absent configuration simply disables it.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            base_url: env::var("DAYLOG_REMOTE_URL").ok()?,
            api_key: env::var("DAYLOG_REMOTE_KEY").ok()?,
            user_id: env::var("DAYLOG_USER_ID").ok()?,
        })
    }
}

/// Wire shape of one mirrored day in the remote `daily_logs` table. The record
/// itself travels as an opaque `log_data` blob.
#[derive(Serialize)]
struct DailyLogRow<'a> {
    user_id: &'a str,
    log_date: String,
    log_data: &'a DayRecord,
}

pub struct RemoteClient {
    client: Client,
    config: RemoteConfig,
}

impl RemoteClient {
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert("apikey", header::HeaderValue::from_str(&config.api_key)?);
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))?,
        );
        headers.insert(
            "Prefer",
            header::HeaderValue::from_static("resolution=merge-duplicates"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl RemoteSync for RemoteClient {
    async fn upsert_day(&self, date: NaiveDate, record: &DayRecord) -> Result<()> {
        let url = format!(
            "{}/rest/v1/daily_logs",
            self.config.base_url.trim_end_matches('/')
        );
        let row = DailyLogRow {
            user_id: &self.config.user_id,
            log_date: date_key(date),
            log_data: record,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("on_conflict", "user_id,log_date")])
            .json(&row)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown API error".to_string());
            return Err(anyhow!("Remote upsert failed with {status}: {body}"));
        }

        Ok(())
    }
}

/// Fires a detached mirror of `record` after a successful local save. Errors
/// are logged at warn and swallowed.
pub fn spawn_mirror(
    remote: Arc<dyn RemoteSync>,
    date: NaiveDate,
    record: DayRecord,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match remote.upsert_day(date, &record).await {
            Ok(()) => debug!("Mirrored day {date} to remote"),
            Err(e) => warn!("Failed to mirror day {date} to remote: {e:#}"),
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::anyhow;
    use chrono::NaiveDate;

    use crate::diary::entities::{DayRecord, FoodEntry};

    use super::{spawn_mirror, DailyLogRow, MockRemoteSync};

    #[test]
    fn daily_log_row_carries_conflict_key_and_blob() {
        let mut record = DayRecord::default();
        record.water = 4;
        record.dinner.push(FoodEntry {
            name: "koshari".into(),
            calories: 600.0,
            p: 15.0,
            c: 110.0,
            f: 10.0,
            fib: 8.0,
            sug: 6.0,
            sod: 900.0,
            image_url: None,
        });

        let row = DailyLogRow {
            user_id: "user-1",
            log_date: "2024-01-01".into(),
            log_data: &record,
        };

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["user_id"], "user-1");
        assert_eq!(value["log_date"], "2024-01-01");
        assert_eq!(value["log_data"]["water"], 4);
        assert_eq!(value["log_data"]["dinner"][0]["name"], "koshari");
    }

    #[tokio::test]
    async fn mirror_failure_is_swallowed() {
        let mut remote = MockRemoteSync::new();
        remote
            .expect_upsert_day()
            .times(1)
            .returning(|_, _| Err(anyhow!("offline")));

        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let handle = spawn_mirror(Arc::new(remote), date, DayRecord::default());

        // The detached task finishes cleanly even though the upsert failed.
        handle.await.unwrap();
    }
}
