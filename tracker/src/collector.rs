use std::path::PathBuf;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;

use crate::config::Config;
use crate::error::CollectError;
use crate::graphql::{self, MatchedUser};
use crate::history::{self, MergeOutcome};
use crate::models::HistoryEntry;

/// Result of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub path: PathBuf,
    pub total: usize,
    pub outcome: MergeOutcome,
}

/// Fetches today's snapshot and folds it into the history file.
///
/// Runs are expected to be serialized by whatever schedules them; the file is
/// not locked.
pub struct Collector {
    config: Config,
    client: Client,
}

impl Collector {
    pub fn new(config: Config) -> Result<Self, CollectError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("rank-tracker/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CollectError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run(&self) -> Result<RunReport, CollectError> {
        tracing::info!("fetching data for user: {}", self.config.username);

        // Nothing on disk is touched unless the query succeeds
        let user =
            graphql::fetch_profile(&self.client, &self.config.endpoint, &self.config.username)
                .await?;

        self.record(user, Utc::now()).await
    }

    /// Merge a fetched profile into the history file as the snapshot for
    /// `now`'s UTC day.
    pub async fn record(
        &self,
        user: MatchedUser,
        now: DateTime<Utc>,
    ) -> Result<RunReport, CollectError> {
        let path = &self.config.output;

        let mut entries = match history::load_history(path).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("could not read existing history, starting fresh: {}", e);
                Vec::new()
            }
        };

        let record = serde_json::to_value(snapshot(user, now)).map_err(|e| {
            CollectError::HistoryWrite {
                path: path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            }
        })?;

        let outcome = history::merge_entry(&mut entries, record, now);
        history::save_history(path, &entries).await?;

        tracing::info!(
            "saved {} ({} records)",
            path.display(),
            entries.len()
        );

        Ok(RunReport {
            path: path.clone(),
            total: entries.len(),
            outcome,
        })
    }
}

/// Build the stored entry for a fetched profile. Stats are kept exactly as
/// returned.
pub fn snapshot(user: MatchedUser, now: DateTime<Utc>) -> HistoryEntry {
    HistoryEntry {
        timestamp: Some(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
        username: user.username,
        ranking: user.profile.ranking,
        real_name: user.profile.real_name,
        avatar: user.profile.user_avatar,
        stats: user.submit_stats.ac_submission_num,
        last_updated: None,
    }
}
