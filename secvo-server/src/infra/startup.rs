use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::infra::app_state::AppState;

const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(300);

#[async_trait]
pub trait StartupHooks: Send + Sync {
    async fn run(&self, state: &AppState) -> Result<()>;
}

/// Starts the background maintenance loops: the stale-scan recovery sweep
/// and expired-session purging.
#[derive(Debug, Default)]
pub struct ProdStartupHooks;

#[async_trait]
impl StartupHooks for ProdStartupHooks {
    async fn run(&self, state: &AppState) -> Result<()> {
        if let Some(period) = state.config.processor.sweep_interval() {
            let dispatcher = state.dispatcher.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                loop {
                    interval.tick().await;
                    match dispatcher.sweep_stale().await {
                        Ok(count) => debug!(count, "stale scan sweep finished"),
                        Err(err) => {
                            warn!(error = %err, "stale scan sweep failed")
                        }
                    }
                }
            });
            info!(?period, "stale scan sweep enabled");
        } else {
            info!("stale scan sweep disabled");
        }

        let auth = state.auth.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
            loop {
                interval.tick().await;
                match auth.purge_expired_sessions(Utc::now()).await {
                    Ok(purged) => debug!(purged, "expired sessions purged"),
                    Err(err) => {
                        warn!(error = %err, "session purge failed")
                    }
                }
            }
        });

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct NoopStartupHooks;

#[async_trait]
impl StartupHooks for NoopStartupHooks {
    async fn run(&self, _state: &AppState) -> Result<()> {
        Ok(())
    }
}
