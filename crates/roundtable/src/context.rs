//! Builds the runtime context (HTTP client, cache, identity, timing)
//! from the config file layered with CLI flags.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use roundtable_api::{GdClient, Transport};
use roundtable_core::{SnapshotCache, Timing, UserId};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything a command handler needs to talk to the platform.
pub struct Context {
    pub client: Arc<GdClient>,
    pub cache: Arc<SnapshotCache>,
    pub user_id: UserId,
    pub timing: Timing,
}

pub fn build_context(global: &GlobalOpts) -> Result<Context, CliError> {
    let cfg = roundtable_config::load_config_or_default();

    let url_str = global
        .server
        .clone()
        .or_else(|| cfg.server.url.clone())
        .ok_or_else(|| CliError::NoServer {
            path: roundtable_config::config_path().display().to_string(),
        })?;
    let server_url: url::Url = url_str.parse().map_err(|e| CliError::Config {
        message: format!("invalid server URL: {e}"),
    })?;

    let user_raw = global
        .user
        .clone()
        .or_else(|| cfg.auth.user_id.clone())
        .ok_or(CliError::NoUser)?;
    let user_id = UserId::new(user_raw)?;

    let token = global
        .token
        .clone()
        .map(SecretString::from)
        .or_else(|| roundtable_config::resolve_token(&cfg.auth).ok());

    let timeout = global.timeout.or(Some(cfg.server.timeout));
    let transport = Transport {
        timeout: timeout.map(Duration::from_secs),
        bearer_token: token,
    };
    let client = Arc::new(GdClient::new(server_url, &transport)?);

    let cache_dir = cfg
        .cache
        .dir
        .clone()
        .or_else(SnapshotCache::default_dir)
        .unwrap_or_else(|| std::path::PathBuf::from(".roundtable-cache"));
    let cache = Arc::new(SnapshotCache::new(cache_dir));

    Ok(Context {
        client,
        cache,
        user_id,
        timing: cfg.timing.to_timing(),
    })
}
