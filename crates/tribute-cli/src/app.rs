//! Command handlers for the `tributes` binary.
//!
//! The `App` ties configuration, the owner token and the sync controller
//! together and renders results to stdout.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use tribute_core::models::{latest, newest_first, TributeRecord};
use tribute_core::utils::{format_timestamp, truncate_string};
use tribute_core::{
    ApiClient, CacheManager, ClientContext, Config, Offline, SyncController, SyncError,
    SyncSource,
};

use crate::cli::{ConfigCommand, ListCommand, SubmitCommand};

/// Message preview width in `--latest` mode
const PREVIEW_WIDTH: usize = 120;

const EMPTY_MESSAGE: &str = "No tributes yet. Be the first to share a memory.";

pub struct App {
    config: Config,
    endpoint_override: Option<String>,
    /// Cache-only controller; commands that need the backend build their own
    local: SyncController<Offline>,
    ctx: ClientContext,
}

impl App {
    pub fn new(config: Config, endpoint_override: Option<String>) -> Result<Self> {
        let data_dir = config.data_dir()?;
        let cache = CacheManager::new(data_dir)?;
        let ctx = ClientContext::load_or_create(&cache)?;
        debug!(data_dir = %cache.dir().display(), "Opened local store");

        Ok(Self {
            config,
            endpoint_override,
            local: SyncController::offline(cache),
            ctx,
        })
    }

    /// Build a controller against the configured backend
    fn controller(&self) -> Result<SyncController<ApiClient>> {
        let endpoint = self
            .config
            .resolve_endpoint(self.endpoint_override.as_deref())?;
        let api = ApiClient::new(&endpoint, self.config.request_timeout())?;
        let cache = CacheManager::new(self.local.cache().dir().to_path_buf())?;
        Ok(SyncController::new(api, cache))
    }

    // =========================================================================
    // Commands
    // =========================================================================

    pub async fn sync(&self) -> Result<()> {
        let controller = self.controller()?;
        let result = controller.bootstrap().await;

        match result.source {
            SyncSource::Remote => {
                println!("Synced {} tributes from the backend.", result.records.len());
            }
            SyncSource::Cache => {
                println!(
                    "Backend unreachable. Showing {} cached tributes (last synced {}).",
                    result.records.len(),
                    self.local.cache().last_synced()
                );
            }
        }
        Ok(())
    }

    pub fn list(&self, cmd: &ListCommand) -> Result<()> {
        let records = self.local.cached_tributes();
        let stdout = io::stdout();
        let mut out = stdout.lock();

        if cmd.json {
            let shown: Vec<&TributeRecord> = match cmd.latest_count() {
                Some(n) => latest(&records, n),
                None => newest_first(&records),
            };
            writeln!(out, "{}", serde_json::to_string_pretty(&shown)?)?;
            return Ok(());
        }

        render_list(&mut out, &records, &self.ctx, cmd.latest_count())?;
        let cache = self.local.cache();
        if cache.is_stale() && !records.is_empty() {
            writeln!(out, "(last synced {}; run `tributes sync` to refresh)", cache.last_synced())?;
        }
        Ok(())
    }

    pub async fn submit(&self, cmd: &SubmitCommand) -> Result<()> {
        let controller = self.controller()?;
        match controller
            .submit_tribute(&self.ctx, &cmd.name, &cmd.relation, &cmd.message)
            .await
        {
            Ok(id) => {
                println!("Thank you for sharing your tribute! (id: {})", id);
                Ok(())
            }
            Err(e @ SyncError::RemoteUnavailable(_)) => Err(anyhow::Error::new(e)
                .context("Make sure the backend is deployed and reachable")),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, id: &str, yes: bool) -> Result<()> {
        self.local.check_owner(&self.ctx, id)?;
        if !self.local.cached_tributes().iter().any(|r| r.id == id) {
            warn!(id = %id, "Tribute not in local cache, asking backend anyway");
        }

        if !yes && !confirm("Are you sure you want to delete your tribute?")? {
            println!("Cancelled.");
            return Ok(());
        }

        let controller = self.controller()?;
        if controller.delete_tribute(&self.ctx, id).await? {
            println!("Deleted tribute {}.", id);
        } else {
            println!(
                "Removed tribute {} locally; the backend did not confirm the delete.",
                id
            );
        }
        Ok(())
    }

    pub fn clear(&self, yes: bool) -> Result<()> {
        if !yes
            && !confirm("This will clear all tributes stored locally on your device. Continue?")?
        {
            println!("Cancelled.");
            return Ok(());
        }
        self.local.clear_local_cache()?;
        println!("Local tribute cache cleared.");
        Ok(())
    }

    pub fn whoami(&self) {
        println!("Owner token:    {}", self.ctx.token());
        let cache = self.local.cache();
        println!("Data directory: {}", cache.dir().display());
        println!("Last synced:    {}", cache.last_synced());
    }
}

/// Config commands run before any store is opened.
pub fn handle_config(mut config: Config, cmd: &ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            println!("Config file:  {}", Config::config_path()?.display());
            println!(
                "Endpoint:     {}",
                config.resolve_endpoint(None).unwrap_or_else(|_| "(not set)".to_string())
            );
            println!("Timeout:      {}s", config.request_timeout().as_secs());
            println!("Data dir:     {}", config.data_dir()?.display());
        }
        ConfigCommand::SetEndpoint { url } => {
            // Validate before saving
            ApiClient::new(url, config.request_timeout())?;
            config.endpoint = Some(url.clone());
            config.save().context("Failed to save config")?;
            println!("Endpoint saved.");
        }
    }
    Ok(())
}

/// Render tributes newest first. With `limit`, only the most recent are shown
/// with a one-line preview, followed by a pointer to the full list.
pub fn render_list<W: Write>(
    out: &mut W,
    records: &[TributeRecord],
    ctx: &ClientContext,
    limit: Option<usize>,
) -> io::Result<()> {
    if records.is_empty() {
        writeln!(out, "{}", EMPTY_MESSAGE)?;
        return Ok(());
    }

    let shown = match limit {
        Some(n) => latest(records, n),
        None => newest_first(records),
    };

    for record in &shown {
        let mut header = record.heading();
        let date = format_timestamp(record.ts);
        if !date.is_empty() {
            header.push_str(" - ");
            header.push_str(&date);
        }
        if ctx.owns(record) {
            header.push_str("  [yours]");
        }
        writeln!(out, "{}  (id: {})", header, record.id)?;

        let message = if limit.is_some() {
            truncate_string(&record.message, PREVIEW_WIDTH)
        } else {
            record.message.clone()
        };
        for line in message.lines() {
            writeln!(out, "    {}", line)?;
        }
        writeln!(out)?;
    }

    if !shown.is_empty() && shown.len() < records.len() {
        writeln!(out, "See all {} tributes with `tributes list`.", records.len())?;
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribute_core::OwnerToken;

    fn record(id: &str, owner: &str, message: &str) -> TributeRecord {
        TributeRecord {
            id: id.to_string(),
            name: "Ann".to_string(),
            relation: "Sister".to_string(),
            message: message.to_string(),
            ts: 0,
            owner: owner.to_string(),
        }
    }

    fn render(records: &[TributeRecord], limit: Option<usize>) -> String {
        let ctx = ClientContext::new(OwnerToken::from("me"));
        let mut out = Vec::new();
        render_list(&mut out, records, &ctx, limit).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&[], None).trim(), EMPTY_MESSAGE);
    }

    #[test]
    fn test_render_marks_own_tributes_newest_first() {
        let records = vec![
            record("1", "someone", "First message here"),
            record("2", "me", "Second message here"),
        ];
        let output = render(&records, None);

        let second = output.find("(id: 2)").unwrap();
        let first = output.find("(id: 1)").unwrap();
        assert!(second < first);
        assert!(output.contains("Ann (Sister)  [yours]  (id: 2)"));
        assert!(output.contains("Ann (Sister)  (id: 1)"));
        assert!(!output.contains("See all"));
    }

    #[test]
    fn test_render_latest_points_to_full_list() {
        let records: Vec<TributeRecord> = (0..6)
            .map(|i| record(&i.to_string(), "x", "A long remembered message"))
            .collect();
        let output = render(&records, Some(4));

        assert!(output.contains("(id: 5)"));
        assert!(output.contains("(id: 2)"));
        assert!(!output.contains("(id: 1)"));
        assert!(output.contains("See all 6 tributes"));
    }

    #[test]
    fn test_render_latest_truncates_long_messages() {
        let long = "m".repeat(300);
        let output = render(&[record("1", "x", &long)], Some(4));
        assert!(output.contains(&format!("{}...", "m".repeat(117))));
        assert!(!output.contains(&long));
    }

    #[test]
    fn test_render_zero_limit_has_no_footer() {
        let records = vec![record("1", "x", "A long remembered message")];
        let output = render(&records, Some(0));
        assert!(!output.contains("(id: 1)"));
        assert!(!output.contains("See all"));
    }
}
