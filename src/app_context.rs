//! Wiring from a resolved policy to a runnable moderation loop.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use action_applier::StyleSuppressor;
use calmfeed_policy_center::PolicyView;
use calmfeed_scheduler::{Scheduler, SchedulerConfig};
use decision_engine::{DecisionEngine, Lexicon, LexiconScorer};
use dom_port::{MemoryDocument, StaticHost};
use site_adapters::SiteAdapterRegistry;

/// A scheduler bound to an in-memory document.
pub struct ModerationContext {
    pub document: Arc<MemoryDocument>,
    pub scheduler: Scheduler,
    pub policy: PolicyView,
}

impl ModerationContext {
    pub fn new(
        policy: PolicyView,
        document: MemoryDocument,
        host: &str,
        lexicon: Option<&Path>,
    ) -> Result<Self> {
        let engine = Arc::new(build_engine(&policy, lexicon)?);
        let registry =
            Arc::new(SiteAdapterRegistry::with_defaults().context("Failed to build site adapters")?);
        let applier = Arc::new(StyleSuppressor::new(
            policy.actions.suppression_filter.clone(),
        ));
        let document = Arc::new(document);
        let config = SchedulerConfig {
            interval: policy.interval(),
            max_in_flight: policy.scheduler.max_in_flight,
        };
        let scheduler = Scheduler::new(
            registry,
            engine,
            applier,
            document.clone(),
            Arc::new(StaticHost::new(host)),
            config,
        )
        .context("Failed to build scheduler")?;
        Ok(Self {
            document,
            scheduler,
            policy,
        })
    }

    pub async fn from_html_file(
        policy: PolicyView,
        html: &Path,
        host: &str,
        lexicon: Option<&Path>,
    ) -> Result<Self> {
        let document = load_document(html).await?;
        Self::new(policy, document, host, lexicon)
    }
}

pub fn build_engine(policy: &PolicyView, lexicon: Option<&Path>) -> Result<DecisionEngine> {
    let lexicon = match lexicon {
        Some(path) => {
            let loaded = Lexicon::load(path)
                .with_context(|| format!("Failed to load lexicon {}", path.display()))?;
            info!(path = %path.display(), words = loaded.len(), "loaded lexicon");
            loaded
        }
        None => Lexicon::builtin(),
    };
    Ok(DecisionEngine::with_config(
        Arc::new(LexiconScorer::new(lexicon)),
        policy.decision_config(),
    ))
}

pub async fn load_document(path: &Path) -> Result<MemoryDocument> {
    let html = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(MemoryDocument::from_html(&html))
}
