use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, Semaphore};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use action_applier::{ActionApplier, ApplyOutcome};
use calmfeed_core_types::{ContentEntity, NodeId};
use decision_engine::DecisionEngine;
use dom_port::{Document, HostContext};
use site_adapters::SiteAdapterRegistry;

use crate::error::SchedulerError;
use crate::events::ModerationEvent;
use crate::metrics;
use crate::model::{CycleReport, DecisionOutcome, SchedulerConfig};
use crate::seen_set::SeenSet;

const EVENT_CAPACITY: usize = 256;

/// Drives extraction, dispatches decisions and applies their outcomes.
///
/// The document and the [`SeenSet`] are only touched from whichever task
/// drives the scheduler; spawned tasks do nothing but score text.
pub struct Scheduler {
    core: SchedulerCore,
    outcomes: mpsc::UnboundedReceiver<DecisionOutcome>,
}

struct SchedulerCore {
    registry: Arc<SiteAdapterRegistry>,
    engine: Arc<DecisionEngine>,
    applier: Arc<dyn ActionApplier>,
    document: Arc<dyn Document>,
    host: Arc<dyn HostContext>,
    config: SchedulerConfig,
    seen: SeenSet,
    in_flight: HashSet<NodeId>,
    slots: Arc<Semaphore>,
    outcome_tx: mpsc::UnboundedSender<DecisionOutcome>,
    events: broadcast::Sender<ModerationEvent>,
}

impl Scheduler {
    pub fn new(
        registry: Arc<SiteAdapterRegistry>,
        engine: Arc<DecisionEngine>,
        applier: Arc<dyn ActionApplier>,
        document: Arc<dyn Document>,
        host: Arc<dyn HostContext>,
        config: SchedulerConfig,
    ) -> Result<Self, SchedulerError> {
        if config.max_in_flight == 0 {
            return Err(SchedulerError::InvalidConfig(
                "max_in_flight must be at least 1".into(),
            ));
        }
        if config.interval.is_zero() {
            return Err(SchedulerError::InvalidConfig(
                "interval must be non-zero".into(),
            ));
        }
        let (outcome_tx, outcomes) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let slots = Arc::new(Semaphore::new(config.max_in_flight));
        Ok(Self {
            core: SchedulerCore {
                registry,
                engine,
                applier,
                document,
                host,
                config,
                seen: SeenSet::new(),
                in_flight: HashSet::new(),
                slots,
                outcome_tx,
                events,
            },
            outcomes,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.core.config
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ModerationEvent> {
        self.core.events.subscribe()
    }

    pub fn seen(&self) -> &SeenSet {
        &self.core.seen
    }

    pub fn in_flight(&self) -> usize {
        self.core.in_flight.len()
    }

    /// One extraction pass. Returns as soon as decisions are dispatched.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run_cycle(&mut self) -> CycleReport {
        self.core.run_cycle()
    }

    /// Applies a finished decision to its node.
    pub fn apply_outcome(&mut self, outcome: DecisionOutcome) -> Option<ApplyOutcome> {
        self.core.apply_outcome(outcome)
    }

    /// Waits for every dispatched decision and applies it. Returns how many
    /// outcomes were applied.
    pub async fn settle(&mut self) -> usize {
        let mut applied = 0;
        while !self.core.in_flight.is_empty() {
            match self.outcomes.recv().await {
                Some(outcome) => {
                    self.core.apply_outcome(outcome);
                    applied += 1;
                }
                None => break,
            }
        }
        applied
    }

    /// Runs cycles on the configured interval until `shutdown` fires. The
    /// first cycle starts immediately.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        let core = &mut self.core;
        let outcomes = &mut self.outcomes;
        let mut ticker = tokio::time::interval(core.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(
            interval_ms = core.config.interval.as_millis() as u64,
            max_in_flight = core.config.max_in_flight,
            "scheduler started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!(in_flight = core.in_flight.len(), "scheduler stopping");
                    break;
                }
                Some(outcome) = outcomes.recv() => {
                    core.apply_outcome(outcome);
                }
                _ = ticker.tick() => {
                    let report = core.run_cycle();
                    debug!(
                        extracted = report.extracted,
                        skipped = report.skipped,
                        dispatched = report.dispatched,
                        "cycle finished"
                    );
                }
            }
        }
    }
}

impl SchedulerCore {
    fn run_cycle(&mut self) -> CycleReport {
        let document = Arc::clone(&self.document);
        let pruned = self.seen.prune(|node| document.is_attached(node));
        if pruned > 0 {
            debug!(pruned, "dropped detached nodes from seen set");
        }

        let host = self.host.host();
        let entities = self.registry.extract(&host, document.as_ref());
        let mut report = CycleReport {
            extracted: entities.len(),
            ..CycleReport::default()
        };

        for entity in entities {
            if self.seen.is_resolved_allow(entity.node) || self.in_flight.contains(&entity.node) {
                report.skipped += 1;
                continue;
            }
            debug!(
                node = %entity.node,
                user_id = %entity.author.user_id,
                user_name = %entity.author.user_name,
                "dispatching decision"
            );
            self.dispatch(entity);
            report.dispatched += 1;
        }

        metrics::record_cycle(report.extracted, report.skipped);
        report
    }

    fn dispatch(&mut self, entity: ContentEntity) {
        self.in_flight.insert(entity.node);
        metrics::record_dispatched();

        let engine = Arc::clone(&self.engine);
        let slots = Arc::clone(&self.slots);
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            // Never closed.
            let _permit = slots.acquire_owned().await.ok();
            let verdict = engine.decide(&entity).await;
            if tx.send(DecisionOutcome { entity, verdict }).is_err() {
                debug!("scheduler dropped before decision completed");
            }
        });
    }

    fn apply_outcome(&mut self, outcome: DecisionOutcome) -> Option<ApplyOutcome> {
        let DecisionOutcome { entity, verdict } = outcome;
        self.in_flight.remove(&entity.node);
        metrics::record_verdict(&verdict);

        let applied = match self
            .applier
            .apply(self.document.as_ref(), &entity, &verdict)
        {
            Ok(applied) => {
                if verdict.is_allow() && verdict.is_measured() {
                    self.seen.record_allow(entity.node);
                }
                Some(applied)
            }
            Err(err) if err.is_benign() => {
                debug!(node = %entity.node, "skipping outcome: {err}");
                None
            }
            Err(err) => {
                metrics::record_apply_failure();
                warn!(node = %entity.node, verdict = %verdict, "apply failed: {err}");
                None
            }
        };

        let event = ModerationEvent {
            node: entity.node,
            author: entity.author,
            verdict,
            applied,
        };
        // No subscribers is the normal case outside the CLI.
        let _ = self.events.send(event);
        applied
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.core.config)
            .field("seen", &self.core.seen.len())
            .field("in_flight", &self.core.in_flight.len())
            .finish()
    }
}
