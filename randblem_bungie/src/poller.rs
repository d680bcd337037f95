use std::time::{Duration, Instant};

use rand::{SeedableRng, rngs::SmallRng};
use randblem_core::{
    EMBLEM_BUCKET_HASH, EmblemEvent, EmblemEventSink, EquippedEmblem, Identity, OrbitWatermark,
    is_new_orbit_entry, select_random_emblem, time::Timestamp,
};
use tokio::{sync::watch, time::sleep};

use crate::{
    BungieError, BungieResult,
    client::EquipRequest,
    clock::{Clock, SystemClock},
    destiny_client::DestinyClient,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub failure_backoff_initial: Duration,
    pub failure_backoff_max: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            failure_backoff_initial: Duration::from_secs(5),
            failure_backoff_max: Duration::from_secs(60),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PollMetrics {
    pub last_success_at: Option<Timestamp>,
    pub last_poll_latency: Option<Duration>,
    pub equips: u64,
}

#[derive(Debug)]
pub enum PollOutcome {
    /// Nothing to do: not in orbit, or still in an orbit entry already handled.
    Idle,
    Equipped(EquippedEmblem),
    Failed(BungieError),
}

/// Polls the account and equips a random emblem each time the most recently
/// played character enters orbit.
pub struct EmblemPoller<C, S, T = SystemClock>
where
    C: DestinyClient + Send,
    S: EmblemEventSink + Send + Sync,
    <S as EmblemEventSink>::Error: std::fmt::Display,
    T: Clock + Send + Sync,
{
    client: C,
    sink: S,
    clock: T,
    config: PollConfig,
    identity: Option<Identity>,
    watermark: OrbitWatermark,
    consecutive_failures: u32,
    metrics: PollMetrics,
    rng: SmallRng,
}

impl<C, S> EmblemPoller<C, S, SystemClock>
where
    C: DestinyClient + Send,
    S: EmblemEventSink + Send + Sync,
    <S as EmblemEventSink>::Error: std::fmt::Display,
{
    pub fn new(client: C, sink: S, config: PollConfig) -> Self {
        Self::with_clock(client, sink, config, SystemClock)
    }
}

impl<C, S, T> EmblemPoller<C, S, T>
where
    C: DestinyClient + Send,
    S: EmblemEventSink + Send + Sync,
    <S as EmblemEventSink>::Error: std::fmt::Display,
    T: Clock + Send + Sync,
{
    pub fn with_clock(client: C, sink: S, config: PollConfig, clock: T) -> Self {
        Self {
            client,
            sink,
            clock,
            config,
            identity: None,
            watermark: OrbitWatermark::default(),
            consecutive_failures: 0,
            metrics: PollMetrics::default(),
            rng: SmallRng::from_entropy(),
        }
    }

    /// Makes emblem selection reproducible.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn watermark(&self) -> OrbitWatermark {
        self.watermark
    }

    pub fn metrics(&self) -> PollMetrics {
        self.metrics.clone()
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Runs poll cycles until `shutdown_rx` turns true or its sender is
    /// dropped. A failed cycle only delays the next one.
    pub async fn run_until_shutdown(&mut self, mut shutdown_rx: watch::Receiver<bool>) {
        log::debug!(
            "emblem poller starting with interval {:?}",
            self.config.interval
        );
        loop {
            if *shutdown_rx.borrow() {
                log::debug!("emblem poller received shutdown before poll");
                return;
            }

            let outcome = {
                let cycle = self.poll_once();
                tokio::pin!(cycle);
                loop {
                    tokio::select! {
                        outcome = &mut cycle => break outcome,
                        changed = shutdown_rx.changed() => {
                            if shutdown_signaled(changed, &shutdown_rx) {
                                log::debug!("emblem poller cancelled during poll");
                                return;
                            }
                        }
                    }
                }
            };

            let wait = self.next_delay();
            match outcome {
                PollOutcome::Idle => {}
                PollOutcome::Equipped(equipped) => {
                    log::info!(
                        "equipped emblem {} on character {}",
                        equipped.item_instance_id,
                        equipped.character_id
                    );
                }
                PollOutcome::Failed(err @ BungieError::NoEmblemsFound { .. }) => {
                    log::warn!("{err}");
                }
                PollOutcome::Failed(err) => {
                    log::error!(
                        "poll cycle failed (consecutive failures: {}, retry in {:?}): {:?}",
                        self.consecutive_failures,
                        wait,
                        err.display_chain()
                    );
                }
            }

            tokio::select! {
                _ = sleep(wait) => {}
                changed = shutdown_rx.changed() => {
                    if shutdown_signaled(changed, &shutdown_rx) {
                        log::debug!("emblem poller cancelled while waiting");
                        return;
                    }
                }
            }
        }
    }

    pub async fn poll_once(&mut self) -> PollOutcome {
        log::trace!("starting poll cycle");
        let started = Instant::now();

        let outcome = match self.run_cycle().await {
            Ok(Some(equipped)) => PollOutcome::Equipped(equipped),
            Ok(None) => PollOutcome::Idle,
            Err(err) => {
                self.record_failure(&err);
                return PollOutcome::Failed(err);
            }
        };

        self.record_success(started.elapsed(), self.clock.now());
        outcome
    }

    async fn run_cycle(&mut self) -> BungieResult<Option<EquippedEmblem>> {
        let identity = self.resolve_identity().await?;
        let profile = self.client.fetch_profile(identity).await?;

        let character_id = profile
            .most_recent_character()
            .map(|character| character.character_id)
            .ok_or_else(|| BungieError::malformed("profile", "account has no characters"))?;

        let decision = is_new_orbit_entry(&profile.activities, character_id, self.watermark);
        if !decision.trigger {
            log::trace!("character {character_id} has no new orbit entry");
            return Ok(None);
        }

        // Advanced before equipping so a failed equip is not retried for the
        // same orbit entry.
        self.watermark = decision.watermark;
        let orbit_entered_at = decision.watermark.timestamp();
        log::info!("character {character_id} entered orbit at {orbit_entered_at}");
        self.emit(EmblemEvent::OrbitEntered {
            character_id,
            activity_started_at: orbit_entered_at,
        })
        .await;

        let inventory = profile.inventory_for(character_id).unwrap_or_default();
        let item_instance_id = select_random_emblem(inventory, EMBLEM_BUCKET_HASH, &mut self.rng)
            .map_err(|_| BungieError::NoEmblemsFound { character_id })?;
        log::debug!("selected emblem {item_instance_id} for character {character_id}");

        self.client
            .equip_item(EquipRequest {
                character_id,
                item_instance_id,
                membership_type: identity.membership_type,
            })
            .await?;

        let equipped = EquippedEmblem {
            character_id,
            item_instance_id,
            membership_type: identity.membership_type,
            orbit_entered_at,
        };
        self.metrics.equips = self.metrics.equips.saturating_add(1);
        self.emit(EmblemEvent::EmblemEquipped(equipped.clone())).await;
        Ok(Some(equipped))
    }

    async fn resolve_identity(&mut self) -> BungieResult<Identity> {
        if let Some(identity) = self.identity {
            return Ok(identity);
        }

        let identity = self.client.resolve_identity().await?;
        log::info!(
            "resolved membership {} on platform {}",
            identity.membership_id,
            identity.membership_type
        );
        self.identity = Some(identity);
        Ok(identity)
    }

    async fn emit(&self, event: EmblemEvent) {
        if let Err(err) = self.sink.emit(event).await {
            log::warn!("failed to emit emblem event: {err}");
        }
    }

    fn record_success(&mut self, latency: Duration, observed_at: Timestamp) {
        self.consecutive_failures = 0;
        self.metrics.last_success_at = Some(observed_at);
        self.metrics.last_poll_latency = Some(latency);
    }

    fn record_failure(&mut self, err: &BungieError) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if matches!(err, BungieError::NotAuthenticated { .. }) {
            self.identity = None;
        }
    }

    fn next_delay(&self) -> Duration {
        if self.consecutive_failures == 0 {
            return self.config.interval;
        }

        exponential_backoff(
            self.consecutive_failures,
            self.config.failure_backoff_initial,
            self.config.failure_backoff_max,
        )
        .max(self.config.interval)
    }
}

fn shutdown_signaled(
    changed: Result<(), watch::error::RecvError>,
    shutdown_rx: &watch::Receiver<bool>,
) -> bool {
    changed.is_err() || *shutdown_rx.borrow()
}

fn exponential_backoff(attempts: u32, initial: Duration, max: Duration) -> Duration {
    let exponent = attempts.saturating_sub(1).min(31);
    let factor = 1_u128 << exponent;
    let initial_ms = initial.as_millis();
    let max_ms = max.as_millis();
    let backoff_ms = initial_ms.saturating_mul(factor).min(max_ms);
    Duration::from_millis(u64::try_from(backoff_ms).unwrap_or(u64::MAX))
}
