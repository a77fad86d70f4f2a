//! Idle hunting loop.
//!
//! Each hunting session owns one tokio task that resolves a hunt every
//! interval. Stopping is cancel-then-drain: the stop signal is only observed
//! between ticks and the caller waits for the task to exit, so nothing is
//! emitted for a session once `stop` has returned.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use idle_shared::{HuntReport, ServerMessage};

use crate::combat::{self, entropy_source, RngSource};
use crate::entities::CharacterId;
use crate::error::{GameError, Result};
use crate::locks::CharacterLocks;
use crate::persistence::{GameStore, HuntingLogEntry};
use crate::progression;
use crate::session::{EventSender, SessionId};

// =============================================================================
// Single Tick
// =============================================================================

/// Resolve, apply and persist one hunt for a character.
///
/// Runs under the character's lock and always starts from the stored record,
/// so a tick whose progress write failed leaves nothing behind to re-apply.
/// Inventory and log writes are best effort once progress is committed; a
/// drop that could not be stored is left out of the report and the log.
pub async fn hunt_tick<R: Rng + ?Sized>(
    store: &dyn GameStore,
    locks: &CharacterLocks,
    character_id: CharacterId,
    rng: &mut R,
) -> Result<HuntReport> {
    let _guard = locks.lock(character_id).await;

    let mut character = store
        .load_character_for_update(character_id)
        .await?
        .ok_or(GameError::CharacterNotFound(character_id))?;

    let mut outcome = combat::resolve_hunt(&character, rng)?;
    let applied = progression::apply_hunt_result(&mut character, &outcome);

    if outcome.success {
        store.update_character_progress(character.id, &character.progress()).await?;

        if let Some(item) = &applied.new_item {
            match store.insert_inventory_item(item).await {
                Ok(()) => {
                    if let Some(drop) = &outcome.drop {
                        info!("Character '{}' found {} item {}", character.name, drop.rarity.name(), drop.name);
                    }
                }
                Err(e) => {
                    warn!("Failed to store {} for character {}: {}", item.name, character.id, e);
                    outcome.forfeit_drop();
                }
            }
        }

        let entry = HuntingLogEntry {
            character_id: character.id,
            monster: outcome.monster.to_string(),
            experience_gained: outcome.exp_gained,
            zen_gained: outcome.zen_gained,
            item_found: outcome.drop.map(|d| d.name.to_string()),
        };
        if let Err(e) = store.append_hunting_log(&entry).await {
            warn!("Failed to log hunt for character {}: {}", character.id, e);
        }

        if applied.leveled_up() {
            info!("Character '{}' reached level {}", character.name, character.level);
        }
    }

    Ok(HuntReport {
        success: outcome.success,
        monster: outcome.monster.to_string(),
        exp_gained: outcome.exp_gained,
        zen_gained: outcome.zen_gained,
        item_found: outcome.drop.map(|d| d.name.to_string()),
        item_rarity: outcome.drop.map(|d| d.rarity),
        level_up: applied.leveled_up(),
        new_level: applied.leveled_up().then_some(character.level),
        message: outcome.message,
        character: character.progress(),
    })
}

// =============================================================================
// Controller
// =============================================================================

struct HuntHandle {
    character_id: CharacterId,
    stop_tx: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl HuntHandle {
    /// Signal the task and wait for it to finish its current tick
    async fn stop(self) {
        let _ = self.stop_tx.send(());
        if let Err(e) = self.task.await {
            warn!("Hunting task for character {} ended abnormally: {}", self.character_id, e);
        }
    }
}

/// Owns the hunting task of every session
pub struct HuntingController {
    store: Arc<dyn GameStore>,
    locks: Arc<CharacterLocks>,
    interval: Duration,
    rng_source: RngSource,
    hunts: Mutex<HashMap<SessionId, HuntHandle>>,
}

impl HuntingController {
    pub fn new(store: Arc<dyn GameStore>, locks: Arc<CharacterLocks>, interval: Duration) -> Self {
        Self {
            store,
            locks,
            interval,
            rng_source: entropy_source(),
            hunts: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the random source handed to new hunting tasks
    #[cfg(test)]
    pub fn with_rng_source(mut self, rng_source: RngSource) -> Self {
        self.rng_source = rng_source;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start hunting for `session`, replacing any loop it already runs.
    ///
    /// The first tick fires one interval after this returns.
    pub async fn start(&self, session: SessionId, character_id: CharacterId, events: EventSender) -> Result<()> {
        let mut hunts = self.hunts.lock().await;

        if let Some(previous) = hunts.remove(&session) {
            debug!("Session {} restarts hunting, stopping previous loop", session);
            previous.stop().await;
        }

        if self.store.get_character(character_id).await?.is_none() {
            return Err(GameError::CharacterNotFound(character_id));
        }

        let (stop_tx, stop_rx) = oneshot::channel();
        let task = tokio::spawn(run_hunt(
            Arc::clone(&self.store),
            Arc::clone(&self.locks),
            character_id,
            events,
            stop_rx,
            self.interval,
            (self.rng_source)(),
        ));

        hunts.insert(session, HuntHandle { character_id, stop_tx, task });
        info!("Session {} started hunting with character {}", session, character_id);
        Ok(())
    }

    /// Stop the loop for `session`. Returns false if it was not hunting.
    pub async fn stop(&self, session: SessionId) -> bool {
        let handle = self.hunts.lock().await.remove(&session);
        match handle {
            Some(handle) => {
                let character_id = handle.character_id;
                handle.stop().await;
                info!("Session {} stopped hunting with character {}", session, character_id);
                true
            }
            None => false,
        }
    }

    pub async fn is_hunting(&self, session: SessionId) -> bool {
        self.hunts
            .lock()
            .await
            .get(&session)
            .is_some_and(|h| !h.task.is_finished())
    }

    /// Stop every loop and wait for all of them
    pub async fn stop_all(&self) {
        let handles: Vec<HuntHandle> = self.hunts.lock().await.drain().map(|(_, h)| h).collect();
        let count = handles.len();
        futures::future::join_all(handles.into_iter().map(HuntHandle::stop)).await;
        if count > 0 {
            info!("Stopped {} hunting loops", count);
        }
    }
}

async fn run_hunt<R: Rng + Send>(
    store: Arc<dyn GameStore>,
    locks: Arc<CharacterLocks>,
    character_id: CharacterId,
    events: EventSender,
    mut stop_rx: oneshot::Receiver<()>,
    interval: Duration,
    mut rng: R,
) {
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            _ = &mut stop_rx => break,

            _ = ticker.tick() => {
                match hunt_tick(store.as_ref(), &locks, character_id, &mut rng).await {
                    Ok(report) => {
                        debug!("Character {}: {}", character_id, report.message);
                        if events.send(ServerMessage::HuntResult(report)).is_err() {
                            debug!("Event channel for character {} closed, ending hunt", character_id);
                            break;
                        }
                    }
                    Err(GameError::NoEligibleTarget { map, level }) => {
                        debug!("No monster on {} for level {}, waiting for next tick", map, level);
                    }
                    Err(GameError::CharacterNotFound(id)) => {
                        warn!("Character {} vanished while hunting", id);
                        let _ = events.send(ServerMessage::HuntingFailed {
                            reason: format!("character {} not found", id),
                        });
                        break;
                    }
                    Err(e) => {
                        warn!("Hunting tick for character {} failed: {}", character_id, e);
                    }
                }
            }
        }
    }
}
