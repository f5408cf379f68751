//! The Advance Engine.
//!
//! Orchestrates one protocol step: validate the command against the
//! traversal, resolve content from the provider under a timeout, fold the
//! batch into a staged copy of the traversal, then commit and hand off any
//! minted clue.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::TimeDelta;
use nearfield_core::action::{ActionKey, ActionType, TraversalState};
use nearfield_core::clock::Clock;
use nearfield_core::command::Command;
use nearfield_core::error::AdvanceError;
use nearfield_core::model::AdvanceResult;
use nearfield_core::provider::{ClueSink, SceneDataProvider};
use tracing::{debug, info, instrument, warn};

use crate::domain::commands::Advance;
use crate::domain::traversal::{Step, Traversal, TraversalKey};

/// Default time allowed for one provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(5);

/// Default time a traversal may sit without an accepted step before it is
/// evicted.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

type TraversalSlot = Arc<tokio::sync::Mutex<Traversal>>;

/// Drives traversals against a scene data provider.
///
/// Each traversal sits behind its own async mutex, so actions against one
/// traversal are serialized while different traversals run independently.
/// A traversal only enters the table once its first `LOAD_SCENE` commits,
/// and leaves it after sitting idle for longer than the idle timeout.
pub struct AdvanceEngine {
    provider: Arc<dyn SceneDataProvider>,
    clue_sink: Arc<dyn ClueSink>,
    clock: Arc<dyn Clock>,
    provider_timeout: Duration,
    idle_timeout: Duration,
    traversals: Mutex<HashMap<TraversalKey, TraversalSlot>>,
}

impl std::fmt::Debug for AdvanceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvanceEngine")
            .field("provider", &self.provider.name())
            .field("provider_timeout", &self.provider_timeout)
            .field("idle_timeout", &self.idle_timeout)
            .finish_non_exhaustive()
    }
}

impl AdvanceEngine {
    /// Creates an engine with no traversals.
    #[must_use]
    pub fn new(
        provider: Arc<dyn SceneDataProvider>,
        clue_sink: Arc<dyn ClueSink>,
        clock: Arc<dyn Clock>,
        provider_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            clue_sink,
            clock,
            provider_timeout,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            traversals: Mutex::new(HashMap::new()),
        }
    }

    /// Sets how long a traversal may go without an accepted step.
    #[must_use]
    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Name of the configured provider.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Advances a traversal by one step.
    ///
    /// The step either fully commits or leaves the traversal untouched:
    /// the provider is consulted before any state changes, and dropping
    /// the returned future mid-call aborts cleanly. A first `LOAD_SCENE`
    /// that fails leaves no traversal behind.
    ///
    /// # Errors
    ///
    /// Returns `AdvanceError::TraversalNotFound` for a non-`LOAD_SCENE`
    /// action on an unknown traversal, the state machine errors of
    /// [`Traversal::begin`], `SceneNotFound` / `ActionKeyNotFound` /
    /// `PolicyExhausted` when content is missing, `ProviderTimeout` when
    /// the provider is too slow, and any error the provider reports.
    #[instrument(
        skip(self, command),
        fields(
            command = command.command_type(),
            correlation_id = %command.correlation_id(),
            session_id = %command.session_id,
            story_id = %command.story_id,
            scene_id = %command.scene_id,
            action = %command.action,
        )
    )]
    pub async fn advance(&self, command: &Advance) -> Result<AdvanceResult, AdvanceError> {
        let key = TraversalKey::new(command.session_id, command.story_id.clone());
        if command.action == ActionType::LoadScene {
            self.evict_idle();
        }

        loop {
            let slot = self.slot(&key, command.action)?;
            let mut traversal = slot.lock().await;
            if !self.holds(&key, &slot) {
                // Discarded or evicted while this call waited for the lock.
                continue;
            }

            let (action_key, result) = match self.step(&mut traversal, command).await {
                Ok(stepped) => stepped,
                Err(err) => {
                    if traversal.state() == TraversalState::Uninitialized {
                        debug!(traversal = %key, "discarding traversal after failed load");
                        self.discard(&key, &slot);
                    }
                    return Err(err);
                }
            };
            let turn = traversal.turn();
            drop(traversal);

            if let Some(clue) = &result.scene_status.new_clue {
                info!(clue_id = %clue.clue_id, "minted clue");
                self.clue_sink.hand_off(command.session_id, clue.clone());
            }

            info!(
                %action_key,
                turn,
                next_action_type = ?result.next_action_type,
                is_scene_over = result.scene_status.is_scene_over,
                is_story_over = result.scene_status.is_story_over,
                events = result.new_events.len(),
                "advanced traversal"
            );

            return Ok(result);
        }
    }

    /// Returns the traversal slot for `key`, if one exists.
    pub(crate) fn existing_slot(&self, key: &TraversalKey) -> Option<TraversalSlot> {
        self.traversals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of traversals currently held.
    #[must_use]
    pub fn traversal_count(&self) -> usize {
        self.traversals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn step(
        &self,
        traversal: &mut Traversal,
        command: &Advance,
    ) -> Result<(ActionKey, AdvanceResult), AdvanceError> {
        let step = traversal.begin(command)?;
        let scene_id = match &step {
            Step::Load { scene_id } => scene_id.clone(),
            _ => traversal.scene_id().unwrap_or_default().to_owned(),
        };
        let story_id = command.story_id.as_str();

        let Some((mut action_key, mut batch)) =
            self.resolve_step(story_id, &scene_id, &step).await?
        else {
            return Err(match &step {
                Step::Load { .. } => AdvanceError::SceneNotFound {
                    story_id: story_id.to_owned(),
                    scene_id,
                },
                _ => AdvanceError::ActionKeyNotFound {
                    scene_id,
                    action_key: step.action_key(),
                },
            });
        };

        if action_key != ActionKey::InteractDefault
            && traversal.breaks_forced_convergence(&step, &batch)
        {
            warn!(
                %action_key,
                provider = self.provider.name(),
                "provider did not end the scene on the last turn of the budget"
            );
            let max_turns = traversal
                .policy()
                .or_else(|| batch.declared_policy())
                .map_or(0, |p| p.max_turns);
            batch = self
                .fetch(story_id, &scene_id, ActionKey::InteractDefault)
                .await?
                .ok_or_else(|| AdvanceError::PolicyExhausted {
                    scene_id: scene_id.clone(),
                    max_turns,
                })?;
            action_key = ActionKey::InteractDefault;
        }

        let mut staged = traversal.clone();
        let result = staged.accept(&step, batch, self.clock.now())?;
        *traversal = staged;
        Ok((action_key, result))
    }

    fn slot(&self, key: &TraversalKey, action: ActionType) -> Result<TraversalSlot, AdvanceError> {
        let mut traversals = self
            .traversals
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(slot) = traversals.get(key) {
            return Ok(Arc::clone(slot));
        }
        if action != ActionType::LoadScene {
            return Err(AdvanceError::TraversalNotFound(key.to_string()));
        }
        debug!(traversal = %key, "creating traversal");
        let slot = Arc::new(tokio::sync::Mutex::new(Traversal::new(
            key.clone(),
            self.clock.now(),
        )));
        traversals.insert(key.clone(), Arc::clone(&slot));
        Ok(slot)
    }

    /// True while `slot` is still the table entry for `key`.
    fn holds(&self, key: &TraversalKey, slot: &TraversalSlot) -> bool {
        self.traversals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
    }

    fn discard(&self, key: &TraversalKey, slot: &TraversalSlot) {
        let mut traversals = self
            .traversals
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if traversals
            .get(key)
            .is_some_and(|current| Arc::ptr_eq(current, slot))
        {
            traversals.remove(key);
        }
    }

    /// Drops every traversal idle for at least the idle timeout and
    /// releases its clues. Traversals mid-step are skipped.
    fn evict_idle(&self) {
        let now = self.clock.now();
        let idle = TimeDelta::from_std(self.idle_timeout).unwrap_or(TimeDelta::MAX);
        let mut evicted = Vec::new();
        self.traversals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|key, slot| {
                let Ok(traversal) = slot.try_lock() else {
                    return true;
                };
                let last_seen = traversal.last_advanced_at.unwrap_or(traversal.started_at);
                if now - last_seen < idle {
                    return true;
                }
                evicted.push(key.clone());
                false
            });

        for key in evicted {
            info!(traversal = %key, "evicting idle traversal");
            self.clue_sink.release(key.session_id, &key.story_id);
        }
    }

    async fn resolve_step(
        &self,
        story_id: &str,
        scene_id: &str,
        step: &Step,
    ) -> Result<Option<(ActionKey, AdvanceResult)>, AdvanceError> {
        let primary = step.action_key();
        if let Some(batch) = self.fetch(story_id, scene_id, primary).await? {
            return Ok(Some((primary, batch)));
        }
        let Some(fallback) = step.fallback_key() else {
            return Ok(None);
        };
        debug!(%primary, %fallback, "no content for key, trying fallback");
        Ok(self
            .fetch(story_id, scene_id, fallback)
            .await?
            .map(|batch| (fallback, batch)))
    }

    async fn fetch(
        &self,
        story_id: &str,
        scene_id: &str,
        action_key: ActionKey,
    ) -> Result<Option<AdvanceResult>, AdvanceError> {
        let call = self.provider.resolve(story_id, scene_id, &action_key);
        if let Ok(resolved) = tokio::time::timeout(self.provider_timeout, call).await {
            resolved
        } else {
            let timeout_ms = u64::try_from(self.provider_timeout.as_millis()).unwrap_or(u64::MAX);
            warn!(%action_key, timeout_ms, "provider timed out");
            Err(AdvanceError::ProviderTimeout {
                action_key,
                timeout_ms,
            })
        }
    }
}
