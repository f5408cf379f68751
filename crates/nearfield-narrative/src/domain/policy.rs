//! Interaction Policy Tracker.

use nearfield_core::error::AdvanceError;
use nearfield_core::model::InteractionPolicy;

/// Tracks the turn budget of the current scene.
///
/// Invariant: `current_turn <= max_turns` while a policy is active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyTracker {
    active: Option<InteractionPolicy>,
}

impl PolicyTracker {
    /// Creates a tracker with no active policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a policy whose count begins at `elapsed`, the turns the
    /// scene has already taken before the policy was declared.
    ///
    /// # Errors
    ///
    /// Returns `AdvanceError::Validation` if `max_turns` is zero, the
    /// budget is already spent by `elapsed`, or a policy is already active.
    pub fn start(
        &mut self,
        max_turns: u32,
        goal: Option<String>,
        constraints: Option<String>,
        elapsed: u32,
    ) -> Result<(), AdvanceError> {
        if max_turns == 0 {
            return Err(AdvanceError::Validation(
                "interaction policy max_turns must be positive".to_owned(),
            ));
        }
        if elapsed >= max_turns {
            return Err(AdvanceError::Validation(format!(
                "interaction policy of {max_turns} turns declared after turn {elapsed}"
            )));
        }
        if self.active.is_some() {
            return Err(AdvanceError::Validation(
                "interaction policy already started for this scene".to_owned(),
            ));
        }
        self.active = Some(InteractionPolicy {
            max_turns,
            current_turn: elapsed,
            goal,
            constraints,
        });
        Ok(())
    }

    /// Counts one accepted turn.
    ///
    /// # Errors
    ///
    /// Returns `AdvanceError::PolicyExhausted` if the budget is already
    /// spent, or `AdvanceError::Validation` if no policy is active.
    pub fn advance(&mut self, scene_id: &str) -> Result<u32, AdvanceError> {
        let policy = self.active.as_mut().ok_or_else(|| {
            AdvanceError::Validation("no interaction policy is active".to_owned())
        })?;
        if policy.current_turn == policy.max_turns {
            return Err(AdvanceError::PolicyExhausted {
                scene_id: scene_id.to_owned(),
                max_turns: policy.max_turns,
            });
        }
        policy.current_turn += 1;
        Ok(policy.current_turn)
    }

    /// True iff a policy is active and its budget is spent.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|p| p.current_turn == p.max_turns)
    }

    /// Returns to "no active policy".
    pub fn clear(&mut self) {
        self.active = None;
    }

    /// True while a policy is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The active policy, if any.
    #[must_use]
    pub fn policy(&self) -> Option<&InteractionPolicy> {
        self.active.as_ref()
    }
}
