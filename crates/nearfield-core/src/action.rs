//! Action vocabulary of the advance protocol.
//!
//! `ActionType` flows from the caller into the engine, `NextActionType`
//! flows back out and drives auto-continuation in the renderer, and
//! `ActionKey` is the lookup key handed to a scene data provider.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdvanceError;

/// An action issued by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    /// Enter a scene fresh.
    LoadScene,
    /// Submit a player turn.
    Interact,
    /// Decline to intervene.
    Pass,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadScene => f.write_str("LOAD_SCENE"),
            Self::Interact => f.write_str("INTERACT"),
            Self::Pass => f.write_str("PASS"),
        }
    }
}

/// What the caller is expected to do after receiving a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NextActionType {
    /// Request the next narrative batch immediately, without player input.
    PlayingNarrative,
    /// Collect player text and resubmit `INTERACT`.
    AwaitingInteraction,
    /// Offer the player an intervene/pass choice.
    AwaitingIntervention,
    /// The scene is terminal.
    SceneEnded,
}

/// Where a traversal sits in the advance state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraversalState {
    /// No scene has been loaded yet.
    Uninitialized,
    /// See [`NextActionType::PlayingNarrative`].
    PlayingNarrative,
    /// See [`NextActionType::AwaitingInteraction`].
    AwaitingInteraction,
    /// See [`NextActionType::AwaitingIntervention`].
    AwaitingIntervention,
    /// See [`NextActionType::SceneEnded`].
    SceneEnded,
}

impl From<NextActionType> for TraversalState {
    fn from(next: NextActionType) -> Self {
        match next {
            NextActionType::PlayingNarrative => Self::PlayingNarrative,
            NextActionType::AwaitingInteraction => Self::AwaitingInteraction,
            NextActionType::AwaitingIntervention => Self::AwaitingIntervention,
            NextActionType::SceneEnded => Self::SceneEnded,
        }
    }
}

impl fmt::Display for TraversalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::PlayingNarrative => "PLAYING_NARRATIVE",
            Self::AwaitingInteraction => "AWAITING_INTERACTION",
            Self::AwaitingIntervention => "AWAITING_INTERVENTION",
            Self::SceneEnded => "SCENE_ENDED",
        };
        f.write_str(name)
    }
}

/// Lookup key passed to a [`SceneDataProvider`](crate::provider::SceneDataProvider).
///
/// The textual form is `LOAD_SCENE`, `PASS`, `INTERACT_turn_<n>` or
/// `INTERACT_default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKey {
    /// Initial batch of a scene.
    LoadScene,
    /// Batch played when the player declines to intervene.
    Pass,
    /// Batch for a specific interaction turn (1-based).
    InteractTurn(u32),
    /// Fallback batch for turns without dedicated content.
    InteractDefault,
}

const INTERACT_TURN_PREFIX: &str = "INTERACT_turn_";

impl ActionKey {
    /// Returns the action type this key belongs to.
    #[must_use]
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::LoadScene => ActionType::LoadScene,
            Self::Pass => ActionType::Pass,
            Self::InteractTurn(_) | Self::InteractDefault => ActionType::Interact,
        }
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadScene => f.write_str("LOAD_SCENE"),
            Self::Pass => f.write_str("PASS"),
            Self::InteractTurn(turn) => write!(f, "{INTERACT_TURN_PREFIX}{turn}"),
            Self::InteractDefault => f.write_str("INTERACT_default"),
        }
    }
}

impl FromStr for ActionKey {
    type Err = AdvanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOAD_SCENE" => Ok(Self::LoadScene),
            "PASS" => Ok(Self::Pass),
            "INTERACT_default" => Ok(Self::InteractDefault),
            other => {
                let turn = other
                    .strip_prefix(INTERACT_TURN_PREFIX)
                    .and_then(|n| n.parse::<u32>().ok())
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| AdvanceError::Validation(format!("invalid action key: {s}")))?;
                Ok(Self::InteractTurn(turn))
            }
        }
    }
}

impl Serialize for ActionKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ActionKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
