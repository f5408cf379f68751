//! Commands for the Near-Field Interaction context.

use nearfield_core::action::ActionType;
use nearfield_core::command::Command;
use uuid::Uuid;

/// Command to advance a traversal by one protocol step.
#[derive(Debug, Clone)]
pub struct Advance {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The player session owning the traversal.
    pub session_id: Uuid,
    /// The story being traversed.
    pub story_id: String,
    /// The scene the action targets.
    pub scene_id: String,
    /// The action issued by the caller.
    pub action: ActionType,
    /// Player free text, only meaningful for `INTERACT`.
    pub turn_input: Option<String>,
}

impl Command for Advance {
    fn command_type(&self) -> &'static str {
        "nearfield.advance"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
