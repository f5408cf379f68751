//! Command abstraction shared by inbound requests.

use uuid::Uuid;

/// Trait that all inbound commands implement.
pub trait Command: Send + Sync + std::fmt::Debug {
    /// Stable command name used in log fields.
    fn command_type(&self) -> &'static str;

    /// Correlation ID tying the command to the log lines it produces.
    fn correlation_id(&self) -> Uuid;
}
