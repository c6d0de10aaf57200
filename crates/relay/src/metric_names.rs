//! Metric names recorded when the `metrics` feature is enabled.

/// Inbound events seen by the dispatcher, labelled by `outcome`
/// (relayed, dropped, unsupported, failed).
pub const EVENTS_TOTAL: &str = "tgrelay_relay_events_total";
/// Relayed messages by content `kind`.
pub const RELAYED_TOTAL: &str = "tgrelay_relay_relayed_total";
/// Send failures, labelled by `reason` (timeout, error).
pub const SEND_FAILURES_TOTAL: &str = "tgrelay_relay_send_failures_total";
/// Outbound send duration in seconds.
pub const SEND_DURATION_SECONDS: &str = "tgrelay_relay_send_duration_seconds";
/// Operator commands executed, labelled by `command` and `outcome`.
pub const COMMANDS_TOTAL: &str = "tgrelay_relay_commands_total";
