/// Lifecycle of a scheduler.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SchedulerState {
    /// Not started yet.
    Idle,

    /// A worker is polling.
    Running,

    /// Polling is suspended until resumed.
    Paused,

    /// Stopped for good.
    Cancelled,

    /// Stopped after an unrecoverable error.
    Failed(String),
}

impl SchedulerState {
    /// Whether no further transitions are possible.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Failed(_))
    }
}
