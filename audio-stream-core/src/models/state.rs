/// Stream connection state machine.
///
/// State transitions:
/// ```text
/// disabled ⇄ enabled
///     ↓         ↓
///      destroyed (connection consumed)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disabled,
    Enabled,
}

impl ConnectionState {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled)
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}
