use crate::db_types::Order;

/// The outcome of a status update on the order ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The order moved forward to the requested status
    Changed(Order),
    /// The order already had the requested status. Nothing was written.
    Unchanged(Order),
}

impl StatusUpdate {
    pub fn order(&self) -> &Order {
        match self {
            Self::Changed(o) | Self::Unchanged(o) => o,
        }
    }

    pub fn into_order(self) -> Order {
        match self {
            Self::Changed(o) | Self::Unchanged(o) => o,
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }
}
