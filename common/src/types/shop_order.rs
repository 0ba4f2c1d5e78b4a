use serde::{Deserialize, Serialize};

/// Presentation order for the nearby shop list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShopOrder {
    /// Feed order, as returned by the filter.
    #[default]
    Feed,
    /// Nearest first; shops without a distance keep feed order at the end.
    Nearest,
}
