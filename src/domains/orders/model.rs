//! Order records as stored in and returned from the `orders` table.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Lifecycle status of an order.
///
/// Orders are created as [`OrderStatus::Pending`]. Rows written by other
/// systems may carry any text, which is preserved as [`OrderStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Other(String),
}

impl OrderStatus {
    pub const PENDING: &'static str = "pending";

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => Self::PENDING,
            Self::Other(s) => s,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        if value == Self::PENDING {
            Self::Pending
        } else {
            Self::Other(value)
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Order {
    /// Identifier generated by the store.
    pub id: i64,

    /// Client the order belongs to.
    pub client: String,

    /// Order amount, always strictly positive.
    pub amount: f64,

    /// Current status.
    #[schemars(with = "String")]
    pub status: OrderStatus,
}

/// Fields submitted when creating an order. The store assigns the id and
/// fixes the status to `pending`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub client: String,
    pub amount: f64,
}

impl NewOrder {
    /// Build the full record once the store has assigned an id.
    pub fn into_order(self, id: i64) -> Order {
        Order {
            id,
            client: self.client,
            amount: self.amount,
            status: OrderStatus::Pending,
        }
    }
}
