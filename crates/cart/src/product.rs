use serde::{Deserialize, Serialize};

use storefront_core::ProductId;

/// The slice of a catalog product the cart needs when adding a line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, unit_price: u64) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
        }
    }
}
