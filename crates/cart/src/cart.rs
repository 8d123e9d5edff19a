use serde::{Deserialize, Serialize};

use storefront_core::{DomainError, DomainResult, ProductId, StateMachine};

use crate::product::Product;

/// One distinct (product, size, color) entry in a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
    /// Price in smallest currency unit (e.g., cents).
    pub unit_price: u64,
    /// Always positive while the item is in a cart.
    pub quantity: i64,
}

impl LineItem {
    /// `unit_price × quantity`, or `None` if it does not fit in `u64`.
    pub fn subtotal(&self) -> Option<u64> {
        let quantity = u64::try_from(self.quantity).ok()?;
        self.unit_price.checked_mul(quantity)
    }

    fn is(&self, product_id: ProductId, size: &str, color: &str) -> bool {
        self.product_id == product_id && self.size == size && self.color == color
    }
}

/// Shopping cart value.
///
/// Every operation takes `&self` and returns the next cart; the total is derived
/// from the items on demand, so it cannot drift from them. A transition whose
/// total would overflow `u64` is rejected, so `total()` is always exact.
///
/// Serialized shape: `{"items": [...], "total": <cents>}`. An incoming `total`
/// is ignored and recomputed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CartSnapshot", into = "CartSnapshot")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of `unit_price × quantity` over all items.
    pub fn total(&self) -> u64 {
        checked_total(&self.items).unwrap_or(u64::MAX)
    }

    /// Number of units across all lines (what the cart badge shows).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn find(&self, product_id: ProductId, size: &str, color: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.is(product_id, size, color))
    }

    /// Add `quantity` units of a product variant.
    ///
    /// Merges into the existing line with the same (product, size, color), or
    /// appends a new one. A zero or negative `quantity` is rejected with
    /// [`DomainError::InvalidQuantity`] rather than clamped.
    pub fn add(
        &self,
        product: &Product,
        size: &str,
        color: &str,
        quantity: i64,
    ) -> DomainResult<Cart> {
        if quantity <= 0 {
            return Err(DomainError::invalid_quantity(quantity));
        }

        let mut items = self.items.clone();
        match items.iter_mut().find(|item| item.is(product.id, size, color)) {
            Some(item) => {
                item.quantity = item
                    .quantity
                    .checked_add(quantity)
                    .ok_or_else(|| DomainError::validation("line quantity overflow"))?;
            }
            None => items.push(LineItem {
                product_id: product.id,
                size: size.to_string(),
                color: color.to_string(),
                unit_price: product.unit_price,
                quantity,
            }),
        }

        Cart::priced(items)
    }

    /// `add` with the default quantity of one.
    pub fn add_one(&self, product: &Product, size: &str, color: &str) -> DomainResult<Cart> {
        self.add(product, size, color, 1)
    }

    /// Drop the matching line. Absent lines are a no-op.
    pub fn remove(&self, product_id: ProductId, size: &str, color: &str) -> Cart {
        let items = self
            .items
            .iter()
            .filter(|item| !item.is(product_id, size, color))
            .cloned()
            .collect();
        Cart { items }
    }

    /// Set the matching line's quantity to exactly `quantity`.
    ///
    /// `quantity <= 0` removes the line. Absent lines are a no-op.
    pub fn update_quantity(
        &self,
        product_id: ProductId,
        size: &str,
        color: &str,
        quantity: i64,
    ) -> DomainResult<Cart> {
        if quantity <= 0 {
            return Ok(self.remove(product_id, size, color));
        }

        let items = self
            .items
            .iter()
            .map(|item| {
                if item.is(product_id, size, color) {
                    LineItem {
                        quantity,
                        ..item.clone()
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        Cart::priced(items)
    }

    pub fn clear(&self) -> Cart {
        Cart::default()
    }

    fn priced(items: Vec<LineItem>) -> DomainResult<Cart> {
        if checked_total(&items).is_none() {
            return Err(DomainError::validation("cart total overflow"));
        }
        Ok(Cart { items })
    }
}

fn checked_total(items: &[LineItem]) -> Option<u64> {
    items
        .iter()
        .try_fold(0u64, |acc, item| acc.checked_add(item.subtotal()?))
}

/// Cart commands, for driving the cart as a reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartCommand {
    Add {
        product: Product,
        size: String,
        color: String,
        quantity: i64,
    },
    Remove {
        product_id: ProductId,
        size: String,
        color: String,
    },
    UpdateQuantity {
        product_id: ProductId,
        size: String,
        color: String,
        quantity: i64,
    },
    Clear,
}

impl StateMachine for Cart {
    type Command = CartCommand;
    type Error = DomainError;

    fn transition(&self, command: &Self::Command) -> Result<Self, Self::Error> {
        match command {
            CartCommand::Add {
                product,
                size,
                color,
                quantity,
            } => self.add(product, size, color, *quantity),
            CartCommand::Remove {
                product_id,
                size,
                color,
            } => Ok(self.remove(*product_id, size, color)),
            CartCommand::UpdateQuantity {
                product_id,
                size,
                color,
                quantity,
            } => self.update_quantity(*product_id, size, color, *quantity),
            CartCommand::Clear => Ok(self.clear()),
        }
    }
}

/// Wire shape consumed by checkout/payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CartSnapshot {
    items: Vec<LineItem>,
    #[serde(default)]
    total: u64,
}

impl From<Cart> for CartSnapshot {
    fn from(cart: Cart) -> Self {
        let total = cart.total();
        Self {
            items: cart.items,
            total,
        }
    }
}

impl TryFrom<CartSnapshot> for Cart {
    type Error = DomainError;

    fn try_from(snapshot: CartSnapshot) -> Result<Self, Self::Error> {
        let mut items: Vec<LineItem> = Vec::with_capacity(snapshot.items.len());
        for line in snapshot.items {
            if line.quantity <= 0 {
                return Err(DomainError::invalid_quantity(line.quantity));
            }
            match items
                .iter_mut()
                .find(|item| item.is(line.product_id, &line.size, &line.color))
            {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .checked_add(line.quantity)
                        .ok_or_else(|| DomainError::validation("line quantity overflow"))?;
                }
                None => items.push(line),
            }
        }
        Cart::priced(items)
    }
}
