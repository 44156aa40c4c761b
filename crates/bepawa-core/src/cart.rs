//! # Cart
//!
//! Cart math for the cart-as-order-row model: an open cart is an `orders`
//! row with `status = 'cart'` whose `items` column holds the lines below.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Frontend Action      Cart Method           Row Change                  │
//! │  ───────────────      ───────────           ──────────                  │
//! │  Add to cart ───────► add_item() ─────────► merge by product_id         │
//! │  Change quantity ───► update_quantity() ──► set qty (0 removes)         │
//! │  Remove ────────────► remove_item() ──────► drop line                   │
//! │  Clear ─────────────► clear() ────────────► items = []                  │
//! │                                                                         │
//! │  After every mutation: total_amount = Σ price × quantity                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use bepawa_core::{Cart, OrderItem};
//!
//! let mut cart = Cart::from_items(vec![OrderItem {
//!     product_id: "a".to_string(),
//!     name: "Panadol".to_string(),
//!     price: 1000,
//!     quantity: 2,
//!     seller_id: None,
//!     image_url: None,
//! }]);
//! cart.update_quantity("a", 3).unwrap();
//! assert_eq!(cart.total_amount().minor(), 3000);
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{OrderItem, Product};
use crate::validation::validate_quantity;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// The lines of an open cart.
///
/// ## Invariants
/// - Lines are unique by `product_id`
/// - Every quantity is in `1..=MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` lines
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<OrderItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Wraps lines read from an order row.
    pub fn from_items(items: Vec<OrderItem>) -> Self {
        Cart { items }
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<OrderItem> {
        self.items
    }

    /// Adds a product, or increases its quantity if already present.
    ///
    /// Name and price are frozen from `product` when the line is created.
    /// A cart holds one seller's products; a line from another seller is
    /// rejected with [`CoreError::MixedSellers`].
    pub fn add_item(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if self.seller_id().is_some_and(|seller| seller != product.owner_id) {
            return Err(CoreError::MixedSellers);
        }

        let existing = self
            .items
            .iter()
            .position(|i| i.product_id == product.id);
        let new_qty = existing.map_or(0, |idx| self.items[idx].quantity) + quantity;

        if new_qty > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: new_qty,
                max: MAX_ITEM_QUANTITY,
            });
        }
        if !product.can_sell(new_qty) {
            return Err(CoreError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock.max(0),
                requested: new_qty,
            });
        }

        let price = existing.map_or(product.price, |idx| self.items[idx].price);
        let line = Money::from_minor(price).checked_multiply_quantity(new_qty)?;
        self.checked_total_with(&product.id, line)?;

        match existing {
            Some(idx) => self.items[idx].quantity = new_qty,
            None => {
                if self.items.len() >= MAX_CART_ITEMS {
                    return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS });
                }
                self.items.push(OrderItem {
                    product_id: product.id.clone(),
                    name: product.name.clone(),
                    price: product.price,
                    quantity: new_qty,
                    seller_id: Some(product.owner_id.clone()),
                    image_url: Some(product.image_url.clone()),
                });
            }
        }
        Ok(())
    }

    /// Sets a line's quantity. Zero removes the line.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }
        validate_quantity(quantity)?;

        let item = self
            .items
            .iter()
            .find(|i| i.product_id == product_id)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;
        let line = Money::from_minor(item.price).checked_multiply_quantity(quantity)?;
        self.checked_total_with(product_id, line)?;

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            item.quantity = quantity;
        }
        Ok(())
    }

    /// Total with `product_id`'s line replaced by `line`, failing on overflow.
    fn checked_total_with(&self, product_id: &str, line: Money) -> CoreResult<Money> {
        let others = self
            .items
            .iter()
            .filter(|i| i.product_id != product_id)
            .map(OrderItem::line_total);
        Money::checked_sum(others.chain(std::iter::once(line)))
    }

    pub fn remove_item(&mut self, product_id: &str) -> CoreResult<()> {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        if self.items.len() == before {
            return Err(CoreError::NotInCart(product_id.to_string()));
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities over all lines.
    pub fn total_quantity(&self) -> i64 {
        self.items.iter().fold(0i64, |acc, i| acc.saturating_add(i.quantity))
    }

    /// The value stored in `orders.total_amount`.
    pub fn total_amount(&self) -> Money {
        Cart::total_of(&self.items)
    }

    /// Sums line totals of any item list.
    pub fn total_of(items: &[OrderItem]) -> Money {
        items.iter().map(OrderItem::line_total).sum()
    }

    /// Seller the order is routed to: the owner of the first line.
    pub fn seller_id(&self) -> Option<&str> {
        self.items.first().and_then(|i| i.seller_id.as_deref())
    }

    /// Serialises the lines for the `items` column.
    pub fn items_json(&self) -> String {
        serde_json::to_string(&self.items).unwrap_or_else(|_| "[]".to_string())
    }
}

/// Cart summary for the cart badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub total_amount: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            total_amount: cart.total_amount().minor(),
        }
    }
}
