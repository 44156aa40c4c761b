//! # Role-Scoped Visibility
//!
//! Decides which rows of the shared `products` and `orders` tables a caller
//! may see, as a declarative [`Predicate`].
//!
//! ## Flow
//! ```text
//! Caller { id, role }
//!      │
//!      ▼
//! visible_products_predicate(role, id, policy) ← THIS MODULE
//!      │
//!      ├──► Predicate::Nothing ──► empty list, no query issued
//!      │
//!      └──► Predicate::{All, Eq, And, Or, ...}
//!                 │
//!                 ├──► bepawa-db renders parameterised SQL
//!                 └──► Predicate::matches() evaluates in memory (tests)
//! ```
//!
//! ## Product Rules
//! ```text
//! ┌────────────┬─────────────────────────────────────────────────────────────┐
//! │ Role       │ Visible products                                            │
//! ├────────────┼─────────────────────────────────────────────────────────────┤
//! │ individual │ is_public_product AND is_retail_product                     │
//! │ retail     │ (is_public_product AND is_wholesale_product)                │
//! │            │   OR user_id = caller                                       │
//! │ wholesale  │ user_id = caller                                            │
//! │ admin      │ everything                                                  │
//! │ other      │ nothing                                                     │
//! └────────────┴─────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{Order, OrderStatus, Product, Role};

// =============================================================================
// Predicate
// =============================================================================

/// A literal compared against a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Text(String),
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// A row filter over named columns.
///
/// Column names are the persisted names (`user_id`, not `owner_id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Every row.
    All,
    /// No row. Callers short-circuit instead of querying.
    Nothing,
    /// `column = value`. A NULL column never matches.
    Eq(&'static str, Value),
    /// `column <> value`. A NULL column never matches.
    Ne(&'static str, Value),
    /// `column IS NOT NULL`.
    NotNull(&'static str),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn equals(column: &'static str, value: impl Into<Value>) -> Self {
        Predicate::Eq(column, value.into())
    }

    pub fn not_equals(column: &'static str, value: impl Into<Value>) -> Self {
        Predicate::Ne(column, value.into())
    }

    /// Conjunction of two predicates, folding `All`/`Nothing`.
    pub fn and(self, other: Predicate) -> Self {
        match (self, other) {
            (Predicate::Nothing, _) | (_, Predicate::Nothing) => Predicate::Nothing,
            (Predicate::All, p) | (p, Predicate::All) => p,
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), p) => {
                left.push(p);
                Predicate::And(left)
            }
            (a, b) => Predicate::And(vec![a, b]),
        }
    }

    /// Disjunction of two predicates, folding `All`/`Nothing`.
    pub fn or(self, other: Predicate) -> Self {
        match (self, other) {
            (Predicate::All, _) | (_, Predicate::All) => Predicate::All,
            (Predicate::Nothing, p) | (p, Predicate::Nothing) => p,
            (Predicate::Or(mut left), Predicate::Or(right)) => {
                left.extend(right);
                Predicate::Or(left)
            }
            (Predicate::Or(mut left), p) => {
                left.push(p);
                Predicate::Or(left)
            }
            (a, b) => Predicate::Or(vec![a, b]),
        }
    }

    /// True when no row can match.
    pub fn is_nothing(&self) -> bool {
        matches!(self, Predicate::Nothing)
    }

    /// True when the predicate doesn't restrict anything.
    pub fn is_all(&self) -> bool {
        matches!(self, Predicate::All)
    }

    /// Evaluates the predicate against a row in memory.
    pub fn matches<R: ColumnSource + ?Sized>(&self, row: &R) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Nothing => false,
            Predicate::Eq(column, value) => row.column(column).as_ref() == Some(value),
            Predicate::Ne(column, value) => {
                matches!(row.column(column), Some(ref v) if v != value)
            }
            Predicate::NotNull(column) => row.column(column).is_some(),
            Predicate::And(parts) => parts.iter().all(|p| p.matches(row)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(row)),
        }
    }
}

/// A row whose columns can be looked up by persisted name.
///
/// Returns `None` for NULL or unknown columns.
pub trait ColumnSource {
    fn column(&self, name: &str) -> Option<Value>;
}

impl ColumnSource for Product {
    fn column(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id.as_str())),
            "user_id" => Some(Value::from(self.owner_id.as_str())),
            "wholesaler_id" => self.wholesaler_id.as_deref().map(Value::from),
            "pharmacy_id" => self.pharmacy_id.as_deref().map(Value::from),
            "is_public_product" => Some(Value::Bool(self.is_public_product)),
            "is_retail_product" => Some(Value::Bool(self.is_retail_product)),
            "is_wholesale_product" => Some(Value::Bool(self.is_wholesale_product)),
            "category" => Some(Value::from(self.category.as_str())),
            _ => None,
        }
    }
}

impl ColumnSource for Order {
    fn column(&self, name: &str) -> Option<Value> {
        match name {
            "id" => Some(Value::from(self.id.as_str())),
            "user_id" => Some(Value::from(self.user_id.as_str())),
            "pharmacy_id" => self.pharmacy_id.as_deref().map(Value::from),
            "wholesaler_id" => self.wholesaler_id.as_deref().map(Value::from),
            "status" => Some(Value::from(self.status.as_str())),
            _ => None,
        }
    }
}

// =============================================================================
// Product Visibility
// =============================================================================

/// Which rule decides the products a retail pharmacy sees.
///
/// Two rules have been used for the retail marketplace view and they admit
/// different rows. `Marketplace` is the flag-pair rule; `LinkedWholesaler`
/// admits any product with a supplying wholesaler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductVisibility {
    #[default]
    Marketplace,
    LinkedWholesaler,
}

impl ProductVisibility {
    /// Parses `marketplace` or `linked-wholesaler`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "marketplace" => Some(ProductVisibility::Marketplace),
            "linked-wholesaler" | "linked_wholesaler" => Some(ProductVisibility::LinkedWholesaler),
            _ => None,
        }
    }
}

/// Returns the predicate restricting `products` to what the caller may see.
///
/// `role` is `None` when the caller's profile carries an unrecognised role;
/// that caller sees nothing, as does a lab.
///
/// ## Example
/// ```rust
/// use bepawa_core::visibility::{visible_products_predicate, Predicate, ProductVisibility};
/// use bepawa_core::Role;
///
/// let p = visible_products_predicate(Some(Role::Admin), "admin-1", ProductVisibility::Marketplace);
/// assert_eq!(p, Predicate::All);
///
/// let p = visible_products_predicate(None, "someone", ProductVisibility::Marketplace);
/// assert!(p.is_nothing());
/// ```
pub fn visible_products_predicate(
    role: Option<Role>,
    caller_id: &str,
    policy: ProductVisibility,
) -> Predicate {
    let own = || Predicate::equals("user_id", caller_id);

    match role {
        Some(Role::Individual) => {
            Predicate::equals("is_public_product", true).and(Predicate::equals("is_retail_product", true))
        }
        Some(Role::Retail) => {
            let marketplace = match policy {
                ProductVisibility::Marketplace => Predicate::equals("is_public_product", true)
                    .and(Predicate::equals("is_wholesale_product", true)),
                ProductVisibility::LinkedWholesaler => Predicate::NotNull("wholesaler_id"),
            };
            marketplace.or(own())
        }
        Some(Role::Wholesale) => own(),
        Some(Role::Admin) => Predicate::All,
        Some(Role::Lab) | None => Predicate::Nothing,
    }
}

/// Returns the predicate restricting `orders` to what the caller may see.
///
/// Open carts are never listed as orders.
pub fn visible_orders_predicate(role: Option<Role>, caller_id: &str) -> Predicate {
    let scope = match role {
        Some(Role::Individual) => Predicate::equals("user_id", caller_id),
        Some(Role::Retail) => {
            Predicate::equals("pharmacy_id", caller_id).or(Predicate::equals("user_id", caller_id))
        }
        Some(Role::Wholesale) => Predicate::equals("wholesaler_id", caller_id),
        Some(Role::Admin) => Predicate::All,
        Some(Role::Lab) | None => Predicate::Nothing,
    };
    scope.and(Predicate::not_equals("status", OrderStatus::Cart.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProductStatus;

    fn product(id: &str, owner: &str, public: bool, retail: bool, wholesale: bool) -> Product {
        Product {
            id: id.to_string(),
            owner_id: owner.to_string(),
            wholesaler_id: None,
            pharmacy_id: None,
            name: id.to_string(),
            description: String::new(),
            category: "general".to_string(),
            manufacturer: String::new(),
            sku: String::new(),
            price: 1000,
            buy_price: 800,
            stock: 20,
            min_stock: 5,
            max_stock: 100,
            expiry_date: None,
            image_url: crate::PLACEHOLDER_IMAGE_URL.to_string(),
            status: ProductStatus::InStock,
            is_public_product: public,
            is_retail_product: retail,
            is_wholesale_product: wholesale,
            created_at: None,
        }
    }

    fn catalog() -> Vec<Product> {
        let mut linked = product("linked", "pharmacy-2", false, true, false);
        linked.wholesaler_id = Some("wholesaler-1".to_string());
        vec![
            product("retail-public", "pharmacy-2", true, true, false),
            product("wholesale-public", "wholesaler-1", true, false, true),
            product("private", "wholesaler-1", false, false, true),
            product("own", "pharmacy-1", false, true, false),
            linked,
        ]
    }

    fn visible(predicate: &Predicate) -> Vec<String> {
        catalog()
            .into_iter()
            .filter(|p| predicate.matches(p))
            .map(|p| p.id)
            .collect()
    }

    #[test]
    fn test_individual_never_sees_private_products() {
        let p = visible_products_predicate(Some(Role::Individual), "u1", ProductVisibility::Marketplace);
        for row in catalog() {
            if p.matches(&row) {
                assert!(row.is_public_product);
                assert!(row.is_retail_product);
            }
        }
        assert_eq!(visible(&p), vec!["retail-public"]);
    }

    #[test]
    fn test_retail_sees_wholesale_marketplace_and_own() {
        let p = visible_products_predicate(Some(Role::Retail), "pharmacy-1", ProductVisibility::Marketplace);
        assert_eq!(visible(&p), vec!["wholesale-public", "own"]);
    }

    #[test]
    fn test_wholesale_sees_only_own() {
        let p = visible_products_predicate(Some(Role::Wholesale), "wholesaler-1", ProductVisibility::Marketplace);
        assert_eq!(visible(&p), vec!["wholesale-public", "private"]);
    }

    #[test]
    fn test_admin_and_unknown_roles() {
        let admin = visible_products_predicate(Some(Role::Admin), "a", ProductVisibility::Marketplace);
        assert!(admin.is_all());
        assert_eq!(visible(&admin).len(), 5);

        let lab = visible_products_predicate(Some(Role::Lab), "l", ProductVisibility::Marketplace);
        assert!(lab.is_nothing());
        let unknown = visible_products_predicate(None, "x", ProductVisibility::Marketplace);
        assert!(visible(&unknown).is_empty());
    }

    #[test]
    fn test_retail_policies_diverge_on_same_rows() {
        let marketplace =
            visible_products_predicate(Some(Role::Retail), "pharmacy-1", ProductVisibility::Marketplace);
        let linked =
            visible_products_predicate(Some(Role::Retail), "pharmacy-1", ProductVisibility::LinkedWholesaler);

        assert_eq!(visible(&linked), vec!["own", "linked"]);
        assert_ne!(visible(&marketplace), visible(&linked));
    }

    #[test]
    fn test_predicate_folding() {
        let p = Predicate::All.and(Predicate::equals("a", true));
        assert_eq!(p, Predicate::equals("a", true));
        assert!(Predicate::Nothing.and(Predicate::All).is_nothing());
        assert!(Predicate::Nothing.or(Predicate::All).is_all());

        let chained = Predicate::equals("a", true)
            .and(Predicate::equals("b", true))
            .and(Predicate::equals("c", true));
        assert!(matches!(chained, Predicate::And(ref parts) if parts.len() == 3));
    }

    #[test]
    fn test_orders_predicate_excludes_carts() {
        let order = |id: &str, status: OrderStatus| Order {
            id: id.to_string(),
            user_id: "buyer".to_string(),
            pharmacy_id: Some("pharmacy-1".to_string()),
            wholesaler_id: None,
            status,
            items: vec![],
            total_amount: 0,
            delivery_address: None,
            created_at: None,
            updated_at: None,
        };

        let buyer = visible_orders_predicate(Some(Role::Individual), "buyer");
        assert!(buyer.matches(&order("o1", OrderStatus::Pending)));
        assert!(!buyer.matches(&order("c1", OrderStatus::Cart)));

        let seller = visible_orders_predicate(Some(Role::Retail), "pharmacy-1");
        assert!(seller.matches(&order("o1", OrderStatus::Delivered)));

        let other = visible_orders_predicate(Some(Role::Wholesale), "wholesaler-9");
        assert!(!other.matches(&order("o1", OrderStatus::Pending)));

        assert!(visible_orders_predicate(Some(Role::Lab), "lab").is_nothing());
    }

    #[test]
    fn test_visibility_policy_parse() {
        assert_eq!(ProductVisibility::parse("marketplace"), Some(ProductVisibility::Marketplace));
        assert_eq!(
            ProductVisibility::parse("Linked-Wholesaler"),
            Some(ProductVisibility::LinkedWholesaler)
        );
        assert_eq!(ProductVisibility::parse("open"), None);
    }
}
