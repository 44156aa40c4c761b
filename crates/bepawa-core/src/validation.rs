//! # Validation Module
//!
//! Input validation for marketplace writes.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Frontend form ──► JSON body ──► serde (shape) ──► THIS MODULE (rules) │
//! │                                                        │                │
//! │                                                        ▼                │
//! │                           SQLite (NOT NULL, CHECK, UNIQUE, FK)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bepawa_core::validation::{validate_price, validate_quantity};
//!
//! validate_quantity(5).unwrap();
//! assert!(validate_price(-1).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{NewAppointment, NewProduct, NewProfile, NewPurchaseOrder, NewSale, NewSupplier};
use crate::{MAX_ITEM_QUANTITY, MAX_PRICE, MAX_PURCHASE_QUANTITY};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn required(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

fn optional(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name: non-empty, at most 200 characters.
///
/// ## Example
/// ```rust
/// use bepawa_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Amoxicillin 250mg").is_ok());
/// assert!(validate_product_name("  ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required("name", name, 200)
}

/// Validates a SKU when one is given.
///
/// Letters, digits, hyphens and underscores, at most 50 characters.
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    required("sku", sku, 50)?;

    if !sku
        .trim()
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates an email address (shape only).
pub fn validate_email(email: &str) -> ValidationResult<()> {
    required("email", email, 254)?;

    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Longest free-text search accepted by the catalog filter.
pub const MAX_SEARCH_LENGTH: usize = 100;

/// Trims a search query; at most [`MAX_SEARCH_LENGTH`] characters.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();
    optional("query", Some(query), MAX_SEARCH_LENGTH)?;
    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## User Workflow
/// ```text
/// User enters quantity: 5
///      │
///      ▼
/// validate_quantity(5) ← THIS FUNCTION
///      │
///      ├── qty <= 0?   → "quantity must be positive"
///      ├── qty > 999?  → "quantity must be between 1 and 999"
///      └── OK          → add to cart / sale
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in minor units: `0..=MAX_PRICE`.
pub fn validate_price(minor: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE).contains(&minor) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE,
        });
    }
    Ok(())
}

/// Validates a purchase-order line quantity: `1..=MAX_PURCHASE_QUANTITY`.
pub fn validate_purchase_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }
    if qty > MAX_PURCHASE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_PURCHASE_QUANTITY,
        });
    }
    Ok(())
}

/// Validates stock levels: all non-negative, `min_stock <= max_stock`.
///
/// A `max_stock` of `None` or `0` means the listing has no maximum.
pub fn validate_stock_levels(stock: i64, min_stock: i64, max_stock: Option<i64>) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    if let Some(max) = max_stock.filter(|m| *m < 0) {
        return Err(ValidationError::OutOfRange {
            field: "max_stock".to_string(),
            min: 0,
            max: max.abs(),
        });
    }
    let max = max_stock.filter(|m| *m > 0).unwrap_or(i64::MAX);
    if min_stock < 0 || min_stock > max {
        return Err(ValidationError::OutOfRange {
            field: "min_stock".to_string(),
            min: 0,
            max,
        });
    }
    Ok(())
}

/// Validates a UUID string.
///
/// ## Example
/// ```rust
/// use bepawa_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Payload Validators
// =============================================================================

/// Validates a product listing before insert.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    if let Some(sku) = product.sku.as_deref() {
        validate_sku(sku)?;
    }
    validate_price(product.price)?;
    if let Some(buy_price) = product.buy_price {
        validate_price(buy_price)?;
    }
    let min_stock = product.min_stock.unwrap_or(crate::DEFAULT_MIN_STOCK);
    validate_stock_levels(product.stock, min_stock, product.max_stock)?;
    optional("description", product.description.as_deref(), 2000)?;
    optional("category", product.category.as_deref(), 100)?;
    Ok(())
}

/// Validates a signup payload.
pub fn validate_new_profile(profile: &NewProfile) -> ValidationResult<()> {
    required("full_name", &profile.full_name, 200)?;
    validate_email(&profile.email)?;
    if profile.role.requires_approval() {
        let name = profile.business_name.as_deref().unwrap_or("");
        required("business_name", name, 200)?;
    }
    optional("phone", profile.phone.as_deref(), 30)?;
    Ok(())
}

/// Validates a supplier payload.
pub fn validate_new_supplier(supplier: &NewSupplier) -> ValidationResult<()> {
    required("name", &supplier.name, 200)?;
    if let Some(email) = supplier.email.as_deref() {
        validate_email(email)?;
    }
    Ok(())
}

/// Validates a purchase order: at least one line, bounded quantities and
/// costs, and a total that fits in minor units.
pub fn validate_new_purchase_order(po: &NewPurchaseOrder) -> ValidationResult<()> {
    required("supplier_id", &po.supplier_id, 64)?;
    if po.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }
    for item in &po.items {
        required("product_id", &item.product_id, 64)?;
        validate_purchase_quantity(item.quantity)?;
        validate_price(item.unit_cost)?;
    }
    if po.checked_total().is_err() {
        return Err(ValidationError::OutOfRange {
            field: "total".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

/// Validates a sale: at least one line, each quantity in range.
pub fn validate_new_sale(sale: &NewSale) -> ValidationResult<()> {
    if sale.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }
    for item in &sale.items {
        required("product_id", &item.product_id, 64)?;
        validate_quantity(item.quantity)?;
    }
    optional("customer_name", sale.customer_name.as_deref(), 200)?;
    Ok(())
}

/// Validates a booking.
pub fn validate_new_appointment(appointment: &NewAppointment) -> ValidationResult<()> {
    required("provider_id", &appointment.provider_id, 64)?;
    required("appointment_time", &appointment.appointment_time, 20)?;
    required("service", &appointment.service, 200)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NewPurchaseOrderItem, NewSaleItem, PaymentMethod, Role};

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("AMX-250").is_ok());
        assert!(validate_sku("para_500").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("pharmacy@bepawa.co.tz").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@bepawa.co.tz").is_err());
        assert!(validate_email("a@localhost").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_stock_levels() {
        assert!(validate_stock_levels(0, 0, None).is_ok());
        assert!(validate_stock_levels(50, 10, Some(100)).is_ok());
        assert!(validate_stock_levels(-1, 10, Some(100)).is_err());
        assert!(validate_stock_levels(50, 200, Some(100)).is_err());
        assert!(validate_stock_levels(50, 10, Some(-1)).is_err());
    }

    #[test]
    fn test_zero_max_stock_means_no_maximum() {
        assert!(validate_stock_levels(5, 10, Some(0)).is_ok());
        assert!(validate_stock_levels(5, 500, None).is_ok());
    }

    #[test]
    fn test_validate_price_bounds() {
        assert!(validate_price(0).is_ok());
        assert!(validate_price(MAX_PRICE).is_ok());
        assert!(validate_price(MAX_PRICE + 1).is_err());
        assert!(validate_price(i64::MAX).is_err());
    }

    #[test]
    fn test_purchase_order_rejects_overflowing_lines() {
        let line = |quantity: i64, unit_cost: i64| NewPurchaseOrderItem {
            product_id: "p1".to_string(),
            quantity,
            unit_cost,
        };
        let mut po = NewPurchaseOrder {
            supplier_id: "s1".to_string(),
            items: vec![line(1 << 62, 4)],
            notes: None,
        };
        assert!(validate_new_purchase_order(&po).is_err());

        po.items = vec![line(10, i64::MAX)];
        assert!(validate_new_purchase_order(&po).is_err());

        // Each line in range, but together they exceed i64
        po.items = (0..100).map(|_| line(MAX_PURCHASE_QUANTITY, MAX_PRICE)).collect();
        assert!(validate_new_purchase_order(&po).is_err());

        po.items = vec![line(50, 1200)];
        assert!(validate_new_purchase_order(&po).is_ok());
    }

    #[test]
    fn test_validate_new_product() {
        let mut product = NewProduct {
            name: "Paracetamol 500mg".to_string(),
            price: 1500,
            stock: 40,
            ..Default::default()
        };
        assert!(validate_new_product(&product).is_ok());

        product.price = -5;
        assert!(validate_new_product(&product).is_err());

        product.price = i64::MAX;
        assert!(validate_new_product(&product).is_err());

        product.price = 1500;
        product.sku = Some("bad sku".to_string());
        assert!(validate_new_product(&product).is_err());
    }

    #[test]
    fn test_business_profiles_need_business_name() {
        let mut profile = NewProfile {
            role: Role::Retail,
            full_name: "Asha Mushi".to_string(),
            email: "asha@example.com".to_string(),
            phone: None,
            region: None,
            business_name: None,
            license_number: None,
        };
        assert!(validate_new_profile(&profile).is_err());

        profile.business_name = Some("Mushi Pharmacy".to_string());
        assert!(validate_new_profile(&profile).is_ok());

        profile.role = Role::Individual;
        profile.business_name = None;
        assert!(validate_new_profile(&profile).is_ok());
    }

    #[test]
    fn test_validate_new_sale() {
        let empty = NewSale {
            items: vec![],
            payment_method: PaymentMethod::Cash,
            customer_name: None,
        };
        assert!(validate_new_sale(&empty).is_err());

        let sale = NewSale {
            items: vec![NewSaleItem {
                product_id: "p1".to_string(),
                quantity: 2,
            }],
            ..empty
        };
        assert!(validate_new_sale(&sale).is_ok());
    }
}
