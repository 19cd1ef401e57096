//! Cart state and derived pricing.
//!
//! A cart is an ordered set of lines, at most one per product, each carrying
//! a full product snapshot taken at add time (catalog edits never reprice an
//! existing line) and a quantity of at least one. Aggregates are always
//! recomputed from the lines, never stored.
//!
//! Shipping policy:
//! - Flat rate: $8 SGD for orders under $80
//! - Free shipping: orders $80+ SGD, and empty carts

use serde::{Deserialize, Serialize};

use kehillah_core::{DocumentId, Money};

use crate::sanity::types::Product;

/// Flat shipping rate below the free-shipping threshold.
pub const SHIPPING_RATE: Money = Money::from_major(8);

/// Subtotal at or above which shipping is free.
pub const FREE_SHIPPING_THRESHOLD: Money = Money::from_major(80);

/// One (product, quantity) pairing within a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Product snapshot taken when the line was created.
    pub product: Product,
    /// Desired purchase quantity, always at least 1.
    pub quantity: u32,
}

impl CartLine {
    /// Price of the whole line (unit price times quantity).
    #[must_use]
    pub fn line_price(&self) -> Money {
        self.product.price * self.quantity
    }
}

/// The cart: what one visitor intends to purchase.
///
/// Only the line set is serialized; everything else is derived. The
/// serialized form (`{ "lines": [...] }`) is what the session layer
/// persists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// The lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` units of a product.
    ///
    /// If a line for the product already exists its quantity is incremented,
    /// saturating at `u32::MAX`, and the stored snapshot is kept; otherwise a
    /// new line is appended.
    /// A zero quantity is a no-op. Stock checks belong to the caller - the
    /// UI disables the action for unavailable products.
    pub fn add_item(&mut self, product: Product, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product.id == product.id)
        {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine { product, quantity });
        }
    }

    /// Remove the line for a product. Absence is not an error.
    pub fn remove_item(&mut self, product_id: &DocumentId) {
        self.lines.retain(|line| line.product.id != *product_id);
    }

    /// Set the quantity of an existing line to exactly `quantity`.
    ///
    /// A quantity of zero or less removes the line. If no line exists for
    /// the product this is a no-op; lines are only ever created through
    /// [`add_item`](Self::add_item).
    pub fn update_quantity(&mut self, product_id: &DocumentId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(product_id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.product.id == *product_id)
        {
            line.quantity = quantity;
        }
    }

    /// Empty the cart unconditionally.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_price).sum()
    }

    /// Shipping cost: zero for an empty cart, zero at or above the
    /// free-shipping threshold, otherwise the flat rate.
    #[must_use]
    pub fn shipping(&self) -> Money {
        let subtotal = self.subtotal();
        if subtotal.is_zero() || subtotal >= FREE_SHIPPING_THRESHOLD {
            Money::ZERO
        } else {
            SHIPPING_RATE
        }
    }

    /// Subtotal plus shipping. Recomputed on every call.
    #[must_use]
    pub fn total(&self) -> Money {
        self.subtotal() + self.shipping()
    }

    /// Total number of units across all lines (for the badge), not the
    /// number of distinct lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Quantity for one product, zero if absent.
    #[must_use]
    pub fn item_quantity(&self, product_id: &DocumentId) -> u32 {
        self.lines
            .iter()
            .find(|line| line.product.id == *product_id)
            .map_or(0, |line| line.quantity)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use kehillah_core::LocaleString;

    use super::*;
    use crate::sanity::types::Slug;

    fn product(id: &str, price_cents: i64) -> Product {
        Product {
            id: DocumentId::new(id),
            name: LocaleString::english(id),
            slug: Slug {
                current: id.to_string(),
            },
            description: None,
            price: Money::from_cents(price_cents),
            category: None,
            kashrut: None,
            images: Vec::new(),
            sku: None,
            in_stock: true,
            featured: false,
        }
    }

    #[test]
    fn addition_is_additive_and_keeps_one_line() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 1000), 2);
        cart.add_item(product("p1", 1000), 3);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.item_quantity(&DocumentId::new("p1")), 5);
    }

    #[test]
    fn add_keeps_original_snapshot() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 1000), 1);
        // The catalog price changed between adds; the line must not reprice.
        cart.add_item(product("p1", 9999), 1);

        assert_eq!(cart.subtotal(), Money::from_cents(2000));
    }

    #[test]
    fn add_zero_quantity_is_a_noop() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 1000), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn add_saturates_at_the_quantity_ceiling() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 100), 1);
        cart.update_quantity(&DocumentId::new("p1"), i64::from(u32::MAX));
        cart.add_item(product("p1", 100), 5);

        assert_eq!(cart.item_quantity(&DocumentId::new("p1")), u32::MAX);
    }

    #[test]
    fn removal_is_idempotent() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 1000), 2);

        let id = DocumentId::new("p1");
        cart.remove_item(&id);
        let after_first = cart.lines().len();
        cart.remove_item(&id);

        assert_eq!(after_first, 0);
        assert_eq!(cart.lines().len(), 0);
    }

    #[test]
    fn update_quantity_sets_absolute_value() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 1000), 2);
        cart.update_quantity(&DocumentId::new("p1"), 7);

        assert_eq!(cart.item_quantity(&DocumentId::new("p1")), 7);
    }

    #[test]
    fn update_to_zero_or_below_removes_the_line() {
        for target in [0, -1, -100] {
            let mut cart = Cart::new();
            cart.add_item(product("p1", 1000), 3);
            cart.update_quantity(&DocumentId::new("p1"), target);
            assert!(cart.is_empty(), "quantity {target} should remove the line");
        }
    }

    #[test]
    fn update_does_not_create_lines() {
        let mut cart = Cart::new();
        cart.update_quantity(&DocumentId::new("ghost"), 4);
        assert!(cart.is_empty());
    }

    #[test]
    fn subtotal_sums_price_times_quantity() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 1000), 2); // $10.00 x 2
        cart.add_item(product("p2", 550), 3); // $5.50 x 3

        assert_eq!(cart.subtotal(), Money::from_cents(3650));
    }

    #[test]
    fn shipping_is_a_step_function_of_the_subtotal() {
        let cases = [
            (0, 0),      // empty cart ships nothing
            (7999, 800), // $79.99 -> flat $8
            (8000, 0),   // $80.00 exactly -> free
            (15000, 0),  // $150 -> free
        ];
        for (subtotal_cents, shipping_cents) in cases {
            let mut cart = Cart::new();
            if subtotal_cents > 0 {
                cart.add_item(product("p1", subtotal_cents), 1);
            }
            assert_eq!(
                cart.shipping(),
                Money::from_cents(shipping_cents),
                "subtotal {subtotal_cents}"
            );
        }
    }

    #[test]
    fn total_is_subtotal_plus_shipping() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 2500), 1);
        assert_eq!(cart.total(), cart.subtotal() + cart.shipping());
        assert_eq!(cart.total(), Money::from_cents(3300));

        cart.add_item(product("p2", 6000), 1);
        assert_eq!(cart.total(), cart.subtotal() + cart.shipping());
        assert_eq!(cart.total(), Money::from_cents(8500));
    }

    #[test]
    fn item_count_sums_units_not_lines() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 1000), 2);
        cart.add_item(product("p2", 550), 3);

        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn clear_empties_everything() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 1000), 2);
        cart.add_item(product("p2", 550), 3);
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn serialized_form_round_trips_the_line_set() {
        let mut cart = Cart::new();
        cart.add_item(product("p1", 1000), 2);
        cart.add_item(product("p2", 550), 3);

        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.get("lines").is_some_and(serde_json::Value::is_array));

        let restored: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(restored.lines().len(), 2);
        assert_eq!(restored.subtotal(), cart.subtotal());
        assert_eq!(restored.item_count(), cart.item_count());
        assert_eq!(
            restored.item_quantity(&DocumentId::new("p1")),
            cart.item_quantity(&DocumentId::new("p1"))
        );
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut cart = Cart::new();
        for id in ["c", "a", "b"] {
            cart.add_item(product(id, 100), 1);
        }
        let order: Vec<&str> = cart
            .lines()
            .iter()
            .map(|line| line.product.id.as_str())
            .collect();
        assert_eq!(order, ["c", "a", "b"]);
    }
}
