//! # Cart State
//!
//! Holds the order being built at the counter.
//!
//! ## Thread Safety
//! The cart is wrapped in `Arc<Mutex<T>>` because:
//! 1. Multiple commands may access/modify the cart
//! 2. Only one command should modify the cart at a time
//! 3. The UI host can invoke commands concurrently
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  UI Action               Command                   Cart State Change    │
//! │  ─────────               ───────                   ─────────────────    │
//! │                                                                         │
//! │  Pick drink ─────────────► add_to_cart() ─────────► add or merge line   │
//! │                                                                         │
//! │  [+] / [-] ──────────────► increment/decrement ───► qty clamped 1..=99  │
//! │                                                                         │
//! │  Pick size ──────────────► change_line_size() ────► re-priced line      │
//! │                                                                         │
//! │  Click Remove ───────────► remove_from_cart() ────► line removed        │
//! │                                                                         │
//! │  View Cart ──────────────► get_cart() ────────────► (read only)         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use teahouse_core::Cart;

/// Shared cart state.
///
/// A poisoned lock is recovered rather than propagated: every cart
/// operation validates before mutating, so a panic mid-command cannot leave
/// a half-applied change behind.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    /// Creates a new empty cart state.
    pub fn new() -> Self {
        CartState::default()
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust
    /// use teahouse_pos_lib::state::CartState;
    ///
    /// let state = CartState::new();
    /// let totals = state.with_cart(|cart| cart.totals());
    /// assert_eq!(totals.line_count, 0);
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Executes a function with write access to the cart.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use teahouse_core::{CartLineItem, Product, SizeSelection};

    fn product(id: &str, price: f64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Drink {}", id),
            price,
            topping_allowed: false,
            variants: Vec::new(),
            category_id: None,
            is_active: true,
        }
    }

    #[test]
    fn test_clones_share_the_cart() {
        let state = CartState::new();
        let other = state.clone();

        other.with_cart_mut(|c| {
            let line = CartLineItem::build(&product("p1", 25_000.0), SizeSelection::Parent, &[], 1)
                .unwrap();
            c.add_line(line).unwrap();
        });

        assert_eq!(state.with_cart(|c| c.lines().len()), 1);
    }

    #[test]
    fn test_concurrent_adds_merge() {
        let state = CartState::new();
        let p = product("p1", 20_000.0);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let state = state.clone();
                let p = p.clone();
                thread::spawn(move || {
                    state.with_cart_mut(|c| {
                        let line = CartLineItem::build(&p, SizeSelection::Parent, &[], 1).unwrap();
                        c.add_line(line).unwrap();
                    })
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        state.with_cart(|c| {
            assert_eq!(c.lines().len(), 1);
            assert_eq!(c.total_quantity(), 8);
            assert_eq!(c.subtotal().units(), 160_000);
        });
    }
}
