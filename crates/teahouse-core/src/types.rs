//! # Domain Types
//!
//! Catalog types as the REST API serves them, plus the size selection used
//! by every cart flow.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Catalog Types                                   │
//! │                                                                         │
//! │  ┌──────────────────────┐      ┌──────────────────────┐                │
//! │  │      Product         │ 1..n │   ProductVariant     │                │
//! │  │  ──────────────────  │─────►│  ──────────────────  │                │
//! │  │  id                  │      │  id                  │                │
//! │  │  name                │      │  size_id (S/M/L)     │                │
//! │  │  price (master)      │      │  price               │                │
//! │  │  topping_allowed     │      └──────────────────────┘                │
//! │  └──────────────────────┘                                               │
//! │                                                                         │
//! │  ┌──────────────────────┐      ┌──────────────────────┐                │
//! │  │      Topping         │      │    SizeSelection     │                │
//! │  │  ──────────────────  │      │  ──────────────────  │                │
//! │  │  product_id          │      │  Parent              │                │
//! │  │  price               │      │  Variant(size_id)    │                │
//! │  └──────────────────────┘      └──────────────────────┘                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Prices on the Wire
//! Catalog prices stay `f64` here because that is what the API sends. They
//! become [`Money`](crate::money::Money) inside the pricing resolver, which
//! is where corrupt values (NaN, negative) are rejected.

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Product
// =============================================================================

/// A sellable drink or food item.
///
/// A product is either sold at its own `price` ("master" product) or through
/// its size `variants`, each carrying its own price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Product identifier assigned by the backend.
    pub id: String,

    /// Display name shown on the menu and receipt.
    pub name: String,

    /// Master price, used when the cashier picks no size.
    pub price: f64,

    /// Whether toppings can be added to this product.
    #[serde(default)]
    pub topping_allowed: bool,

    /// Sized versions of this product.
    #[serde(default)]
    pub variants: Vec<ProductVariant>,

    /// Menu category, if assigned.
    #[serde(default)]
    pub category_id: Option<String>,

    /// Whether the product is on sale (soft delete).
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl Product {
    /// Looks up the variant for a size identifier.
    pub fn variant(&self, size_id: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.size_id == size_id)
    }

    /// Returns the selection the order screen should preselect.
    ///
    /// Products with variants open on their first size; master-only
    /// products open on [`SizeSelection::Parent`].
    pub fn default_size(&self) -> SizeSelection {
        match self.variants.first() {
            Some(v) => SizeSelection::variant(v.size_id.clone()),
            None => SizeSelection::Parent,
        }
    }
}

/// A size-priced instance of a product (e.g. Small/Medium/Large).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ProductVariant {
    /// Variant identifier (the backend models variants as products too).
    pub id: String,

    /// Size identifier this variant is keyed by.
    pub size_id: String,

    /// Price of this size.
    pub price: f64,
}

// =============================================================================
// Topping
// =============================================================================

/// An add-on with its own price (pearls, cheese foam, jelly...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Topping {
    pub product_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub price: f64,
}

impl Topping {
    pub fn new(product_id: impl Into<String>, price: f64) -> Self {
        Topping {
            product_id: product_id.into(),
            name: None,
            price,
        }
    }
}

// =============================================================================
// Size Selection
// =============================================================================

/// Which price a cart line is built on.
///
/// ## Why a Tagged Union?
/// The legacy wire format marks "use the master price" with the literal
/// size id `"Parent"`, which could collide with a real size id. Here the two
/// cases cannot be confused; the literal only exists in
/// [`SizeSelection::from_legacy`] and [`SizeSelection::to_legacy`].
///
/// ## JSON Shape
/// ```json
/// { "kind": "parent" }
/// { "kind": "variant", "sizeId": "L" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export)]
pub enum SizeSelection {
    /// Sell at the product's own price, no variant.
    Parent,
    /// Sell the variant keyed by this size id.
    Variant {
        #[serde(rename = "sizeId")]
        size_id: String,
    },
}

/// Size id the legacy API uses as the master-price marker.
const LEGACY_PARENT_SIZE_ID: &str = "Parent";

impl SizeSelection {
    /// Builds a variant selection.
    pub fn variant(size_id: impl Into<String>) -> Self {
        SizeSelection::Variant {
            size_id: size_id.into(),
        }
    }

    /// Maps a `sizeId` field from legacy cart/order payloads.
    ///
    /// ## Example
    /// ```rust
    /// use teahouse_core::types::SizeSelection;
    ///
    /// assert_eq!(SizeSelection::from_legacy("Parent"), SizeSelection::Parent);
    /// assert_eq!(SizeSelection::from_legacy("L"), SizeSelection::variant("L"));
    /// ```
    pub fn from_legacy(size_id: &str) -> Self {
        if size_id == LEGACY_PARENT_SIZE_ID {
            SizeSelection::Parent
        } else {
            SizeSelection::variant(size_id)
        }
    }

    /// The `sizeId` value to send to endpoints that still expect the legacy
    /// string form.
    pub fn to_legacy(&self) -> &str {
        match self {
            SizeSelection::Parent => LEGACY_PARENT_SIZE_ID,
            SizeSelection::Variant { size_id } => size_id,
        }
    }

    pub fn is_parent(&self) -> bool {
        matches!(self, SizeSelection::Parent)
    }
}

impl fmt::Display for SizeSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeSelection::Parent => f.write_str("master price"),
            SizeSelection::Variant { size_id } => write!(f, "size {}", size_id),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn milk_tea() -> Product {
        Product {
            id: "p-1".to_string(),
            name: "Trà sữa trân châu".to_string(),
            price: 30000.0,
            topping_allowed: true,
            variants: vec![
                ProductVariant {
                    id: "p-1-m".to_string(),
                    size_id: "M".to_string(),
                    price: 30000.0,
                },
                ProductVariant {
                    id: "p-1-l".to_string(),
                    size_id: "L".to_string(),
                    price: 38000.0,
                },
            ],
            category_id: None,
            is_active: true,
        }
    }

    #[test]
    fn test_variant_lookup() {
        let product = milk_tea();
        assert_eq!(product.variant("L").map(|v| v.price), Some(38000.0));
        assert!(product.variant("XL").is_none());
    }

    #[test]
    fn test_default_size() {
        let mut product = milk_tea();
        assert_eq!(product.default_size(), SizeSelection::variant("M"));

        product.variants.clear();
        assert_eq!(product.default_size(), SizeSelection::Parent);
    }

    #[test]
    fn test_product_deserializes_from_api_payload() {
        let json = r#"{
            "id": "p-9",
            "name": "Hồng trà",
            "price": 25000,
            "toppingAllowed": false
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.price, 25000.0);
        assert!(!product.topping_allowed);
        assert!(product.variants.is_empty());
        assert!(product.is_active);
    }

    #[test]
    fn test_legacy_size_mapping_roundtrip() {
        assert_eq!(SizeSelection::Parent.to_legacy(), "Parent");
        assert_eq!(SizeSelection::variant("M").to_legacy(), "M");
        assert!(SizeSelection::from_legacy("Parent").is_parent());
        assert!(!SizeSelection::from_legacy("parent").is_parent());
    }

    #[test]
    fn test_size_selection_json_shape() {
        let json = serde_json::to_value(SizeSelection::variant("L")).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "variant", "sizeId": "L" }));

        let parent: SizeSelection = serde_json::from_str(r#"{"kind":"parent"}"#).unwrap();
        assert_eq!(parent, SizeSelection::Parent);
    }
}
