//! Core data models used throughout the catalog sync job.
//!
//! These types represent the canonical product document that is persisted,
//! the partial update applied to an existing document, and the intermediate
//! shapes the mapper resolves a source record into.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of a single `ProductDetail` entry in a source record.
///
/// Source records list their details in a fixed order; [`DetailKind::ORDERED`]
/// is that order and is used when an entry does not name its own kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailKind {
    Price,
    DiscountedPrice,
    ProductType,
    Quantity,
    Color,
    Series,
}

impl DetailKind {
    /// Positional order of the detail list.
    pub const ORDERED: [DetailKind; 6] = [
        DetailKind::Price,
        DetailKind::DiscountedPrice,
        DetailKind::ProductType,
        DetailKind::Quantity,
        DetailKind::Color,
        DetailKind::Series,
    ];

    /// Resolve a `Name` attribute (case-insensitive) to a kind.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ORDERED
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }

    /// Kind expected at `index` when the entry carries no recognised name.
    pub fn at_position(index: usize) -> Option<Self> {
        Self::ORDERED.get(index).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DetailKind::Price => "Price",
            DetailKind::DiscountedPrice => "DiscountedPrice",
            DetailKind::ProductType => "ProductType",
            DetailKind::Quantity => "Quantity",
            DetailKind::Color => "Color",
            DetailKind::Series => "Series",
        }
    }
}

impl std::fmt::Display for DetailKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A product description as it appears in the source.
///
/// Either bare text, or an element that also carries attributes or child
/// elements. Only the text payload of a rich node is kept downstream.
#[derive(Debug, Clone, PartialEq)]
pub enum Description {
    PlainText(String),
    RichNode {
        text: Option<String>,
        attributes: Vec<(String, String)>,
    },
}

impl Description {
    /// The text payload, empty when a rich node has none.
    pub fn text(&self) -> &str {
        match self {
            Description::PlainText(text) => text,
            Description::RichNode { text, .. } => text.as_deref().unwrap_or(""),
        }
    }
}

/// Canonical product document, keyed by `stock_code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDocument {
    pub stock_code: String,
    pub name: String,
    pub price: f64,
    pub discounted_price: f64,
    pub product_type: String,
    pub quantity: i64,
    pub color: Vec<String>,
    pub series: String,
    pub images: Vec<String>,
    pub description: String,
    pub is_discounted: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// A partial update: every `Some` field is written, every `None` field is
/// left untouched in the store.
///
/// `stock_code` and `created_at` have no field here; they never change
/// after insertion.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discounted_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_discounted: Option<bool>,
    #[serde(rename = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProductPatch {
    /// Names of the business fields this patch sets, in document order.
    /// `updatedAt` is not included.
    pub fn business_fields(&self) -> Vec<&'static str> {
        let flags = [
            ("name", self.name.is_some()),
            ("price", self.price.is_some()),
            ("discounted_price", self.discounted_price.is_some()),
            ("product_type", self.product_type.is_some()),
            ("quantity", self.quantity.is_some()),
            ("color", self.color.is_some()),
            ("series", self.series.is_some()),
            ("images", self.images.is_some()),
            ("description", self.description.is_some()),
            ("is_discounted", self.is_discounted.is_some()),
        ];
        flags
            .into_iter()
            .filter_map(|(field, set)| set.then_some(field))
            .collect()
    }

    /// Every field the patch writes, `updatedAt` last.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = self.business_fields();
        if self.updated_at.is_some() {
            fields.push("updatedAt");
        }
        fields
    }

    /// True when no business field is set.
    pub fn is_empty(&self) -> bool {
        self.business_fields().is_empty()
    }

    /// Apply the patch in place.
    pub fn apply(&self, doc: &mut ProductDocument) {
        if let Some(name) = &self.name {
            doc.name = name.clone();
        }
        if let Some(price) = self.price {
            doc.price = price;
        }
        if let Some(discounted_price) = self.discounted_price {
            doc.discounted_price = discounted_price;
        }
        if let Some(product_type) = &self.product_type {
            doc.product_type = product_type.clone();
        }
        if let Some(quantity) = self.quantity {
            doc.quantity = quantity;
        }
        if let Some(color) = &self.color {
            doc.color = color.clone();
        }
        if let Some(series) = &self.series {
            doc.series = series.clone();
        }
        if let Some(images) = &self.images {
            doc.images = images.clone();
        }
        if let Some(description) = &self.description {
            doc.description = description.clone();
        }
        if let Some(is_discounted) = self.is_discounted {
            doc.is_discounted = is_discounted;
        }
        if let Some(updated_at) = self.updated_at {
            doc.updated_at = updated_at;
        }
    }
}
