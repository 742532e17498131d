//! Record mapping: source `<Product>` element → [`ProductDocument`].
//!
//! Mapping is pure. The caller passes in `now`, which becomes `updatedAt`
//! and, when the record carries no `createdAt`, `createdAt` as well.
//!
//! # Detail entries
//!
//! `ProductDetails/ProductDetail` entries are resolved in one pass into a
//! [`ProductDetails`] keyed by [`DetailKind`]. An entry whose `Name` attribute
//! names a known kind is filed under that kind, an entry with an unknown
//! `Name` is ignored, and an entry with no `Name` at all is filed under the
//! kind expected at its position. Fewer than six entries, a kind claimed
//! twice, or a kind never supplied all fail the record.
//!
//! # Numbers
//!
//! Decimal values use a comma separator in the source. Every comma is
//! replaced with a period before parsing, so a value that also carries a
//! thousands separator (`1.234,56` → `1.234.56`) is rejected rather than
//! guessed at.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::error::MappingError;
use crate::models::{Description, DetailKind, ProductDocument};
use crate::xml::XmlNode;

const PRODUCT_ID_ATTR: &str = "ProductId";
const NAME_ATTR: &str = "Name";
const VALUE_ATTR: &str = "Value";
const PATH_ATTR: &str = "Path";
const CREATED_AT: &str = "createdAt";

/// Detail values of one record, keyed by kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
    values: HashMap<DetailKind, String>,
}

impl ProductDetails {
    pub fn get(&self, kind: DetailKind) -> &str {
        self.values.get(&kind).map(String::as_str).unwrap_or("")
    }
}

/// Map one product record.
pub fn map_product(record: &XmlNode, now: DateTime<Utc>) -> Result<ProductDocument, MappingError> {
    let stock_code = record
        .attr(PRODUCT_ID_ATTR)
        .ok_or(MappingError::MissingAttribute(PRODUCT_ID_ATTR))?;
    let name = record
        .attr(NAME_ATTR)
        .ok_or(MappingError::MissingAttribute(NAME_ATTR))?;

    let details = extract_details(record)?;
    let price = parse_decimal(DetailKind::Price, details.get(DetailKind::Price))?;
    let discounted_price = parse_decimal(
        DetailKind::DiscountedPrice,
        details.get(DetailKind::DiscountedPrice),
    )?;
    let quantity = parse_quantity(details.get(DetailKind::Quantity))?;

    let created_at = match extract_created_at(record) {
        Some(raw) => parse_timestamp(raw)?,
        None => now,
    };

    Ok(ProductDocument {
        stock_code: stock_code.to_string(),
        name: capitalize_first(name),
        price,
        discounted_price,
        product_type: details.get(DetailKind::ProductType).to_string(),
        quantity,
        color: vec![details.get(DetailKind::Color).to_string()],
        series: details.get(DetailKind::Series).to_string(),
        images: extract_images(record)?,
        description: extract_description(record)
            .map(|d| d.text().to_string())
            .unwrap_or_default(),
        is_discounted: discounted_price < price,
        created_at,
        updated_at: now,
    })
}

/// Resolve the detail list of a record into named values.
pub fn extract_details(record: &XmlNode) -> Result<ProductDetails, MappingError> {
    let entries: Vec<&XmlNode> = record
        .child("ProductDetails")
        .map(|d| d.children_named("ProductDetail").collect())
        .unwrap_or_default();

    let expected = DetailKind::ORDERED.len();
    if entries.len() < expected {
        return Err(MappingError::ShortDetailList {
            found: entries.len(),
            expected,
        });
    }

    let mut values = HashMap::with_capacity(expected);
    for (index, entry) in entries.iter().enumerate() {
        let kind = match entry.attr(NAME_ATTR) {
            Some(name) => DetailKind::from_name(name),
            None => DetailKind::at_position(index),
        };
        let Some(kind) = kind else {
            continue;
        };
        let value = entry.attr(VALUE_ATTR).unwrap_or("").to_string();
        if values.insert(kind, value).is_some() {
            return Err(MappingError::DuplicateDetail(kind));
        }
    }

    if let Some(missing) = DetailKind::ORDERED
        .into_iter()
        .find(|kind| !values.contains_key(kind))
    {
        return Err(MappingError::MissingDetail(missing));
    }

    Ok(ProductDetails { values })
}

/// Resolve the `Description` element, if any.
pub fn extract_description(record: &XmlNode) -> Option<Description> {
    let node = record.child("Description")?;
    if node.is_text_only() {
        Some(Description::PlainText(node.text.clone().unwrap_or_default()))
    } else {
        Some(Description::RichNode {
            text: node.text.clone(),
            attributes: node.attributes.clone(),
        })
    }
}

/// Image paths in source order; a missing `Images` element yields none.
/// Every `Image` must carry a `Path`.
pub fn extract_images(record: &XmlNode) -> Result<Vec<String>, MappingError> {
    let Some(images) = record.child("Images") else {
        return Ok(Vec::new());
    };
    images
        .children_named("Image")
        .map(|img| {
            img.attr(PATH_ATTR)
                .map(str::to_string)
                .ok_or(MappingError::MissingAttribute(PATH_ATTR))
        })
        .collect()
}

fn extract_created_at(record: &XmlNode) -> Option<&str> {
    record
        .child(CREATED_AT)
        .and_then(|node| node.text.as_deref())
        .or_else(|| record.attr(CREATED_AT))
}

/// Parse a decimal detail, treating every comma as the decimal separator.
pub fn parse_decimal(kind: DetailKind, raw: &str) -> Result<f64, MappingError> {
    let normalized = raw.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MappingError::InvalidNumber {
            kind,
            value: raw.to_string(),
        })
}

fn parse_quantity(raw: &str) -> Result<i64, MappingError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| MappingError::InvalidInteger {
            kind: DetailKind::Quantity,
            value: raw.to_string(),
        })
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, MappingError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| MappingError::InvalidTimestamp(raw.to_string()))
}

/// Upper-case the first character, leave the rest alone.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
