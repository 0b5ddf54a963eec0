//! Shared fixtures for unit tests.

use skuforge_core::{AggregateId, AttributeId, OptionValueId};

use crate::attribute::{OptionValue, ProductAttribute};
use crate::product::{ProductBase, ProductId};
use crate::variant::VariantFields;

pub(crate) const COLOR: u128 = 1;
pub(crate) const SIZE: u128 = 2;
pub(crate) const MATERIAL: u128 = 3;

pub(crate) fn attribute(id: u128, name: &str, values: &[&str]) -> ProductAttribute {
    let options = values
        .iter()
        .enumerate()
        .map(|(i, v)| OptionValue::new(OptionValueId::from_u128(id * 100 + i as u128), *v, i as i32))
        .collect();
    ProductAttribute::options(AttributeId::from_u128(id), name, options)
}

pub(crate) fn color() -> ProductAttribute {
    attribute(COLOR, "Color", &["Red", "Blue"])
}

pub(crate) fn size() -> ProductAttribute {
    attribute(SIZE, "Size", &["S", "M"])
}

pub(crate) fn material() -> ProductAttribute {
    attribute(MATERIAL, "Material", &["Cotton", "Linen", "Wool"])
}

pub(crate) fn empty_attribute() -> ProductAttribute {
    attribute(9, "Finish", &[])
}

pub(crate) fn product_id() -> ProductId {
    ProductId::new(AggregateId::from_u128(1000))
}

pub(crate) fn shirt() -> ProductBase {
    ProductBase {
        id: product_id(),
        name: "Basic Shirt".to_string(),
        sku: "SHIRT".to_string(),
        slug: String::new(),
        defaults: VariantFields {
            price: 2500,
            offer_price: Some(1999),
            quantity: 10,
            weight: Some(200),
        },
    }
}
