//! Raw record → flat product record, and the validity filter
//!
//! Normalization never fails: missing fields become `None` or an empty
//! string. Whether a record is usable is decided afterwards by
//! [`NormalizedProduct::validate`].

use crate::off::RawProduct;

/// Nutrient values per 100 g, passed through exactly as received
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Nutrients {
    pub energy_kcal: Option<f64>,
    pub fat: Option<f64>,
    pub carbohydrates: Option<f64>,
    pub proteins: Option<f64>,
    pub salt: Option<f64>,
}

/// Flat product record, not yet checked for the required fields
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedProduct {
    pub barcode: Option<String>,
    pub name: Option<String>,
    pub image_url: Option<String>,
    /// First brand token, trimmed; may be empty
    pub brand: String,
    /// First category token, trimmed; may be empty
    pub category: String,
    pub nutrients: Nutrients,
}

/// A product that has both a barcode and a name and may be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct ValidProduct {
    pub barcode: String,
    pub name: String,
    pub image_url: Option<String>,
    pub brand: String,
    pub category: String,
    pub nutrients: Nutrients,
}

/// Why a record was left out of the import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    MissingBarcode,
    MissingName,
}

impl DropReason {
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::MissingBarcode => "missing barcode",
            DropReason::MissingName => "missing product name",
        }
    }
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map an API record onto the internal shape
pub fn normalize(raw: &RawProduct) -> NormalizedProduct {
    NormalizedProduct {
        barcode: raw.code.clone(),
        name: raw.product_name.clone(),
        image_url: raw.image_url.clone(),
        brand: first_token(raw.brands.as_deref()),
        category: first_token(raw.categories.as_deref()),
        nutrients: Nutrients {
            energy_kcal: raw.energy_kcal_100g,
            fat: raw.fat_100g,
            carbohydrates: raw.carbohydrates_100g,
            proteins: raw.proteins_100g,
            salt: raw.salt_100g,
        },
    }
}

/// First entry of a comma-separated list, trimmed. `None` and `""` give `""`.
pub fn first_token(list: Option<&str>) -> String {
    list.unwrap_or_default()
        .split(',')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// True when the record has a non-empty barcode and name
pub fn is_valid(product: &NormalizedProduct) -> bool {
    product.drop_reason().is_none()
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

impl NormalizedProduct {
    pub fn drop_reason(&self) -> Option<DropReason> {
        if !present(&self.barcode) {
            Some(DropReason::MissingBarcode)
        } else if !present(&self.name) {
            Some(DropReason::MissingName)
        } else {
            None
        }
    }

    pub fn validate(self) -> Result<ValidProduct, DropReason> {
        if let Some(reason) = self.drop_reason() {
            return Err(reason);
        }

        match (self.barcode, self.name) {
            (Some(barcode), Some(name)) => Ok(ValidProduct {
                barcode,
                name,
                image_url: self.image_url,
                brand: self.brand,
                category: self.category,
                nutrients: self.nutrients,
            }),
            (None, _) => Err(DropReason::MissingBarcode),
            (_, None) => Err(DropReason::MissingName),
        }
    }
}
