// Open Food Facts search response types
//
// The catalog is crowd-sourced, so field types drift: barcodes sometimes
// arrive as numbers and nutrient values as strings. Deserialization keeps
// whatever is usable and turns everything else into None instead of failing
// the whole page.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Body of `/cgi/search.pl?json=1`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResponse {
    /// Products in API order; missing or null means an empty page
    #[serde(default, deserialize_with = "null_as_empty")]
    pub products: Vec<RawProduct>,
}

/// One product as returned by the search endpoint, restricted to the
/// requested field projection
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawProduct {
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub product_name: Option<String>,

    /// Comma-separated free text, most specific brand first
    #[serde(default, deserialize_with = "lenient_string")]
    pub brands: Option<String>,

    /// Comma-separated free text, broadest category first
    #[serde(default, deserialize_with = "lenient_string")]
    pub categories: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub image_url: Option<String>,

    #[serde(rename = "energy-kcal_100g", default, deserialize_with = "lenient_number")]
    pub energy_kcal_100g: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub fat_100g: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub carbohydrates_100g: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub proteins_100g: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub salt_100g: Option<f64>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<RawProduct>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RawProduct>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    Ok(number.filter(|n| n.is_finite()))
}
