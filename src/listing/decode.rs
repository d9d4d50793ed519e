//! Schema-tolerant decoding of the search response envelope
//!
//! The envelope is `{ results: [...], count, maxPages, currentPage }`. Each
//! result nests a `realEstate` document holding one or more sub-properties and
//! an `seo` document. Every sub-property is expanded into its own [`Listing`]
//! carrying the shared parent fields. Missing nested fields become absent
//! values; only a body that is not a JSON object is rejected.

use super::model::{Coerced, Listing};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that make a response body unusable as a page
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("response envelope is not a JSON object")]
    NotAnObject,
}

/// One decoded page of search results
#[derive(Debug, Clone, Default)]
pub struct DecodedPage {
    /// Expanded listings, in response order
    pub listings: Vec<Listing>,

    /// Total matches reported for the query
    pub total_count: u64,

    /// Number of pages reported for the query
    pub max_pages: u32,

    /// Page number echoed by the API
    pub current_page: u32,

    /// Number of `results` elements before expansion
    pub result_count: usize,
}

/// Decodes a raw response body
pub fn decode_page(body: &str) -> Result<DecodedPage, DecodeError> {
    let value: Value = serde_json::from_str(body)?;
    decode_envelope(&value)
}

/// Decodes an already-parsed response envelope
pub fn decode_envelope(value: &Value) -> Result<DecodedPage, DecodeError> {
    let envelope = value.as_object().ok_or(DecodeError::NotAnObject)?;

    let results = envelope
        .get("results")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let listings = results.iter().flat_map(expand_result).collect();

    Ok(DecodedPage {
        listings,
        total_count: lenient_u64(envelope.get("count")).unwrap_or(0),
        max_pages: lenient_u64(envelope.get("maxPages"))
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(0),
        current_page: lenient_u64(envelope.get("currentPage"))
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
            .unwrap_or(1),
        result_count: results.len(),
    })
}

/// Expands one `results` element into a listing per sub-property
fn expand_result(result: &Value) -> Vec<Listing> {
    let real_estate = result.get("realEstate");
    let seo = result.get("seo");

    let Some(id) = real_estate.and_then(|re| re.get("id")).and_then(identifier) else {
        tracing::debug!("Skipping result without realEstate.id");
        return Vec::new();
    };

    let mut parent = Listing::new(id);
    parent.is_new = field(real_estate, "isNew").map(Coerced::<bool>::flag);
    parent.luxury = field(real_estate, "luxury").map(Coerced::<bool>::flag);
    parent.contract = field(real_estate, "contract").map(Coerced::<String>::category);
    parent.sale_type = field(real_estate, "type").map(Coerced::<String>::category);
    parent.anchor = field(seo, "anchor").and_then(text);
    parent.url = field(seo, "url").and_then(text);

    let properties = real_estate
        .and_then(|re| re.get("properties"))
        .and_then(Value::as_array)
        .filter(|props| !props.is_empty());

    match properties {
        Some(props) => props
            .iter()
            .map(|property| with_property(parent.clone(), property))
            .collect(),
        None => vec![parent],
    }
}

/// Fills the sub-property fields of `listing` from `property`
fn with_property(mut listing: Listing, property: &Value) -> Listing {
    let property = Some(property);
    let price = field(property, "price");
    let location = field(property, "location");

    listing.price = field(price, "value").map(Coerced::<f64>::number);
    listing.price_range = field(price, "priceRange").map(Coerced::<String>::category);
    listing.surface = field(property, "surface").map(Coerced::<f64>::surface);
    listing.rooms = field(property, "rooms").map(Coerced::<String>::category);
    listing.bathrooms = field(property, "bathrooms").map(Coerced::<String>::category);
    listing.floor = field(field(property, "floor"), "abbreviation").map(Coerced::<String>::category);
    listing.garage = field(property, "ga4Garage").map(Coerced::<String>::category);
    listing.condition = field(property, "ga4Condition").map(Coerced::<String>::category);
    listing.heating = field(field(property, "energy"), "ga4Heating").map(Coerced::<String>::category);
    listing.category = field(field(property, "category"), "name").map(Coerced::<String>::category);
    listing.description = field(property, "description").and_then(text);

    listing.city = field(location, "city").map(Coerced::<String>::category);
    listing.macrozone = field(location, "macrozone").map(Coerced::<String>::category);
    listing.latitude = field(location, "latitude").map(Coerced::<f64>::number);
    listing.longitude = field(location, "longitude").map(Coerced::<f64>::number);

    listing
}

/// Looks up `key` on an optional object; null counts as absent
fn field<'a>(parent: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    parent
        .and_then(Value::as_object)
        .and_then(|obj: &Map<String, Value>| obj.get(key))
        .filter(|v| !v.is_null())
}

fn text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn identifier(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn lenient_u64(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
