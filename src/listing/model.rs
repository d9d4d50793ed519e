use serde::Serialize;
use serde_json::Value;

/// A field value after best-effort type coercion
///
/// When the upstream value cannot be coerced to `T` the original JSON value is
/// kept as-is instead of failing the whole record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Coerced<T> {
    Typed(T),
    Raw(Value),
}

impl<T> Coerced<T> {
    /// The coerced value, if coercion succeeded
    pub fn typed(&self) -> Option<&T> {
        match self {
            Self::Typed(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

impl Coerced<f64> {
    /// Coerces a JSON value to a number; numeric strings are accepted
    pub fn number(value: &Value) -> Self {
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed {
            Some(n) if n.is_finite() => Self::Typed(n),
            _ => Self::Raw(value.clone()),
        }
    }

    /// Coerces a surface such as `"85 m²"` to square metres
    pub fn surface(value: &Value) -> Self {
        match value {
            Value::String(s) => {
                let trimmed = s.trim().trim_end_matches("m²").trim_end_matches("mq").trim();
                match trimmed.replace(',', ".").parse::<f64>() {
                    Ok(n) if n.is_finite() => Self::Typed(n),
                    _ => Self::Raw(value.clone()),
                }
            }
            other => Self::number(other),
        }
    }
}

impl Coerced<bool> {
    pub fn flag(value: &Value) -> Self {
        match value {
            Value::Bool(b) => Self::Typed(*b),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Self::Typed(true),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Self::Typed(false),
            Value::Number(n) if n.as_u64() == Some(0) => Self::Typed(false),
            Value::Number(n) if n.as_u64() == Some(1) => Self::Typed(true),
            other => Self::Raw(other.clone()),
        }
    }
}

impl Coerced<String> {
    /// Coerces a categorical value; numbers become their decimal text
    pub fn category(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Typed(s.clone()),
            Value::Number(n) => Self::Typed(n.to_string()),
            other => Self::Raw(other.clone()),
        }
    }
}

/// One normalized listing record
///
/// `id` uniquely identifies a listing across the whole crawl. Every other field
/// is absent when the upstream document does not carry it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub id: String,

    // Parent (real-estate level) fields, shared by every sub-property
    pub is_new: Option<Coerced<bool>>,
    pub luxury: Option<Coerced<bool>>,
    pub contract: Option<Coerced<String>>,
    pub sale_type: Option<Coerced<String>>,
    pub anchor: Option<String>,
    pub url: Option<String>,

    // Sub-property fields
    pub price: Option<Coerced<f64>>,
    pub price_range: Option<Coerced<String>>,
    pub surface: Option<Coerced<f64>>,
    pub rooms: Option<Coerced<String>>,
    pub bathrooms: Option<Coerced<String>>,
    pub floor: Option<Coerced<String>>,
    pub garage: Option<Coerced<String>>,
    pub condition: Option<Coerced<String>>,
    pub heating: Option<Coerced<String>>,
    pub category: Option<Coerced<String>>,
    pub description: Option<String>,

    // Location
    pub city: Option<Coerced<String>>,
    pub macrozone: Option<Coerced<String>>,
    pub latitude: Option<Coerced<f64>>,
    pub longitude: Option<Coerced<f64>>,
}

impl Listing {
    /// Creates a listing carrying only its identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            is_new: None,
            luxury: None,
            contract: None,
            sale_type: None,
            anchor: None,
            url: None,
            price: None,
            price_range: None,
            surface: None,
            rooms: None,
            bathrooms: None,
            floor: None,
            garage: None,
            condition: None,
            heating: None,
            category: None,
            description: None,
            city: None,
            macrozone: None,
            latitude: None,
            longitude: None,
        }
    }

    /// Numeric price, if present and coercible
    pub fn price_value(&self) -> Option<f64> {
        self.price.as_ref().and_then(Coerced::typed).copied()
    }

    /// Surface in square metres, if present and coercible
    pub fn surface_value(&self) -> Option<f64> {
        self.surface.as_ref().and_then(Coerced::typed).copied()
    }

    pub fn price_per_sqm(&self) -> Option<f64> {
        match (self.price_value(), self.surface_value()) {
            (Some(price), Some(surface)) if surface > 0.0 => Some(price / surface),
            _ => None,
        }
    }
}
