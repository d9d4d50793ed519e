//! Listing records and response decoding
//!
//! - `Listing`: one normalized real-estate record keyed by its identifier
//! - `Coerced`: best-effort typed field value that falls back to the raw JSON
//! - `decode_page`: tolerant decoder for the search response envelope

mod decode;
mod model;

pub use decode::{decode_envelope, decode_page, DecodeError, DecodedPage};
pub use model::{Coerced, Listing};
