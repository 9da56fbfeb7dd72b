//! Static lookup tables
//!
//! Compiled tables consumed during generation:
//! - Language table (babel name, direction, default encoding)
//! - Encoding table (package kind, encodable repertoire)
//! - Markup substitutes for characters without a direct representation

pub mod encodings;
pub mod languages;
pub mod substitutes;

pub use encodings::{encoding, encoding_or_default, Encoding, EncodingPackage};
pub use languages::{language, language_or_default, Language};
pub use substitutes::substitute;
