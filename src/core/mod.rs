//! Core generation components
//!
//! - `doc2latex`: the serializer walk and switch state machine
//! - `macros`: position-scoped macro resolution
//! - `rowmap`: output-line to document-position tracking

pub mod doc2latex;
pub mod macros;
pub mod rowmap;
