//! # Geometry Extraction
//!
//! Turns raw asset primitives into the vertex streams the renderer uploads.
//! Normals are synthesized when the source omits them and colours are
//! normalized to three float channels.

pub mod extract;
pub mod normals;

pub use extract::{extract_primitive, ExtractedGeometry};
pub use normals::{flat_normals, smooth_normals, FALLBACK_NORMAL};
