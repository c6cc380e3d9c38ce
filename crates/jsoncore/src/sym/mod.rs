//! Symbol tables for property names.
//!
//! [`ByteQuadsCanonicalizer`] deduplicates names as a parser reads them so a
//! document with thousands of objects sharing a schema allocates each name
//! once. [`intern`] optionally extends sharing across factories.

mod byte_quads;
pub mod intern;
pub mod quads;

#[cfg(test)]
mod tests;

pub use byte_quads::{
    ByteQuadsCanonicalizer, CanonicalizerRoot, DEFAULT_CAPACITY, MAX_ENTRIES_FOR_REUSE,
    MAX_PRIMARY, SymbolFlags,
};
pub(crate) use byte_quads::calc_hash;
pub use quads::{Quads, pack_quads};
