//! Annotid mints clean, collision-free identifiers for the gene and RNA
//! features of a GFF3 genome annotation, rewriting every downstream
//! `Parent` reference consistently across the whole file. It was built for
//! (and is primarily tested on) output from the
//! [Maker](https://www.yandell-lab.org/software/maker.html) annotation
//! pipeline, whose auto-generated IDs and names are long and uninformative.
//! A small companion utility repairs stale `##sequence-region` pragma
//! lines against the lengths of the assembled sequences.
//!
//! Processing is a two-pass batch transform: the whole input is buffered,
//! scanned once to discover the gene→RNA hierarchy and mint the old→new ID
//! mapping, then each line is rewritten by anchored textual substitution so
//! that untouched spans survive byte-for-byte.

pub mod error;
pub mod gff_utils;
pub mod idfmt;
pub mod minter;
pub mod options;
pub mod record;
pub mod region;
pub mod rewrite;

pub use error::AnnotError;
pub use idfmt::IdFormat;
pub use minter::IdMinter;
pub use options::MintOptions;
pub use record::{Attributes, FeatureRecord, GffLine};
