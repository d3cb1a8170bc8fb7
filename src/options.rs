use crate::idfmt::IdFormat;

/// Configuration consumed by the mint pipeline.
///
/// These are assembled by the command-line layer, but the pipeline only
/// ever sees this struct, so the core can be driven programmatically with
/// the same knobs.
///
/// # Fields
///
/// * `id_format`: the template used to mint new gene and RNA IDs.
/// * `dbxref`: when set, every replaced `ID` is preserved in an appended
///   `Dbxref=<key>:<oldID>` clause using this key.
/// * `strip_names`: when `true`, `Name=` clauses are removed from every
///   feature; useful when names are uninformative, as with Maker output.
#[derive(Debug, Clone, Default)]
pub struct MintOptions {
    pub id_format: IdFormat,
    pub dbxref: Option<String>,
    pub strip_names: bool,
}

impl MintOptions {
    pub fn new(id_format: IdFormat, dbxref: Option<String>, strip_names: bool) -> MintOptions {
        MintOptions {
            id_format,
            dbxref,
            strip_names,
        }
    }
}
