use thiserror::Error;

/// Input-format errors surfaced by the minting and region-fixing pipelines.
///
/// Every variant is fatal: the tool has no partial-success mode, so any of
/// these aborts the run with a non-zero exit and the Display message on the
/// error stream. Silently dropping a malformed record would leave the output
/// annotation internally inconsistent, which is worse than aborting.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnnotError {
    /// An attribute clause in column 9 did not contain a `=` separator.
    #[error("malformed attribute clause '{0}': expected key=value")]
    MalformedAttribute(String),

    /// An RNA feature lacked a required attribute, or a CDS/UTR feature
    /// lacked its `Parent`.
    #[error("{feature_type} feature is missing the required {attribute} attribute")]
    MissingAttribute {
        feature_type: String,
        attribute: &'static str,
    },

    /// The CDS/UTR ID deriver saw a UTR-like feature type it has no short
    /// label for.
    #[error("unknown CDS/UTR feature type '{0}'")]
    UnknownFeatureType(String),

    /// A `##sequence-region` pragma references a sequence that is absent
    /// from the FASTA collection.
    #[error("sequence '{0}' not found in the FASTA input")]
    UnresolvedSequenceRegion(String),
}
