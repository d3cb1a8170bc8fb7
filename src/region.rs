//! Repair of `##sequence-region` pragma lines.
//!
//! This utility shares no state with the ID-minting core: it reads
//! per-sequence lengths from a FASTA collection and rewrites any region
//! pragma whose length field has drifted from the sequence it describes.

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

use noodles::fasta;
use tracing::info;

use crate::error::AnnotError;
use crate::gff_utils::fasta_reader;

/// Per-sequence lengths, keyed by the first whitespace-delimited token of
/// each FASTA record name.
pub struct SequenceLengths {
    lengths: HashMap<String, usize>,
}

impl SequenceLengths {
    /// Reads every record of the given FASTA file (plain or gzipped) and
    /// tallies its length.
    pub fn from_fasta<T: AsRef<Path>>(file_path: T) -> anyhow::Result<SequenceLengths> {
        let mut rdr = fasta_reader(file_path)?;
        SequenceLengths::from_reader(&mut rdr)
    }

    fn from_reader<T: BufRead>(rdr: &mut fasta::Reader<T>) -> anyhow::Result<SequenceLengths> {
        let mut lengths = HashMap::new();
        for result in rdr.records() {
            let record = result?;
            let record_name = record.name();
            let seqid = record_name.split_once(' ').unwrap_or((record_name, "")).0;
            lengths.insert(seqid.to_string(), record.sequence().len());
        }
        info!("collected lengths for {} sequences", lengths.len());
        Ok(SequenceLengths { lengths })
    }

    /// The length of the named sequence, if it was present in the FASTA
    /// collection.
    pub fn get(&self, seqid: &str) -> Option<usize> {
        self.lengths.get(seqid).copied()
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }
}

/// Rewrites one line if it is a `##sequence-region` pragma; all other
/// lines are returned unchanged.
///
/// The pragma's seqid is the first whitespace-separated token after the
/// keyword. A pragma referencing a sequence absent from the FASTA
/// collection is a fatal [AnnotError::UnresolvedSequenceRegion]; a known
/// seqid has its pragma replaced wholesale by
/// `##sequence-region   <seqid> 1 <length>`.
pub fn fix_region_line(line: &str, lengths: &SequenceLengths) -> Result<String, AnnotError> {
    let Some(rest) = line.strip_prefix("##sequence-region") else {
        return Ok(line.to_string());
    };
    if !rest.starts_with(char::is_whitespace) {
        return Ok(line.to_string());
    }
    let Some(seqid) = rest.split_whitespace().next() else {
        return Ok(line.to_string());
    };

    let length = lengths
        .get(seqid)
        .ok_or_else(|| AnnotError::UnresolvedSequenceRegion(seqid.to_string()))?;
    Ok(format!("##sequence-region   {} 1 {}", seqid, length))
}
