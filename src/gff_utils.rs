use anyhow::Context;
use flate2::bufread::MultiGzDecoder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// Type alias for a noodles FASTA reader that can read from a `dyn BufRead`.
/// It is used to allow reading from either a compressed or uncompressed
/// FASTA file.
pub type FastaReader = noodles::fasta::Reader<Box<dyn BufRead>>;

/// Feature types that participate in gene grouping and ID minting.
pub const RNA_TYPES: [&str; 3] = ["mRNA", "tRNA", "rRNA"];

/// Returns `true` if `ftype` is one of the RNA feature types in [RNA_TYPES].
pub fn is_rna_type(ftype: &str) -> bool {
    RNA_TYPES.contains(&ftype)
}

/// Tests if the stream underlying the [BufReader] `reader` is gzipped or not
/// by examining the first 2 bytes for the magic header. This function
/// *requires*, but does not check, that none of the stream has yet been
/// consumed. It will fill the buffer to examine the first two bytes, but
/// will not consume them.
pub fn is_gzipped<T: BufRead>(reader: &mut T) -> std::io::Result<bool> {
    const GZIP_MAGIC_NUMBER: [u8; 2] = [0x1f, 0x8b];

    let src = reader.fill_buf()?;
    Ok(src.get(..2) == Some(&GZIP_MAGIC_NUMBER))
}

/// Buffers every line of the given input into memory, with line terminators
/// stripped. `-` reads standard input; any other value is treated as a file
/// path, with gzip compression detected automatically.
///
/// The two-pass minting algorithm needs the full input in memory before it
/// can rewrite anything, because an RNA may legally appear before or after
/// its gene in a GFF3 stream. Buffering also keeps stdin, named pipes, and
/// process substitutions working.
pub fn read_lines(input: &str) -> anyhow::Result<Vec<String>> {
    if input == "-" {
        let stdin = io::stdin();
        let lines = stdin.lock().lines().collect::<Result<Vec<_>, _>>()?;
        return Ok(lines);
    }

    let file =
        File::open(input).with_context(|| format!("failed to open input file {}", input))?;
    let mut inner_rdr = BufReader::new(file);
    let lines = if is_gzipped(&mut inner_rdr)? {
        info!("auto-detected gzipped file - reading via decompression");
        BufReader::new(MultiGzDecoder::new(inner_rdr))
            .lines()
            .collect::<Result<Vec<_>, _>>()?
    } else {
        inner_rdr.lines().collect::<Result<Vec<_>, _>>()?
    };
    Ok(lines)
}

/// Creates a [FastaReader] from the provided path. This function will
/// automatically determine if the provided path points to a gzip compressed
/// or an uncompressed FASTA file, and will return the appropriate reader
/// accordingly.
pub fn fasta_reader<T: AsRef<Path>>(p: T) -> anyhow::Result<FastaReader> {
    let file = File::open(p.as_ref())
        .with_context(|| format!("failed to open FASTA file {}", p.as_ref().display()))?;
    let mut inner_rdr = BufReader::new(file);
    if is_gzipped(&mut inner_rdr)? {
        info!("auto-detected gzipped FASTA file - reading via decompression");
        Ok(noodles::fasta::Reader::new(Box::new(BufReader::new(
            GzDecoder::new(inner_rdr),
        ))))
    } else {
        Ok(noodles::fasta::Reader::new(Box::new(inner_rdr)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_gzipped() {
        let gz_magic: &[u8] = &[0x1f, 0x8b, 0x08, 0x00];
        let mut rdr = BufReader::new(gz_magic);
        assert!(is_gzipped(&mut rdr).unwrap());

        let plain: &[u8] = b"##gff-version 3\n";
        let mut rdr = BufReader::new(plain);
        assert!(!is_gzipped(&mut rdr).unwrap());
    }

    #[test]
    fn test_is_rna_type() {
        assert!(is_rna_type("mRNA"));
        assert!(is_rna_type("tRNA"));
        assert!(is_rna_type("rRNA"));
        assert!(!is_rna_type("gene"));
        assert!(!is_rna_type("exon"));
        assert!(!is_rna_type("mrna"));
    }
}
