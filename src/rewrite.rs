//! The per-line rewrite pipeline.
//!
//! Every output line is produced by textual substitution within the
//! original line, never by re-serializing a parsed record, so field order,
//! whitespace, and unrelated attributes survive byte-for-byte except for
//! the substituted spans. All attribute matching is anchored: a key only
//! matches at the start of column 9 or immediately after a `;`, so a key
//! like `ID` can never fire inside `exon_ID`.

use crate::error::AnnotError;
use crate::minter::IdMinter;
use crate::options::MintOptions;
use crate::record::GffLine;

/// Byte offset of the attribute column (the 9th tab-separated field), or
/// `None` if the line does not have exactly 9 fields.
fn attribute_column(line: &str) -> Option<usize> {
    let mut tabs = 0usize;
    let mut col = None;
    for (i, b) in line.bytes().enumerate() {
        if b == b'\t' {
            tabs += 1;
            if tabs == 8 {
                col = Some(i + 1);
            }
        }
    }
    if tabs == 8 {
        col
    } else {
        None
    }
}

/// The `type` field (column 3) of a 9-field feature line.
fn feature_type(line: &str) -> Option<&str> {
    attribute_column(line)?;
    line.split('\t').nth(2)
}

/// Locates the first `<key>=<value>` clause in the attribute column,
/// scanning clause by clause so the match is anchored at `;` boundaries.
/// Returns `(clause_start, value_start, value_end)` as absolute byte
/// offsets into `line`.
fn find_attr(line: &str, key: &str) -> Option<(usize, usize, usize)> {
    let col = attribute_column(line)?;
    let mut pos = col;
    while pos <= line.len() {
        let clause_end = line[pos..]
            .find(';')
            .map(|p| pos + p)
            .unwrap_or(line.len());
        let clause = &line[pos..clause_end];
        if let Some(eq) = clause.find('=') {
            if &clause[..eq] == key {
                return Some((pos, pos + eq + 1, clause_end));
            }
        }
        pos = clause_end + 1;
    }
    None
}

/// Substitutes minted IDs into one raw line.
///
/// Non-feature lines pass through unchanged. For a feature line, the `ID`
/// and `Parent` attribute values are each replaced when (and only when)
/// they are keys in the mapping; both substitutions can apply to the same
/// line, e.g. a CDS whose own ID is unmapped but whose `Parent` is a
/// renamed mRNA. When a `dbxref` key is supplied, any line whose `ID` was
/// replaced gets a `Dbxref=<key>:<oldID>` clause appended, preserving the
/// old ID for traceability.
pub fn rewrite_ids(
    line: &str,
    minter: &IdMinter,
    dbxref: Option<&str>,
) -> Result<String, AnnotError> {
    let rec = match GffLine::parse(line)? {
        GffLine::Feature(rec) => rec,
        GffLine::Opaque(_) => return Ok(line.to_string()),
    };

    let mut out = line.to_string();
    if let Some(old_id) = rec.attributes.id.as_deref() {
        if let Some(new_id) = minter.new_id(old_id) {
            if let Some((_, vstart, vend)) = find_attr(&out, "ID") {
                out.replace_range(vstart..vend, new_id);
            }
            if let Some(key) = dbxref {
                out.push_str(";Dbxref=");
                out.push_str(key);
                out.push(':');
                out.push_str(old_id);
            }
        }
    }
    if let Some(old_parent) = rec.attributes.parent.as_deref() {
        if let Some(new_parent) = minter.new_id(old_parent) {
            if let Some((_, vstart, vend)) = find_attr(&out, "Parent") {
                out.replace_range(vstart..vend, new_parent);
            }
        }
    }
    Ok(out)
}

/// Removes every `Name=` clause from a feature line, together with any
/// semicolons immediately preceding it. Non-feature lines pass through
/// unchanged.
pub fn strip_name(line: &str) -> String {
    let Some(col) = attribute_column(line) else {
        return line.to_string();
    };
    let mut out = line.to_string();
    while let Some((cstart, _, vend)) = find_attr(&out, "Name") {
        let mut start = cstart;
        while start > col && out.as_bytes()[start - 1] == b';' {
            start -= 1;
        }
        out.replace_range(start..vend, "");
    }
    out
}

/// Removes the `ID=` clause (and its trailing semicolons) from lines whose
/// `type` field is exactly `exon`; exons do not need stable IDs
/// downstream. All other lines pass through unchanged.
pub fn strip_exon_id(line: &str) -> String {
    if feature_type(line) != Some("exon") {
        return line.to_string();
    }
    let mut out = line.to_string();
    while let Some((cstart, _, mut vend)) = find_attr(&out, "ID") {
        while vend < out.len() && out.as_bytes()[vend] == b';' {
            vend += 1;
        }
        out.replace_range(cstart..vend, "");
    }
    out
}

/// Rewrites the `ID` of CDS and UTR features as `<ParentID>.<label>`,
/// where the label shortens the feature type (`cds`, `utr`, `5putr`,
/// `3putr`).
///
/// Any feature type ending in `UTR` enters the deriver; an unrecognized
/// UTR-flavored type is a fatal [AnnotError::UnknownFeatureType], and a
/// matching line with no `Parent` attribute is a fatal
/// [AnnotError::MissingAttribute]. A matching line that carries no `ID=`
/// clause is left as-is; the deriver rewrites an existing clause, it never
/// invents one.
pub fn fix_cds_utr_id(line: &str) -> Result<String, AnnotError> {
    let Some(ftype) = feature_type(line) else {
        return Ok(line.to_string());
    };
    if ftype != "CDS" && !ftype.ends_with("UTR") {
        return Ok(line.to_string());
    }

    let label = match ftype {
        "five_prime_UTR" => "5putr",
        "three_prime_UTR" => "3putr",
        "UTR" => "utr",
        "CDS" => "cds",
        _ => return Err(AnnotError::UnknownFeatureType(ftype.to_string())),
    };

    let (_, pstart, pend) = find_attr(line, "Parent").ok_or_else(|| {
        AnnotError::MissingAttribute {
            feature_type: ftype.to_string(),
            attribute: "Parent",
        }
    })?;
    let new_id = format!("{}.{}", &line[pstart..pend], label);

    let mut out = line.to_string();
    if let Some((_, vstart, vend)) = find_attr(&out, "ID") {
        out.replace_range(vstart..vend, &new_id);
    }
    Ok(out)
}

/// Runs one line through the full output pipeline, in fixed order:
/// ID rewrite, optional name stripping, exon-ID stripping, CDS/UTR ID
/// derivation. Each stage's output feeds the next.
pub fn transform_line(
    line: &str,
    minter: &IdMinter,
    opts: &MintOptions,
) -> Result<String, AnnotError> {
    let mut out = rewrite_ids(line, minter, opts.dbxref.as_deref())?;
    if opts.strip_names {
        out = strip_name(&out);
    }
    out = strip_exon_id(&out);
    fix_cds_utr_id(&out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idfmt::IdFormat;

    fn minter_for(lines: &[&str]) -> IdMinter {
        IdMinter::new(lines, &IdFormat::default()).unwrap()
    }

    const MRNA: &str = "chr1\tmaker\tmRNA\t1000\t9000\t.\t+\t.\tID=abc123;Parent=gene007";

    #[test]
    fn test_rewrite_id_and_parent() {
        let minter = minter_for(&[MRNA]);
        assert_eq!(
            rewrite_ids(MRNA, &minter, None).unwrap(),
            "chr1\tmaker\tmRNA\t1000\t9000\t.\t+\t.\tID=MRNA1.1;Parent=GENE1",
        );
    }

    #[test]
    fn test_rewrite_parent_only() {
        // a CDS keeps its own (unmapped) ID but follows its renamed parent
        let minter = minter_for(&[MRNA]);
        let cds = "chr1\tmaker\tCDS\t1000\t2000\t.\t+\t0\tID=cds1;Parent=abc123";
        assert_eq!(
            rewrite_ids(cds, &minter, None).unwrap(),
            "chr1\tmaker\tCDS\t1000\t2000\t.\t+\t0\tID=cds1;Parent=MRNA1.1",
        );
    }

    #[test]
    fn test_rewrite_appends_dbxref() {
        let minter = minter_for(&[MRNA]);
        assert_eq!(
            rewrite_ids(MRNA, &minter, Some("old")).unwrap(),
            "chr1\tmaker\tmRNA\t1000\t9000\t.\t+\t.\tID=MRNA1.1;Parent=GENE1;Dbxref=old:abc123",
        );
    }

    #[test]
    fn test_unmapped_line_round_trips() {
        let minter = minter_for(&[MRNA]);
        for line in [
            "chr9\tmaker\tgene\t1\t100\t.\t-\t.\tID=other;note=untouched",
            "# comment line",
            "##gff-version 3",
            "",
        ] {
            assert_eq!(rewrite_ids(line, &minter, Some("old")).unwrap(), line);
        }
    }

    #[test]
    fn test_anchored_match_skips_lookalike_keys() {
        let minter = minter_for(&[MRNA]);
        // exon_ID and transcript_Parent must not be rewritten
        let line = "chr1\tmaker\tgene\t1\t100\t.\t+\t.\texon_ID=abc123;ID=gene007;transcript_Parent=gene007";
        assert_eq!(
            rewrite_ids(line, &minter, None).unwrap(),
            "chr1\tmaker\tgene\t1\t100\t.\t+\t.\texon_ID=abc123;ID=GENE1;transcript_Parent=gene007",
        );
    }

    #[test]
    fn test_strip_name_trailing() {
        let line = "chr1\tmaker\tgene\t1\t100\t.\t+\t.\tID=g1;Name=maker-g1";
        assert_eq!(
            strip_name(line),
            "chr1\tmaker\tgene\t1\t100\t.\t+\t.\tID=g1",
        );
    }

    #[test]
    fn test_strip_name_when_only_attribute() {
        let line = "chr1\tmaker\tgene\t1\t100\t.\t+\t.\tName=maker-g1";
        assert_eq!(strip_name(line), "chr1\tmaker\tgene\t1\t100\t.\t+\t.\t");
    }

    #[test]
    fn test_strip_name_leaves_non_features_alone() {
        assert_eq!(strip_name("# Name=of a tool"), "# Name=of a tool");
    }

    #[test]
    fn test_strip_exon_id() {
        let line = "chr1\tmaker\texon\t1\t50\t.\t+\t.\tID=exon55;Parent=MRNA1.1";
        assert_eq!(
            strip_exon_id(line),
            "chr1\tmaker\texon\t1\t50\t.\t+\t.\tParent=MRNA1.1",
        );
    }

    #[test]
    fn test_strip_exon_id_requires_exon_type() {
        // the type field decides, not the source column or attribute text
        let line = "chr1\texon\tgene\t1\t50\t.\t+\t.\tID=g1";
        assert_eq!(strip_exon_id(line), line);
        let line = "chr1\tmaker\tmRNA\t1\t50\t.\t+\t.\tID=t1;Parent=g1";
        assert_eq!(strip_exon_id(line), line);
    }

    #[test]
    fn test_fix_cds_id() {
        let line = "chr1\tmaker\tCDS\t1100\t1500\t.\t+\t0\tID=cds88;Parent=MRNA1.1";
        assert_eq!(
            fix_cds_utr_id(line).unwrap(),
            "chr1\tmaker\tCDS\t1100\t1500\t.\t+\t0\tID=MRNA1.1.cds;Parent=MRNA1.1",
        );
    }

    #[test]
    fn test_fix_utr_ids() {
        let cases = [
            ("five_prime_UTR", "5putr"),
            ("three_prime_UTR", "3putr"),
            ("UTR", "utr"),
        ];
        for (ftype, label) in cases {
            let line = format!(
                "chr1\tmaker\t{}\t1\t100\t.\t+\t.\tID=u1;Parent=MRNA1.1",
                ftype
            );
            assert_eq!(
                fix_cds_utr_id(&line).unwrap(),
                format!(
                    "chr1\tmaker\t{}\t1\t100\t.\t+\t.\tID=MRNA1.1.{};Parent=MRNA1.1",
                    ftype, label
                ),
            );
        }
    }

    #[test]
    fn test_fix_cds_utr_id_without_id_clause_is_noop() {
        let line = "chr1\tmaker\tCDS\t1\t100\t.\t+\t0\tParent=MRNA1.1";
        assert_eq!(fix_cds_utr_id(line).unwrap(), line);
    }

    #[test]
    fn test_unknown_utr_type_is_fatal() {
        let line = "chr1\tmaker\tweird_UTR\t1\t100\t.\t+\t.\tID=u1;Parent=MRNA1.1";
        assert_eq!(
            fix_cds_utr_id(line),
            Err(AnnotError::UnknownFeatureType("weird_UTR".to_string())),
        );
    }

    #[test]
    fn test_cds_without_parent_is_fatal() {
        let line = "chr1\tmaker\tCDS\t1\t100\t.\t+\t0\tID=cds1";
        assert_eq!(
            fix_cds_utr_id(line),
            Err(AnnotError::MissingAttribute {
                feature_type: "CDS".to_string(),
                attribute: "Parent",
            }),
        );
    }

    #[test]
    fn test_transform_line_pipeline_order() {
        let mrna = "chr1\tmaker\tmRNA\t1\t100\t.\t+\t.\tID=t1;Parent=g1;Name=t1-name";
        let exon = "chr1\tmaker\texon\t1\t50\t.\t+\t.\tID=e1;Parent=t1";
        let cds = "chr1\tmaker\tCDS\t10\t50\t.\t+\t0\tID=c1;Parent=t1";
        let minter = minter_for(&[mrna, exon, cds]);
        let opts = MintOptions::new(IdFormat::default(), Some("old".to_string()), true);

        assert_eq!(
            transform_line(mrna, &minter, &opts).unwrap(),
            "chr1\tmaker\tmRNA\t1\t100\t.\t+\t.\tID=MRNA1.1;Parent=GENE1;Dbxref=old:t1",
        );
        // the exon drops its ID but keeps the rewritten Parent
        assert_eq!(
            transform_line(exon, &minter, &opts).unwrap(),
            "chr1\tmaker\texon\t1\t50\t.\t+\t.\tParent=MRNA1.1",
        );
        // the CDS ID is derived from the already-rewritten parent
        assert_eq!(
            transform_line(cds, &minter, &opts).unwrap(),
            "chr1\tmaker\tCDS\t10\t50\t.\t+\t0\tID=MRNA1.1.cds;Parent=MRNA1.1",
        );
    }
}
