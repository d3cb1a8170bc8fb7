use std::collections::HashMap;
use std::io::Write;

use tracing::info;

use crate::error::AnnotError;
use crate::idfmt::IdFormat;
use crate::record::GffLine;

/// An RNA feature admitted to a gene group during the scan pass, with its
/// required attributes already validated and pulled out of the attribute
/// mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RnaRecord {
    pub id: String,
    pub ftype: String,
}

/// One gene and its RNA children, in the order they were first seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneGroup {
    pub gene_id: String,
    pub rnas: Vec<RnaRecord>,
}

/// The gene→RNA hierarchy implied by `Parent` references, built in one pass
/// over the buffered input.
///
/// Insertion order of both genes and RNA children is first-seen order in
/// the input stream; that order determines the numbering the minter
/// assigns, regardless of where each gene's own feature line sits relative
/// to its RNAs.
#[derive(Debug, Default)]
pub struct GeneGroups {
    groups: Vec<GeneGroup>,
    index: HashMap<String, usize>,
}

impl GeneGroups {
    /// Scans the full ordered set of input lines and groups RNA-type
    /// features (`mRNA`, `tRNA`, `rRNA`) by their `Parent` gene ID.
    ///
    /// Every RNA record must carry non-empty `ID` and `Parent` attributes;
    /// an RNA not linked to a gene is a hard input-format violation, not a
    /// recoverable condition.
    pub fn scan<S: AsRef<str>>(lines: &[S]) -> Result<GeneGroups, AnnotError> {
        let mut groups = GeneGroups::default();
        let mut n_features = 0usize;
        let mut n_opaque = 0usize;

        for line in lines {
            let rec = match GffLine::parse(line.as_ref())? {
                GffLine::Feature(rec) => {
                    n_features += 1;
                    rec
                }
                GffLine::Opaque(_) => {
                    n_opaque += 1;
                    continue;
                }
            };
            if !rec.is_rna() {
                continue;
            }

            let id = match rec.attributes.id.as_deref() {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => {
                    return Err(AnnotError::MissingAttribute {
                        feature_type: rec.ftype,
                        attribute: "ID",
                    })
                }
            };
            let parent = match rec.attributes.parent.as_deref() {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => {
                    return Err(AnnotError::MissingAttribute {
                        feature_type: rec.ftype,
                        attribute: "Parent",
                    })
                }
            };

            groups.push(parent, RnaRecord { id, ftype: rec.ftype });
        }

        info!(
            "scanned {} feature and {} opaque lines; found {} genes with {} RNA features",
            n_features,
            n_opaque,
            groups.groups.len(),
            groups.rna_count(),
        );
        Ok(groups)
    }

    fn push(&mut self, gene_id: String, rna: RnaRecord) {
        match self.index.get(&gene_id) {
            Some(&i) => self.groups[i].rnas.push(rna),
            None => {
                self.index.insert(gene_id.clone(), self.groups.len());
                self.groups.push(GeneGroup {
                    gene_id,
                    rnas: vec![rna],
                });
            }
        }
    }

    /// The gene groups in first-seen order.
    pub fn groups(&self) -> &[GeneGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn rna_count(&self) -> usize {
        self.groups.iter().map(|g| g.rnas.len()).sum()
    }
}

/// The completed old→new ID mapping for genes and RNA features.
///
/// Minting runs once, immediately after the scan; the mapping is then
/// consulted (never mutated) by the rewrite pass. Genes are numbered by a
/// monotonically increasing counter in group discovery order; each gene's
/// RNAs get a per-gene sibling counter starting at 1, so an RNA ID like
/// `MRNA4.2` stays traceable to its gene's number. Counters are never
/// reused across genes.
#[derive(Debug)]
pub struct IdMinter {
    new_ids: HashMap<String, String>,
    groups: GeneGroups,
}

impl IdMinter {
    /// Scans the buffered input and mints a new ID for every gene and RNA
    /// feature using the given format template.
    pub fn new<S: AsRef<str>>(lines: &[S], fmt: &IdFormat) -> Result<IdMinter, AnnotError> {
        let groups = GeneGroups::scan(lines)?;
        let rna_fmt = fmt.rna_format();

        let mut new_ids = HashMap::new();
        for (i, group) in groups.groups().iter().enumerate() {
            let gene_num = (i + 1) as u64;
            new_ids.insert(group.gene_id.clone(), fmt.render("GENE", &[gene_num]));

            for (j, rna) in group.rnas.iter().enumerate() {
                let label = rna.ftype.to_uppercase();
                new_ids.insert(
                    rna.id.clone(),
                    rna_fmt.render(&label, &[gene_num, (j + 1) as u64]),
                );
            }
        }

        info!("minted {} replacement IDs", new_ids.len());
        Ok(IdMinter { new_ids, groups })
    }

    /// Looks up the minted replacement for an old ID, if there is one.
    pub fn new_id(&self, old_id: &str) -> Option<&str> {
        self.new_ids.get(old_id).map(String::as_str)
    }

    /// The gene groups the mapping was minted from.
    pub fn gene_groups(&self) -> &GeneGroups {
        &self.groups
    }

    /// Writes the new-gene-ID to old-gene-ID table, one tab-separated row
    /// per gene in discovery order.
    pub fn write_gene_map<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        for group in self.groups.groups() {
            if let Some(new_id) = self.new_id(&group.gene_id) {
                writeln!(out, "{}\t{}", new_id, group.gene_id)?;
            }
        }
        Ok(())
    }

    /// Writes the new-RNA-ID to old-RNA-ID table, grouped by gene then RNA
    /// discovery order.
    pub fn write_rna_map<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        for group in self.groups.groups() {
            for rna in &group.rnas {
                if let Some(new_id) = self.new_id(&rna.id) {
                    writeln!(out, "{}\t{}", new_id, rna.id)?;
                }
            }
        }
        Ok(())
    }
}
