use crate::error::AnnotError;
use crate::gff_utils::is_rna_type;

/// One line of a GFF3 stream, classified by shape alone.
///
/// A line with exactly 9 tab-separated fields is a [GffLine::Feature];
/// everything else (comments, pragmas, blank lines) is a [GffLine::Opaque]
/// that passes through the pipeline untouched.
///
/// # Examples
///
/// ```
/// use annotid::record::GffLine;
///
/// let line = "chr1\tmaker\tmRNA\t1000\t9000\t.\t+\t.\tID=t1;Parent=g1";
/// let GffLine::Feature(rec) = GffLine::parse(line).unwrap() else {
///     panic!("expected a feature");
/// };
/// assert_eq!(rec.ftype, "mRNA");
/// assert_eq!(rec.attributes.parent.as_deref(), Some("g1"));
///
/// assert!(matches!(
///     GffLine::parse("# a comment").unwrap(),
///     GffLine::Opaque(_)
/// ));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GffLine {
    Feature(FeatureRecord),
    Opaque(String),
}

/// A structured view of a single GFF3 feature line.
///
/// Parsing is purely syntactic: `start`, `end`, and `score` are kept as raw
/// strings because nothing downstream ever computes on them, and keeping
/// them raw means the rewrite pass cannot perturb bytes it does not own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureRecord {
    pub seqid: String,
    pub source: String,
    pub ftype: String,
    pub start: String,
    pub end: String,
    pub score: String,
    pub strand: String,
    pub phase: String,
    pub attributes: Attributes,
}

/// The column-9 attribute mapping of a feature line.
///
/// The attributes the pipeline actually consults (`ID`, `Parent`, `Name`,
/// `Dbxref`) are typed fields, so required-attribute checks are static
/// presence checks; every other key lands in `extra` in input order.
/// A repeated key concatenates its values with `,` rather than overwriting,
/// preserving multi-value semantics such as multiple `Dbxref` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    pub id: Option<String>,
    pub parent: Option<String>,
    pub name: Option<String>,
    pub dbxref: Option<String>,
    pub extra: Vec<(String, String)>,
}

impl Attributes {
    /// Parses a `;`-separated list of `key=value` clauses.
    ///
    /// A clause without `=` (including the empty clause produced by a
    /// trailing `;`) is a fatal input error; corrupt attribute syntax has
    /// no recovery path.
    pub fn parse(field: &str) -> Result<Attributes, AnnotError> {
        let mut attrs = Attributes::default();
        for clause in field.split(';') {
            let Some((key, value)) = clause.split_once('=') else {
                return Err(AnnotError::MalformedAttribute(clause.to_string()));
            };
            attrs.insert(key, value);
        }
        Ok(attrs)
    }

    fn insert(&mut self, key: &str, value: &str) {
        let slot = match key {
            "ID" => &mut self.id,
            "Parent" => &mut self.parent,
            "Name" => &mut self.name,
            "Dbxref" => &mut self.dbxref,
            _ => {
                if let Some((_, existing)) = self.extra.iter_mut().find(|(k, _)| k == key) {
                    existing.push(',');
                    existing.push_str(value);
                } else {
                    self.extra.push((key.to_string(), value.to_string()));
                }
                return;
            }
        };
        match slot {
            Some(existing) => {
                existing.push(',');
                existing.push_str(value);
            }
            None => *slot = Some(value.to_string()),
        }
    }

    /// Looks up an attribute value by its GFF3 key.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "ID" => self.id.as_deref(),
            "Parent" => self.parent.as_deref(),
            "Name" => self.name.as_deref(),
            "Dbxref" => self.dbxref.as_deref(),
            _ => self
                .extra
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
        }
    }
}

impl GffLine {
    /// Parses one raw line into a tagged [GffLine].
    ///
    /// The only fatal condition is a malformed attribute clause on a
    /// 9-field line; a line of any other shape is opaque, never an error.
    pub fn parse(line: &str) -> Result<GffLine, AnnotError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 9 {
            return Ok(GffLine::Opaque(line.to_string()));
        }

        Ok(GffLine::Feature(FeatureRecord {
            seqid: fields[0].to_string(),
            source: fields[1].to_string(),
            ftype: fields[2].to_string(),
            start: fields[3].to_string(),
            end: fields[4].to_string(),
            score: fields[5].to_string(),
            strand: fields[6].to_string(),
            phase: fields[7].to_string(),
            attributes: Attributes::parse(fields[8])?,
        }))
    }
}

impl FeatureRecord {
    /// Returns `true` if this record is one of the RNA feature types that
    /// participate in gene grouping.
    pub fn is_rna(&self) -> bool {
        is_rna_type(&self.ftype)
    }
}
