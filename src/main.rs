use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use annotid::gff_utils::read_lines;
use annotid::minter::IdMinter;
use annotid::options::MintOptions;
use annotid::region::{fix_region_line, SequenceLengths};
use annotid::rewrite::transform_line;
use annotid::IdFormat;

#[derive(Parser)]
#[command(
    name = "annotid",
    version,
    about = "Mint clean IDs for GFF3 genome annotations and repair sequence-region pragmas"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create new IDs for gene and RNA features using the specified format
    Mint(MintArgs),
    /// Fix '##sequence-region' pragmas using sequence lengths from a FASTA file
    FixRegions(FixRegionsArgs),
}

#[derive(Args)]
struct MintArgs {
    /// printf-style format to use for creating new IDs; must accept a
    /// string (%s) and an unsigned integer (%d or %lu)
    #[arg(short = 'f', long = "idfmt", default_value = "%s%d")]
    idfmt: String,

    /// write the correspondence of new gene IDs to old gene IDs to the
    /// given file
    #[arg(short = 'g', long = "genemap")]
    genemap: Option<PathBuf>,

    /// remove names from all features; particularly useful when name
    /// attributes are uninformative, as is the case with Maker
    #[arg(short = 'n', long = "stripnames")]
    stripnames: bool,

    /// file to which output will be written; default is standard output
    #[arg(short = 'o', long = "outfile")]
    outfile: Option<PathBuf>,

    /// write the correspondence of new RNA IDs to old RNA IDs to the given
    /// file
    #[arg(short = 'r', long = "rnamap")]
    rnamap: Option<PathBuf>,

    /// use the 'Dbxref' attribute to store a copy of any ID that is
    /// replaced; the argument provided will serve as the Dbxref key
    #[arg(short = 'x', long = "dbxref")]
    dbxref: Option<String>,

    /// input GFF3 file, or '-' for standard input
    gff3: String,
}

#[derive(Args)]
struct FixRegionsArgs {
    /// FASTA file containing the annotated sequences
    fasta: PathBuf,

    /// input GFF3 file, or '-' for standard input
    #[arg(default_value = "-")]
    gff3: String,

    /// file to which output will be written; default is standard output
    #[arg(short = 'o', long = "outfile")]
    outfile: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Mint(args) => run_mint(args),
        Commands::FixRegions(args) => run_fix_regions(args),
    }
}

fn open_output(outfile: Option<&PathBuf>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match outfile {
        Some(path) => Box::new(BufWriter::new(File::create(path).with_context(|| {
            format!("failed to create output file {}", path.display())
        })?)),
        None => Box::new(BufWriter::new(io::stdout())),
    })
}

fn run_mint(args: MintArgs) -> anyhow::Result<()> {
    let id_format: IdFormat = args.idfmt.parse()?;
    let lines = read_lines(&args.gff3)?;

    // pass 1: scan the hierarchy and mint the full mapping before any
    // output is written
    let minter = IdMinter::new(&lines, &id_format)?;
    let opts = MintOptions::new(id_format, args.dbxref, args.stripnames);

    // pass 2: rewrite and emit every line in input order
    let mut out = open_output(args.outfile.as_ref())?;
    for line in &lines {
        writeln!(out, "{}", transform_line(line, &minter, &opts)?)?;
    }
    out.flush()?;

    if let Some(path) = &args.genemap {
        let mut map_out = BufWriter::new(File::create(path).with_context(|| {
            format!("failed to create gene map file {}", path.display())
        })?);
        minter.write_gene_map(&mut map_out)?;
        map_out.flush()?;
        info!("wrote gene map to {}", path.display());
    }
    if let Some(path) = &args.rnamap {
        let mut map_out = BufWriter::new(File::create(path).with_context(|| {
            format!("failed to create RNA map file {}", path.display())
        })?);
        minter.write_rna_map(&mut map_out)?;
        map_out.flush()?;
        info!("wrote RNA map to {}", path.display());
    }
    Ok(())
}

fn run_fix_regions(args: FixRegionsArgs) -> anyhow::Result<()> {
    let lengths = SequenceLengths::from_fasta(&args.fasta)?;
    let lines = read_lines(&args.gff3)?;

    let mut out = open_output(args.outfile.as_ref())?;
    for line in &lines {
        writeln!(out, "{}", fix_region_line(line, &lengths)?)?;
    }
    out.flush()?;
    Ok(())
}
