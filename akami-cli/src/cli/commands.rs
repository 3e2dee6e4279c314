//! The `cluster` command: CSV ingestion, estimator configuration, and
//! summary rendering.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use akami_core::{
    Affinity, AgglomerativeBuilder, AgglomerativeError, ClusteringResult, Connectivity,
    DistanceMatrix, FeatureMatrix, Linkage, MatrixError,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use thiserror::Error;

const DEFAULT_N_CLUSTERS: usize = 2;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "akami", about = "Run hierarchical agglomerative clustering.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Cluster a CSV matrix and print the flat clustering.
    Cluster(ClusterCommand),
}

/// Options accepted by the `cluster` command.
#[derive(Debug, Args, Clone)]
pub struct ClusterCommand {
    /// Path to a CSV file: one sample per line, comma-separated values.
    /// With `--affinity precomputed` the file must hold a square symmetric
    /// distance matrix instead.
    pub path: PathBuf,

    /// Number of flat clusters to extract.
    #[arg(
        long = "clusters",
        default_value_t = DEFAULT_N_CLUSTERS,
        value_parser = clap::value_parser!(usize),
    )]
    pub clusters: usize,

    /// Linkage criterion.
    #[arg(long, value_enum, default_value_t = LinkageArg::Ward)]
    pub linkage: LinkageArg,

    /// Pairwise affinity.
    #[arg(long, value_enum, default_value_t = AffinityArg::Euclidean)]
    pub affinity: AffinityArg,

    /// Optional CSV edge list (`i,j` per line) constraining which samples
    /// may merge.
    #[arg(long)]
    pub connectivity: Option<PathBuf>,

    /// Stop tree construction once `--clusters` clusters remain instead of
    /// building the full hierarchy.
    #[arg(long = "no-full-tree")]
    pub no_full_tree: bool,

    /// Print one `index<TAB>cluster` line per sample after the summary.
    #[arg(long)]
    pub labels: bool,

    /// Override name for the data source (defaults to the file name).
    #[arg(long)]
    pub name: Option<String>,
}

/// Linkage criteria selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LinkageArg {
    /// Minimise the within-cluster variance increase (Euclidean only).
    Ward,
    /// Maximum pairwise distance between cluster members.
    Complete,
    /// Mean pairwise distance between cluster members.
    Average,
    /// Minimum pairwise distance between cluster members.
    Single,
}

impl From<LinkageArg> for Linkage {
    fn from(arg: LinkageArg) -> Self {
        match arg {
            LinkageArg::Ward => Self::Ward,
            LinkageArg::Complete => Self::Complete,
            LinkageArg::Average => Self::Average,
            LinkageArg::Single => Self::Single,
        }
    }
}

/// Affinities selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AffinityArg {
    /// Euclidean (L2) distance over raw features.
    Euclidean,
    /// Manhattan (L1) distance over raw features.
    Manhattan,
    /// Cosine distance over raw features.
    Cosine,
    /// The input file already holds pairwise distances.
    Precomputed,
}

impl From<AffinityArg> for Affinity {
    fn from(arg: AffinityArg) -> Self {
        match arg {
            AffinityArg::Euclidean => Self::Euclidean,
            AffinityArg::Manhattan => Self::Manhattan,
            AffinityArg::Cosine => Self::Cosine,
            AffinityArg::Precomputed => Self::Precomputed,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while loading an input file.
    #[error("failed to read `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// A CSV value or row could not be parsed.
    #[error("failed to parse `{path}` line {line}: {message}")]
    Parse {
        /// Path of the offending file.
        path: PathBuf,
        /// One-based line number of the offending row.
        line: usize,
        /// Description of what went wrong.
        message: String,
    },
    /// The parsed buffer did not form a valid matrix.
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    /// Core orchestration failed.
    #[error(transparent)]
    Core(#[from] AgglomerativeError),
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Name reported for the input matrix.
    pub data_source: String,
    /// Flat clustering produced by the estimator.
    pub result: ClusteringResult,
    /// Whether to render one label line per sample.
    pub show_labels: bool,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when parsing or execution fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use akami_cli::cli::{AffinityArg, Cli, ClusterCommand, Command, LinkageArg, run_cli};
/// # use tempfile::NamedTempFile;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let file = NamedTempFile::new()?;
/// std::fs::write(file.path(), "0.0,0.0\n0.1,0.0\n5.0,5.0\n5.1,5.0\n")?;
/// let cli = Cli {
///     command: Command::Cluster(ClusterCommand {
///         path: file.path().to_path_buf(),
///         clusters: 2,
///         linkage: LinkageArg::Ward,
///         affinity: AffinityArg::Euclidean,
///         connectivity: None,
///         no_full_tree: false,
///         labels: false,
///         name: None,
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert_eq!(summary.result.cluster_count(), 2);
/// # Ok(())
/// # }
/// ```
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Cluster(command) => cluster_command(command),
    }
}

pub(super) fn cluster_command(command: ClusterCommand) -> Result<ExecutionSummary, CliError> {
    let name = derive_data_source_name(&command.path, command.name.as_deref());
    let (values, dimension, rows) = load_csv_matrix(&command.path)?;

    let mut builder = AgglomerativeBuilder::new()
        .with_n_clusters(command.clusters)
        .with_linkage(command.linkage.into())
        .with_affinity(command.affinity.into())
        .with_compute_full_tree(!command.no_full_tree);
    if let Some(path) = &command.connectivity {
        builder = builder.with_connectivity(load_connectivity(path, rows)?);
    }
    let estimator = builder.build()?;

    let result = if command.affinity == AffinityArg::Precomputed {
        let matrix = DistanceMatrix::from_rows(name.clone(), values)?;
        estimator.fit_precomputed(&matrix)?
    } else {
        let matrix = FeatureMatrix::from_rows(name.clone(), values, dimension)?;
        estimator.fit(&matrix)?
    };

    Ok(ExecutionSummary {
        data_source: name,
        result,
        show_labels: command.labels,
    })
}

/// Parses a CSV file into a row-major buffer, returning the values, the row
/// width, and the row count. Blank lines are skipped; every remaining row
/// must have the width of the first.
pub(super) fn load_csv_matrix(path: &Path) -> Result<(Vec<f64>, usize, usize), CliError> {
    let contents = read_file(path)?;
    let mut values = Vec::new();
    let mut dimension = 0usize;
    let mut rows = 0usize;
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut width = 0usize;
        for field in line.split(',') {
            let value = field
                .trim()
                .parse::<f64>()
                .map_err(|err| CliError::Parse {
                    path: path.to_path_buf(),
                    line: index + 1,
                    message: format!("invalid number `{}`: {err}", field.trim()),
                })?;
            values.push(value);
            width += 1;
        }
        if rows == 0 {
            dimension = width;
        } else if width != dimension {
            return Err(CliError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
                message: format!("expected {dimension} values, found {width}"),
            });
        }
        rows += 1;
    }
    Ok((values, dimension, rows))
}

/// Parses a CSV edge list (`i,j` per line) into a [`Connectivity`] over
/// `rows` samples.
fn load_connectivity(path: &Path, rows: usize) -> Result<Connectivity, CliError> {
    let contents = read_file(path)?;
    let mut edges = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parse_endpoint = |field: &str| {
            field.trim().parse::<usize>().map_err(|err| CliError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
                message: format!("invalid node id `{}`: {err}", field.trim()),
            })
        };
        let Some((left, right)) = line.split_once(',') else {
            return Err(CliError::Parse {
                path: path.to_path_buf(),
                line: index + 1,
                message: "expected `i,j`".to_owned(),
            });
        };
        edges.push((parse_endpoint(left)?, parse_endpoint(right)?));
    }
    Connectivity::from_edges(rows, &edges).map_err(|error| {
        CliError::Core(AgglomerativeError::Linkage {
            data_source: path.display().to_string().into(),
            error,
        })
    })
}

fn read_file(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(super) fn derive_data_source_name(path: &Path, override_name: Option<&str>) -> String {
    if let Some(name) = override_name {
        return name.to_owned();
    }

    path.file_stem()
        .and_then(|value| value.to_str())
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| "matrix".to_owned())
}

/// Renders `summary` to `writer` in a human-readable text format.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    writeln!(writer, "data source: {}", summary.data_source)?;
    writeln!(writer, "clusters: {}", summary.result.cluster_count())?;

    let mut sizes = vec![0usize; summary.result.cluster_count()];
    for cluster in summary.result.assignments() {
        sizes[cluster.get()] += 1;
    }
    for (cluster, size) in sizes.iter().enumerate() {
        writeln!(writer, "cluster {cluster}: {size} samples")?;
    }

    if summary.show_labels {
        for (index, cluster) in summary.result.assignments().iter().enumerate() {
            writeln!(writer, "{index}\t{}", cluster.get())?;
        }
    }
    Ok(())
}
