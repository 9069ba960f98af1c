use std::{
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use verstamp::{
    describe::{iso_commit_date, parse_describe, DescribeInput},
    render, DescribeError, Pieces, Rendered, Style, DEFAULT_BRANCH,
};

#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Describe(#[from] DescribeError),

    #[error("Unable to read pieces from `{path}`: {source}")]
    Read { path: String, source: io::Error },

    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

/// Output options shared by every rendering subcommand.
#[derive(Args, Debug)]
struct OutputArgs {
    /// The version style to render.
    #[arg(short, long, value_enum, default_value_t = Style::default(), env = "VERSTAMP_STYLE")]
    style: Style,

    /// Print the whole result (version, full revision id, dirty, error, date) as JSON instead of
    /// only the version.
    #[arg(long)]
    json: bool,
}

/// Pieces given one flag at a time.
#[derive(Args, Debug)]
struct PiecesArgs {
    /// The closest tag. Omit when no tag is reachable.
    #[arg(short, long)]
    tag: Option<String>,

    /// Commits since the tag (or since the root commit, when untagged).
    #[arg(short, long, default_value_t = 0)]
    distance: u64,

    /// Abbreviated commit hash.
    #[arg(long, default_value = "")]
    short: String,

    /// Full commit hash.
    #[arg(long, default_value = "")]
    long: String,

    /// The working tree has uncommitted changes.
    #[arg(long)]
    dirty: bool,

    /// Current branch.
    #[arg(short, long, default_value = DEFAULT_BRANCH)]
    branch: String,

    /// HEAD is detached and no branch contains it. Branch-aware styles treat this like any
    /// non-default branch.
    #[arg(long, conflicts_with = "branch")]
    no_branch: bool,

    /// ISO-8601 commit date.
    #[arg(long)]
    date: Option<String>,

    /// Report that metadata could not be determined. The version will be `unknown`.
    #[arg(long)]
    error: Option<String>,
}

impl From<PiecesArgs> for Pieces {
    fn from(args: PiecesArgs) -> Self {
        Pieces {
            error: args.error,
            closest_tag: args.tag,
            distance: args.distance,
            dirty: args.dirty,
            short: args.short,
            long: args.long,
            date: args.date,
            branch: (!args.no_branch).then_some(args.branch),
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log more. Repeat for more detail (`-vv` debug, `-vvv` trace). `RUST_LOG` overrides this.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Renders a version from pieces given as flags
    Render {
        #[command(flatten)]
        pieces: PiecesArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Renders a version from captured `git describe --tags --dirty --always --long` output
    Describe {
        /// The describe output, e.g. `v1.2.3-4-gabc1234-dirty`
        #[arg(allow_hyphen_values = true)]
        describe: String,

        /// Full commit hash, from `git rev-parse HEAD`.
        #[arg(long, default_value = "")]
        full: String,

        /// Prefix that tags carry. It is removed from the rendered tag.
        #[arg(long, default_value = "", env = "VERSTAMP_TAG_PREFIX")]
        tag_prefix: String,

        /// Total commit count, from `git rev-list HEAD --count`. Used as the distance when no tag
        /// is reachable.
        #[arg(long)]
        commit_count: Option<u64>,

        /// Current branch.
        #[arg(short, long, default_value = DEFAULT_BRANCH)]
        branch: String,

        /// Commit date as printed by `git show -s --format=%ci HEAD`.
        #[arg(long, value_name = "RAW")]
        date: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Renders a version from a JSON pieces document
    ///
    /// The document uses hyphenated keys: `error`, `closest-tag`, `distance`, `dirty`, `short`,
    /// `long`, `date`, `branch`. Every key may be omitted.
    Pieces {
        /// The document to read, or `-` for stdin.
        #[arg(default_value = "-")]
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Lists the supported styles
    Styles,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    debug!(?cli, "parsed arguments");

    match do_work(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn log_level(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = log_level(verbose, quiet);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("verstamp={level}")));

    let res = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
    if let Err(e) = res {
        eprintln!("Failed to initialise logging: {e}");
    }
}

fn do_work(cli: Cli) -> Result<String, CliError> {
    match cli.command {
        Commands::Render { pieces, output } => emit(&pieces.into(), &output),
        Commands::Describe {
            describe,
            full,
            tag_prefix,
            commit_count,
            branch,
            date,
            output,
        } => {
            let date = date.as_deref().map(iso_commit_date).transpose()?;
            let pieces = match parse_describe(&DescribeInput {
                describe: &describe,
                full_revision: &full,
                tag_prefix: &tag_prefix,
                commit_count,
            }) {
                Ok(pieces) => pieces.with_branch(Some(branch)).with_date(date),
                // an unusable description renders as `unknown`, never as a made-up version
                Err(e) => {
                    warn!(error = %e, "describe output unusable");
                    Pieces::failed(e.to_string()).with_long(full.trim())
                }
            };
            emit(&pieces, &output)
        }
        Commands::Pieces { file, output } => emit(&read_pieces(&file)?, &output),
        Commands::Styles => Ok(Style::ALL
            .iter()
            .map(Style::name)
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

fn read_pieces(file: &Path) -> Result<Pieces, CliError> {
    let read_err = |source| CliError::Read {
        path: file.display().to_string(),
        source,
    };

    let text = if file == Path::new("-") {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map_err(read_err)?;
        text
    } else {
        fs::read_to_string(file).map_err(read_err)?
    };
    Ok(serde_json::from_str(&text)?)
}

fn emit(pieces: &Pieces, output: &OutputArgs) -> Result<String, CliError> {
    let rendered: Rendered = render(pieces, output.style);
    info!(style = %output.style, version = %rendered.version, "rendered");
    if output.json {
        Ok(serde_json::to_string_pretty(&rendered)?)
    } else {
        Ok(rendered.version)
    }
}
