use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use either::Either;
use tracing_subscriber::EnvFilter;

use flexjson::answers::read_answers;
use flexjson::generate::{self, Method};
use flexjson::haversine::{pairs_from_value, EARTH_RADIUS_KM};
use flexjson::profile::Profiler;
use flexjson::Lexer;

#[derive(Parser)]
#[command(name = "flexjson", version, about = "Generate and process haversine coordinate-pair JSON")]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write data_<N>_flex.json and data_<N>_haveranswer.json.
    Generate {
        #[arg(value_enum)]
        method: Method,
        seed: u64,
        pair_count: u64,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Parse a pairs document and report the mean haversine distance.
    Process {
        /// JSON file to read, or `-` for stdin.
        input: PathBuf,
        /// Binary answer file to check the result against.
        #[arg(long)]
        answers: Option<PathBuf>,
        #[arg(long, default_value_t = EARTH_RADIUS_KM)]
        radius: f64,
        /// Write a Chrome trace of the processing phases to this file.
        #[arg(long)]
        profile: Option<PathBuf>,
    },
    /// Print the token stream of a file, one token per line.
    Tokens {
        /// JSON file to read, or `-` for stdin.
        input: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn open_input(path: &Path) -> anyhow::Result<impl Read> {
    if path == Path::new("-") {
        return Ok(Either::Right(io::stdin()));
    }
    let file = File::open(path).with_context(|| format!("could not open {}", path.display()))?;
    Ok(Either::Left(file))
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    let mut text = String::new();
    open_input(path)?
        .read_to_string(&mut text)
        .with_context(|| format!("could not read {}", path.display()))?;
    Ok(text)
}

fn run_generate(method: Method, seed: u64, pair_count: u64, out_dir: &Path) -> anyhow::Result<()> {
    let config = generate::Config {
        method,
        seed,
        pair_count,
    };
    let output = generate::generate_files(&config, out_dir)?;
    let summary = output.summary;

    println!("Method: {}", summary.method.name());
    println!("Random seed: {}", summary.seed);
    println!("Pair count: {}", summary.pair_count);
    println!("Expected sum: {:.16}", summary.expected_mean);
    Ok(())
}

fn run_process(
    input: &Path,
    answers: Option<&Path>,
    radius: f64,
    profile: Option<&Path>,
) -> anyhow::Result<()> {
    let profiler = Profiler::new();

    let text = profiler.time("read", || read_input(input))?;
    let root = profiler
        .time("parse", || flexjson::parse(&text))
        .with_context(|| format!("could not parse {}", input.display()))?;
    let pairs = profiler.time("pairs", || pairs_from_value(&root))?;
    let mean = profiler.time("sum", || pairs.mean_distance(radius));

    println!("Found {} pairs", pairs.len());
    println!("Mean haversine distance: {:.16}", mean);

    if let Some(path) = answers {
        let bytes = std::fs::read(path).with_context(|| format!("could not read {}", path.display()))?;
        let expected = read_answers(&bytes).with_context(|| format!("bad answer file {}", path.display()))?;
        if expected.distances.len() != pairs.len() {
            tracing::warn!(
                expected = expected.distances.len(),
                found = pairs.len(),
                "pair count differs from answer file"
            );
        }
        println!("Expected mean: {:.16}", expected.mean);
        println!("Difference: {:.16}", mean - expected.mean);
    }

    if let Some(path) = profile {
        let file = File::create(path).with_context(|| format!("could not create {}", path.display()))?;
        let mut w = BufWriter::new(file);
        profiler.write_trace("process", &mut w)?;
        w.flush()?;
        tracing::info!(path = %path.display(), "wrote profile trace");
    }
    Ok(())
}

fn run_tokens(input: &Path) -> anyhow::Result<()> {
    let text = read_input(input)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut lexer = Lexer::new(&text);
    loop {
        let token = lexer.next_token()?;
        writeln!(out, "{:?}\t{}", token.kind, token.text)?;
        if token.is(flexjson::TokenKind::EndOfInput) {
            break;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Generate {
            method,
            seed,
            pair_count,
            out_dir,
        } => {
            if !out_dir.is_dir() {
                bail!("output directory {} does not exist", out_dir.display());
            }
            run_generate(method, seed, pair_count, &out_dir)
        }
        Command::Process {
            input,
            answers,
            radius,
            profile,
        } => run_process(&input, answers.as_deref(), radius, profile.as_deref()),
        Command::Tokens { input } => run_tokens(&input),
    }
}
