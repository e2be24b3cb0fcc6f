#![deny(warnings)]

use kbest::config::EnumeratorConfig;
use kbest::io::{try_write_ranked, MatrixRead, OutputFormat};
use kbest::matrix::CostMatrix;
use kbest::random_models::generate_uniform;
use kbest::{AllTies, KBestEnumerator, RankedMatching};
use log::*;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;
use std::fs::{File, OpenOptions};
use std::io::{stdin, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "kbest-cli",
    about = "Enumerates the perfect matchings of a square cost matrix by non-decreasing cost."
)]
struct Opt {
    /// Input file with one whitespace separated row per line; `inf` forbids an entry.
    /// `stdin` if not specified.
    #[structopt(short, long, parse(from_os_str))]
    input: Option<PathBuf>,

    /// Output file. `stdout` if not specified.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Output format. 'pairs', 'columns'.
    #[structopt(short = "f", long, default_value = "pairs")]
    output_format: String,

    /// Maximum number of matchings to produce. All of them if not specified.
    #[structopt(short = "k", long = "count")]
    count: Option<usize>,

    /// Emit every matching tied with a subproblem's optimum, making the enumeration exhaustive
    /// for matrices with equal-cost matchings
    #[structopt(short, long)]
    ties: bool,

    /// Reduced costs up to this magnitude count as zero
    #[structopt(long, parse(try_from_str = parse_tolerance))]
    tolerance: Option<f64>,

    /// Largest accepted minimum reduced cost (relative to the largest finite entry) before the
    /// duals of the solver are considered broken
    #[structopt(long, parse(try_from_str = parse_tolerance))]
    degeneracy_tolerance: Option<f64>,

    /// Ignores the input and generates a uniform random n x n matrix with entries in [0, 1)
    #[structopt(short, long)]
    random: Option<usize>,

    /// Seed of the random matrix
    #[structopt(short, long, default_value = "1")]
    seed: u64,

    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[structopt(short, long, parse(from_occurrences))]
    verbose: usize,
}

fn main() -> std::io::Result<()> {
    let opt = Opt::from_args();
    kbest::log::build_logger_for_verbosity(LevelFilter::Warn, opt.verbose);

    let output_format = OutputFormat::from_str(&opt.output_format)
        .expect("Failed parsing 'output_format' parameter: ");

    let matrix = match (opt.random, &opt.input) {
        (Some(n), _) => {
            info!("Generate uniform matrix with n={} and seed {}", n, opt.seed);
            let mut gen = Pcg64Mcg::seed_from_u64(opt.seed);
            generate_uniform(&mut gen, n, 0.0..1.0)
        }
        (None, Some(path)) => {
            info!("Read file {:?}", path);
            CostMatrix::try_read_matrix(BufReader::new(File::open(path)?))?
        }
        (None, None) => {
            let stdin = stdin();
            CostMatrix::try_read_matrix(stdin.lock())?
        }
    };

    info!("Input matrix with n={}", matrix.len());

    let mut config = EnumeratorConfig::default();
    if let Some(tolerance) = opt.tolerance {
        config = config.with_admissible_tolerance(tolerance);
    }
    if let Some(tolerance) = opt.degeneracy_tolerance {
        config = config.with_degeneracy_tolerance(tolerance);
    }
    debug!("Using {:?}", config);

    let enumerator = KBestEnumerator::new(matrix).with_config(config);
    let ranked: Box<dyn Iterator<Item = RankedMatching>> = if opt.ties {
        Box::new(enumerator.with_tie_handler(AllTies).ranked())
    } else {
        Box::new(enumerator.ranked())
    };
    let ranked = ranked.take(opt.count.unwrap_or(usize::MAX));

    let start = Instant::now();
    let emitted = if let Some(path) = opt.output {
        let writer = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        output_result(BufWriter::new(writer), output_format, ranked)?
    } else {
        output_result(std::io::stdout().lock(), output_format, ranked)?
    };

    info!(
        "Emitted {} matchings in {}ms",
        emitted,
        start.elapsed().as_millis()
    );

    Ok(())
}

fn output_result<W: Write>(
    mut writer: W,
    format: OutputFormat,
    ranked: impl Iterator<Item = RankedMatching>,
) -> std::io::Result<usize> {
    let mut emitted = 0;
    for (rank, entry) in ranked.enumerate() {
        try_write_ranked(&mut writer, format, rank + 1, &entry)?;
        emitted += 1;
    }
    writer.flush()?;
    Ok(emitted)
}

fn parse_tolerance(value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(x) if x.is_finite() && x >= 0.0 => Ok(x),
        Ok(x) => Err(format!("'{}' is not a finite, non-negative tolerance.", x)),
        Err(e) => Err(format!("Cannot parse tolerance '{}': {}", value, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerance_values() {
        assert_eq!(parse_tolerance("1e-6"), Ok(1e-6));
        assert_eq!(parse_tolerance("0"), Ok(0.0));
        assert!(parse_tolerance("-1").is_err());
        assert!(parse_tolerance("inf").is_err());
        assert!(parse_tolerance("NaN").is_err());
        assert!(parse_tolerance("small").is_err());
    }

    #[test]
    fn invalid_tolerance_is_usage_error() {
        assert!(Opt::from_iter_safe(["kbest-cli", "--tolerance=-1"]).is_err());
        assert!(Opt::from_iter_safe(["kbest-cli", "--degeneracy-tolerance=nan"]).is_err());

        let args = ["kbest-cli", "--tolerance=0.5", "--degeneracy-tolerance=1e-3"];
        let opt = Opt::from_iter_safe(args).unwrap();
        assert_eq!(opt.tolerance, Some(0.5));
        assert_eq!(opt.degeneracy_tolerance, Some(1e-3));
    }
}
