use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;
use std::time::Instant;

/// Builds the logger using the environment variable 'RUST_LOG' to determine the log level. Uses the
/// passed in `level` if the environment variable is not set. Every line is prefixed with the time
/// elapsed since the logger was built.
pub fn build_logger_for_level(level: LevelFilter) {
    let start_time = Instant::now();

    let env = Env::default().default_filter_or(level.as_str());
    let mut builder = Builder::from_env(env);
    builder
        .format(move |buf, record| {
            let elapsed = start_time.elapsed().as_millis();
            writeln!(
                buf,
                "{:>6}.{:03} [{:<5}] {} - {}",
                elapsed / 1000,
                elapsed % 1000,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

/// Builds the logger using the environment variable 'RUST_LOG' to determine the log level. If the
/// environment variable is not set, the passed in `default_level` is increased by `verbosity` many
/// levels and the result is used as the log level.
pub fn build_logger_for_verbosity(default_level: LevelFilter, verbosity: usize) {
    build_logger_for_level(level_from_verbosity(default_level, verbosity));
}

fn level_from_verbosity(default_level: LevelFilter, verbosity: usize) -> LevelFilter {
    let levels = [
        LevelFilter::Off,
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
        LevelFilter::Trace,
    ];

    let default_index = levels
        .iter()
        .position(|&l| l == default_level)
        .unwrap_or(0);

    levels
        .get(default_index + verbosity)
        .copied()
        .unwrap_or(LevelFilter::Trace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(LevelFilter::Off, 5 => LevelFilter::Trace)]
    #[test_case(LevelFilter::Warn, 1 => LevelFilter::Info)]
    #[test_case(LevelFilter::Warn, 2 => LevelFilter::Debug)]
    #[test_case(LevelFilter::Error, 0 => LevelFilter::Error)]
    #[test_case(LevelFilter::Trace, 1 => LevelFilter::Trace)]
    #[test_case(LevelFilter::Info, 100 => LevelFilter::Trace)]
    fn verbosity(default: LevelFilter, verbosity: usize) -> LevelFilter {
        level_from_verbosity(default, verbosity)
    }
}
