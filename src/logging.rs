use std::env;
use std::io;

use anyhow::{Context, Result};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;

/// ログの出力先を標準エラー出力に設定する。
///
/// レベルは`RUST_LOG`が優先され、未指定の場合は`verbose`なら`Debug`、そうでなければ`Info`とする。
pub fn setup_logging(verbose: bool) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue);

    fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{} {} {}] {}",
                Local::now().format("%H:%M:%S"),
                colors.color(record.level()),
                record.target(),
                message
            ))
        })
        .level(level(env::var("RUST_LOG").ok().as_deref(), verbose))
        .chain(io::stderr())
        .apply()
        .context("Failed to initialize logger")?;

    Ok(())
}

fn level(rust_log: Option<&str>, verbose: bool) -> LevelFilter {
    match rust_log.and_then(|value| value.parse::<LevelFilter>().ok()) {
        Some(level) => level,
        None if verbose => LevelFilter::Debug,
        None => LevelFilter::Info,
    }
}

#[cfg(test)]
mod tests {
    use log::LevelFilter;
    use rstest::rstest;

    use super::level;

    #[rstest]
    #[case::default(None, false, LevelFilter::Info)]
    #[case::verbose(None, true, LevelFilter::Debug)]
    #[case::rust_log(Some("warn"), true, LevelFilter::Warn)]
    #[case::invalid_rust_log(Some("loud"), false, LevelFilter::Info)]
    fn test_level(
        #[case] rust_log: Option<&str>,
        #[case] verbose: bool,
        #[case] expected: LevelFilter,
    ) {
        assert_eq!(level(rust_log, verbose), expected);
    }
}
