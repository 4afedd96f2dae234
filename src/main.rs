use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

mod aggregate;
mod config;
mod console;
mod daily_command;
mod datetime;
mod document;
mod duration;
mod evaluator;
mod locale;
mod logging;
mod parser;
mod query_command;
mod report;
mod source;
mod store;
mod summary_command;

use aggregate::aggregate;
use config::Config;
use console::{ConsoleMarkdownSummary, ConsolePresenter};
use daily_command::{DailyArgs, DailyCommand};
use evaluator::JqEvaluator;
use locale::Lang;
use query_command::{QueryArgs, QueryCommand};
use source::DirectorySource;
use store::ReportStore;
use summary_command::{SummaryArgs, SummaryCommand};

/// 日報を集計するためのCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- summary --since 2025-01-01 --until 2025-01-31
/// $ cargo run -- query --query '.aggregated.tasks | length'
/// $ cargo run -- daily --date 2025-01-03
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(
        long = "dir",
        global = true,
        help = "Directory containing YYYYMMDD.md reports (env: DAILYREPORT_DIR)"
    )]
    dir: Option<PathBuf>,

    #[clap(
        long = "lang",
        global = true,
        help = "Report language, ja or en (env: DAILYREPORT_LANG)",
        parse(try_from_str)
    )]
    lang: Option<Lang>,

    #[clap(short = 'v', long = "verbose", global = true, help = "Show debug logs")]
    verbose: bool,

    #[clap(subcommand)]
    subcommand: SubCommands,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    /// Show the summary of a single day
    Daily(DailyArgs),
    /// Show the summary of reports in a range
    Summary(SummaryArgs),
    /// Query reports in a range with jq filters
    Query(QueryArgs),
}

fn main() -> Result<()> {
    let args = Args::parse();

    logging::setup_logging(args.verbose)?;
    let config = Config::load(args.dir, args.lang).context("Failed to load config")?;
    let source = DirectorySource::new(&config.dir);
    info!("Report directory: {}", source.dir().display());
    let store = ReportStore::new(&source, &config.lang.keywords());

    let stdout = io::stdout();
    let mut writer = stdout.lock();
    match args.subcommand {
        SubCommands::Daily(daily) => {
            let reports = DailyCommand::new(&store).run(daily)?;
            let mut presenter = ConsoleMarkdownSummary::new(&mut writer, config.lang.labels());
            presenter.show_summary(&reports, &aggregate(&reports))?;
        }
        SubCommands::Summary(summary) => {
            let reports = SummaryCommand::new(&store).run(summary)?;
            let mut presenter = ConsoleMarkdownSummary::new(&mut writer, config.lang.labels());
            presenter.show_summary(&reports, &aggregate(&reports))?;
        }
        SubCommands::Query(query) => {
            let evaluator = JqEvaluator::default();
            for result in QueryCommand::new(&store, &evaluator).run(query)? {
                writeln!(writer, "{}", result).context("Failed to write query result")?;
            }
        }
    }

    Ok(())
}
