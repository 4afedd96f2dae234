use anyhow::{Context, Result};
use log::info;

use crate::document::Document;
use crate::evaluator::FilterEvaluator;
use crate::source::ReportSource;
use crate::store::ReportStore;
use crate::summary_command::RangeArgs;

/// `query`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct QueryArgs {
    #[clap(flatten)]
    range: RangeArgs,

    #[clap(
        short = 'q',
        long = "query",
        help = "Filter expression applied to the report document, repeatable (defaults to \".\")"
    )]
    queries: Vec<String>,
}

pub struct QueryCommand<'a, 's, S: ReportSource, E: FilterEvaluator> {
    store: &'a ReportStore<'s, S>,
    evaluator: &'a E,
}

impl<'a, 's, S: ReportSource, E: FilterEvaluator> QueryCommand<'a, 's, S, E> {
    /// 新しい`QueryCommand`を返す。
    ///
    /// # Arguments
    /// * `store` - 日報を読み込むためのストア
    /// * `evaluator` - フィルタ式を評価する外部コマンド
    pub fn new(store: &'a ReportStore<'s, S>, evaluator: &'a E) -> Self {
        Self { store, evaluator }
    }

    /// `query`サブコマンドの処理を行う。
    ///
    /// 期間内の日報と集計結果からなる文書に、フィルタ式を指定された順に適用した結果を返す。
    pub fn run(&self, query: QueryArgs) -> Result<Vec<String>> {
        let (since, until) = query.range.resolve()?;
        info!("Since: {}, Until: {}", since, until);

        let reports = self
            .store
            .list(&since, &until)
            .context("Failed to list reports")?;
        let document = Document::new(reports)
            .to_value()
            .context("Failed to build report document")?;

        let filters = if query.queries.is_empty() {
            vec![".".to_string()]
        } else {
            query.queries
        };
        filters
            .iter()
            .map(|filter| {
                self.evaluator
                    .evaluate(&document, filter)
                    .with_context(|| format!("Failed to evaluate filter: {}", filter))
            })
            .collect()
    }
}
