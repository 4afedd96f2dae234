use std::collections::HashMap;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::Duration;

use crate::duration::hours;
use crate::locale::Labels;
use crate::report::{AggregatedReport, Report, Task};

/// Consoleに日報の集計結果を表示するためのtrait。
pub trait ConsolePresenter {
    /// 集計結果を表示する。
    ///
    /// # Arguments
    ///
    /// * `reports` - 集計対象の日報
    /// * `aggregated` - `reports`のタスクを集計した結果
    fn show_summary(&mut self, reports: &[Report], aggregated: &AggregatedReport) -> Result<()>;
}

/// 集計結果をMarkdownのlist形式で表示する。
pub struct ConsoleMarkdownSummary<'a, W: Write> {
    writer: &'a mut W,
    labels: Labels,
}

/// プロジェクトごとにまとめたタスク。
struct ProjectGroup<'t> {
    project: &'t str,
    tasks: Vec<&'t Task>,
}

impl<'a, W: Write> ConsoleMarkdownSummary<'a, W> {
    /// 新しい`ConsoleMarkdownSummary`を返す。
    pub fn new(writer: &'a mut W, labels: Labels) -> Self {
        Self { writer, labels }
    }
}

impl<'a, W: Write> ConsolePresenter for ConsoleMarkdownSummary<'a, W> {
    // サマリーを出力した後、プロジェクトとその配下のタスクを出現順に出力する。
    fn show_summary(&mut self, reports: &[Report], aggregated: &AggregatedReport) -> Result<()> {
        let labels = self.labels;
        let working = sum(reports.iter().map(|report| report.attendance.working_duration));
        let estimated = sum(aggregated.tasks.iter().map(|task| task.estimated_duration));
        let actual = sum(aggregated.tasks.iter().map(|task| task.actual_duration));

        write!(
            self.writer,
            "# {}\n\n- {} : {} days\n- {} : {:.2} h\n- {} : {:.2} h\n- {} : {:.2} h\n\n# {}\n\n",
            labels.summary,
            labels.days,
            reports.len(),
            labels.working_hours,
            hours(working),
            labels.estimated,
            hours(estimated),
            labels.actual,
            hours(actual),
            labels.tasks,
        )
        .context("Failed to write summary")?;

        for group in group_by_project(&aggregated.tasks) {
            let completed = group.tasks.iter().all(|task| task.completed);
            let estimated = sum(group.tasks.iter().map(|task| task.estimated_duration));
            let actual = sum(group.tasks.iter().map(|task| task.actual_duration));
            writeln!(
                self.writer,
                "- {} {:.2}h / {:.2}h {}",
                checkbox(completed),
                hours(estimated),
                hours(actual),
                group.project
            )
            .with_context(|| format!("Failed to write project: {}", group.project))?;

            for task in group.tasks {
                writeln!(
                    self.writer,
                    "  - {} {:.2}h / {:.2}h {}",
                    checkbox(task.completed),
                    hours(task.estimated_duration),
                    hours(task.actual_duration),
                    task.description
                )
                .with_context(|| format!("Failed to write task: {:?}", task))?;
            }
        }

        Ok(())
    }
}

/// タスクをプロジェクトごとにまとめる。プロジェクトの順序は最初に現れた順とする。
fn group_by_project(tasks: &[Task]) -> Vec<ProjectGroup<'_>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<ProjectGroup<'_>> = Vec::new();

    for task in tasks {
        let project = task.project.as_str();
        let i = *index.entry(project).or_insert_with(|| {
            groups.push(ProjectGroup {
                project,
                tasks: Vec::new(),
            });
            groups.len() - 1
        });
        groups[i].tasks.push(task);
    }

    groups
}

fn sum(durations: impl Iterator<Item = Duration>) -> Duration {
    durations.fold(Duration::zero(), |total, duration| total + duration)
}

fn checkbox(completed: bool) -> &'static str {
    if completed {
        "[x]"
    } else {
        "[ ]"
    }
}
