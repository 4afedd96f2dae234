use std::collections::HashMap;

use crate::report::{AggregatedReport, Report, Task};

/// 日報のタスクを`(project, description)`ごとに集計する。
///
/// 見積もりと実績は合計し、完了状態はいずれかの日に完了していれば完了とする。
/// 結果の順序は各タスクが最初に現れた順とするため、`reports`は日付順に渡すこと。
pub fn aggregate(reports: &[Report]) -> AggregatedReport {
    aggregate_tasks(reports.iter().flat_map(|report| report.tasks.iter()))
}

/// タスクの列を`(project, description)`ごとに集計する。
pub fn aggregate_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> AggregatedReport {
    let mut index: HashMap<(&str, &str), usize> = HashMap::new();
    let mut aggregated: Vec<Task> = Vec::new();

    for task in tasks {
        let key = (task.project.as_str(), task.description.as_str());
        match index.get(&key) {
            Some(&i) => {
                let entry = &mut aggregated[i];
                entry.estimated_duration = entry.estimated_duration + task.estimated_duration;
                entry.actual_duration = entry.actual_duration + task.actual_duration;
                entry.completed |= task.completed;
            }
            None => {
                index.insert(key, aggregated.len());
                aggregated.push(task.clone());
            }
        }
    }

    AggregatedReport { tasks: aggregated }
}
