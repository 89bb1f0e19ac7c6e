use serde::Serialize;
use std::collections::HashMap;

use crate::task::Status;
use crate::task_store::TaskStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: Status,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssigneeCount {
    pub assignee: String,
    pub count: usize,
    /// Share of the busiest assignee's count, 0-100.
    pub bar_percent: usize,
}

/// Aggregates shown on the report screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub by_status: Vec<StatusCount>,
    pub total: usize,
    pub active: usize,
    /// Done tasks as a whole percentage of all tasks, 0 when there are none.
    pub completion_rate: usize,
    pub members: usize,
    pub by_assignee: Vec<AssigneeCount>,
}

impl Report {
    pub fn build(store: &TaskStore) -> Self {
        let by_status: Vec<StatusCount> = Status::ALL
            .iter()
            .map(|&status| StatusCount { status, count: store.count_by_status(status) })
            .collect();

        let total = store.len();
        let done = store.count_by_status(Status::Done);
        let completion_rate = if total > 0 { done * 100 / total } else { 0 };

        let mut counts: HashMap<String, usize> = HashMap::new();
        for task in store.get_all() {
            *counts.entry(task.assigned_to).or_default() += 1;
        }
        let max = counts.values().copied().max().unwrap_or(1);
        let mut by_assignee: Vec<AssigneeCount> = counts
            .into_iter()
            .map(|(assignee, count)| AssigneeCount { assignee, count, bar_percent: count * 100 / max })
            .collect();
        by_assignee.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.assignee.cmp(&b.assignee)));

        Self {
            by_status,
            total,
            active: total - done,
            completion_rate,
            members: by_assignee.len(),
            by_assignee,
        }
    }

    pub fn count(&self, status: Status) -> usize {
        self.by_status.iter().find(|s| s.status == status).map_or(0, |s| s.count)
    }
}
