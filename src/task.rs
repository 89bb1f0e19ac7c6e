use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::codec::Record;
use crate::error::StoreError;

/// On-disk and display format of `created_date`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Workflow column of a task. Any value may be set directly; the pipeline
/// order is only a display convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Pending,
    Progress,
    Done,
}

impl Status {
    /// All statuses in board order.
    pub const ALL: [Status; 3] = [Status::Pending, Status::Progress, Status::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Progress => "Progress",
            Status::Done => "Done",
        }
    }

    /// Next column on the board, staying on `Done`.
    pub fn next(self) -> Self {
        match self {
            Status::Pending => Status::Progress,
            Status::Progress | Status::Done => Status::Done,
        }
    }

    /// Label used by the report screen.
    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Progress => "In Progress",
            Status::Done => "Completed",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = StoreError;

    /// Exact, case-sensitive match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Status::Pending),
            "Progress" => Ok(Status::Progress),
            "Done" => Ok(Status::Done),
            other => Err(StoreError::InvalidStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub assigned_to: String,
    pub created_date: NaiveDate,
}

impl Task {
    pub fn created_date_str(&self) -> String {
        self.created_date.format(DATE_FORMAT).to_string()
    }
}

/// Candidate for [`TaskStore::add`](crate::task_store::TaskStore::add). The
/// store assigns the id; `status` is checked against [`Status`] there.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: String,
    pub assigned_to: String,
    /// `None` stamps today's local date.
    pub created_date: Option<NaiveDate>,
}

impl NewTask {
    pub(crate) fn into_task(self, id: u32, status: Status) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            status,
            assigned_to: self.assigned_to,
            created_date: self.created_date.unwrap_or_else(|| Local::now().date_naive()),
        }
    }
}

impl Record for Task {
    const HEADER: &'static str = "id,title,description,status,assignedTo,createdDate";
    const ARITY: usize = 6;

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.title.clone(),
            self.description.clone(),
            self.status.to_string(),
            self.assigned_to.clone(),
            self.created_date_str(),
        ]
    }

    fn from_fields(fields: &[&str]) -> Option<Self> {
        Some(Task {
            id: fields[0].trim().parse().ok()?,
            title: fields[1].to_string(),
            description: fields[2].to_string(),
            status: fields[3].parse().ok()?,
            assigned_to: fields[4].to_string(),
            created_date: NaiveDate::parse_from_str(fields[5], DATE_FORMAT).ok()?,
        })
    }
}
