use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::codec;
use crate::error::{Result, StoreError};
use crate::task::{NewTask, Status, Task};

/// Tasks held in memory and mirrored to a delimited file.
///
/// Reads come from the cache. Every mutation rewrites the file before it
/// returns; if the write fails the cache is put back the way it was.
#[derive(Debug)]
pub struct TaskStore {
    path: PathBuf,
    tasks: Vec<Task>,
    next_id: u32,
    skipped: usize,
}

impl TaskStore {
    /// Open the store at `path`, creating a header-only file if it is missing.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let mut store = Self { path: path.into(), tasks: Vec::new(), next_id: 1, skipped: 0 };
        store.load()?;
        Ok(store)
    }

    /// Reload the cache from disk and reseed the id counter.
    pub fn load(&mut self) -> Result<()> {
        if codec::create_table::<Task>(&self.path, &[])? {
            info!(path = %self.path.display(), "created task file");
            self.tasks.clear();
            self.next_id = 1;
            self.skipped = 0;
            return Ok(());
        }

        let mut table = codec::read_table::<Task>(&self.path)?;
        // An id with no successor would leave the counter nowhere to go.
        let before = table.rows.len();
        table.rows.retain(|t| t.id < u32::MAX);
        table.skipped += before - table.rows.len();
        if table.skipped > 0 {
            warn!(skipped = table.skipped, path = %self.path.display(), "skipped malformed task lines");
        }
        self.next_id = table
            .rows
            .iter()
            .map(|t| t.id)
            .max()
            .and_then(|max| max.checked_add(1))
            .unwrap_or(1);
        self.tasks = table.rows;
        self.skipped = table.skipped;
        debug!(count = self.tasks.len(), next_id = self.next_id, "loaded tasks");
        Ok(())
    }

    /// Write the whole cache back to disk.
    pub fn save(&self) -> Result<()> {
        codec::write_table(&self.path, &self.tasks).inspect_err(|e| {
            warn!(error = %e, "failed to save tasks");
        })
    }

    /// Validate the status, assign the next id and persist. Returns the stored task.
    ///
    /// `u32::MAX` is never assigned; once the counter reaches it every `add`
    /// fails with [`StoreError::IdsExhausted`].
    pub fn add(&mut self, candidate: NewTask) -> Result<Task> {
        let status: Status = candidate.status.parse()?;
        let following = self.next_id.checked_add(1).ok_or(StoreError::IdsExhausted)?;
        let task = candidate.into_task(self.next_id, status);

        self.tasks.push(task.clone());
        if let Err(e) = self.save() {
            self.tasks.pop();
            return Err(e);
        }
        self.next_id = following;
        info!(id = task.id, status = %task.status, "added task");
        Ok(task)
    }

    /// Replace the task with the same id, every field included.
    pub fn update(&mut self, task: Task) -> Result<()> {
        let index = self.position(task.id)?;
        let previous = std::mem::replace(&mut self.tasks[index], task);
        if let Err(e) = self.save() {
            self.tasks[index] = previous;
            return Err(e);
        }
        info!(id = self.tasks[index].id, status = %self.tasks[index].status, "updated task");
        Ok(())
    }

    /// Remove the task with `id`. The id is never handed out again.
    pub fn delete(&mut self, id: u32) -> Result<()> {
        let index = self.position(id)?;
        let removed = self.tasks.remove(index);
        if let Err(e) = self.save() {
            self.tasks.insert(index, removed);
            return Err(e);
        }
        info!(id, "deleted task");
        Ok(())
    }

    pub fn get_by_id(&self, id: u32) -> Option<Task> {
        self.tasks.iter().find(|t| t.id == id).cloned()
    }

    /// Snapshot of every task in file order.
    pub fn get_all(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    pub fn get_by_status(&self, status: Status) -> Vec<Task> {
        self.tasks.iter().filter(|t| t.status == status).cloned().collect()
    }

    pub fn get_by_assignee(&self, username: &str) -> Vec<Task> {
        self.tasks.iter().filter(|t| t.assigned_to == username).cloned().collect()
    }

    pub fn count_by_status(&self, status: Status) -> usize {
        self.tasks.iter().filter(|t| t.status == status).count()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Id the next `add` will assign.
    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    /// Lines dropped by the last load.
    pub fn skipped_lines(&self) -> usize {
        self.skipped
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn position(&self, id: u32) -> Result<usize> {
        self.tasks.iter().position(|t| t.id == id).ok_or(StoreError::TaskNotFound(id))
    }
}
