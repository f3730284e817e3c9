//! Board state store.
//!
//! A board is one ordered task list per status code. Every operation
//! returns a new board and leaves the receiver untouched; apart from
//! [`Board::group_by_status`] none of them changes the total task count.

use kanban_core::{StatusCode, Task, TaskId};
use tracing::warn;

/// Errors from board operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// No column for this status
    #[error("unknown column: {0}")]
    UnknownColumn(StatusCode),

    /// Index past the end of a column
    #[error("index {index} out of range for column {status} of length {len}")]
    IndexOutOfRange {
        /// Column
        status: StatusCode,
        /// Requested index
        index: usize,
        /// Column length
        len: usize,
    },

    /// Task is not in the expected column
    #[error("task {task_id} not found in column {status}")]
    TaskNotFound {
        /// Task
        task_id: TaskId,
        /// Column searched
        status: StatusCode,
    },
}

/// Result type for board operations.
pub type Result<T> = std::result::Result<T, BoardError>;

/// One board column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Status shared by every task in the column
    pub status: StatusCode,

    /// Tasks in display order
    pub tasks: Vec<Task>,
}

/// Tasks grouped by status, in column order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Board {
    columns: Vec<Column>,
}

impl Board {
    /// Empty board with one column per status.
    pub fn with_columns(statuses: &[StatusCode]) -> Self {
        Self {
            columns: statuses
                .iter()
                .map(|status| Column {
                    status: status.clone(),
                    tasks: Vec::new(),
                })
                .collect(),
        }
    }

    /// Partition a flat task list by status. Tasks whose status is not one
    /// of `known` go to the first known column. With no known statuses the
    /// board is empty.
    pub fn group_by_status(tasks: Vec<Task>, known: &[StatusCode]) -> Self {
        let mut board = Self::with_columns(known);
        if board.columns.is_empty() {
            if !tasks.is_empty() {
                warn!("No status columns; {} tasks not placed", tasks.len());
            }
            return board;
        }
        for task in tasks {
            let slot = board
                .columns
                .iter()
                .position(|c| c.status == task.status)
                .unwrap_or(0);
            board.columns[slot].tasks.push(task);
        }
        board
    }

    /// All columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Tasks of one column.
    pub fn column(&self, status: &StatusCode) -> Option<&[Task]> {
        self.columns
            .iter()
            .find(|c| &c.status == status)
            .map(|c| c.tasks.as_slice())
    }

    /// Whether the board has a column for `status`.
    pub fn has_column(&self, status: &StatusCode) -> bool {
        self.column(status).is_some()
    }

    /// Ids of one column's tasks, in order.
    pub fn task_ids(&self, status: &StatusCode) -> Vec<TaskId> {
        self.column(status)
            .map(|tasks| tasks.iter().map(|t| t.id).collect())
            .unwrap_or_default()
    }

    /// Total number of tasks across all columns.
    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }

    /// Column and index of a task.
    pub fn locate(&self, task_id: TaskId) -> Option<(&StatusCode, usize)> {
        self.columns.iter().find_map(|c| {
            c.tasks
                .iter()
                .position(|t| t.id == task_id)
                .map(|index| (&c.status, index))
        })
    }

    /// A task anywhere on the board.
    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.columns
            .iter()
            .flat_map(|c| c.tasks.iter())
            .find(|t| t.id == task_id)
    }

    fn slot(&self, status: &StatusCode) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| &c.status == status)
            .ok_or_else(|| BoardError::UnknownColumn(status.clone()))
    }

    /// Move the task at `from` to `to` within one column. `to` past the end
    /// moves the task to the end.
    pub fn reorder_within_column(&self, status: &StatusCode, from: usize, to: usize) -> Result<Board> {
        let slot = self.slot(status)?;
        let len = self.columns[slot].tasks.len();
        if from >= len {
            return Err(BoardError::IndexOutOfRange {
                status: status.clone(),
                index: from,
                len,
            });
        }

        let mut next = self.clone();
        let tasks = &mut next.columns[slot].tasks;
        let task = tasks.remove(from);
        let to = to.min(tasks.len());
        tasks.insert(to, task);
        Ok(next)
    }

    /// Move a task from one column to another, inserting at `insert_index`
    /// (appending when `None` or past the end). The moved copy takes the
    /// destination status. When both columns are the same this is a reorder
    /// to `insert_index`, or to the end.
    pub fn move_across_columns(
        &self,
        task_id: TaskId,
        from: &StatusCode,
        to: &StatusCode,
        insert_index: Option<usize>,
    ) -> Result<Board> {
        let from_slot = self.slot(from)?;
        let to_slot = self.slot(to)?;
        let index = self.columns[from_slot]
            .tasks
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| BoardError::TaskNotFound {
                task_id,
                status: from.clone(),
            })?;

        if from_slot == to_slot {
            let end = self.columns[from_slot].tasks.len().saturating_sub(1);
            return self.reorder_within_column(from, index, insert_index.unwrap_or(end));
        }

        let mut next = self.clone();
        let task = next.columns[from_slot].tasks.remove(index);
        let moved = Task {
            status: to.clone(),
            ..task
        };
        let dest = &mut next.columns[to_slot].tasks;
        match insert_index {
            Some(i) if i < dest.len() => dest.insert(i, moved),
            _ => dest.push(moved),
        }
        Ok(next)
    }

    /// Replace one column's task list wholesale.
    pub fn replace_column(&self, status: &StatusCode, tasks: Vec<Task>) -> Result<Board> {
        let slot = self.slot(status)?;
        let mut next = self.clone();
        next.columns[slot].tasks = tasks;
        Ok(next)
    }

    /// Apply `edit` to one task wherever it sits.
    pub fn update_task(&self, task_id: TaskId, edit: impl FnOnce(&mut Task)) -> Option<Board> {
        let mut next = self.clone();
        let task = next
            .columns
            .iter_mut()
            .flat_map(|c| c.tasks.iter_mut())
            .find(|t| t.id == task_id)?;
        edit(task);
        Some(next)
    }
}
