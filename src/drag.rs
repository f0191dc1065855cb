//! Drop Resolution
//!
//! Turns a finished drag gesture into at most one board intent. Indices are
//! always recomputed from the current board by identity, never taken from
//! what the gesture saw when it started.

use crate::intent::BoardIntent;
use crate::models::Board;

/// What is being dragged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragSource {
    Task { task_id: u32, column_id: u32 },
    Column { column_id: u32 },
}

/// What the pointer is over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Task { task_id: u32, column_id: u32 },
    /// Column header or the empty surface below its cards
    Column { column_id: u32 },
}

impl DropTarget {
    pub fn column_id(&self) -> u32 {
        match self {
            DropTarget::Task { column_id, .. } | DropTarget::Column { column_id } => *column_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPlan {
    Noop,
    MoveTask { task_id: u32, from: u32, to: u32, index: usize },
    MoveColumn { column_id: u32, index: usize },
}

impl DragPlan {
    pub fn into_intent(self) -> Option<BoardIntent> {
        match self {
            DragPlan::Noop => None,
            DragPlan::MoveTask { task_id, to, index, .. } => Some(BoardIntent::MoveTask { task_id, to, index }),
            DragPlan::MoveColumn { column_id, index } => Some(BoardIntent::MoveColumn { column_id, index }),
        }
    }
}

pub fn resolve_drop(board: &Board, source: DragSource, target: Option<DropTarget>) -> DragPlan {
    let Some(target) = target else {
        return DragPlan::Noop;
    };
    match source {
        DragSource::Task { task_id, .. } => resolve_task_drop(board, task_id, target),
        DragSource::Column { column_id } => resolve_column_drop(board, column_id, target.column_id()),
    }
    .unwrap_or(DragPlan::Noop)
}

fn resolve_task_drop(board: &Board, task_id: u32, target: DropTarget) -> Option<DragPlan> {
    let from = board.column_of_task(task_id)?;
    let old = board.column(from)?.task_index(task_id)?;

    let (to, index) = match target {
        DropTarget::Task { task_id: over, .. } => {
            if over == task_id {
                return None;
            }
            let to = board.column_of_task(over)?;
            // Same column: take the target's slot. Other column: insert before it.
            (to, board.column(to)?.task_index(over)?)
        }
        DropTarget::Column { column_id } => {
            let len = board.column(column_id)?.tasks.len();
            let index = if column_id == from { len - 1 } else { len };
            (column_id, index)
        }
    };

    if to == from && index == old {
        return None;
    }
    Some(DragPlan::MoveTask { task_id, from, to, index })
}

fn resolve_column_drop(board: &Board, column_id: u32, over: u32) -> Option<DragPlan> {
    let old = board.column_index(column_id)?;
    let index = board.column_index(over)?;
    if old == index {
        return None;
    }
    Some(DragPlan::MoveColumn { column_id, index })
}
