//! Periodic task scheduler.
//!
//! Each runtime thread owns a [`Scheduler`] holding the periodic tasks it
//! is responsible for.  The thread sleeps for [`Scheduler::next_due_ms`],
//! advances the scheduler by the time that actually elapsed, and the
//! scheduler notifies a [`SchedulerDelegate`] for every task that came due.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  evaluation thread            signaling thread               │
//! │  ┌──────────┐ ┌────────────┐  ┌──────────┐                   │
//! │  │ Evaluate │ │Diagnostics │  │  Signal  │                   │
//! │  │  2000 ms │ │  5000 ms   │  │ 1000 ms  │                   │
//! │  └────┬─────┘ └─────┬──────┘  └────┬─────┘                   │
//! │       ▼             ▼              ▼                         │
//! │  ┌────────────────────────┐   ┌──────────────────────┐       │
//! │  │ SchedulerDelegate      │   │ SchedulerDelegate    │       │
//! │  │ AppService tick/report │   │ AlertSignaler.drive  │       │
//! │  └────────────────────────┘   └──────────────────────┘       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! A late tick fires a task once and keeps its phase; missed periods are
//! not replayed.

use crate::app::ports::{SchedulerDelegate, TaskKind};
use log::{info, warn};

/// Maximum number of tasks per scheduler (stack-allocated).
const MAX_TASKS: usize = 4;

/// A periodic task definition.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicTask {
    /// Human-readable label (e.g., "evaluate").
    pub label: &'static str,
    pub kind: TaskKind,
    pub interval_ms: u32,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy)]
struct TaskEntry {
    task: PeriodicTask,
    elapsed_ms: u32,
}

/// The scheduler engine.
///
/// Decoupled from threads and hardware: when a task is due it invokes the
/// [`SchedulerDelegate`] callback.
pub struct Scheduler {
    tasks: [Option<TaskEntry>; MAX_TASKS],
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            tasks: [None; MAX_TASKS],
        }
    }

    /// Add a task.  Returns the slot index, or `None` if full or the
    /// interval is zero.
    pub fn add(&mut self, task: PeriodicTask) -> Option<usize> {
        if task.interval_ms == 0 {
            warn!("Scheduler: rejected '{}' with zero interval", task.label);
            return None;
        }
        let (i, slot) = self
            .tasks
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())?;
        info!(
            "Scheduler: added '{}' every {} ms at slot {}",
            task.label, task.interval_ms, i
        );
        *slot = Some(TaskEntry {
            task,
            elapsed_ms: 0,
        });
        Some(i)
    }

    /// Remove a task by slot index.
    pub fn remove(&mut self, slot: usize) {
        if let Some(entry) = self.tasks.get_mut(slot) {
            if let Some(e) = entry.take() {
                info!("Scheduler: removed '{}' from slot {}", e.task.label, slot);
            }
        }
    }

    /// Enable or disable one task.  A re-enabled task starts a fresh period.
    pub fn set_enabled(&mut self, slot: usize, enabled: bool) {
        if let Some(Some(entry)) = self.tasks.get_mut(slot) {
            entry.task.enabled = enabled;
            entry.elapsed_ms = 0;
        }
    }

    /// Advance every enabled task by `delta_ms` and fire those now due.
    pub fn tick(&mut self, delta_ms: u32, delegate: &mut dyn SchedulerDelegate) {
        for entry in self.tasks.iter_mut().flatten() {
            if !entry.task.enabled {
                continue;
            }
            entry.elapsed_ms = entry.elapsed_ms.saturating_add(delta_ms);
            if entry.elapsed_ms >= entry.task.interval_ms {
                if entry.elapsed_ms >= entry.task.interval_ms.saturating_mul(2) {
                    log::debug!(
                        "Scheduler: '{}' late by {} ms",
                        entry.task.label,
                        entry.elapsed_ms - entry.task.interval_ms
                    );
                }
                entry.elapsed_ms %= entry.task.interval_ms;
                delegate.on_task_due(entry.task.label, entry.task.kind);
            }
        }
    }

    /// Milliseconds until the next enabled task is due, or `None` if idle.
    pub fn next_due_ms(&self) -> Option<u32> {
        self.tasks
            .iter()
            .flatten()
            .filter(|e| e.task.enabled)
            .map(|e| e.task.interval_ms.saturating_sub(e.elapsed_ms))
            .min()
    }

    /// Number of enabled tasks.
    pub fn active_count(&self) -> usize {
        self.tasks
            .iter()
            .flatten()
            .filter(|e| e.task.enabled)
            .count()
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
