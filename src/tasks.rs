//! Calendar tasks, kept only in process memory: they vanish on restart,
//! matching the client-held task list they replace.

use crate::models::{Task, TaskPriority};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct TaskBoard {
    days: BTreeMap<NaiveDate, Vec<Task>>,
}

impl TaskBoard {
    pub fn add(&mut self, date: NaiveDate, text: String, priority: TaskPriority) -> Task {
        let task = Task {
            id: Uuid::new_v4(),
            text,
            completed: false,
            priority,
            date,
        };
        self.days.entry(date).or_default().push(task.clone());
        task
    }

    pub fn toggle(&mut self, date: NaiveDate, id: Uuid) -> Option<Task> {
        let task = self
            .days
            .get_mut(&date)?
            .iter_mut()
            .find(|task| task.id == id)?;
        task.completed = !task.completed;
        Some(task.clone())
    }

    pub fn remove(&mut self, date: NaiveDate, id: Uuid) -> Option<Task> {
        let tasks = self.days.get_mut(&date)?;
        let position = tasks.iter().position(|task| task.id == id)?;
        Some(tasks.remove(position))
    }

    /// The day's tasks, highest priority first and, within a priority,
    /// incomplete before completed.
    pub fn for_date(&self, date: NaiveDate) -> Vec<Task> {
        let mut tasks = self.days.get(&date).cloned().unwrap_or_default();
        sort_tasks(&mut tasks);
        tasks
    }
}

pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then(a.completed.cmp(&b.completed))
    });
}
