use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use crate::task::{IdSource, Property, Task, ViewFilter};

/// Exclusive owner of the task sequence plus the session scalars.
/// Operations that touch the sequence report whether it changed so the
/// caller knows a persistence write is due.
#[derive(Debug)]
pub struct Session {
    tasks: Vec<Task>,
    filter: ViewFilter,
    editing_id: Option<u64>,
    input_error: bool,
    ids: IdSource,
}

impl Session {
    pub fn new(tasks: Vec<Task>) -> Self {
        let ids = IdSource::seeded_from(&tasks);
        Self {
            tasks,
            filter: ViewFilter::default(),
            editing_id: None,
            input_error: false,
            ids,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn filter(&self) -> ViewFilter {
        self.filter
    }

    pub fn editing_id(&self) -> Option<u64> {
        self.editing_id
    }

    pub fn editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn input_error(&self) -> bool {
        self.input_error
    }

    #[instrument(skip(self, title, now))]
    pub fn create(&mut self, title: &str, now: DateTime<Utc>) -> bool {
        let title = title.trim();
        if title.is_empty() {
            debug!("rejected empty title");
            self.input_error = true;
            return false;
        }

        let id = self.ids.next(now);
        self.tasks.push(Task::new(id, title.to_string()));
        self.input_error = false;
        debug!(id, count = self.tasks.len(), "task created");
        true
    }

    /// Overwrites a title verbatim and leaves edit mode. Unlike `create`
    /// this path never validates; the edit field may commit any text.
    #[instrument(skip(self, new_title))]
    pub fn set_title(&mut self, id: u64, new_title: String) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!(id, "set_title on absent id ignored");
            return false;
        };

        task.title = new_title;
        self.editing_id = None;
        true
    }

    /// Completing a task drops its important flag, and a completed task
    /// ignores important toggles until undone; a finished task is never
    /// flagged.
    #[instrument(skip(self))]
    pub fn toggle(&mut self, id: u64, property: Property) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            debug!(id, "toggle on absent id ignored");
            return false;
        };

        match property {
            Property::Completed => {
                task.completed = !task.completed;
                if task.completed {
                    task.important = false;
                }
            }
            Property::Important => {
                if task.completed {
                    debug!(id, "important toggle on a completed task ignored");
                    return false;
                }
                task.important = !task.important;
            }
        }
        true
    }

    #[instrument(skip(self))]
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    #[instrument(skip(self))]
    pub fn remove_all(&mut self) -> bool {
        if self.tasks.is_empty() {
            return false;
        }
        debug!(count = self.tasks.len(), "removing all tasks");
        self.tasks.clear();
        true
    }

    /// Any edit already in progress is abandoned without saving.
    #[instrument(skip(self))]
    pub fn begin_edit(&mut self, id: u64) {
        if self.tasks.iter().any(|task| task.id == id) {
            self.editing_id = Some(id);
        } else {
            debug!(id, "begin_edit on absent id ignored");
        }
    }

    #[instrument(skip(self))]
    pub fn set_filter(&mut self, filter: ViewFilter) {
        self.filter = filter;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::Session;
    use crate::task::{Property, Task, ViewFilter};

    fn now() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn create_rejects_whitespace_and_raises_the_error_indicator() {
        let mut session = Session::new(vec![]);

        assert!(!session.create("   ", now()));
        assert!(session.input_error());
        assert!(session.tasks().is_empty());

        assert!(session.create("  Learn Rust  ", now()));
        assert!(!session.input_error());
        assert_eq!(session.tasks().len(), 1);
        assert_eq!(session.tasks()[0].title, "Learn Rust");
        assert!(!session.tasks()[0].completed);
        assert!(!session.tasks()[0].important);
    }

    #[test]
    fn ids_stay_unique_within_one_millisecond() {
        let mut session = Session::new(vec![]);
        let t = now();

        assert!(session.create("a", t));
        assert!(session.create("b", t));
        assert!(session.create("c", t + Duration::milliseconds(5)));

        let ids: Vec<u64> = session.tasks().iter().map(|task| task.id).collect();
        assert!(ids[0] < ids[1]);
        assert!(ids[1] < ids[2]);
    }

    #[test]
    fn completed_implies_not_important_in_either_toggle_order() {
        for complete_first in [true, false] {
            let mut session = Session::new(vec![Task::new(1, "x".to_string())]);
            if complete_first {
                assert!(session.toggle(1, Property::Completed));
                assert!(!session.toggle(1, Property::Important));
            } else {
                assert!(session.toggle(1, Property::Important));
                assert!(session.toggle(1, Property::Completed));
            }

            let task = &session.tasks()[0];
            assert!(task.completed);
            assert!(!task.important);
        }
    }

    #[test]
    fn undo_reopens_a_task_without_restoring_the_flag() {
        let mut session = Session::new(vec![Task::new(1, "x".to_string())]);
        assert!(session.toggle(1, Property::Important));
        assert!(session.toggle(1, Property::Completed));
        assert!(session.toggle(1, Property::Completed));

        let task = &session.tasks()[0];
        assert!(!task.completed);
        assert!(!task.important);
        assert!(session.toggle(1, Property::Important));
        assert!(session.tasks()[0].important);
    }

    #[test]
    fn set_title_is_verbatim_and_leaves_edit_mode() {
        let mut session = Session::new(vec![Task::new(7, "old".to_string())]);
        session.begin_edit(7);
        assert_eq!(session.editing_id(), Some(7));

        assert!(session.set_title(7, "  spaced  ".to_string()));
        assert_eq!(session.tasks()[0].title, "  spaced  ");
        assert_eq!(session.editing_id(), None);

        // empty commits are allowed on this path
        assert!(session.set_title(7, String::new()));
        assert_eq!(session.tasks()[0].title, "");
    }

    #[test]
    fn stale_ids_are_silent_noops() {
        let mut session = Session::new(vec![Task::new(1, "keep".to_string())]);

        assert!(!session.set_title(99, "ghost".to_string()));
        assert!(!session.toggle(99, Property::Completed));
        assert!(!session.remove(99));
        session.begin_edit(99);

        assert_eq!(session.editing_id(), None);
        assert_eq!(session.tasks().len(), 1);
        assert_eq!(session.tasks()[0].title, "keep");
    }

    #[test]
    fn begin_edit_abandons_a_previous_edit() {
        let mut session = Session::new(vec![
            Task::new(1, "first".to_string()),
            Task::new(2, "second".to_string()),
        ]);

        session.begin_edit(1);
        session.begin_edit(2);
        assert_eq!(session.editing_id(), Some(2));
        assert_eq!(session.tasks()[0].title, "first");
    }

    #[test]
    fn remove_all_empties_and_reports_change_once() {
        let mut session = Session::new(vec![Task::new(1, "a".to_string())]);
        session.set_filter(ViewFilter::Important);

        assert!(session.remove_all());
        assert!(session.tasks().is_empty());
        assert!(!session.remove_all());
    }
}
