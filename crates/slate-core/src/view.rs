use crate::task::{Task, ViewFilter};

pub const ERROR_EMPTY_TITLE: &str = "Task title cannot be empty.";

pub fn placeholder(filter: ViewFilter) -> &'static str {
    match filter {
        ViewFilter::All => "No tasks available.",
        ViewFilter::Completed => "No completed tasks.",
        ViewFilter::Incomplete => "No incomplete tasks.",
        ViewFilter::Important => "Nothing important at the moment.",
    }
}

/// One rendered row. The action labels from [`Row::actions`] are the
/// stable contract an external driver keys on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Placeholder { text: &'static str },
    Editing { id: u64, field: String },
    Open { id: u64, title: String, important: bool },
    Done { id: u64, title: String },
}

impl Row {
    pub fn actions(&self) -> Vec<&'static str> {
        match self {
            Self::Placeholder { .. } => vec![],
            Self::Editing { .. } => vec!["Save"],
            Self::Open { important, .. } => vec![
                "Mark as Done",
                "Edit",
                if *important {
                    "Unmark Important"
                } else {
                    "Mark Important"
                },
                "Remove",
            ],
            Self::Done { .. } => vec!["Undo", "Remove"],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub rows: Vec<Row>,
    pub active_filter: ViewFilter,
    pub delete_all_visible: bool,
    pub add_enabled: bool,
    pub error_visible: bool,
}

pub fn view(
    tasks: &[Task],
    filter: ViewFilter,
    editing_id: Option<u64>,
    input_error: bool,
) -> ViewModel {
    let visible: Vec<&Task> = tasks.iter().filter(|task| filter.matches(task)).collect();

    let rows = if visible.is_empty() {
        vec![Row::Placeholder {
            text: placeholder(filter),
        }]
    } else {
        visible
            .into_iter()
            .map(|task| {
                if editing_id == Some(task.id) {
                    Row::Editing {
                        id: task.id,
                        field: task.title.clone(),
                    }
                } else if task.completed {
                    Row::Done {
                        id: task.id,
                        title: task.title.clone(),
                    }
                } else {
                    Row::Open {
                        id: task.id,
                        title: task.title.clone(),
                        important: task.important,
                    }
                }
            })
            .collect()
    };

    ViewModel {
        rows,
        active_filter: filter,
        // keyed on the full sequence, not the filtered one: a filter that
        // hides every row must not hide the control
        delete_all_visible: !tasks.is_empty(),
        add_enabled: editing_id.is_none(),
        error_visible: input_error,
    }
}

#[cfg(test)]
mod tests {
    use super::{Row, placeholder, view};
    use crate::task::{Task, ViewFilter};

    fn sample() -> Vec<Task> {
        let mut done = Task::new(2, "shipped".to_string());
        done.completed = true;
        let mut flagged = Task::new(3, "call back".to_string());
        flagged.important = true;
        vec![Task::new(1, "open".to_string()), done, flagged]
    }

    #[test]
    fn filters_preserve_insertion_order() {
        let tasks = sample();

        let all = view(&tasks, ViewFilter::All, None, false);
        let ids: Vec<u64> = all
            .rows
            .iter()
            .map(|row| match row {
                Row::Open { id, .. } | Row::Done { id, .. } | Row::Editing { id, .. } => *id,
                Row::Placeholder { .. } => panic!("unexpected placeholder"),
            })
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let completed = view(&tasks, ViewFilter::Completed, None, false);
        assert_eq!(completed.rows.len(), 1);
        assert!(matches!(completed.rows[0], Row::Done { id: 2, .. }));

        let incomplete = view(&tasks, ViewFilter::Incomplete, None, false);
        assert_eq!(incomplete.rows.len(), 2);

        let important = view(&tasks, ViewFilter::Important, None, false);
        assert_eq!(important.rows.len(), 1);
        assert!(matches!(important.rows[0], Row::Open { id: 3, .. }));
    }

    #[test]
    fn view_is_deterministic() {
        let tasks = sample();
        let first = view(&tasks, ViewFilter::Incomplete, Some(1), true);
        let second = view(&tasks, ViewFilter::Incomplete, Some(1), true);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_filtered_view_renders_exactly_one_placeholder() {
        let tasks = vec![Task::new(1, "open".to_string())];

        let vm = view(&tasks, ViewFilter::Completed, None, false);
        assert_eq!(
            vm.rows,
            vec![Row::Placeholder {
                text: "No completed tasks."
            }]
        );
        // the full sequence is non-empty, so Delete All stays visible
        assert!(vm.delete_all_visible);

        let empty = view(&[], ViewFilter::All, None, false);
        assert_eq!(
            empty.rows,
            vec![Row::Placeholder {
                text: "No tasks available."
            }]
        );
        assert!(!empty.delete_all_visible);

        assert_eq!(
            placeholder(ViewFilter::Important),
            "Nothing important at the moment."
        );
        assert_eq!(placeholder(ViewFilter::Incomplete), "No incomplete tasks.");
    }

    #[test]
    fn row_actions_follow_task_state() {
        let tasks = sample();
        let vm = view(&tasks, ViewFilter::All, None, false);

        assert_eq!(
            vm.rows[0].actions(),
            vec!["Mark as Done", "Edit", "Mark Important", "Remove"]
        );
        assert_eq!(vm.rows[1].actions(), vec!["Undo", "Remove"]);
        assert_eq!(
            vm.rows[2].actions(),
            vec!["Mark as Done", "Edit", "Unmark Important", "Remove"]
        );
    }

    #[test]
    fn editing_row_offers_save_only_and_disables_add() {
        let tasks = sample();
        let vm = view(&tasks, ViewFilter::All, Some(1), false);

        assert_eq!(
            vm.rows[0],
            Row::Editing {
                id: 1,
                field: "open".to_string()
            }
        );
        assert_eq!(vm.rows[0].actions(), vec!["Save"]);
        assert!(!vm.add_enabled);

        let idle = view(&tasks, ViewFilter::All, None, false);
        assert!(idle.add_enabled);
    }
}
