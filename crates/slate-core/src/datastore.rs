use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::task::Task;
use crate::theme::Theme;

// One file per key under the data dir, replaced wholesale on write.
const TASKS_KEY: &str = "todos";
const THEME_KEY: &str = "background";

#[derive(Debug)]
pub struct DataStore {
    pub data_dir: PathBuf,
    tasks_path: PathBuf,
    theme_path: PathBuf,
}

impl DataStore {
    #[tracing::instrument(skip(data_dir))]
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let data_dir = data_dir.to_path_buf();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("failed to create {}", data_dir.display()))?;

        let tasks_path = data_dir.join(format!("{TASKS_KEY}.data"));
        let theme_path = data_dir.join(format!("{THEME_KEY}.data"));

        info!(
            data_dir = %data_dir.display(),
            tasks = %tasks_path.display(),
            theme = %theme_path.display(),
            "opened datastore"
        );

        Ok(Self {
            data_dir,
            tasks_path,
            theme_path,
        })
    }

    /// A missing, unreadable, or corrupt blob degrades to the empty
    /// list; reads never fail the session.
    #[tracing::instrument(skip(self))]
    pub fn load_tasks(&self) -> Vec<Task> {
        let Some(raw) = read_key(&self.tasks_path) else {
            return vec![];
        };

        match serde_json::from_str::<Vec<Task>>(&raw) {
            Ok(tasks) => {
                debug!(count = tasks.len(), "loaded tasks");
                tasks
            }
            Err(err) => {
                warn!(
                    file = %self.tasks_path.display(),
                    error = %err,
                    "corrupt task blob; starting with an empty list"
                );
                vec![]
            }
        }
    }

    #[tracing::instrument(skip(self, tasks))]
    pub fn save_tasks(&self, tasks: &[Task]) -> anyhow::Result<()> {
        let payload = serde_json::to_string(tasks)?;
        write_key_atomic(&self.tasks_path, &payload)
            .with_context(|| format!("failed to save {TASKS_KEY}"))
    }

    #[tracing::instrument(skip(self))]
    pub fn load_theme(&self) -> Theme {
        let Some(raw) = read_key(&self.theme_path) else {
            return Theme::default();
        };

        match Theme::parse(&raw) {
            Some(theme) => theme,
            None => {
                warn!(
                    file = %self.theme_path.display(),
                    "unrecognized theme value; using default"
                );
                Theme::default()
            }
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn save_theme(&self, theme: Theme) -> anyhow::Result<()> {
        write_key_atomic(&self.theme_path, theme.as_str())
            .with_context(|| format!("failed to save {THEME_KEY}"))
    }
}

fn read_key(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(raw) => Some(raw),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(file = %path.display(), "key absent; using default");
            None
        }
        Err(err) => {
            warn!(file = %path.display(), error = %err, "failed reading key; using default");
            None
        }
    }
}

fn write_key_atomic(path: &Path, payload: &str) -> anyhow::Result<()> {
    debug!(file = %path.display(), bytes = payload.len(), "writing key atomically");

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(payload.as_bytes())?;
    temp.flush()?;

    temp.persist(path)
        .map_err(|err| anyhow!("failed to persist {}: {}", path.display(), err))?;

    Ok(())
}
