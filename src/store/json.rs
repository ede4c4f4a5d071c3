use std::path::{Path, PathBuf};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use crate::error::TrackerError;
use crate::skills::SkillMatrix;
use crate::tasks::Task;
use crate::validation::weekly::DailyLogRecord;
use super::{check_user_id, GoalRecord, ProgressStore};

const GOAL_FILE: &str = "goal.json";
const SKILLS_FILE: &str = "skills.json";
const TASKS_FILE: &str = "tasks.json";
const LOGS_FILE: &str = "logs.json";

/// One directory per user under `<root>/users`, one pretty-printed JSON file
/// per concern. Writes go through a temp file and a rename.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_file(&self, user: &str, file: &str) -> Result<PathBuf, TrackerError> {
        check_user_id(user)?;
        Ok(self.root.join("users").join(user).join(file))
    }

    async fn read_json<T: DeserializeOwned>(&self, user: &str, file: &str) -> Result<Option<T>, TrackerError> {
        let path = self.user_file(user, file)?;
        let data = match tokio::fs::read_to_string(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = ?path, user, "No stored file yet");
                return Ok(None);
            }
            Err(e) => {
                return Err(TrackerError::new(format!("Failed to read {}: {}", file, e), "io")
                    .with_user(user)
                    .with_context(format!("path: {:?}", path)));
            }
        };
        serde_json::from_str(&data).map(Some).map_err(|e| {
            TrackerError::new(format!("Failed to parse {}: {}", file, e), "json_parse")
                .with_user(user)
                .with_context(format!("path: {:?}", path))
        })
    }

    async fn write_json<T: Serialize + ?Sized>(&self, user: &str, file: &str, value: &T) -> Result<(), TrackerError> {
        let path = self.user_file(user, file)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                TrackerError::new(format!("Failed to create directory: {}", e), "io")
                    .with_user(user)
                    .with_context(format!("path: {:?}", parent))
            })?;
        }

        let json = serde_json::to_string_pretty(value).map_err(|e| {
            TrackerError::new(format!("Failed to serialize {}: {}", file, e), "json_serialize").with_user(user)
        })?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(|e| {
            TrackerError::new(format!("Failed to write {}: {}", file, e), "io")
                .with_user(user)
                .with_context(format!("path: {:?}", tmp))
        })?;
        tokio::fs::rename(&tmp, &path).await.map_err(|e| {
            TrackerError::new(format!("Failed to replace {}: {}", file, e), "io")
                .with_user(user)
                .with_context(format!("path: {:?}", path))
        })?;

        tracing::debug!(path = ?path, user, "Saved");
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for JsonFileStore {
    async fn load_goal(&self, user: &str) -> Result<Option<GoalRecord>, TrackerError> {
        self.read_json(user, GOAL_FILE).await
    }

    async fn save_goal(&self, user: &str, record: &GoalRecord) -> Result<(), TrackerError> {
        self.write_json(user, GOAL_FILE, record).await
    }

    async fn load_skills(&self, user: &str) -> Result<SkillMatrix, TrackerError> {
        Ok(self.read_json(user, SKILLS_FILE).await?.unwrap_or_default())
    }

    async fn save_skills(&self, user: &str, matrix: &SkillMatrix) -> Result<(), TrackerError> {
        self.write_json(user, SKILLS_FILE, matrix).await
    }

    async fn load_tasks(&self, user: &str) -> Result<Vec<Task>, TrackerError> {
        Ok(self.read_json(user, TASKS_FILE).await?.unwrap_or_default())
    }

    async fn save_tasks(&self, user: &str, tasks: &[Task]) -> Result<(), TrackerError> {
        self.write_json(user, TASKS_FILE, tasks).await
    }

    async fn load_logs(&self, user: &str) -> Result<Vec<DailyLogRecord>, TrackerError> {
        Ok(self.read_json(user, LOGS_FILE).await?.unwrap_or_default())
    }

    async fn append_log(&self, user: &str, record: &DailyLogRecord) -> Result<(), TrackerError> {
        let mut logs = self.load_logs(user).await?;
        logs.push(record.clone());
        self.write_json(user, LOGS_FILE, &logs).await
    }
}
