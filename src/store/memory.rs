use std::collections::HashMap;
use async_trait::async_trait;
use parking_lot::RwLock;
use crate::error::TrackerError;
use crate::skills::SkillMatrix;
use crate::tasks::Task;
use crate::validation::weekly::DailyLogRecord;
use super::{check_user_id, GoalRecord, ProgressStore};

#[derive(Debug, Clone, Default)]
struct UserData {
    goal: Option<GoalRecord>,
    skills: SkillMatrix,
    tasks: Vec<Task>,
    logs: Vec<DailyLogRecord>,
}

/// Process-local store for tests and one-shot CLI runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserData>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, user: &str, f: impl FnOnce(&UserData) -> T) -> Result<T, TrackerError>
    where
        T: Default,
    {
        check_user_id(user)?;
        Ok(self.users.read().get(user).map(f).unwrap_or_default())
    }

    fn write(&self, user: &str, f: impl FnOnce(&mut UserData)) -> Result<(), TrackerError> {
        check_user_id(user)?;
        f(self.users.write().entry(user.to_string()).or_default());
        Ok(())
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn load_goal(&self, user: &str) -> Result<Option<GoalRecord>, TrackerError> {
        self.read(user, |d| d.goal.clone())
    }

    async fn save_goal(&self, user: &str, record: &GoalRecord) -> Result<(), TrackerError> {
        self.write(user, |d| d.goal = Some(record.clone()))
    }

    async fn load_skills(&self, user: &str) -> Result<SkillMatrix, TrackerError> {
        self.read(user, |d| d.skills.clone())
    }

    async fn save_skills(&self, user: &str, matrix: &SkillMatrix) -> Result<(), TrackerError> {
        self.write(user, |d| d.skills = matrix.clone())
    }

    async fn load_tasks(&self, user: &str) -> Result<Vec<Task>, TrackerError> {
        self.read(user, |d| d.tasks.clone())
    }

    async fn save_tasks(&self, user: &str, tasks: &[Task]) -> Result<(), TrackerError> {
        self.write(user, |d| d.tasks = tasks.to_vec())
    }

    async fn load_logs(&self, user: &str) -> Result<Vec<DailyLogRecord>, TrackerError> {
        self.read(user, |d| d.logs.clone())
    }

    async fn append_log(&self, user: &str, record: &DailyLogRecord) -> Result<(), TrackerError> {
        self.write(user, |d| d.logs.push(record.clone()))
    }
}
