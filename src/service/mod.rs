//! Host-side orchestration around the pure engine.
//!
//! Every call that reads and then writes a user's state holds that user's
//! lock for the whole read-modify-write, and skill credit goes through
//! [`SkillMatrix::apply_once`], so a day is credited at most once even when
//! submissions race.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use chrono::{NaiveDate, Utc};
use serde::{Serialize, Deserialize};
use tokio::sync::Mutex as AsyncMutex;
use crate::advice::AdviceProvider;
use crate::config::EngineConfig;
use crate::curriculum::{elapsed_weeks, generate, Goal};
use crate::error::TrackerError;
use crate::gates::{check_progress_blocks, HandsOnGates, ProgressBlock};
use crate::metrics::EngineMetrics;
use crate::notify::{Notifier, ProgressEvent, TracingNotifier};
use crate::portfolio::{verify_items, PortfolioItem};
use crate::readiness::{detect_readiness, practice_streak, ReadinessResult, ReadinessThresholds, UserProgress};
use crate::skills::{SkillDelta, SkillMatrix};
use crate::store::{check_user_id, GoalRecord, ProgressStore};
use crate::tasks::{regenerate_tasks, should_regenerate, Category, Priority, Task};
use crate::validation::weekly::{summarize_week, tutorial_hell_streak, DailyLogRecord, TutorialHellStatus, WeeklySummary};
use crate::validation::{DailyLogSubmission, DailyLogValidator, ValidationVerdict};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub verdict: ValidationVerdict,
    pub accepted: bool,
    /// Skills changed by this submission; empty when rejected or when the
    /// day had already been credited.
    pub skill_changes: Vec<SkillDelta>,
    pub duplicate_day: bool,
    pub tutorial_hell: TutorialHellStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskToggle {
    pub completed: bool,
    pub regenerated: bool,
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub summary: WeeklySummary,
    pub tutorial_hell: TutorialHellStatus,
    pub gates: HandsOnGates,
    pub blocks: Vec<ProgressBlock>,
    pub progress: UserProgress,
    pub readiness: ReadinessResult,
}

pub struct ProgressService<S: ProgressStore> {
    store: S,
    validator: DailyLogValidator,
    thresholds: ReadinessThresholds,
    advisor: Option<Arc<dyn AdviceProvider>>,
    notifier: Arc<dyn Notifier>,
    metrics: EngineMetrics,
    user_locks: parking_lot::Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl<S: ProgressStore> ProgressService<S> {
    pub fn new(store: S, config: &EngineConfig) -> Self {
        Self {
            store,
            validator: DailyLogValidator::new(config.validation.clone()),
            thresholds: config.readiness.clone(),
            advisor: None,
            notifier: Arc::new(TracingNotifier),
            metrics: EngineMetrics::new(),
            user_locks: parking_lot::Mutex::new(HashMap::new()),
        }
    }

    pub fn with_advisor(mut self, advisor: Arc<dyn AdviceProvider>) -> Self {
        self.advisor = Some(advisor);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn metrics(&self) -> &EngineMetrics {
        &self.metrics
    }

    /// The caller's lock for `user`. Entries nobody holds are dropped on
    /// the way in, so the map only keeps users with calls in flight.
    fn user_lock(&self, user: &str) -> Result<Arc<AsyncMutex<()>>, TrackerError> {
        check_user_id(user)?;
        let mut locks = self.user_locks.lock();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        Ok(locks
            .entry(user.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone())
    }

    /// Store a goal, its plan and optional advice, and replace the auto
    /// tasks with the batch for the phase active at `today`.
    pub async fn set_goal(
        &self,
        user: &str,
        goal: Goal,
        start_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<GoalRecord, TrackerError> {
        goal.check().map_err(|e| TrackerError::from(e).with_user(user))?;
        let lock = self.user_lock(user)?;
        let _guard = lock.lock().await;

        let plan = generate(&goal);
        let advice = match &self.advisor {
            Some(advisor) => match advisor.advise(&goal, &plan).await {
                Ok(advice) => Some(advice),
                Err(e) => {
                    self.metrics.record_advice_failure();
                    tracing::warn!(user, error = %e, "Continuing without plan advice");
                    None
                }
            },
            None => None,
        };

        let now = Utc::now();
        let record = GoalRecord {
            goal,
            plan,
            start_date,
            advice,
            created_at: now,
        };
        self.store.save_goal(user, &record).await?;

        let weeks = elapsed_weeks(start_date, today);
        let existing = self.store.load_tasks(user).await?;
        let tasks = regenerate_tasks(&existing, &record.plan, weeks, now);
        self.store.save_tasks(user, &tasks).await?;

        tracing::info!(
            user,
            phases = record.plan.len(),
            total_weeks = record.plan.total_weeks(),
            "Goal set"
        );
        Ok(record)
    }

    /// Validate one day's log. Accepted logs are stored and credited to the
    /// skill matrix once per date; rejected logs change nothing. Resending a
    /// log already stored for the same date is reported as a duplicate and
    /// neither stored nor credited again.
    pub async fn submit_daily_log(
        &self,
        user: &str,
        date: NaiveDate,
        submission: DailyLogSubmission,
    ) -> Result<SubmissionOutcome, TrackerError> {
        submission
            .check_shape(self.validator.policy())
            .map_err(|e| TrackerError::from(e).with_user(user))?;

        let accepted = match self.validator.gate(submission) {
            Ok(accepted) => accepted,
            Err(verdict) => {
                self.metrics.record_validation(false);
                tracing::info!(user, date = %date, errors = verdict.errors.len(), "Daily log rejected");
                let logs = self.store.load_logs(user).await?;
                return Ok(SubmissionOutcome {
                    verdict,
                    accepted: false,
                    skill_changes: Vec::new(),
                    duplicate_day: false,
                    tutorial_hell: tutorial_hell_streak(&logs, self.validator.policy()),
                });
            }
        };
        self.metrics.record_validation(true);

        let lock = self.user_lock(user)?;
        let _guard = lock.lock().await;

        let names = accepted.activity_names();
        let (submission, verdict) = accepted.into_parts();
        let record = DailyLogRecord { date, submission };

        let mut logs = self.store.load_logs(user).await?;
        if logs.contains(&record) {
            self.metrics.record_duplicate_day();
            tracing::info!(user, date = %date, "Identical log already stored, skipping");
            return Ok(SubmissionOutcome {
                verdict,
                accepted: true,
                skill_changes: Vec::new(),
                duplicate_day: true,
                tutorial_hell: tutorial_hell_streak(&logs, self.validator.policy()),
            });
        }
        self.store.append_log(user, &record).await?;
        logs.push(record);

        let mut matrix: SkillMatrix = self.store.load_skills(user).await?;
        let (skill_changes, duplicate_day) = match matrix.apply_once(&names, date, Utc::now()) {
            Some(deltas) if deltas.is_empty() => (deltas, false),
            Some(deltas) => {
                self.store.save_skills(user, &matrix).await?;
                self.metrics.record_skill_update();
                self.notifier.notify(&ProgressEvent::SkillsAdvanced {
                    user: user.to_string(),
                    date,
                    deltas: deltas.clone(),
                });
                (deltas, false)
            }
            None => {
                self.metrics.record_duplicate_day();
                (Vec::new(), true)
            }
        };

        let tutorial_hell = tutorial_hell_streak(&logs, self.validator.policy());
        if tutorial_hell.alert {
            self.notifier.notify(&ProgressEvent::TutorialHellAlert {
                user: user.to_string(),
                streak_days: tutorial_hell.streak_days,
            });
        }

        Ok(SubmissionOutcome {
            verdict,
            accepted: true,
            skill_changes,
            duplicate_day,
            tutorial_hell,
        })
    }

    pub async fn add_manual_task(
        &self,
        user: &str,
        title: &str,
        description: &str,
        priority: Priority,
        category: Category,
    ) -> Result<Task, TrackerError> {
        if title.trim().is_empty() {
            return Err(TrackerError::new("Task title must not be empty", "tasks").with_user(user));
        }
        let lock = self.user_lock(user)?;
        let _guard = lock.lock().await;

        let mut tasks = self.store.load_tasks(user).await?;
        let mut task = Task::manual(title.trim(), description, priority, category, Utc::now());
        // Two manual tasks created in the same millisecond would share an id.
        while tasks.iter().any(|t| t.id == task.id) {
            task.id.push('x');
        }
        tasks.push(task.clone());
        self.store.save_tasks(user, &tasks).await?;
        Ok(task)
    }

    /// Flip a task. When that leaves every auto task done, the auto batch is
    /// replaced from the phase active at `today`.
    pub async fn toggle_task(&self, user: &str, task_id: &str, today: NaiveDate) -> Result<TaskToggle, TrackerError> {
        let lock = self.user_lock(user)?;
        let _guard = lock.lock().await;

        let mut tasks = self.store.load_tasks(user).await?;
        let completed = crate::tasks::toggle_task(&mut tasks, task_id).ok_or_else(|| {
            TrackerError::new("Task not found", "tasks")
                .with_user(user)
                .with_context(format!("task_id: {}", task_id))
        })?;

        if completed {
            if let Some(task) = tasks.iter().find(|t| t.id == task_id) {
                self.notifier.notify(&ProgressEvent::TaskCompleted {
                    user: user.to_string(),
                    task_id: task.id.clone(),
                    title: task.title.clone(),
                });
            }
        }

        let mut regenerated = false;
        if should_regenerate(&tasks) {
            if let Some(record) = self.store.load_goal(user).await? {
                let weeks = elapsed_weeks(record.start_date, today);
                tasks = regenerate_tasks(&tasks, &record.plan, weeks, Utc::now());
                regenerated = true;
                self.metrics.record_regeneration();
                let phase = record.plan.active_phase(weeks);
                self.notifier.notify(&ProgressEvent::TasksRegenerated {
                    user: user.to_string(),
                    phase_number: phase.phase_number,
                    task_count: tasks.iter().filter(|t| t.is_auto()).count(),
                });
            } else {
                tracing::warn!(user, "All auto tasks done but no goal stored, not regenerating");
            }
        }

        self.store.save_tasks(user, &tasks).await?;
        Ok(TaskToggle { completed, regenerated, tasks })
    }

    /// Quota, streak, gates and readiness for the week ending on
    /// `week_ending`, computed from stored skills and the logs dated on or
    /// before it.
    pub async fn weekly_report(&self, user: &str, week_ending: NaiveDate) -> Result<WeeklyReport, TrackerError> {
        let mut logs = self.store.load_logs(user).await?;
        logs.retain(|r| r.date <= week_ending);
        let matrix = self.store.load_skills(user).await?;
        let policy = self.validator.policy();

        let items: Vec<PortfolioItem> = logs
            .iter()
            .flat_map(|r| &r.submission.portfolio_items)
            .map(PortfolioItem::from)
            .collect();
        let verification = verify_items(&items);

        let gates = HandsOnGates::from_logs(&logs, verification.count(), Utc::now());
        let blocks = check_progress_blocks(&gates);

        let days: BTreeSet<NaiveDate> = logs.iter().map(|r| r.date).collect();
        let progress = UserProgress {
            phase0_complete: gates.phase0_complete(),
            portfolio_count: items.len(),
            verified_portfolio_count: verification.count(),
            total_labs_completed: logs.iter().map(|r| r.submission.labs_completed.len()).sum(),
            total_tool_hours: logs.iter().map(|r| r.submission.tool_hours()).sum(),
            current_streak: practice_streak(&days, week_ending),
            ..UserProgress::from_matrix(&matrix)
        };
        let readiness = detect_readiness(&progress, &self.thresholds);

        Ok(WeeklyReport {
            summary: summarize_week(&logs, week_ending, policy),
            tutorial_hell: tutorial_hell_streak(&logs, policy),
            gates,
            blocks,
            progress,
            readiness,
        })
    }
}
