use std::path::{Path, PathBuf};
use std::sync::Arc;
use anyhow::Context;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::{Serialize, de::DeserializeOwned};

use skillgate_lib::advice::{AdviceProvider, OllamaAdvisor};
use skillgate_lib::config::{get_engine_config, EngineConfig};
use skillgate_lib::curriculum::{elapsed_weeks, estimated_completion, CurriculumPlan, Goal};
use skillgate_lib::readiness::{detect_readiness, readiness_report, UserProgress};
use skillgate_lib::service::ProgressService;
use skillgate_lib::skills::{apply_accepted, SkillMap};
use skillgate_lib::store::{check_user_id, JsonFileStore};
use skillgate_lib::validation::{DailyLogSubmission, DailyLogValidator};
use skillgate_lib::{derive_tasks_for_phase, generate_curriculum_plan, logging, validate_daily_submission};

#[derive(Parser)]
#[command(name = "skillgate", about = "Evidence-gated study planner and skill tracker")]
struct Cli {
    /// Config file (defaults to skillgate.toml in the app-data directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a curriculum plan from a goal JSON file
    Plan {
        #[arg(long)]
        goal: PathBuf,
        /// Ask the configured local model for advice on the plan
        #[arg(long)]
        advice: bool,
    },
    /// Validate one day's log without storing it
    Validate {
        #[arg(long)]
        submission: PathBuf,
    },
    /// Derive the task batch for the phase active today
    Tasks {
        #[arg(long)]
        plan: PathBuf,
        /// Plan start date, YYYY-MM-DD
        #[arg(long)]
        start_date: NaiveDate,
        /// Defaults to the current date
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Credit an accepted day's activities to a skill map
    Apply {
        /// Skill map JSON; a missing file starts empty
        #[arg(long)]
        skills: PathBuf,
        #[arg(long)]
        submission: PathBuf,
        /// Activity date, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
    },
    /// Store a goal for a user and create their first task batch
    SetGoal {
        #[arg(long)]
        user: String,
        #[arg(long)]
        goal: PathBuf,
        /// Defaults to the current date
        #[arg(long)]
        start_date: Option<NaiveDate>,
    },
    /// Validate a day's log and, if accepted, store it and credit skills
    Log {
        #[arg(long)]
        user: String,
        #[arg(long)]
        submission: PathBuf,
        /// Defaults to the current date
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Weekly quota, gates and readiness for a stored user
    Report {
        #[arg(long)]
        user: String,
        /// Defaults to the current date
        #[arg(long)]
        week_ending: Option<NaiveDate>,
    },
    /// Readiness assessment from a progress JSON file
    Readiness {
        #[arg(long)]
        progress: PathBuf,
        /// Print a markdown report instead of JSON
        #[arg(long)]
        markdown: bool,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let data = std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::load_from(path)?),
        None => Ok(get_engine_config().clone()),
    }
}

fn open_service(config: &EngineConfig, user: &str) -> anyhow::Result<ProgressService<JsonFileStore>> {
    check_user_id(user)?;
    let mut service = ProgressService::new(JsonFileStore::new(config.data_dir()), config);
    if config.advice.enabled {
        service = service.with_advisor(Arc::new(OllamaAdvisor::new(config.advice.clone())));
    }
    Ok(service)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_logging();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Plan { goal, advice } => {
            let goal: Goal = read_json(&goal)?;
            goal.check()?;
            let plan = generate_curriculum_plan(&goal);
            let advice = if advice || config.advice.enabled {
                let advisor = OllamaAdvisor::new(config.advice.clone());
                match advisor.advise(&goal, &plan).await {
                    Ok(advice) => Some(advice),
                    Err(e) => {
                        tracing::warn!(error = %e, "Plan generated without advice");
                        None
                    }
                }
            } else {
                None
            };
            print_json(&serde_json::json!({
                "plan": plan,
                "estimatedCompletion": estimated_completion(&plan),
                "advice": advice,
            }))
        }
        Commands::Validate { submission } => {
            let submission: DailyLogSubmission = read_json(&submission)?;
            let verdict = validate_daily_submission(&submission, Some(&config.validation))?;
            print_json(&verdict)?;
            if !verdict.can_submit {
                std::process::exit(2);
            }
            Ok(())
        }
        Commands::Tasks { plan, start_date, today } => {
            let plan: CurriculumPlan = read_json(&plan)?;
            let today = today.unwrap_or_else(|| Utc::now().date_naive());
            let phase = plan.active_phase(elapsed_weeks(start_date, today));
            print_json(&derive_tasks_for_phase(phase))
        }
        Commands::Apply { skills, submission, date } => {
            let current: SkillMap = if skills.exists() {
                read_json(&skills)?
            } else {
                SkillMap::new()
            };
            let submission: DailyLogSubmission = read_json(&submission)?;
            submission.check_shape(&config.validation)?;
            match DailyLogValidator::new(config.validation.clone()).gate(submission) {
                Ok(accepted) => print_json(&apply_accepted(&current, &accepted, date, Utc::now())),
                Err(verdict) => {
                    print_json(&verdict)?;
                    anyhow::bail!("Submission rejected, skills unchanged")
                }
            }
        }
        Commands::SetGoal { user, goal, start_date } => {
            let goal: Goal = read_json(&goal)?;
            let today = Utc::now().date_naive();
            let service = open_service(&config, &user)?;
            let record = service.set_goal(&user, goal, start_date.unwrap_or(today), today).await?;
            print_json(&record)
        }
        Commands::Log { user, submission, date } => {
            let submission: DailyLogSubmission = read_json(&submission)?;
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            let service = open_service(&config, &user)?;
            let outcome = service.submit_daily_log(&user, date, submission).await?;
            print_json(&outcome)?;
            if !outcome.accepted {
                std::process::exit(2);
            }
            Ok(())
        }
        Commands::Report { user, week_ending } => {
            let week_ending = week_ending.unwrap_or_else(|| Utc::now().date_naive());
            let service = open_service(&config, &user)?;
            print_json(&service.weekly_report(&user, week_ending).await?)
        }
        Commands::Readiness { progress, markdown } => {
            let progress: UserProgress = read_json(&progress)?;
            let result = detect_readiness(&progress, &config.readiness);
            if markdown {
                print!("{}", readiness_report(&result));
                Ok(())
            } else {
                print_json(&result)
            }
        }
    }
}
