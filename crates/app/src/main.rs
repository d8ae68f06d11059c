mod catalog;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use interview_core::model::{Difficulty, UserId};
use services::{
    AppServices, Clock, CreateSessionRequest, FinishSessionRequest, PlaceholderScorer,
    RecordAnswerRequest, SelectionCriteria, SessionConfig,
};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "interview", about = "Mock interview practice sessions")]
struct Cli {
    /// JSON file with an array of questions. Uses a built-in set when omitted.
    #[arg(long, env = "INTERVIEW_CATALOG", global = true)]
    catalog: Option<PathBuf>,

    /// Seed for question sampling and placeholder scores.
    #[arg(long, env = "INTERVIEW_SEED", global = true)]
    seed: Option<u64>,

    #[arg(long, env = "INTERVIEW_DEFAULT_COUNT", default_value_t = 5, global = true)]
    default_count: usize,

    #[arg(long, env = "INTERVIEW_MAX_COUNT", default_value_t = 50, global = true)]
    max_count: usize,

    /// Catalog field that counts as relevant to every preferred field.
    #[arg(long, env = "INTERVIEW_UNIVERSAL_FIELD", default_value = "common", global = true)]
    universal_field: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print a sampled question set as JSON.
    Sample(SelectionArgs),
    /// Run a scripted session end to end and print the final view as JSON.
    Demo {
        #[command(flatten)]
        selection: SelectionArgs,

        #[arg(long, default_value_t = 1)]
        user_id: u64,

        /// Seconds recorded against each answer.
        #[arg(long, default_value_t = 60)]
        time_per_answer: u32,
    },
}

#[derive(Debug, Args)]
struct SelectionArgs {
    #[arg(long)]
    count: Option<usize>,
    #[arg(long)]
    field: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    difficulty: Option<Difficulty>,
    #[arg(long, value_delimiter = ',')]
    tags: Vec<String>,
    #[arg(long)]
    preferred_field: Option<String>,
}

impl From<SelectionArgs> for SelectionCriteria {
    fn from(args: SelectionArgs) -> Self {
        SelectionCriteria {
            count: args.count,
            field: args.field,
            category: args.category,
            difficulty: args.difficulty,
            tags: args.tags,
            preferred_field: args.preferred_field,
            ..SelectionCriteria::default()
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn build_services(cli: &Cli) -> Result<AppServices, Box<dyn std::error::Error>> {
    let config = SessionConfig {
        default_question_count: cli.default_count,
        max_question_count: cli.max_count,
        universal_field: cli.universal_field.clone(),
        seed: cli.seed,
    };
    let scorer = match cli.seed {
        Some(seed) => PlaceholderScorer::seeded(seed),
        None => PlaceholderScorer::new(),
    };
    let services = AppServices::in_memory(Clock::system(), config, Arc::new(scorer))?;

    let drafts = match &cli.catalog {
        Some(path) => catalog::load(path)?,
        None => catalog::builtin(),
    };
    let seeded = services.seed_questions(drafts).await?;
    info!(questions = seeded, "question catalog loaded");
    Ok(services)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let services = build_services(&cli).await?;
    let manager = services.sessions();

    match cli.command {
        Command::Sample(selection) => {
            let questions = manager.sample_questions(&selection.into()).await?;
            println!("{}", serde_json::to_string_pretty(&questions)?);
        }
        Command::Demo {
            selection,
            user_id,
            time_per_answer,
        } => {
            let user_id = UserId::new(user_id);
            let create = CreateSessionRequest {
                criteria: selection.into(),
            };
            let session = manager.create_session(user_id, &create.criteria).await?;

            for question in session.questions() {
                let body = serde_json::json!({
                    "question_id": question.id(),
                    "answer_text": format!("Practice answer for: {}", question.title()),
                    "time_spent": time_per_answer,
                })
                .to_string();
                let request = RecordAnswerRequest::from_json(&body)?;
                manager
                    .record_answer(
                        session.id(),
                        user_id,
                        request.question_id,
                        request.answer_text,
                        request.time_spent,
                    )
                    .await?;
            }

            let finish = FinishSessionRequest::from_json("")?;
            let view = manager
                .finish_session(session.id(), user_id, finish.total_time)
                .await?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
