use std::{error::Error, fs, path::PathBuf};

use clap::Parser;
use log::{error, info};
use votecrypt::ballot::{Ballot, Questionnaire};

/// Encrypts answers to an anonymous questionnaire and prints the submission for the backend.
#[derive(Clone, Debug, Parser)]
#[command(name = "votecrypt-ballot")]
struct Args {
    /// Questionnaire payload as returned by the backend.
    #[arg(long)]
    questionnaire: PathBuf,

    /// Chosen option per question, e.g. `0,2,1`.
    #[arg(long, value_delimiter = ',', required = true)]
    answers: Vec<usize>,

    /// Overrides the questionnaire id taken from the payload.
    #[arg(long)]
    id: Option<String>,

    /// Writes the submission here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Threads encrypting questions in parallel.
    #[arg(long, default_value_t = 1)]
    threads: usize,

    #[arg(long, default_value_t = false)]
    pretty: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let payload = fs::read_to_string(&args.questionnaire)?;
    let questionnaire: Questionnaire = serde_json::from_str(&payload)?;
    let questionnaire_id = args
        .id
        .clone()
        .or_else(|| questionnaire.submission_id())
        .ok_or("questionnaire has neither a link nor an id, pass --id")?;
    let ballot = Ballot::new(&questionnaire)?;
    info!(
        "Encrypting {} answers for questionnaire {}",
        args.answers.len(),
        questionnaire_id
    );

    let submission = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(args.threads.max(1))
        .max_blocking_threads(args.threads.max(1))
        .enable_all()
        .build()?
        .block_on(ballot.submit(questionnaire_id, &args.answers))?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&submission)?
    } else {
        serde_json::to_string(&submission)?
    };
    match &args.output {
        Some(path) => {
            fs::write(path, json)?;
            info!("Wrote submission to {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}
