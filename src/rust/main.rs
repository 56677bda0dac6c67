use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use symptom_triage::app::render_home;
use symptom_triage::shell::{list_symptoms, parse_command, split_symptoms, Command, HELP_TEXT};
use symptom_triage::{render, App, AppConfig, ChatSession, DataLoadError, GeminiAssistant, Predictor};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding training_data.csv, dis_info.csv, model.onnx, classes.json and static/
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of candidate diseases to show
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Assistant request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Skip checksums.json verification of the data files
    #[arg(long)]
    skip_verify: bool,

    /// Predict once for a comma-separated symptom list, print JSON and exit
    #[arg(short, long)]
    symptoms: Option<String>,
}

fn load_config(args: &Args) -> anyhow::Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    }
    .with_process_env();

    if let Some(dir) = &args.data_dir {
        config.data_dir = Some(dir.clone());
    }
    if let Some(top_k) = args.top_k {
        config.top_k = top_k;
    }
    if let Some(timeout) = args.timeout_secs {
        config.request_timeout_secs = timeout;
    }
    config.validate()?;
    Ok(config)
}

fn load_predictor(config: &AppConfig, skip_verify: bool) -> Result<Predictor, DataLoadError> {
    let store = config.artifact_store();
    info!("Using data directory {:?}", store.data_dir());
    if !store.is_complete() {
        warn!("Data directory is incomplete; prediction will be unavailable");
    }

    if skip_verify {
        warn!("Checksum verification skipped");
    } else {
        store.verify_checksums()?;
    }

    Predictor::builder()
        .with_runtime_config(config.runtime_config())
        .with_top_k(config.top_k)
        .with_min_symptoms(config.min_symptoms)
        .with_artifacts(&store)?
        .build()
}

fn build_assistant(config: &AppConfig) -> Option<GeminiAssistant> {
    let api_key = match &config.api_key {
        Some(key) => key,
        None => {
            warn!("GEMINI_API_KEY is not set; the assistant is disabled");
            return None;
        }
    };
    match GeminiAssistant::new(
        api_key.as_str(),
        config.gemini_model.as_str(),
        &config.gemini_base_url,
        config.request_timeout_secs,
    ) {
        Ok(assistant) => {
            info!("Assistant ready with model {}", assistant.model());
            Some(assistant)
        }
        Err(e) => {
            error!("Error initializing assistant: {}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(&args)?;

    if let Some(list) = &args.symptoms {
        let predictor = load_predictor(&config, args.skip_verify).context("Error loading files")?;
        let results = predictor.predict(&split_symptoms(list))?;
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    info!("=== Starting Disease Predictor and Chatbot ===");
    let app = App::new(
        load_predictor(&config, args.skip_verify),
        ChatSession::new(build_assistant(&config)),
    );
    if let Some(predictor) = app.predictor() {
        let info = predictor.info();
        info!(
            "Prediction ready: {} symptoms, {} diseases ({} described)",
            info.num_symptoms, info.num_classes, info.described_diseases
        );
    }

    println!("{}", render_home());
    let mut state = app.initial_state();
    println!("{}", render(&state));
    println!("{}", HELP_TEXT);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Command::Event(event) => {
                state = app.handle(state, event).await;
                println!("{}", render(&state));
            }
            Command::ListSymptoms(filter) => match app.predictor() {
                Some(predictor) => {
                    for name in list_symptoms(predictor.schema(), filter.as_deref()) {
                        println!("  {}", name);
                    }
                }
                None => println!("Prediction is unavailable."),
            },
            Command::Show => println!("{}", render(&state)),
            Command::Help => println!("{}", HELP_TEXT),
            Command::Quit => break,
            Command::Empty => {}
            Command::Unknown(word) => println!("Unknown command '{}'. Type 'help' for commands.", word),
        }
    }

    info!("=== Session ended ({} chat messages) ===", state.transcript.len());
    Ok(())
}
