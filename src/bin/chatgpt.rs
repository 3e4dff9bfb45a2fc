//! Chat with the completion API from the console.
//!
//! Run with:
//! ```bash
//! export API_KEY="your-api-key"
//! cargo run --bin chatgpt
//! ```

use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use gpt_client::client::StreamingClient;
use gpt_client::model::{CompletionRequest, CompletionResponse, TEXT_DAVINCI_003_ENGINE};
use gpt_client::options::{ClientConfig, DEFAULT_BASE_URL};
use gpt_client::providers::OpenAiClient;

/// Exit status used when a completion call fails.
const COMPLETION_FAILED: u8 = 13;

/// Words that are read as control input rather than as a question.
const IGNORED_WORDS: [&str; 6] = ["loop", "break", "continue", "cls", "exit", "block"];

#[derive(Debug, Parser)]
#[command(name = "chatgpt", about = "Chat with ChatGPT in console.")]
struct Args {
    /// API key used as the bearer token
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    api_key: String,

    /// Organization id sent with every request
    #[arg(long, env = "OPENAI_ORGANIZATION")]
    org: Option<String>,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Engine used for completions
    #[arg(long, default_value = TEXT_DAVINCI_003_ENGINE)]
    model: String,

    #[arg(long, default_value_t = 3000)]
    max_tokens: u32,

    #[arg(long, default_value_t = 0.0)]
    temperature: f32,

    /// Budget for one whole answer, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

/// What to do with one line of input.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Quit,
    Skip,
    Question(String),
}

fn parse_input(line: &str) -> Input {
    let question = line.trim_matches(' ');
    if question == "q" {
        Input::Quit
    } else if question.is_empty() || IGNORED_WORDS.contains(&question) {
        Input::Skip
    } else {
        Input::Question(question.to_string())
    }
}

/// Print the first choice of a streamed frame as soon as it arrives.
fn write_frame(out: &mut impl Write, frame: &CompletionResponse) -> io::Result<()> {
    write!(out, "{}", frame.text())?;
    out.flush()
}

async fn answer(client: &OpenAiClient, args: &Args, question: String) -> Result<(), gpt_client::ClientError> {
    let request = CompletionRequest {
        max_tokens: Some(args.max_tokens),
        temperature: Some(args.temperature),
        ..CompletionRequest::new(question)
    };

    let mut stdout = io::stdout();
    client
        .completion_stream_with_engine(&args.model, request, &mut |frame: CompletionResponse| {
            if let Err(e) = write_frame(&mut stdout, &frame) {
                debug!(error = %e, "stdout write failed");
            }
        })
        .await?;

    println!();
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    if args.api_key.trim().is_empty() {
        eprintln!("Missing API KEY");
        return ExitCode::FAILURE;
    }

    let mut config = ClientConfig::new(args.api_key.clone())
        .with_base_url(args.base_url.clone())
        .with_timeout(Duration::from_secs(args.timeout_secs));
    if let Some(org) = &args.org {
        config = config.with_org(org.clone());
    }

    let client = match OpenAiClient::new(config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Please input question(q for exit): ");
        let _ = io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                debug!(error = %e, "stdin read failed");
                break;
            }
            None => break,
        };

        match parse_input(&line) {
            Input::Quit => break,
            Input::Skip => continue,
            Input::Question(question) => {
                if let Err(e) = answer(&client, &args, question).await {
                    println!("{}", e);
                    return ExitCode::from(COMPLETION_FAILED);
                }
            }
        }
    }

    ExitCode::SUCCESS
}
