//! loadstar-ask: ask the broker-intelligence agent a question from the terminal.
//!
//! Usage:
//!   loadstar-ask [--context <broker>] [--config <file>] [--no-stream] [--whole-response] [--html] <question>

use anyhow::{bail, Context};
use futures::StreamExt;
use loadstar_agent::{AgentClient, AgentConfig, ChatSession, EmitMode, ReducerOptions};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Args {
    context: Option<String>,
    config: Option<String>,
    no_stream: bool,
    whole_response: bool,
    html: bool,
    question: String,
}

fn print_usage() {
    println!(
        r#"loadstar-ask — query the LoadStar broker-intelligence agent

USAGE:
    loadstar-ask [OPTIONS] <QUESTION>...

OPTIONS:
    --context <broker>    Scope the question to one broker
    --config <file>       YAML config file (environment still overrides it)
    --no-stream           Use the non-streaming endpoint
    --whole-response      Show reasoning as one block instead of per step
    --html                Print the rendered timeline markup at the end
    -h, --help            Show this help message
    -V, --version         Show version information

ENVIRONMENT:
    SNOWFLAKE_HOST        Account host serving the agent
    LOADSTAR_TOKEN_PATH   Session token file (default /snowflake/session/token)
    RUST_LOG              Log filter, e.g. loadstar_agent=debug"#
    );
}

fn parse_args(raw: &[String]) -> anyhow::Result<Option<Args>> {
    let mut args = Args::default();
    let mut words = Vec::new();
    let mut iter = raw.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--context" => {
                args.context = Some(iter.next().context("--context needs a broker name")?.clone());
            }
            "--config" => {
                args.config = Some(iter.next().context("--config needs a file path")?.clone());
            }
            "--no-stream" => args.no_stream = true,
            "--whole-response" => args.whole_response = true,
            "--html" => args.html = true,
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            "-V" | "--version" => {
                println!("loadstar-ask {}", env!("CARGO_PKG_VERSION"));
                return Ok(None);
            }
            other if other.starts_with("--") => bail!("unknown option: {other}"),
            word => words.push(word.to_string()),
        }
    }
    if words.is_empty() {
        print_usage();
        bail!("no question given");
    }
    args.question = words.join(" ");
    Ok(Some(args))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let raw: Vec<String> = std::env::args().skip(1).collect();
    let Some(args) = parse_args(&raw)? else {
        return Ok(());
    };

    let config = match &args.config {
        Some(path) => AgentConfig::from_yaml_file(path)
            .with_context(|| format!("loading config from {path}"))?,
        None => AgentConfig::from_env(),
    };
    let mut client = AgentClient::new(config).context("building agent client")?;
    if args.whole_response {
        client = client.with_reducer_options(ReducerOptions::whole_response());
    }

    let mut session = args
        .context
        .clone()
        .map(ChatSession::with_context)
        .unwrap_or_default();
    if args.no_stream {
        println!("{}", client.ask(&args.question, session.context()).await);
        return Ok(());
    }

    let mut stream = client.ask_in_session(&mut session, &args.question).await;
    let mut answer = String::new();
    while let Some(emission) = stream.next().await {
        match emission.mode {
            EmitMode::Status => eprintln!("· {}", emission.text),
            EmitMode::Sql => eprintln!("SQL:\n{}\n", emission.text),
            EmitMode::Thinking => {}
            EmitMode::Answer => answer = emission.text,
        }
    }
    println!("{answer}");

    session.record_assistant(stream.into_transcript());
    if args.html {
        if let Some(markup) = session.render_turn(1) {
            println!("\n{markup}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_and_joins_question_words() {
        let args = parse_args(&strings(&["--context", "Acme", "--no-stream", "how", "many", "loads?"]))
            .unwrap()
            .unwrap();
        assert_eq!(args.context.as_deref(), Some("Acme"));
        assert!(args.no_stream);
        assert_eq!(args.question, "how many loads?");
    }

    #[test]
    fn rejects_unknown_options_and_empty_questions() {
        assert!(parse_args(&strings(&["--bogus", "q"])).is_err());
        assert!(parse_args(&strings(&["--context"])).is_err());
        assert!(parse_args(&strings(&[])).is_err());
    }
}
