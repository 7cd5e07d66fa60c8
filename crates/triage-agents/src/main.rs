use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use triage_agents::{build_orchestrator, TriageConfig};
use triage_core::{classify, TracingObserver};

fn cli() -> Command {
    let text = Arg::new("text")
        .required(true)
        .num_args(1..)
        .help("Free-text request");
    let json = Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON");

    Command::new("triage")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Rule-based intent classification and sequential agent triage")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON"),
        )
        .subcommand(
            Command::new("classify")
                .about("Classify a request and print its intent profile")
                .arg(text.clone())
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("run")
                .about("Run one full control cycle and print the report")
                .arg(text)
                .arg(json)
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Path to a TOML config file"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Random seed for reproducible simulation"),
                )
                .arg(
                    Arg::new("error-rate")
                        .long("error-rate")
                        .value_parser(value_parser!(f64))
                        .help("Probability in [0, 1] that an agent fails"),
                )
                .arg(
                    Arg::new("pace-ms")
                        .long("pace-ms")
                        .value_parser(value_parser!(u64))
                        .help("Pacing delay between lifecycle phases"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn request_text(args: &ArgMatches) -> String {
    args.get_many::<String>("text")
        .map(|words| words.cloned().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

fn run_classify(args: &ArgMatches) -> Result<()> {
    let profile = classify(&request_text(args));

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("Intent:   {}", profile.intent_type);
        println!("Severity: {}", profile.severity);
        println!("Domain:   {}", profile.domain);
        println!("Agents:   {}", profile.agents_to_invoke.join(" -> "));
        if !profile.primary_keywords.is_empty() {
            println!("Keywords: {}", profile.primary_keywords.join(", "));
        }
        if let Some(ctx) = &profile.extracted_context {
            println!("Use case: {}", ctx.use_case.marker());
            println!("Instance: {}", ctx.instance_id.as_deref().unwrap_or("-"));
            println!("Server:   {}", ctx.server_id.as_deref().unwrap_or("-"));
        }
    }
    Ok(())
}

async fn run_cycle(args: &ArgMatches) -> Result<()> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => TriageConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => TriageConfig::default(),
    };

    if let Some(seed) = args.get_one::<u64>("seed") {
        config.simulation.seed = Some(*seed);
    }
    if let Some(rate) = args.get_one::<f64>("error-rate") {
        config.simulation.error_rate = *rate;
    }
    if let Some(pace) = args.get_one::<u64>("pace-ms") {
        config.orchestrator.phase_delay_ms = *pace;
    }
    config.validate().context("invalid command-line overrides")?;

    let orchestrator = build_orchestrator(&config);
    let result = orchestrator
        .run_cycle(&request_text(args), &TracingObserver)
        .await
        .context("control cycle aborted")?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.report_data.to_markdown());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("classify", args)) => {
            init_tracing(args.get_flag("log-json"));
            run_classify(args)
        }
        Some(("run", args)) => {
            init_tracing(args.get_flag("log-json"));
            run_cycle(args).await
        }
        _ => {
            cli().print_help()?;
            Ok(())
        }
    }
}
