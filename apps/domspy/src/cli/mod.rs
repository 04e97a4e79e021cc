use ds_analyzer::TreeAnalyzer;
use ds_core::DomspyError;
use ds_core::DomspyResult;
use ds_core::SharedLogger;
use ds_core::default_logger;
use ds_dom::Document;
use ds_dom::HostTree;
use ds_html::HtmlParser;
use ds_inspector::InspectorConfig;
use ds_normalize::Normalizer;
use ds_normalize::ShapeNode;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod args;
mod decode;

use args::CliArgs;
use args::Command;
use args::OutputMode;
use args::USAGE;
use args::parse_args;
use decode::decode_html;

const LOG_ENV: &str = "DOMSPY_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

pub(crate) fn run() -> ExitCode {
    if let Err(error) = init_tracing() {
        eprintln!("domspy: {error}");
    }

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(error) => {
            eprintln!("domspy: {error}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    let args = match command {
        Command::Help => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Command::Run(args) => args,
    };

    match execute(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("domspy: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Installs the stderr subscriber; fails if one is already installed.
fn init_tracing() -> DomspyResult<()> {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| {
            DomspyError::new(
                "cli.logging_init_failed",
                format!("logging disabled: {error}"),
            )
        })
}

fn execute(args: &CliArgs) -> DomspyResult<String> {
    let config = effective_config(args, InspectorConfig::from_env()?)?;
    let body = std::fs::read(&args.input).map_err(|error| {
        DomspyError::new(
            "cli.read_failed",
            format!("failed to read `{}`: {error}", args.input.display()),
        )
    })?;
    let doc = HtmlParser.parse(&decode_html(&body))?;

    tracing::debug!(
        mode = args.mode.as_str(),
        nodes = doc.node_count(),
        "rendering document"
    );
    render(args.mode, &doc, &config, default_logger())
}

/// Applies command-line overrides on top of the environment configuration.
fn effective_config(args: &CliArgs, mut config: InspectorConfig) -> DomspyResult<InspectorConfig> {
    if let Some(order) = args.order {
        config.analyzer.order = order;
    }
    if let Some(max_attribute_len) = args.max_attribute_len {
        config.normalizer.max_attribute_len = max_attribute_len;
    }
    config.validate()?;
    Ok(config)
}

fn render(
    mode: OutputMode,
    doc: &Document,
    config: &InspectorConfig,
    logger: SharedLogger,
) -> DomspyResult<String> {
    let analyzer = TreeAnalyzer::new(config.analyzer.clone(), logger.clone());
    let normalizer = Normalizer::new(config.normalizer.clone(), logger);

    let value = match mode {
        OutputMode::Annotated => to_json(&analyzer.analyze(doc, doc.root()))?,
        OutputMode::Canonical => {
            let analysis = analyzer.analyze(doc, doc.root());
            to_json(&normalizer.canonicalize_annotated(&analysis))?
        }
        OutputMode::Live => to_json(&normalizer.analyze_dom(doc))?,
        OutputMode::Labeled => {
            let analysis = analyzer.analyze(doc, doc.root());
            to_json(&normalizer.label_tree(Some(&ShapeNode::from_annotated(&analysis))))?
        }
        OutputMode::Outline => to_json(&normalizer.outline_elements(doc))?,
    };

    serde_json::to_string_pretty(&value).map_err(encode_error)
}

fn to_json<T: serde::Serialize>(value: &T) -> DomspyResult<serde_json::Value> {
    serde_json::to_value(value).map_err(encode_error)
}

fn encode_error(error: serde_json::Error) -> DomspyError {
    DomspyError::new("cli.encode_failed", format!("failed to encode output: {error}"))
}

#[cfg(test)]
mod tests;
