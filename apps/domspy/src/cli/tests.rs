use super::args::CliArgs;
use super::args::Command;
use super::args::OutputMode;
use super::args::parse_args;
use super::decode::decode_html;
use super::decode::sniff_meta_encoding;
use super::effective_config;
use super::init_tracing;
use super::render;
use ds_analyzer::RankOrder;
use ds_core::NullLogger;
use ds_dom::Document;
use ds_html::HtmlParser;
use ds_inspector::InspectorConfig;
use std::path::PathBuf;
use std::sync::Arc;

const PAGE: &str = concat!(
    "<!DOCTYPE html>",
    "<html><head><meta charset=\"utf-8\"><title>T</title></head>",
    "<body><div data-testid=\"hero-banner\"><a href=\"https://example.com/assets/images/banners/summer.png\">x</a></div></body>",
    "</html>"
);

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

fn run_args(values: &[&str]) -> CliArgs {
    match parse_args(args(values)) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => panic!("unexpected help"),
        Err(error) => panic!("{error}"),
    }
}

fn parse(input: &str) -> Document {
    match HtmlParser.parse(input) {
        Ok(doc) => doc,
        Err(error) => panic!("{error}"),
    }
}

fn render_json(mode: OutputMode, config: &InspectorConfig) -> serde_json::Value {
    let doc = parse(PAGE);
    let output = match render(mode, &doc, config, Arc::new(NullLogger)) {
        Ok(output) => output,
        Err(error) => panic!("{error}"),
    };
    match serde_json::from_str(&output) {
        Ok(value) => value,
        Err(error) => panic!("{error}"),
    }
}

#[test]
fn parses_input_and_flags() {
    let parsed = run_args(&[
        "page.html",
        "--mode",
        "labeled",
        "--order",
        "length",
        "--max-attribute-len",
        "24",
    ]);

    assert_eq!(
        parsed,
        CliArgs {
            input: PathBuf::from("page.html"),
            mode: OutputMode::Labeled,
            order: Some(RankOrder::BySerializedLength),
            max_attribute_len: Some(24),
        }
    );
}

#[test]
fn defaults_to_annotated_mode() {
    let parsed = run_args(&["page.html"]);
    assert_eq!(parsed.mode, OutputMode::Annotated);
    assert_eq!(parsed.order, None);
}

#[test]
fn help_flag_short_circuits() {
    assert_eq!(parse_args(args(&["--help", "--bogus"])), Ok(Command::Help));
}

#[test]
fn rejects_bad_arguments() {
    let cases: [(&[&str], &str); 6] = [
        (&[], "cli.input_missing"),
        (&["a.html", "b.html"], "cli.input_duplicate"),
        (&["a.html", "--mode"], "cli.flag_value_missing"),
        (&["a.html", "--mode", "tree"], "cli.mode_invalid"),
        (&["a.html", "--order", "size"], "config.order_invalid"),
        (&["a.html", "--verbose"], "cli.flag_unknown"),
    ];

    for (values, code) in cases {
        match parse_args(args(values)) {
            Ok(command) => panic!("{values:?} parsed as {command:?}"),
            Err(error) => assert_eq!(error.code, code),
        }
    }
}

#[test]
fn flags_override_environment_config() {
    let parsed = run_args(&["a.html", "--order", "depth", "--max-attribute-len", "12"]);
    let config = match effective_config(&parsed, InspectorConfig::default()) {
        Ok(config) => config,
        Err(error) => panic!("{error}"),
    };

    assert_eq!(config.analyzer.order, RankOrder::ByDepth);
    assert_eq!(config.normalizer.max_attribute_len, 12);

    let zero = run_args(&["a.html", "--max-attribute-len", "0"]);
    assert!(effective_config(&zero, InspectorConfig::default()).is_err());
}

#[test]
fn annotated_mode_prints_wire_names() {
    let value = render_json(OutputMode::Annotated, &InspectorConfig::default());
    assert_eq!(value["tagName"], "#document");
    assert!(value["nodes"].as_u64().is_some_and(|nodes| nodes > 5));
    assert!(value["_children"].is_array());
}

#[test]
fn canonical_and_live_modes_agree_on_shape() {
    let canonical = render_json(OutputMode::Canonical, &InspectorConfig::default());
    let live = render_json(OutputMode::Live, &InspectorConfig::default());

    assert_eq!(canonical["tag"], "#document");
    assert_eq!(live["tag"], "#document");
    assert_eq!(live["children"][0]["tag"], "<!DOCTYPE html>");
}

#[test]
fn labeled_mode_uses_functional_names_and_short_values() {
    let mut config = InspectorConfig::default();
    config.analyzer.order = RankOrder::ByDepth;
    let value = render_json(OutputMode::Labeled, &config);

    let html = &value["children"][1];
    let body = &html["children"][1];
    let banner = &body["children"][0];
    assert_eq!(banner["label"], "hero_banner");
    assert_eq!(banner["path"], "#document > html > body > hero_banner");
    assert_eq!(
        banner["children"][0]["attributes"]["href"],
        "https://example.com/...s/banners/summer.png"
    );
    assert_eq!(banner["id"].as_str().map(str::len), Some(16));
}

#[test]
fn outline_mode_lists_elements() {
    let value = render_json(OutputMode::Outline, &InspectorConfig::default());
    assert_eq!(value["tag"], "html");
    assert_eq!(value["children"][0]["children"][1]["text"], "T");
}

#[test]
fn detects_meta_charset() {
    let html = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=windows-1252\">";
    assert_eq!(sniff_meta_encoding(html), Some(encoding_rs::WINDOWS_1252));

    let skips_unknown = b"<meta charset=\"bogus\"><meta charset=' Shift_JIS '>";
    assert_eq!(sniff_meta_encoding(skips_unknown), Some(encoding_rs::SHIFT_JIS));
    assert_eq!(sniff_meta_encoding(b"<p>charset=</p>"), None);
}

#[test]
fn decodes_legacy_and_bom_prefixed_input() {
    let latin = b"<meta charset='iso-8859-1'><p>caf\xE9</p>";
    assert!(decode_html(latin).contains("caf\u{e9}"));

    let bom = b"\xEF\xBB\xBF<p>\xE2\x82\xAC</p>";
    assert_eq!(decode_html(bom), "<p>\u{20AC}</p>");

    let invalid = b"<p>\xFF</p>";
    assert!(decode_html(invalid).contains('\u{FFFD}'));
}

#[test]
fn second_subscriber_install_is_reported() {
    let _ = init_tracing();
    match init_tracing() {
        Ok(()) => panic!("a second global subscriber was installed"),
        Err(error) => assert_eq!(error.code, "cli.logging_init_failed"),
    }
}
