use ds_analyzer::RankOrder;
use ds_core::DomspyError;
use ds_core::DomspyResult;
use ds_inspector::parse_max_attribute_len;
use ds_inspector::parse_order;
use std::path::PathBuf;

pub(super) const USAGE: &str = "usage: domspy <file.html> [--mode annotated|canonical|live|labeled|outline] [--order nodes|depth|length] [--max-attribute-len N]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) enum OutputMode {
    #[default]
    Annotated,
    Canonical,
    Live,
    Labeled,
    Outline,
}

impl OutputMode {
    pub(super) fn as_str(self) -> &'static str {
        match self {
            Self::Annotated => "annotated",
            Self::Canonical => "canonical",
            Self::Live => "live",
            Self::Labeled => "labeled",
            Self::Outline => "outline",
        }
    }

    pub(super) fn from_name(value: &str) -> Option<Self> {
        match value {
            "annotated" => Some(Self::Annotated),
            "canonical" => Some(Self::Canonical),
            "live" => Some(Self::Live),
            "labeled" => Some(Self::Labeled),
            "outline" => Some(Self::Outline),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct CliArgs {
    pub(super) input: PathBuf,
    pub(super) mode: OutputMode,
    pub(super) order: Option<RankOrder>,
    pub(super) max_attribute_len: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Command {
    Help,
    Run(CliArgs),
}

pub(super) fn parse_args<I>(args: I) -> DomspyResult<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut input = None;
    let mut mode = OutputMode::default();
    let mut order = None;
    let mut max_attribute_len = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--mode" => {
                let name = flag_value(&mut args, "--mode")?;
                mode = OutputMode::from_name(&name).ok_or_else(|| {
                    DomspyError::new(
                        "cli.mode_invalid",
                        format!(
                            "unsupported mode `{name}` (expected: annotated|canonical|live|labeled|outline)"
                        ),
                    )
                })?;
            }
            "--order" => order = Some(parse_order(&flag_value(&mut args, "--order")?)?),
            "--max-attribute-len" => {
                let value = flag_value(&mut args, "--max-attribute-len")?;
                max_attribute_len = Some(parse_max_attribute_len(&value)?);
            }
            flag if flag.starts_with("--") => {
                return Err(DomspyError::new(
                    "cli.flag_unknown",
                    format!("unknown flag `{flag}`"),
                ));
            }
            other if input.is_some() => {
                return Err(DomspyError::new(
                    "cli.input_duplicate",
                    format!("unexpected extra argument `{other}`"),
                ));
            }
            other => input = Some(PathBuf::from(other)),
        }
    }

    let input = input.ok_or_else(|| DomspyError::new("cli.input_missing", "missing input file"))?;
    Ok(Command::Run(CliArgs {
        input,
        mode,
        order,
        max_attribute_len,
    }))
}

fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str) -> DomspyResult<String> {
    args.next().ok_or_else(|| {
        DomspyError::new(
            "cli.flag_value_missing",
            format!("missing value after {flag}"),
        )
    })
}
