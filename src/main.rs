//! Purpose: `solcx` CLI entry point: parse args, resolve the active solc, dispatch commands.
//! Role: Binary crate root; emits JSON on stdout and diagnostics on stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr; TTYs get text.
//! Invariants: Process exit code is derived from `api::to_exit_code`, except `run`,
//!             which mirrors solc's own exit code on success.
use std::error::Error as StdError;
use std::io::{self, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use solcx::api::{
    ActiveSolc, CompileOptions, Error, ErrorKind, Invocation, OptionValue, Solc, SolcRegistry,
    StandardOptions, SystemRunner, Version, compile_files, compile_standard, default_install_dir,
    installed_versions, to_exit_code,
};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

#[derive(Parser)]
#[command(
    name = "solcx",
    version,
    about = "Version-aware front end for the solc Solidity compiler",
    long_about = None,
    after_help = r#"EXAMPLES
  $ solcx list
  $ solcx --use 0.8.10 argv bin optimize-runs=200
  $ echo 'contract Foo {}' | solcx run abi --stdin -
  $ solcx compile contracts/Foo.sol --output abi,bin
  $ solcx --solc ./solc standard-json input.json

Options for `argv` and `run` are written as NAME or NAME=VALUE, e.g.
`evm-version=london` or `combined-json=abi,bin`."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        help = "solc binary to use; its version is detected with --version",
        value_hint = ValueHint::FilePath,
        conflicts_with = "use_version"
    )]
    solc: Option<PathBuf>,
    #[arg(
        long = "use",
        value_name = "VERSION",
        help = "Installed solc version to use (default: newest installed)"
    )]
    use_version: Option<String>,
    #[arg(
        long,
        help = "Install directory (default: $SOLCX_BINARY_PATH or ~/.solcx)",
        value_hint = ValueHint::DirPath
    )]
    dir: Option<PathBuf>,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Print the active solc version and path")]
    Version,
    #[command(about = "List solc versions installed in the install directory")]
    List,
    #[command(about = "Validate options and print the argv solc would be run with")]
    Argv {
        #[arg(value_name = "OPTION[=VALUE]")]
        options: Vec<String>,
        #[arg(long, help = "Build argv as if a source were piped on stdin")]
        stdin: bool,
    },
    #[command(about = "Run solc with validated options and forward its output")]
    Run {
        #[arg(value_name = "OPTION[=VALUE]")]
        options: Vec<String>,
        #[arg(long, value_name = "FILE", help = "Pipe FILE (or - for stdin) into solc")]
        stdin: Option<PathBuf>,
        #[arg(long, default_value_t = 0, help = "Exit code solc must return")]
        success_code: i32,
    },
    #[command(about = "Compile source files with --combined-json and print contracts as JSON")]
    Compile {
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        files: Vec<PathBuf>,
        #[arg(long, value_delimiter = ',', help = "Combined-json outputs (default: all available)")]
        output: Vec<String>,
        #[arg(long = "option", value_name = "OPTION[=VALUE]", help = "Extra solc option")]
        options: Vec<String>,
        #[arg(long, help = "Succeed even when no contracts are produced")]
        allow_empty: bool,
    },
    #[command(about = "Compile a standard-json input and print solc's JSON output")]
    StandardJson {
        #[arg(value_name = "FILE", help = "Input JSON file, or - for stdin (default: -)")]
        input: Option<PathBuf>,
        #[arg(long = "option", value_name = "OPTION[=VALUE]", help = "Extra solc option")]
        options: Vec<String>,
        #[arg(long, help = "Allow input without sources")]
        allow_empty: bool,
    },
    #[command(about = "Generate shell completions")]
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `solcx --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    let target = SolcTarget {
        solc: cli.solc,
        use_version: cli.use_version,
        dir: cli.dir.unwrap_or_else(default_install_dir),
    };
    command_dispatch::dispatch_command(cli.command, &target).map_err(|err| (err, color_mode))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Where the active compiler comes from: an explicit binary or the install directory.
struct SolcTarget {
    solc: Option<PathBuf>,
    use_version: Option<String>,
    dir: PathBuf,
}

impl SolcTarget {
    fn resolve(&self) -> Result<Solc, Error> {
        if let Some(path) = &self.solc {
            let active = ActiveSolc::detect(path, &SystemRunner)?;
            return Ok(Solc::new(active));
        }
        let requested = self
            .use_version
            .as_deref()
            .map(parse_requested_version)
            .transpose()?;
        let registry = SolcRegistry::from_install_dir(&self.dir, requested.as_ref())?;
        Solc::from_registry(&registry)
    }
}

fn parse_requested_version(text: &str) -> Result<Version, Error> {
    let trimmed = text.trim().trim_start_matches('v');
    Version::parse(trimmed).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid solc version '{text}'"))
            .with_hint("Use a full version like 0.8.10.")
            .with_source(err)
    })
}

/// Parse `NAME` or `NAME=VALUE` into an option on `request`.
fn apply_option_token(request: Invocation, token: &str) -> Result<Invocation, Error> {
    let token = token.trim();
    if token.is_empty() || token == "-" || token == "--" {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(format!("invalid option '{token}'"))
            .with_hint("Write options as NAME or NAME=VALUE."));
    }
    Ok(match token.split_once('=') {
        Some((name, value)) => request.option(name, OptionValue::Text(value.to_string())),
        None => request.flag(token),
    })
}

fn apply_option_tokens(mut request: Invocation, tokens: &[String]) -> Result<Invocation, Error> {
    for token in tokens {
        request = apply_option_token(request, token)?;
    }
    Ok(request)
}

fn read_input(path: &Path) -> Result<Vec<u8>, Error> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read stdin")
                .with_source(err)
        })?;
        return Ok(buf);
    }
    std::fs::read(path).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read input file")
            .with_path(path)
            .with_source(err)
    })
}

fn write_stream(mut out: impl Write, bytes: &[u8]) -> Result<(), Error> {
    out.write_all(bytes)
        .and_then(|()| out.flush())
        .map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to forward solc output")
                .with_source(err)
        })
}

fn emit_json(value: Value) {
    let encoded = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    let json = encoded.unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotInstalled => "solc is not installed".to_string(),
        ErrorKind::UnknownOption => "unknown option".to_string(),
        ErrorKind::UnknownValue => "unknown option value".to_string(),
        ErrorKind::Solc => "solc failed".to_string(),
        ErrorKind::ContractsNotFound => "no contracts found".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(option) = err.option() {
        inner.insert("option".to_string(), json!(option));
    }
    if let Some(value) = err.value() {
        inner.insert("value".to_string(), json!(value));
    }
    if let Some(version) = err.version() {
        inner.insert("solc_version".to_string(), json!(version.to_string()));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(code) = err.exit_code() {
        inner.insert("exit_code".to_string(), json!(code));
    }
    if let Some(stderr) = err.stderr() {
        inner.insert("stderr".to_string(), json!(stderr));
    }
    if let Some(argv) = err.argv() {
        inner.insert("argv".to_string(), json!(argv));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));
    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(stderr) = err.stderr().filter(|stderr| !stderr.trim().is_empty()) {
        lines.push(format!(
            "{}\n{}",
            colorize_label("solc stderr:", use_color, AnsiColor::Yellow),
            stderr.trim_end()
        ));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

#[cfg(test)]
mod tests {
    use super::{Cli, apply_option_tokens, error_json, error_text, parse_requested_version};
    use clap::CommandFactory;
    use solcx::api::{Error, ErrorKind, Invocation, OptionValue, Version};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn option_tokens_become_flags_and_values() {
        let tokens = vec![
            "bin".to_string(),
            "--optimize-runs=200".to_string(),
            "combined_json=abi,bin".to_string(),
        ];
        let request = apply_option_tokens(Invocation::new(), &tokens).expect("tokens");
        let options = request.options();
        assert_eq!(options[0], ("bin".to_string(), OptionValue::Flag(true)));
        assert_eq!(
            options[1],
            ("optimize-runs".to_string(), OptionValue::Text("200".to_string()))
        );
        assert_eq!(options[2].0, "combined-json");
    }

    #[test]
    fn bare_dash_token_is_usage_error() {
        let err = apply_option_tokens(Invocation::new(), &["-".to_string()]).expect_err("dash");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn requested_version_accepts_v_prefix() {
        assert_eq!(
            parse_requested_version("v0.8.10").expect("version"),
            Version::new(0, 8, 10)
        );
        let err = parse_requested_version("latest").expect_err("bad");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn error_json_carries_option_context() {
        let err = Error::new(ErrorKind::UnknownValue)
            .with_message("bad value")
            .with_option("--evm-version")
            .with_value("potato")
            .with_version(Version::new(0, 8, 10));
        let value = error_json(&err);
        assert_eq!(value["error"]["kind"], "UnknownValue");
        assert_eq!(value["error"]["option"], "--evm-version");
        assert_eq!(value["error"]["value"], "potato");
        assert_eq!(value["error"]["solc_version"], "0.8.10");
    }

    #[test]
    fn error_text_respects_color_flag() {
        let err = Error::new(ErrorKind::Usage).with_message("bad input");
        let colored = error_text(&err, true);
        let plain = error_text(&err, false);
        assert!(colored.contains("\u{1b}[31merror:\u{1b}[0m"));
        assert!(plain.contains("error:"));
        assert!(!plain.contains("\u{1b}["));
    }
}
