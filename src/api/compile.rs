//! Purpose: Convenience compilation entry points built on the raw invoker.
//! Exports: `CompileOptions`, `compile_source`, `compile_files`, `compile_standard`, `link_code`.
//! Role: Turn solc's combined-json and standard-json stdout into `serde_json` values.
//! Invariants: Contracts are keyed `<source>:<Contract>` exactly as solc reports them.
//! Invariants: Pre-0.8.0 string-encoded ABIs are decoded so callers always see JSON arrays.
//! Invariants: Standard-json errors with severity `error` fail the call; warnings pass through.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::error::{Error, ErrorKind};
use crate::core::invocation::{Invocation, OptionValue};
use crate::core::invoker::{InvocationResult, Solc};
use crate::core::options;
use crate::core::runner::ProcessRunner;

pub type Contracts = BTreeMap<String, Value>;

#[derive(Clone, Debug, Default)]
pub struct CompileOptions {
    outputs: Option<Vec<String>>,
    allow_empty: bool,
    base: Invocation,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict `--combined-json` to these outputs instead of every available one.
    pub fn outputs<I, S>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs = Some(outputs.into_iter().map(Into::into).collect());
        self
    }

    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    /// Extra solc options (e.g. `optimize`, `evm-version`, remappings).
    pub fn option(mut self, name: &str, value: impl Into<OptionValue>) -> Self {
        self.base = self.base.option(name, value);
        self
    }

    pub fn remapping(mut self, remapping: impl Into<String>) -> Self {
        self.base = self.base.remapping(remapping);
        self
    }
}

/// Every combined-json output the active version can emit.
pub fn default_outputs<R: ProcessRunner>(solc: &Solc<R>) -> Vec<String> {
    options::lookup("combined-json")
        .and_then(|spec| spec.allowed_values(solc.version()))
        .unwrap_or_default()
        .into_iter()
        .filter(|name| *name != "compact-format")
        .map(str::to_string)
        .collect()
}

pub fn compile_source<R: ProcessRunner>(
    solc: &Solc<R>,
    source: &str,
    options: &CompileOptions,
) -> Result<Contracts, Error> {
    let request = combined_request(solc, options).stdin(source.as_bytes().to_vec());
    compile_combined(solc, request, options.allow_empty)
}

pub fn compile_files<R: ProcessRunner>(
    solc: &Solc<R>,
    paths: &[PathBuf],
    options: &CompileOptions,
) -> Result<Contracts, Error> {
    if paths.is_empty() {
        return Err(Error::new(ErrorKind::Usage).with_message("no source files given"));
    }
    let request = combined_request(solc, options).sources(paths.iter().cloned());
    compile_combined(solc, request, options.allow_empty)
}

fn combined_request<R: ProcessRunner>(solc: &Solc<R>, options: &CompileOptions) -> Invocation {
    let outputs = options
        .outputs
        .clone()
        .unwrap_or_else(|| default_outputs(solc));
    options.base.clone().option("combined-json", outputs)
}

fn compile_combined<R: ProcessRunner>(
    solc: &Solc<R>,
    request: Invocation,
    allow_empty: bool,
) -> Result<Contracts, Error> {
    let result = solc.invoke(&request)?;
    let contracts = parse_combined_json(&result)?;
    debug!(count = contracts.len(), "parsed combined-json contracts");
    if contracts.is_empty() && !allow_empty {
        return Err(Error::new(ErrorKind::ContractsNotFound)
            .with_message("no contracts found in compiled sources")
            .with_version(solc.version().clone())
            .with_output(result.stdout_text(), result.stderr_text())
            .with_argv(result.argv.to_strings()));
    }
    Ok(contracts)
}

fn parse_json_stdout(result: &InvocationResult) -> Result<Value, Error> {
    serde_json::from_slice(&result.stdout).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("solc output is not valid JSON")
            .with_output(result.stdout_text(), result.stderr_text())
            .with_argv(result.argv.to_strings())
            .with_source(err)
    })
}

fn parse_combined_json(result: &InvocationResult) -> Result<Contracts, Error> {
    let mut output = parse_json_stdout(result)?;
    let sources = match output.get_mut("sources").map(Value::take) {
        Some(Value::Object(sources)) => sources,
        _ => Map::new(),
    };
    let contracts = match output.get_mut("contracts").map(Value::take) {
        Some(Value::Object(contracts)) => contracts,
        _ => Map::new(),
    };

    let mut parsed = Contracts::new();
    for (key, mut data) in contracts {
        if let Some(Value::String(text)) = data.get("abi") {
            let abi: Value = serde_json::from_str(text).map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message(format!("abi for {key} is not valid JSON"))
                    .with_source(err)
            })?;
            data["abi"] = abi;
        }
        let source_name = key.rsplit_once(':').map_or(key.as_str(), |(name, _)| name);
        let ast = sources
            .get(source_name)
            .and_then(|source| source.get("AST").or_else(|| source.get("ast")))
            .cloned();
        if let (Some(ast), Value::Object(fields)) = (ast, &mut data) {
            fields.insert("ast".to_string(), ast);
        }
        parsed.insert(key, data);
    }
    Ok(parsed)
}

#[derive(Clone, Debug, Default)]
pub struct StandardOptions {
    allow_empty: bool,
    base: Invocation,
}

impl StandardOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    /// Extra solc options (e.g. `base-path`, `allow-paths`, `output-dir`).
    pub fn option(mut self, name: &str, value: impl Into<OptionValue>) -> Self {
        self.base = self.base.option(name, value);
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StandardJsonError {
    severity: String,
    #[serde(default)]
    formatted_message: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

pub fn compile_standard<R: ProcessRunner>(
    solc: &Solc<R>,
    input: &Value,
    options: &StandardOptions,
) -> Result<Value, Error> {
    let has_sources = input
        .get("sources")
        .and_then(Value::as_object)
        .is_some_and(|sources| !sources.is_empty());
    if !has_sources && !options.allow_empty {
        return Err(Error::new(ErrorKind::ContractsNotFound)
            .with_message("input JSON does not contain any sources"));
    }

    let stdin = serde_json::to_vec(input).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode standard-json input")
            .with_source(err)
    })?;
    let request = options.base.clone().flag("standard-json").stdin(stdin);
    let result = solc.invoke(&request)?;
    let output = parse_json_stdout(&result)?;

    let errors: Vec<StandardJsonError> = match output.get("errors") {
        Some(errors) => serde_json::from_value(errors.clone()).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("unexpected shape of standard-json errors")
                .with_source(err)
        })?,
        None => Vec::new(),
    };
    let messages: Vec<&str> = errors
        .iter()
        .filter(|error| error.severity == "error")
        .map(|error| {
            error
                .formatted_message
                .as_deref()
                .or(error.message.as_deref())
                .unwrap_or("unknown error")
        })
        .collect();
    if !messages.is_empty() {
        return Err(Error::new(ErrorKind::Solc)
            .with_message(messages.join("\n"))
            .with_version(solc.version().clone())
            .with_exit_code(result.exit_code)
            .with_output(result.stdout_text(), result.stderr_text())
            .with_argv(result.argv.to_strings()));
    }
    Ok(output)
}

/// Fill library placeholders in unlinked bytecode via `solc --link`.
///
/// `libraries` maps fully qualified library names to deployed addresses.
pub fn link_code<R: ProcessRunner>(
    solc: &Solc<R>,
    bytecode: &str,
    libraries: &BTreeMap<String, String>,
) -> Result<String, Error> {
    if libraries.is_empty() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("no libraries given to link")
            .with_option("--libraries"));
    }
    let pairs: Vec<String> = libraries
        .iter()
        .map(|(name, address)| format!("{name}:{address}"))
        .collect();
    let request = Invocation::new()
        .flag("link")
        .option("libraries", pairs)
        .stdin(bytecode.as_bytes().to_vec());
    let result = solc.invoke(&request)?;
    debug!(libraries = libraries.len(), "linked bytecode");
    Ok(result
        .stdout_text()
        .replace("Linking completed.", "")
        .trim()
        .to_string())
}
