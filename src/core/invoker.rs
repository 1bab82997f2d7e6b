//! Purpose: Validate invocation requests against the option table and run solc.
//! Exports: `Solc`, `InvocationResult`.
//! Role: The only path from keyword options to a spawned compiler process.
//! Invariants: All validation happens before spawning; a rejected request has no side effects.
//! Invariants: argv is `[binary] + sources + remappings + options (supplied order) [+ "-"]`.
//! Invariants: An exit code other than the expected one is always an error, never retried.

use std::borrow::Cow;

use bstr::ByteSlice;
use semver::Version;
use tracing::{debug, warn};

use crate::core::error::{Error, ErrorKind};
use crate::core::invocation::{Invocation, OptionValue};
use crate::core::options::{self, Arity, EnumValue, OptionSpec, Packing, ValueKind};
use crate::core::runner::{Argv, ProcessRunner, SystemRunner};
use crate::core::version::{ActiveSolc, SolcRegistry};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InvocationResult {
    pub argv: Argv,
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl InvocationResult {
    pub fn stdout_text(&self) -> Cow<'_, str> {
        self.stdout.to_str_lossy()
    }

    pub fn stderr_text(&self) -> Cow<'_, str> {
        self.stderr.to_str_lossy()
    }
}

#[derive(Clone, Debug)]
pub struct Solc<R = SystemRunner> {
    active: ActiveSolc,
    runner: R,
}

impl Solc<SystemRunner> {
    pub fn new(active: ActiveSolc) -> Self {
        Self {
            active,
            runner: SystemRunner,
        }
    }

    pub fn from_registry(registry: &SolcRegistry) -> Result<Self, Error> {
        Ok(Self::new(registry.active()?.clone()))
    }
}

impl<R: ProcessRunner> Solc<R> {
    pub fn with_runner(active: ActiveSolc, runner: R) -> Self {
        Self { active, runner }
    }

    pub fn active(&self) -> &ActiveSolc {
        &self.active
    }

    pub fn version(&self) -> &Version {
        &self.active.version
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Validate `request` and produce the argv it would run, without spawning.
    pub fn build_argv(&self, request: &Invocation) -> Result<Argv, Error> {
        let version = &self.active.version;
        let mut argv = Argv::new(&self.active.path);

        for source in request.source_files() {
            argv.args.push(source.to_string_lossy().into_owned());
        }
        argv.args.extend(request.import_remappings().iter().cloned());

        for (name, value) in request.options() {
            let spec = resolve_spec(name, version)?;
            push_option(&mut argv.args, spec, value, version)?;
        }

        if request.stdin_bytes().is_some()
            && request.source_files().is_empty()
            && !request.has_option("standard-json")
        {
            argv.args.push("-".to_string());
        }
        Ok(argv)
    }

    pub fn invoke(&self, request: &Invocation) -> Result<InvocationResult, Error> {
        let argv = self.build_argv(request)?;
        debug!(solc = %self.active.version, argv = ?argv.to_strings(), "invoking solc");

        let output = self.runner.run(&argv, request.stdin_bytes())?;
        debug!(exit_code = output.exit_code, "solc exited");

        if output.exit_code != request.expected_code() {
            let stderr = output.stderr.to_str_lossy();
            if let Some(err) = classify_rejection(&stderr, &self.active.version) {
                warn!(solc = %self.active.version, "solc rejected an option the table allows");
                return Err(err.with_argv(argv.to_strings()));
            }
            return Err(Error::new(ErrorKind::Solc)
                .with_message(format!(
                    "solc exited with code {}, expected {}",
                    output.exit_code,
                    request.expected_code()
                ))
                .with_version(self.active.version.clone())
                .with_exit_code(output.exit_code)
                .with_output(output.stdout.to_str_lossy(), stderr)
                .with_argv(argv.to_strings()));
        }

        Ok(InvocationResult {
            argv,
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

fn resolve_spec(name: &str, version: &Version) -> Result<&'static OptionSpec, Error> {
    let spec = options::lookup(name).ok_or_else(|| {
        Error::new(ErrorKind::UnknownOption)
            .with_message(format!("'--{name}' is not a recognized solc option"))
            .with_option(format!("--{name}"))
            .with_version(version.clone())
    })?;
    if spec.available_at(version) {
        return Ok(spec);
    }
    let mut message = format!("solc {version} does not support the '{}' option", spec.flag);
    if let Some((major, minor, patch)) = spec.window.removed {
        if options::triple(version) >= (major, minor, patch) {
            message = format!("{message}; it was removed in {major}.{minor}.{patch}");
        }
    }
    if let Some((major, minor, patch)) = spec.window.introduced {
        if options::triple(version) < (major, minor, patch) {
            message = format!("{message}; it requires {major}.{minor}.{patch} or newer");
        }
    }
    Err(Error::new(ErrorKind::UnknownOption)
        .with_message(message)
        .with_option(spec.flag)
        .with_version(version.clone()))
}

fn push_option(
    args: &mut Vec<String>,
    spec: &OptionSpec,
    value: &OptionValue,
    version: &Version,
) -> Result<(), Error> {
    if *value == OptionValue::Flag(false) {
        return Ok(());
    }
    let kind = match spec.arity {
        Arity::Flag => {
            if *value != OptionValue::Flag(true) {
                return Err(usage(spec, "is a flag and does not take a value"));
            }
            args.push(spec.flag.to_string());
            return Ok(());
        }
        Arity::Value(kind) => kind,
    };

    let rendered = render_value(spec, kind, value, version)?;
    match spec.packing {
        Packing::Separate => {
            args.push(spec.flag.to_string());
            args.push(rendered);
        }
        Packing::Joined => args.push(format!("{}={rendered}", spec.flag)),
    }
    Ok(())
}

fn render_value(
    spec: &OptionSpec,
    kind: ValueKind,
    value: &OptionValue,
    version: &Version,
) -> Result<String, Error> {
    match (kind, value) {
        (_, OptionValue::Flag(_)) => Err(usage(spec, "requires a value")),
        (ValueKind::Int, OptionValue::Int(number)) => Ok(number.to_string()),
        (ValueKind::Int, OptionValue::Text(text)) if text.trim().parse::<u64>().is_ok() => {
            Ok(text.trim().to_string())
        }
        (ValueKind::Int, _) => Err(usage(spec, "requires an integer value")),
        (ValueKind::Text | ValueKind::Path, OptionValue::List(_)) => {
            Err(usage(spec, "takes a single value, not a list"))
        }
        (ValueKind::Text | ValueKind::Path | ValueKind::List, value) => Ok(value.render()),
        (ValueKind::Enum(allowed), OptionValue::Text(text)) => {
            check_enum(spec, allowed, text, version)?;
            Ok(text.clone())
        }
        (ValueKind::Enum(_), _) => Err(usage(spec, "requires a named value")),
        (ValueKind::EnumList(allowed), OptionValue::Text(text)) => {
            let items: Vec<&str> = text.split(',').map(str::trim).collect();
            render_enum_list(spec, allowed, &items, version)
        }
        (ValueKind::EnumList(allowed), OptionValue::List(items)) => {
            let items: Vec<&str> = items.iter().map(|item| item.trim()).collect();
            render_enum_list(spec, allowed, &items, version)
        }
        (ValueKind::EnumList(_), _) => Err(usage(spec, "requires a list of named values")),
    }
}

/// Items are rendered exactly as validated: trimmed and comma-joined.
fn render_enum_list(
    spec: &OptionSpec,
    allowed: &[EnumValue],
    items: &[&str],
    version: &Version,
) -> Result<String, Error> {
    if items.iter().all(|item| item.is_empty()) {
        return Err(usage(spec, "requires at least one value"));
    }
    for item in items {
        check_enum(spec, allowed, item, version)?;
    }
    Ok(items.join(","))
}

fn check_enum(
    spec: &OptionSpec,
    allowed: &[EnumValue],
    value: &str,
    version: &Version,
) -> Result<(), Error> {
    let accepted = allowed
        .iter()
        .any(|candidate| candidate.name == value && candidate.window.contains(version));
    if accepted {
        return Ok(());
    }
    let names = spec.allowed_values(version).unwrap_or_default();
    Err(Error::new(ErrorKind::UnknownValue)
        .with_message(format!(
            "solc {version} does not accept '{value}' for the '{}' option",
            spec.flag
        ))
        .with_hint(format!("Allowed values: {}", names.join(", ")))
        .with_option(spec.flag)
        .with_value(value)
        .with_version(version.clone()))
}

fn usage(spec: &OptionSpec, problem: &str) -> Error {
    Error::new(ErrorKind::Usage)
        .with_message(format!("'{}' {problem}", spec.flag))
        .with_option(spec.flag)
}

/// Map solc's own option-rejection messages onto the validation taxonomy.
fn classify_rejection(stderr: &str, version: &Version) -> Option<Error> {
    let stderr = stderr.trim_start();
    if let Some(rest) = stderr.strip_prefix("unrecognised option") {
        let flag = rest.split('\'').nth(1).unwrap_or("").to_string();
        return Some(
            Error::new(ErrorKind::UnknownOption)
                .with_message(format!("solc {version} does not support the '{flag}' option"))
                .with_option(flag)
                .with_version(version.clone()),
        );
    }
    if stderr.starts_with("Invalid option") {
        let line = stderr.lines().next().unwrap_or("");
        let (head, value) = line.split_once(": ")?;
        let flag = head.split_whitespace().last().unwrap_or("").to_string();
        let value = value.trim().to_string();
        return Some(
            Error::new(ErrorKind::UnknownValue)
                .with_message(format!(
                    "solc {version} does not accept '{value}' for the '{flag}' option"
                ))
                .with_option(flag)
                .with_value(value)
                .with_version(version.clone()),
        );
    }
    None
}

#[cfg(test)]
mod tests {
    use super::classify_rejection;
    use crate::core::error::ErrorKind;
    use semver::Version;

    #[test]
    fn classifies_unrecognised_option() {
        let err = classify_rejection("unrecognised option '--ast'\n", &Version::new(0, 6, 0))
            .expect("classified");
        assert_eq!(err.kind(), ErrorKind::UnknownOption);
        assert_eq!(err.option(), Some("--ast"));
    }

    #[test]
    fn classifies_invalid_value() {
        let err = classify_rejection(
            "Invalid option to --evm-version: potato\n",
            &Version::new(0, 5, 0),
        )
        .expect("classified");
        assert_eq!(err.kind(), ErrorKind::UnknownValue);
        assert_eq!(err.option(), Some("--evm-version"));
        assert_eq!(err.value(), Some("potato"));
    }

    #[test]
    fn leaves_compile_errors_alone() {
        let stderr = "Error: Expected ';' but got '}'\n --> <stdin>:1:20:\n";
        assert!(classify_rejection(stderr, &Version::new(0, 8, 10)).is_none());
    }
}
