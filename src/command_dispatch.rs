//! Purpose: Hold top-level CLI command dispatch for `solcx`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: The active solc is resolved lazily; `list` and `completion` never need one.

use super::*;

pub(super) fn dispatch_command(command: Command, target: &SolcTarget) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "solcx", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::List => {
            let versions = installed_versions(&target.dir)?;
            let versions: Vec<String> = versions.iter().map(Version::to_string).collect();
            emit_json(json!({
                "dir": target.dir.display().to_string(),
                "versions": versions,
            }));
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            let solc = target.resolve()?;
            emit_json(json!({
                "version": solc.version().to_string(),
                "path": solc.active().path.display().to_string(),
            }));
            Ok(RunOutcome::ok())
        }
        Command::Argv { options, stdin } => {
            let solc = target.resolve()?;
            let mut request = apply_option_tokens(Invocation::new(), &options)?;
            if stdin {
                request = request.stdin(Vec::new());
            }
            let argv = solc.build_argv(&request)?;
            emit_json(json!({
                "version": solc.version().to_string(),
                "argv": argv.to_strings(),
            }));
            Ok(RunOutcome::ok())
        }
        Command::Run {
            options,
            stdin,
            success_code,
        } => {
            let solc = target.resolve()?;
            let mut request =
                apply_option_tokens(Invocation::new(), &options)?.success_code(success_code);
            if let Some(path) = stdin {
                request = request.stdin(read_input(&path)?);
            }
            let result = solc.invoke(&request)?;
            write_stream(io::stdout().lock(), &result.stdout)?;
            write_stream(io::stderr().lock(), &result.stderr)?;
            Ok(RunOutcome::with_code(result.exit_code))
        }
        Command::Compile {
            files,
            output,
            options,
            allow_empty,
        } => {
            let solc = target.resolve()?;
            let mut compile_options = CompileOptions::new().allow_empty(allow_empty);
            if !output.is_empty() {
                compile_options = compile_options.outputs(output);
            }
            for (name, value) in apply_option_tokens(Invocation::new(), &options)?.options() {
                compile_options = compile_options.option(name, value.clone());
            }
            let contracts = compile_files(&solc, &files, &compile_options)?;
            emit_json(Value::Object(contracts.into_iter().collect()));
            Ok(RunOutcome::ok())
        }
        Command::StandardJson {
            input,
            options,
            allow_empty,
        } => {
            let solc = target.resolve()?;
            let path = input.unwrap_or_else(|| PathBuf::from("-"));
            let raw = read_input(&path)?;
            let input: Value = serde_json::from_slice(&raw).map_err(|err| {
                Error::new(ErrorKind::Usage)
                    .with_message("standard-json input is not valid JSON")
                    .with_path(&path)
                    .with_source(err)
            })?;
            let mut standard_options = StandardOptions::new().allow_empty(allow_empty);
            for (name, value) in apply_option_tokens(Invocation::new(), &options)?.options() {
                standard_options = standard_options.option(name, value.clone());
            }
            let output = compile_standard(&solc, &input, &standard_options)?;
            emit_json(output);
            Ok(RunOutcome::ok())
        }
    }
}
