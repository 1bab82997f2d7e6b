//! Purpose: Define the stable public Rust API boundary for solcx.
//! Exports: Invoker, registry, option table, request/result types, and compile helpers.
//! Role: Public, additive-only surface used by the CLI and embedding applications.
//! Invariants: Callers never need to reach into `core` for ordinary use.

mod compile;

pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::invocation::{Invocation, OptionValue};
pub use crate::core::invoker::{InvocationResult, Solc};
pub use crate::core::options::{OPTIONS, OptionSpec, lookup as lookup_option};
pub use crate::core::runner::{Argv, ProcessOutput, ProcessRunner, SystemRunner};
pub use crate::core::version::{
    ActiveSolc, SolcRegistry, detect_version, expected_help_code, parse_version_output,
};
pub use crate::solc_paths::{binary_path, default_install_dir, installed_versions};
pub use compile::{
    CompileOptions, Contracts, StandardOptions, compile_files, compile_source, compile_standard,
    default_outputs, link_code,
};
pub use semver::Version;
