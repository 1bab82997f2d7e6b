//! Purpose: Library crate for version-aware invocation of the solc compiler binary.
//! Exports: `api` (public surface), `core` (option table, invoker, errors), `solc_paths`.
//! Role: Backs the `solcx` CLI and embedding applications.
//! Invariants: The active compiler is always passed explicitly; there is no global selection.
//! Invariants: Option legality is decided by the static table in `core::options`.
pub mod api;
pub mod core;
pub mod solc_paths;
