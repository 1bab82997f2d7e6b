// Core modules implementing option gating, invocation, and error modeling.
pub mod error;
pub mod invocation;
pub mod invoker;
pub mod options;
pub mod runner;
pub mod version;
