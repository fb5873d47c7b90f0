//! Gastro App - gastritis care tracker
//!
//! Wires the model, store and advisor crates into a command-line
//! application:
//! - Guest mode keeps symptoms in a local file store; signed-in users go to
//!   the hosted backend
//! - The care dashboard loads history and today's record concurrently and
//!   degrades each failed read to "nothing"
//! - The food advisor is only constructed when `advise` runs, so a missing
//!   LLM key never blocks the rest of the app

pub mod cli;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod logging;
pub mod render;

pub use cli::{execute, Command};
pub use config::{Args, LogFormat};
pub use context::{AppContext, Session};
