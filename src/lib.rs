//! # docpilot
//!
//! A document Q&A agent: a tool-using reasoning loop over an ingested
//! text corpus.
//!
//! This library provides:
//! - An HTTP API for submitting questions and reading transcripts
//! - A bounded think/act/observe agent loop with a typed transcript
//! - A tool registry with schema-validated dispatch
//! - Embedding-backed retrieval over ingested documents via OpenRouter
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Receive a question via the API
//! 2. Build context with system prompt and available tools
//! 3. Ask the reasoning driver for the next step
//! 4. Execute tool calls, feed observations back, repeat until a final
//!    answer or a budget runs out
//!
//! ## Example
//!
//! ```rust,ignore
//! use docpilot::{agent::AgentSession, config::Config};
//!
//! let config = Config::from_env()?;
//! let session = AgentSession::new(driver, registry, config.session_limits());
//! let completed = session.run("What does chapter 3 say about ownership?").await?;
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod corpus;
pub mod driver;
pub mod error;
pub mod llm;
pub mod tools;
pub mod transcript;

pub use config::Config;
