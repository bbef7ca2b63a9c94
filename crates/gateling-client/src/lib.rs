//! Client library for an OpenAI-compatible AI gateway.
//!
//! The gateway (by default at `http://localhost:8080/ai`) fronts many model
//! providers behind one chat-completions surface; this crate speaks that
//! surface. Its centerpiece is [`StreamAccumulator`], which folds the
//! fragmented deltas of a streamed response back into the full assistant text
//! and the complete, index-ordered list of tool calls.
//!
//! On top of the accumulator sit [`GatewayClient`] (HTTP + SSE transport),
//! [`ToolRegistry`] (name-to-handler dispatch) and [`ChatRunner`] (the
//! tool-call follow-up loop).

pub mod accumulator;
pub mod chunk;
pub mod client;
pub mod config;
pub mod context;
pub mod runner;
pub mod stream;
pub mod tools;

pub use accumulator::StreamAccumulator;
pub use client::{ChatOutcome, GatewayClient};
pub use config::GatewayConfig;
pub use context::ContextWindow;
pub use runner::ChatRunner;
pub use stream::StreamEvent;
pub use tools::{Tool, ToolDescriptor, ToolRegistry};
