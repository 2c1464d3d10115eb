//! Agent runtime - email classification and tool-calling orchestration
//!
//! This crate is the "brain" of maildesk:
//! - Classifies inbound email into a support intent and complexity tier
//!   (`classifier`)
//! - Picks the cheapest capable model for that tier (`router`)
//! - Runs a bounded tool-calling loop against the selected model
//!   (`runtime`), executing tools from the registry (`tools`)
//! - Grounds answers in the knowledge base via embedding retrieval (`rag`)
//!
//! # Key Types
//!
//! - `SupportAgent` - the orchestration loop (see `runtime`)
//! - `EmailProcessor` - parse + orchestrate + audit-log pipeline
//!   (see `processor`)
//! - `ChatBackend` / `EmbeddingBackend` - pluggable LLM seams (`llm`)
//!
//! # Safety Principle
//!
//! The model drafts text and chooses which tools to call; it never invents
//! order data. Factual claims come from tool results, and anything the
//! agent cannot answer is escalated to a human rather than guessed.

pub mod classifier;
pub mod llm;
pub mod openai;
pub mod processor;
pub mod prompts;
pub mod rag;
pub mod router;
pub mod runtime;
pub mod tools;
