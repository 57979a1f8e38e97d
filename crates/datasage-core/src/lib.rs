//! DataSage core - schema profiling and rule-based question answering
//!
//! Reads a relational store through the [`Store`] trait, computes table
//! profiles and chat facts, and answers free-text questions with canned
//! templates or literal SQL. No model inference is involved.

pub mod assistant;
pub mod catalog;
pub mod chat;
pub mod docs;
pub mod error;
pub mod facts;
pub mod profile;
pub mod store;
pub mod translate;
pub mod types;

pub use assistant::{Assistant, AssistantConfig, ChatAnswer};
pub use chat::{route, Intent};
pub use error::{AssistantError, Result};
pub use facts::{Fact, FactExtractor, FactReport, FactTarget};
pub use profile::{Profiler, StatKind};
pub use store::{Store, StoreError};
pub use translate::{translate, QueryShape, Translation, Translator};
pub use types::*;
