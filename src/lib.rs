//! # algonote
//!
//! Turns one algorithm source file into a structured study note: title,
//! problem, approach, pseudocode, complexity, edge cases, examples and a
//! plain-language explanation, plus the original code.
//!
//! Notes come from a local pattern-matching engine, from a multi-stage
//! generative pipeline, or from both (the generator refines the heuristic
//! draft). The result is saved as JSON and optionally published to Notion.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────────────┐   ┌──────────┐
//! │  source  │──▶│ generate (mode)   │──▶│  export  │  JSON file
//! │   file   │   │ heuristic │ llm   │   └──────────┘
//! └──────────┘   │     hybrid        │   ┌──────────┐
//!                └───────────────────┘──▶│ publish  │  Notion page
//!                                        └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | Core data types |
//! | [`signals`] | Pattern probes over raw source text |
//! | [`classify`] | Algorithm family and title inference |
//! | [`pseudocode`] | Canned pseudocode per family |
//! | [`complexity`] | Time/space estimate |
//! | [`edge_cases`] | Edge cases and worked examples |
//! | [`explain`] | Canned explanations |
//! | [`note`] | Heuristic assembly and normalization |
//! | [`llm`] | Generative pipeline |
//! | [`generate`] | Mode dispatch and fallback |
//! | [`publish`] | Notion publishing |
//! | [`export`] | JSON output |
//! | [`progress`] | Stage progress on stderr |
//! | [`config`] | TOML configuration and environment |

pub mod classify;
pub mod complexity;
pub mod config;
pub mod edge_cases;
pub mod explain;
pub mod export;
pub mod generate;
pub mod llm;
pub mod models;
pub mod note;
pub mod progress;
pub mod pseudocode;
pub mod publish;
pub mod signals;
