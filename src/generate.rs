//! Mode dispatch.
//!
//! `heuristic` runs the local pipeline only. `llm` asks the generator for a
//! whole note. `hybrid` drafts heuristically and lets the generator rewrite the
//! prose. Any generator failure falls back to the heuristic note and is logged
//! as a warning; the heuristic path itself cannot fail.

use crate::config::Config;
use crate::llm::{NoteGenerator, Refinement};
use crate::models::{Mode, Note, SourceUnit};
use crate::note::{dedupe_cases, heuristic_note, normalize};
use crate::progress::StageProgressReporter;

/// Maximum edge cases kept after a hybrid merge.
pub const HYBRID_EDGE_CASE_CAP: usize = 6;

/// A finished note and how it was produced.
#[derive(Debug, Clone)]
pub struct Generated {
    pub note: Note,
    /// Mode that actually produced the note.
    pub produced_by: Mode,
}

impl Generated {
    pub fn fell_back(&self, requested: Mode) -> bool {
        self.produced_by != requested
    }
}

pub async fn build_note(
    config: &Config,
    unit: &SourceUnit,
    mode: Mode,
    generator: &dyn NoteGenerator,
    progress: &dyn StageProgressReporter,
) -> Generated {
    match mode {
        Mode::Heuristic => heuristic(config, unit),
        Mode::Llm => {
            tracing::info!(generator = generator.name(), "generating note");
            match generator.generate(unit, progress).await {
                Ok(note) => Generated {
                    note: normalize(note, &unit.name, config.limits.max_code_chars),
                    produced_by: Mode::Llm,
                },
                Err(e) => {
                    tracing::warn!(stage = e.stage(), error = %e, "generation failed; using heuristic note");
                    heuristic(config, unit)
                }
            }
        }
        Mode::Hybrid => {
            let draft = heuristic_note(unit, &config.limits);
            tracing::info!(generator = generator.name(), "refining heuristic note");
            match generator.refine(unit, &draft, progress).await {
                Ok(refinement) => Generated {
                    note: merge_refinement(draft, refinement, config.limits.max_code_chars),
                    produced_by: Mode::Hybrid,
                },
                Err(e) => {
                    tracing::warn!(stage = e.stage(), error = %e, "refinement failed; keeping heuristic note");
                    Generated {
                        note: draft,
                        produced_by: Mode::Heuristic,
                    }
                }
            }
        }
    }
}

fn heuristic(config: &Config, unit: &SourceUnit) -> Generated {
    tracing::info!(name = %unit.name, language = %unit.language, "building heuristic note");
    Generated {
        note: heuristic_note(unit, &config.limits),
        produced_by: Mode::Heuristic,
    }
}

/// Title, problem, pseudocode and complexity stay heuristic. Approach and
/// explanation are replaced when the refinement has them. Edge cases are
/// refinement-first, deduplicated, capped at [`HYBRID_EDGE_CASE_CAP`].
pub fn merge_refinement(draft: Note, refinement: Refinement, max_code_chars: usize) -> Note {
    let fallback = draft.title.clone();
    let mut note = draft;

    if !refinement.approach.trim().is_empty() {
        note.approach = refinement.approach;
    }
    if !refinement.explanation.trim().is_empty() {
        note.explanation = refinement.explanation;
    }

    let mut cases = refinement.edge_cases;
    cases.append(&mut note.edge_cases);
    note.edge_cases = dedupe_cases(cases);
    note.edge_cases.truncate(HYBRID_EDGE_CASE_CAP);

    normalize(note, &fallback, max_code_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::TITLE_NOT_INFERRED;
    use crate::llm::{Stage, StageError};
    use crate::progress::NoProgress;
    use async_trait::async_trait;

    const SELECTION_SORT: &str = include_str!("../tests/fixtures/selection_sort.cpp");

    /// Returns canned output, or a parse error when none is set.
    struct StubGenerator {
        note: Option<Note>,
        refinement: Option<Refinement>,
    }

    #[async_trait]
    impl NoteGenerator for StubGenerator {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(
            &self,
            _unit: &SourceUnit,
            _progress: &dyn StageProgressReporter,
        ) -> Result<Note, StageError> {
            self.note.clone().ok_or(StageError::Parse {
                stage: Stage::Analyze,
                message: "no canned note".to_string(),
            })
        }

        async fn refine(
            &self,
            _unit: &SourceUnit,
            _draft: &Note,
            _progress: &dyn StageProgressReporter,
        ) -> Result<Refinement, StageError> {
            self.refinement.clone().ok_or(StageError::Request {
                stage: Stage::Refine,
                message: "connection refused".to_string(),
            })
        }
    }

    fn failing() -> StubGenerator {
        StubGenerator {
            note: None,
            refinement: None,
        }
    }

    fn unit() -> SourceUnit {
        SourceUnit::new("selection_sort", "cpp", SELECTION_SORT)
    }

    #[tokio::test]
    async fn heuristic_mode_never_calls_generator() {
        let generator = StubGenerator {
            note: Some(Note {
                title: "from generator".to_string(),
                ..Note::default()
            }),
            refinement: None,
        };
        let out = build_note(&Config::minimal(), &unit(), Mode::Heuristic, &generator, &NoProgress).await;
        assert_eq!(out.produced_by, Mode::Heuristic);
        assert_eq!(out.note.title, "Selection Sort (likely)");
    }

    #[tokio::test]
    async fn llm_failure_falls_back_to_heuristic() {
        let out = build_note(&Config::minimal(), &unit(), Mode::Llm, &failing(), &NoProgress).await;
        assert!(out.fell_back(Mode::Llm));
        assert_eq!(out.note.title, "Selection Sort (likely)");
    }

    #[tokio::test]
    async fn llm_output_is_normalized() {
        let generator = StubGenerator {
            note: Some(Note {
                title: "  ".to_string(),
                language: " C++ ".to_string(),
                edge_cases: vec!["a".to_string(), "A".to_string()],
                code: "int main() {}".to_string(),
                ..Note::default()
            }),
            refinement: None,
        };
        let out = build_note(&Config::minimal(), &unit(), Mode::Llm, &generator, &NoProgress).await;
        assert_eq!(out.produced_by, Mode::Llm);
        assert_eq!(out.note.title, "selection_sort");
        assert_eq!(out.note.language, "c++");
        assert_eq!(out.note.edge_cases, vec!["a"]);
        assert_ne!(out.note.title, TITLE_NOT_INFERRED);
    }

    #[tokio::test]
    async fn hybrid_keeps_structure_and_caps_cases() {
        let generator = StubGenerator {
            note: None,
            refinement: Some(Refinement {
                approach: "Grow a sorted prefix one minimum at a time.".to_string(),
                explanation: String::new(),
                edge_cases: vec![
                    "array of length 1".to_string(),
                    "Empty input".to_string(),
                    "very large n".to_string(),
                ],
            }),
        };
        let draft = heuristic_note(&unit(), &Config::minimal().limits);
        let out = build_note(&Config::minimal(), &unit(), Mode::Hybrid, &generator, &NoProgress).await;

        assert_eq!(out.produced_by, Mode::Hybrid);
        assert_eq!(out.note.title, draft.title);
        assert_eq!(out.note.pseudocode, draft.pseudocode);
        assert_eq!(out.note.problem, draft.problem);
        assert_eq!(out.note.approach, "Grow a sorted prefix one minimum at a time.");
        assert_eq!(out.note.explanation, draft.explanation);

        assert_eq!(out.note.edge_cases.len(), HYBRID_EDGE_CASE_CAP);
        assert_eq!(out.note.edge_cases[0], "array of length 1");
        assert_eq!(out.note.edge_cases[1], "Empty input");
        assert_eq!(
            out.note
                .edge_cases
                .iter()
                .filter(|c| c.eq_ignore_ascii_case("empty input"))
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn hybrid_failure_keeps_draft() {
        let draft = heuristic_note(&unit(), &Config::minimal().limits);
        let out = build_note(&Config::minimal(), &unit(), Mode::Hybrid, &failing(), &NoProgress).await;
        assert!(out.fell_back(Mode::Hybrid));
        assert_eq!(out.note, draft);
    }
}
