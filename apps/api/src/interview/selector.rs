//! Phase Selector: picks the questions for a single interview phase.
//!
//! Flow: index search → category validation → random working set →
//!       curator call → strict validation → random fill of any shortfall.
//!
//! Curator problems never escape this module. Any failure is logged and the
//! missing picks are sampled from the working set instead.

use std::collections::HashSet;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::interview::curation::{parse_curation, CurationError};
use crate::interview::curator::QuestionCurator;
use crate::interview::models::{
    finalize, CurationCandidate, FinalQuestion, InterviewContext, InterviewRequest,
    QUESTIONS_PER_PHASE,
};
use crate::interview::prompts::{render, CURATION_PROMPT_TEMPLATE};
use crate::questions::index::QuestionIndex;
use crate::questions::{Phase, QuestionRecord};

/// Bounds for one phase's retrieval and curation.
#[derive(Debug, Clone)]
pub struct SelectionSettings {
    /// `top_k` for the index search.
    pub candidate_pool_size: usize,
    /// Upper bound on questions shown to the curator.
    pub working_set_size: usize,
    pub curator_timeout: Duration,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            candidate_pool_size: 200,
            working_set_size: 20,
            curator_timeout: Duration::from_secs(30),
        }
    }
}

pub struct PhaseSelector<'a> {
    index: &'a dyn QuestionIndex,
    curator: &'a dyn QuestionCurator,
    settings: &'a SelectionSettings,
}

impl<'a> PhaseSelector<'a> {
    pub fn new(
        index: &'a dyn QuestionIndex,
        curator: &'a dyn QuestionCurator,
        settings: &'a SelectionSettings,
    ) -> Self {
        Self {
            index,
            curator,
            settings,
        }
    }

    /// Selects up to `QUESTIONS_PER_PHASE` unused questions for `phase` and
    /// records them in `ctx`. Fewer are returned only when the working set has
    /// fewer unused members; the caller decides whether that is acceptable.
    pub async fn select<R: Rng + Send>(
        &self,
        request: &InterviewRequest,
        phase: Phase,
        ctx: &mut InterviewContext,
        rng: &mut R,
    ) -> Result<Vec<FinalQuestion>, AppError> {
        let candidates = self.index.search(
            &request.relevance_query(),
            self.settings.candidate_pool_size,
            Some(phase.category()),
        );
        if candidates.is_empty() {
            return Err(AppError::QuestionsUnavailable(format!(
                "No interview questions available for {phase} phase"
            )));
        }

        let mut seen = HashSet::new();
        let valid: Vec<QuestionRecord> = candidates
            .into_iter()
            .filter(|q| q.is_well_formed() && phase.matches(&q.category))
            .filter(|q| seen.insert(q.question.clone()))
            .collect();
        if valid.is_empty() {
            return Err(AppError::QuestionsUnavailable(format!(
                "No valid interview questions available for {phase} phase"
            )));
        }

        let working_set: Vec<QuestionRecord> = valid
            .choose_multiple(rng, self.settings.working_set_size)
            .cloned()
            .collect();
        if working_set.is_empty() {
            return Err(AppError::QuestionsUnavailable(format!(
                "No questions available for {phase} phase after sampling"
            )));
        }
        info!(
            "Working set of {} questions for {phase} phase ({} valid candidates)",
            working_set.len(),
            valid.len()
        );

        let mut picks = match self.curate(request, phase, &working_set, ctx).await {
            Ok(curated) => {
                let accepted = accept_valid_picks(curated, &working_set, phase, ctx);
                if accepted.len() < QUESTIONS_PER_PHASE {
                    warn!(
                        "Curator gave only {}/{QUESTIONS_PER_PHASE} usable picks for {phase} phase, sampling the rest",
                        accepted.len()
                    );
                }
                accepted
            }
            Err(e) => {
                warn!("Curation failed for {phase} phase, falling back to random sampling: {e}");
                Vec::new()
            }
        };
        fill_shortfall(&mut picks, &working_set, ctx, rng);

        let questions = picks
            .into_iter()
            .map(|pick| {
                ctx.mark_used(&pick.original_question);
                let source = working_set
                    .iter()
                    .find(|q| q.question == pick.original_question);
                finalize(pick, source, phase)
            })
            .collect();

        Ok(questions)
    }

    async fn curate(
        &self,
        request: &InterviewRequest,
        phase: Phase,
        working_set: &[QuestionRecord],
        ctx: &InterviewContext,
    ) -> Result<Vec<CurationCandidate>, CurationError> {
        let prompt = build_curation_prompt(request, phase, working_set, ctx)?;

        let raw = tokio::time::timeout(self.settings.curator_timeout, self.curator.generate(&prompt))
            .await
            .map_err(|_| CurationError::TimedOut(self.settings.curator_timeout))??;
        debug!("Curator response for {phase} phase: {raw}");

        parse_curation(&raw, QUESTIONS_PER_PHASE)
    }
}

/// Keeps curator picks that name a working-set question of this phase that has
/// not been used in this or an earlier phase.
fn accept_valid_picks(
    curated: Vec<CurationCandidate>,
    working_set: &[QuestionRecord],
    phase: Phase,
    ctx: &InterviewContext,
) -> Vec<CurationCandidate> {
    let mut accepted: Vec<CurationCandidate> = Vec::with_capacity(QUESTIONS_PER_PHASE);

    for pick in curated {
        let in_phase = working_set
            .iter()
            .any(|q| q.question == pick.original_question && phase.matches(&q.category));
        let repeated = ctx.is_used(&pick.original_question)
            || accepted
                .iter()
                .any(|a| a.original_question == pick.original_question);

        if in_phase && !repeated {
            accepted.push(pick);
        } else {
            debug!("Dropping curator pick for {phase} phase: {:?}", pick.original_question);
        }
    }

    accepted.truncate(QUESTIONS_PER_PHASE);
    accepted
}

/// Tops `picks` up to `QUESTIONS_PER_PHASE` with uniformly sampled, unused
/// working-set questions taken verbatim. Stops early if the pool runs dry.
fn fill_shortfall<R: Rng>(
    picks: &mut Vec<CurationCandidate>,
    working_set: &[QuestionRecord],
    ctx: &InterviewContext,
    rng: &mut R,
) {
    let shortfall = QUESTIONS_PER_PHASE.saturating_sub(picks.len());
    if shortfall == 0 {
        return;
    }

    let eligible: Vec<&QuestionRecord> = working_set
        .iter()
        .filter(|q| !ctx.is_used(&q.question))
        .filter(|q| !picks.iter().any(|p| p.original_question == q.question))
        .collect();

    let sampled: Vec<CurationCandidate> = eligible
        .choose_multiple(rng, shortfall)
        .map(|q| CurationCandidate::verbatim(q))
        .collect();
    picks.extend(sampled);
}

fn build_curation_prompt(
    request: &InterviewRequest,
    phase: Phase,
    working_set: &[QuestionRecord],
    ctx: &InterviewContext,
) -> Result<String, CurationError> {
    let questions_json = serde_json::to_string_pretty(working_set)?;

    let used = ctx.used_sorted();
    let used_questions = if used.is_empty() {
        "(none)".to_string()
    } else {
        serde_json::to_string_pretty(&used)?
    };

    let phase_definitions = Phase::ALL
        .iter()
        .map(|p| format!("- '{}': {}", p.category(), p.definition()))
        .collect::<Vec<_>>()
        .join("\n");

    let timestamp = chrono::Utc::now().to_rfc3339();
    let count = QUESTIONS_PER_PHASE.to_string();
    Ok(render(
        CURATION_PROMPT_TEMPLATE,
        &[
            ("timestamp", timestamp.as_str()),
            ("phase_definitions", phase_definitions.as_str()),
            ("phase", phase.category()),
            ("count", count.as_str()),
            ("used_questions", used_questions.as_str()),
            ("questions_json", questions_json.as_str()),
            ("resume", request.resume.as_str()),
            ("job_description", request.job_description.as_str()),
        ],
    ))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::llm_client::LlmError;
    use crate::questions::index::LexicalIndex;

    /// Replays one scripted answer per call and records the prompts it saw.
    struct ScriptedCurator {
        answers: Mutex<Vec<Result<String, LlmError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedCurator {
        fn new(answers: Vec<Result<String, LlmError>>) -> Self {
            Self {
                answers: Mutex::new(answers),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl QuestionCurator for ScriptedCurator {
        async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            let mut answers = self.answers.lock().unwrap();
            if answers.is_empty() {
                return Err(LlmError::EmptyContent);
            }
            answers.remove(0)
        }
    }

    struct HangingCurator;

    #[async_trait]
    impl QuestionCurator for HangingCurator {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            std::future::pending::<()>().await;
            unreachable!()
        }
    }

    /// Returns canned records regardless of the query or filter.
    struct FixedIndex(Vec<QuestionRecord>);

    impl QuestionIndex for FixedIndex {
        fn search(&self, _query: &str, top_k: usize, _category: Option<&str>) -> Vec<QuestionRecord> {
            self.0.iter().take(top_k).cloned().collect()
        }

        fn len(&self) -> usize {
            self.0.len()
        }
    }

    fn record(question: &str, category: &str) -> QuestionRecord {
        QuestionRecord {
            question: question.to_string(),
            category: category.to_string(),
            tags: vec![category.replace(' ', "-")],
        }
    }

    fn basics(n: usize) -> Vec<QuestionRecord> {
        (1..=n).map(|i| record(&format!("Basics question {i}"), "basics")).collect()
    }

    fn request() -> InterviewRequest {
        InterviewRequest {
            resume: "Backend engineer, five years of Rust and PostgreSQL".to_string(),
            job_description: "Senior Rust developer".to_string(),
        }
    }

    fn picks_json(pairs: &[(&str, &str)]) -> String {
        let items: Vec<_> = pairs
            .iter()
            .map(|(o, e)| serde_json::json!({"original_question": o, "enhanced_question": e}))
            .collect();
        serde_json::to_string(&items).unwrap()
    }

    async fn run(
        index: &dyn QuestionIndex,
        curator: &dyn QuestionCurator,
        ctx: &mut InterviewContext,
    ) -> Result<Vec<FinalQuestion>, AppError> {
        let settings = SelectionSettings::default();
        let selector = PhaseSelector::new(index, curator, &settings);
        let mut rng = StdRng::seed_from_u64(7);
        selector.select(&request(), Phase::Basics, ctx, &mut rng).await
    }

    #[tokio::test]
    async fn test_valid_curation_is_used_verbatim() {
        let index = LexicalIndex::build(basics(5));
        let curator = ScriptedCurator::new(vec![Ok(picks_json(&[
            ("Basics question 1", "How would you explain question 1?"),
            ("Basics question 2", "Basics question 2"),
            ("Basics question 3", "Question 3, for a Rust shop"),
        ]))]);
        let mut ctx = InterviewContext::default();

        let questions = run(&index, &curator, &mut ctx).await.unwrap();

        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].question, "How would you explain question 1?");
        assert_eq!(questions[0].tags, vec!["basics".to_string()]);
        assert!(questions.iter().all(|q| q.phase == "Basics"));
        assert!(ctx.is_used("Basics question 1"));
        assert_eq!(ctx.used_count(), 3);
    }

    #[tokio::test]
    async fn test_curator_error_falls_back_to_sampling() {
        let index = LexicalIndex::build(basics(5));
        let curator = ScriptedCurator::new(vec![Err(LlmError::Api {
            status: 503,
            message: "overloaded".to_string(),
        })]);
        let mut ctx = InterviewContext::default();

        let questions = run(&index, &curator, &mut ctx).await.unwrap();

        assert_eq!(questions.len(), 3);
        let distinct: HashSet<_> = questions.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(distinct.len(), 3);
        assert!(questions.iter().all(|q| q.category == "basics"));
    }

    #[tokio::test]
    async fn test_garbage_response_falls_back_to_sampling() {
        let index = LexicalIndex::build(basics(4));
        let curator = ScriptedCurator::new(vec![Ok("I'd rather not.".to_string())]);
        let mut ctx = InterviewContext::default();

        assert_eq!(run(&index, &curator, &mut ctx).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_invalid_picks_are_replaced_and_valid_ones_kept() {
        let index = LexicalIndex::build(basics(5));
        let curator = ScriptedCurator::new(vec![Ok(picks_json(&[
            ("Basics question 2", "Tailored question 2"),
            ("A question the model invented", "Invented"),
            ("Basics question 2", "Duplicate pick"),
        ]))]);
        let mut ctx = InterviewContext::default();

        let questions = run(&index, &curator, &mut ctx).await.unwrap();

        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].question, "Tailored question 2");
        assert!(!questions.iter().any(|q| q.question == "Invented"));
        assert!(!questions.iter().any(|q| q.question == "Duplicate pick"));
        let distinct: HashSet<_> = questions.iter().map(|q| q.question.as_str()).collect();
        assert_eq!(distinct.len(), 3);
    }

    #[tokio::test]
    async fn test_already_used_picks_are_rejected() {
        let index = LexicalIndex::build(basics(5));
        let curator = ScriptedCurator::new(vec![Ok(picks_json(&[
            ("Basics question 1", "Q1"),
            ("Basics question 2", "Q2"),
            ("Basics question 3", "Q3"),
        ]))]);
        let mut ctx = InterviewContext::default();
        ctx.mark_used("Basics question 1");

        let questions = run(&index, &curator, &mut ctx).await.unwrap();

        assert_eq!(questions.len(), 3);
        assert!(!questions.iter().any(|q| q.question == "Q1"));
        assert!(!questions.iter().any(|q| q.question == "Basics question 1"));
        assert_eq!(ctx.used_count(), 4);
    }

    #[tokio::test]
    async fn test_prompt_lists_used_questions_and_phase_definitions() {
        let index = LexicalIndex::build(basics(5));
        let curator = ScriptedCurator::new(vec![]);
        let mut ctx = InterviewContext::default();
        ctx.mark_used("Tell me about yourself.");

        run(&index, &curator, &mut ctx).await.unwrap();

        let prompts = curator.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Tell me about yourself."));
        assert!(prompts[0].contains("'problem solving':"));
        assert!(prompts[0].contains("Senior Rust developer"));
        assert!(!prompts[0].contains("{phase}"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_curator_times_out_into_fallback() {
        let index = LexicalIndex::build(basics(5));
        let mut ctx = InterviewContext::default();

        let questions = run(&index, &HangingCurator, &mut ctx).await.unwrap();
        assert_eq!(questions.len(), 3);
    }

    #[tokio::test]
    async fn test_wrong_category_candidates_are_filtered() {
        let mut records = basics(2);
        records.push(record("How do you design a cache?", "problem solving"));
        let index = FixedIndex(records);
        let curator = ScriptedCurator::new(vec![]);
        let mut ctx = InterviewContext::default();

        let questions = run(&index, &curator, &mut ctx).await.unwrap();

        assert_eq!(questions.len(), 2, "only two basics questions exist");
        assert!(questions.iter().all(|q| q.category == "basics"));
    }

    #[tokio::test]
    async fn test_no_candidates_is_fatal() {
        let index = FixedIndex(vec![]);
        let curator = ScriptedCurator::new(vec![]);
        let mut ctx = InterviewContext::default();

        let err = run(&index, &curator, &mut ctx).await.unwrap_err();
        assert!(matches!(err, AppError::QuestionsUnavailable(_)));
    }

    #[tokio::test]
    async fn test_only_off_phase_candidates_is_fatal() {
        let index = FixedIndex(vec![record("Why this company?", "introductory")]);
        let curator = ScriptedCurator::new(vec![]);
        let mut ctx = InterviewContext::default();

        let err = run(&index, &curator, &mut ctx).await.unwrap_err();
        assert!(matches!(err, AppError::QuestionsUnavailable(msg) if msg.contains("No valid")));
    }

    #[tokio::test]
    async fn test_repeated_index_records_are_sampled_once() {
        let records: Vec<_> = basics(2).into_iter().flat_map(|r| [r.clone(), r]).collect();
        let index = FixedIndex(records);

        for seed in 0..20 {
            let curator = ScriptedCurator::new(vec![]);
            let mut ctx = InterviewContext::default();
            let settings = SelectionSettings::default();
            let selector = PhaseSelector::new(&index, &curator, &settings);
            let mut rng = StdRng::seed_from_u64(seed);

            let questions = selector
                .select(&request(), Phase::Basics, &mut ctx, &mut rng)
                .await
                .unwrap();

            let distinct: HashSet<_> = questions.iter().map(|q| q.question.as_str()).collect();
            assert_eq!(questions.len(), 2, "seed {seed}: {questions:?}");
            assert_eq!(distinct.len(), 2, "seed {seed}: {questions:?}");
        }
    }

    #[tokio::test]
    async fn test_resume_braces_do_not_pull_in_other_fields() {
        let index = LexicalIndex::build(basics(5));
        let curator = ScriptedCurator::new(vec![]);
        let mut ctx = InterviewContext::default();
        let settings = SelectionSettings::default();
        let selector = PhaseSelector::new(&index, &curator, &settings);
        let request = InterviewRequest {
            resume: "My notes {job_description} end".to_string(),
            job_description: "SECRET-JD".to_string(),
        };

        selector
            .select(&request, Phase::Basics, &mut ctx, &mut StdRng::seed_from_u64(7))
            .await
            .unwrap();

        let prompts = curator.prompts.lock().unwrap();
        assert!(prompts[0].contains("Resume: My notes {job_description} end"));
        assert_eq!(prompts[0].matches("SECRET-JD").count(), 1);
    }

    #[test]
    fn test_fill_shortfall_count_is_min_of_three_and_pool() {
        for pool in 0..6 {
            let working_set = basics(pool);
            let ctx = InterviewContext::default();
            let mut picks = Vec::new();
            let mut rng = StdRng::seed_from_u64(42);

            fill_shortfall(&mut picks, &working_set, &ctx, &mut rng);
            assert_eq!(picks.len(), pool.min(QUESTIONS_PER_PHASE));
        }
    }

    #[test]
    fn test_fill_shortfall_is_deterministic_for_a_seed() {
        let working_set = basics(10);
        let ctx = InterviewContext::default();
        let sample = |seed| {
            let mut picks = Vec::new();
            fill_shortfall(&mut picks, &working_set, &ctx, &mut StdRng::seed_from_u64(seed));
            picks
        };
        assert_eq!(sample(3), sample(3));
    }

    #[test]
    fn test_fill_shortfall_skips_used_and_already_picked() {
        let working_set = basics(4);
        let mut ctx = InterviewContext::default();
        ctx.mark_used("Basics question 1");
        let mut picks = vec![CurationCandidate::verbatim(&working_set[1])];
        let mut rng = StdRng::seed_from_u64(1);

        fill_shortfall(&mut picks, &working_set, &ctx, &mut rng);

        let originals: HashSet<_> = picks.iter().map(|p| p.original_question.as_str()).collect();
        assert_eq!(picks.len(), 3);
        assert_eq!(originals.len(), 3);
        assert!(!originals.contains("Basics question 1"));
    }
}
