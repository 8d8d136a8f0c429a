// All LLM prompt constants for the Interview module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Curation prompt template.
/// Replace: {timestamp}, {phase}, {phase_definitions}, {questions_json},
///          {used_questions}, {count}, {resume}, {job_description}
pub const CURATION_PROMPT_TEMPLATE: &str = r#"Current timestamp: {timestamp}
Based on the following resume and job description, select {count} interview questions *verbatim* from the provided question list for the '{phase}' phase. Optionally, rephrase the questions to better align with the specific skills and experiences in the resume and job description, but only if the rephrased question remains true to the original intent and category. Ensure the questions are highly tailored to the candidate's background and job requirements. For the '{phase}' phase, only select questions with the '{phase}' category. Do NOT select any question that was already used in another phase.

The phases are defined as:
{phase_definitions}

Question List (all questions have category '{phase}'):
{questions_json}

Already used questions (never select these):
{used_questions}

Select exactly {count} unique questions for the '{phase}' phase. Return a JSON array of {count} objects, each with 'original_question' (the verbatim question from the list) and 'enhanced_question' (the rephrased question or the original if no rephrasing is needed), e.g., [{"original_question": "question 1", "enhanced_question": "rephrased question 1"}, ...]. Return no additional text, explanations, or markdown.

Resume: {resume}
Job Description: {job_description}"#;

/// Answer feedback prompt template.
/// Replace: {question}, {category}, {tags}, {user_answer}
pub const FEEDBACK_PROMPT_TEMPLATE: &str = r#"A candidate answered the following interview question during a mock interview.

Question: {question}
Category: {category}
Tags: {tags}

Candidate answer:
{user_answer}

Give concise, constructive feedback on the answer:
1. What the answer does well.
2. What is missing, unclear, or incorrect, with concrete suggestions.
3. A short example of a stronger answer.

Keep the feedback specific to this question and category."#;

/// Fills `{key}` placeholders in a single left-to-right pass.
/// Substituted values are never rescanned, and unknown `{...}` text is kept as is.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let hit = values.iter().find(|(key, _)| {
            tail[1..]
                .strip_prefix(key)
                .is_some_and(|after| after.starts_with('}'))
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
