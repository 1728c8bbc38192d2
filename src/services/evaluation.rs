//! Sentence evaluation: does the learner's sentence use the target word well?

use serde::{Deserialize, Serialize};

use crate::services::llm_provider::{LLMError, LLMProvider};

pub const PASS_MARKER: &str = "PASS";
pub const FAIL_MARKER: &str = "FAIL";
const LOCAL_PASS_SCORE: u8 = 60;

const SIMPLE_SYSTEM_PROMPT: &str = "You are a friendly English teacher checking example sentences \
    written by learners of the Oxford 3000 word list.";

const STRICT_SYSTEM_PROMPT: &str = "You are a strict English examiner. \
    You always answer with a single JSON object and nothing else.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerdictSource {
    Ai,
    FallbackSimple,
    FallbackLocal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub passed: bool,
    pub feedback: String,
    pub confidence: f64,
    pub source: VerdictSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

#[derive(Debug, Clone)]
pub struct SentenceRequest<'a> {
    pub word: &'a str,
    pub user_input: &'a str,
    pub meaning: Option<&'a str>,
}

pub fn simple_prompt(req: &SentenceRequest<'_>) -> String {
    let meaning = req
        .meaning
        .filter(|m| !m.trim().is_empty())
        .map(|m| format!(" (meaning: {m})"))
        .unwrap_or_default();
    format!(
        "Target word: \"{word}\"{meaning}\n\
         Learner sentence: \"{input}\"\n\n\
         Decide whether the sentence uses the target word correctly and naturally.\n\
         Start your reply with a line containing only {PASS_MARKER} or {FAIL_MARKER}, \
         then give one or two short sentences of feedback addressed to the learner.",
        word = req.word,
        input = req.user_input,
    )
}

pub fn strict_prompt(req: &SentenceRequest<'_>) -> String {
    let meaning = req.meaning.unwrap_or("");
    format!(
        "Evaluate this learner sentence.\n\
         word: {word}\n\
         meaning: {meaning}\n\
         sentence: {input}\n\n\
         Respond with JSON of the form \
         {{\"passed\": boolean, \"score\": integer 0-100, \"feedback\": string}}. \
         The sentence passes only if it contains the word, is grammatical and shows the meaning.",
        word = req.word,
        input = req.user_input,
    )
}

/// Reads the verdict marker out of a free-text reply.
pub fn parse_marked_reply(reply: &str) -> Verdict {
    let mut lines = reply.lines().map(str::trim).filter(|l| !l.is_empty());
    let first = lines.next().unwrap_or("");
    let first_upper = first.to_ascii_uppercase();

    let first_passes = first_upper.contains(PASS_MARKER) && !first_upper.contains(FAIL_MARKER);
    let (passed, confidence, feedback) = if first_passes {
        (true, 0.9, lines.collect::<Vec<_>>().join(" "))
    } else if first_upper.contains(FAIL_MARKER) {
        (false, 0.9, lines.collect::<Vec<_>>().join(" "))
    } else {
        let upper = reply.to_ascii_uppercase();
        let passed = upper.contains(PASS_MARKER) && !upper.contains(FAIL_MARKER);
        (passed, 0.6, reply.trim().to_string())
    };

    let feedback = if feedback.is_empty() {
        if passed {
            "Well done, the word is used correctly.".to_string()
        } else {
            "The word is not used correctly yet. Try again.".to_string()
        }
    } else {
        feedback
    };

    Verdict {
        passed,
        feedback,
        confidence,
        source: VerdictSource::Ai,
        score: None,
    }
}

/// Quota or configuration fallback: the sentence mentions the word and is
/// longer than three characters.
pub fn fallback_simple(req: &SentenceRequest<'_>) -> Verdict {
    let passed = contains_word(req.user_input, req.word) && req.user_input.chars().count() > 3;
    let feedback = if passed {
        format!("Your sentence uses \"{}\". AI feedback is unavailable right now.", req.word)
    } else {
        format!("Write a full sentence that includes \"{}\".", req.word)
    };
    Verdict {
        passed,
        feedback,
        confidence: 0.5,
        source: VerdictSource::FallbackSimple,
        score: None,
    }
}

fn contains_word(input: &str, word: &str) -> bool {
    let word = word.trim().to_lowercase();
    !word.is_empty() && input.to_lowercase().contains(&word)
}

/// Heuristic score used when the strict model path is unavailable.
pub fn fallback_local(req: &SentenceRequest<'_>) -> Verdict {
    let input = req.user_input.trim();
    let mut score: u8 = 0;
    let mut notes = Vec::new();

    if contains_word(input, req.word) {
        score += 40;
    } else {
        notes.push(format!("include the word \"{}\"", req.word));
    }

    match input.split_whitespace().count() {
        n if n >= 5 => score += 20,
        n if n >= 3 => {
            score += 10;
            notes.push("add a little more context".to_string());
        }
        _ => notes.push("write a complete sentence".to_string()),
    }

    if input.chars().count() >= 20 {
        score += 20;
    }
    if input.chars().next().is_some_and(char::is_uppercase) {
        score += 10;
    } else {
        notes.push("start with a capital letter".to_string());
    }
    if input.ends_with(['.', '!', '?']) {
        score += 10;
    } else {
        notes.push("end with punctuation".to_string());
    }

    let passed = score >= LOCAL_PASS_SCORE;
    let feedback = if notes.is_empty() {
        "Good sentence.".to_string()
    } else {
        format!("To improve: {}.", notes.join(", "))
    };

    Verdict {
        passed,
        feedback,
        confidence: 0.4,
        source: VerdictSource::FallbackLocal,
        score: Some(score),
    }
}

#[derive(Debug, Deserialize)]
struct StrictReply {
    passed: Option<bool>,
    score: Option<f64>,
    feedback: Option<String>,
}

/// Parses a JSON-mode reply, tolerating a surrounding markdown fence.
pub fn parse_strict_reply(reply: &str) -> Option<Verdict> {
    let trimmed = reply.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let parsed: StrictReply = serde_json::from_str(body).ok()?;
    let score = parsed.score.map(|s| s.clamp(0.0, 100.0).round() as u8);
    let passed = match (parsed.passed, score) {
        (Some(passed), _) => passed,
        (None, Some(score)) => score >= LOCAL_PASS_SCORE,
        (None, None) => return None,
    };

    Some(Verdict {
        passed,
        feedback: parsed
            .feedback
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| if passed { "Good sentence.".into() } else { "Try again.".into() }),
        confidence: 0.85,
        source: VerdictSource::Ai,
        score,
    })
}

/// Free-text evaluation. Quota errors and a missing provider degrade to
/// [`fallback_simple`]; any other provider failure is returned.
pub async fn evaluate_simple(
    llm: &LLMProvider,
    req: &SentenceRequest<'_>,
) -> Result<Verdict, LLMError> {
    if !llm.is_available() {
        tracing::warn!("LLM provider not configured, using simple fallback");
        return Ok(fallback_simple(req));
    }

    match llm
        .complete_with_system(SIMPLE_SYSTEM_PROMPT, &simple_prompt(req), false)
        .await
    {
        Ok(reply) => Ok(parse_marked_reply(&reply)),
        Err(err) if err.is_quota_exceeded() => {
            tracing::warn!(word = req.word, "LLM quota exceeded, using simple fallback");
            Ok(fallback_simple(req))
        }
        Err(err) => Err(err),
    }
}

/// JSON-mode evaluation. Every failure degrades to [`fallback_local`].
pub async fn evaluate_strict(llm: &LLMProvider, req: &SentenceRequest<'_>) -> Verdict {
    if !llm.is_available() {
        return fallback_local(req);
    }

    match llm
        .complete_with_system(STRICT_SYSTEM_PROMPT, &strict_prompt(req), true)
        .await
    {
        Ok(reply) => parse_strict_reply(&reply).unwrap_or_else(|| {
            tracing::warn!(word = req.word, "unparsable strict evaluation reply");
            fallback_local(req)
        }),
        Err(err) => {
            tracing::warn!(
                word = req.word,
                error = %err,
                "strict evaluation failed, scoring locally"
            );
            fallback_local(req)
        }
    }
}
