//! Prompt template for assisted bullet rewrites

use crate::error::{Result, ResumeScorerError};

pub const REWRITE_SYSTEM_PROMPT: &str = "You are a resume evaluator bot.";

const REWRITE_TEMPLATE: &str = r#"You are a friendly ATS expert and resume coach helping a candidate applying for a "{role}" role.

Rewrite each resume bullet below so that it:
- opens with a strong past-tense action verb
- states a measurable result (use a placeholder such as [X]% when the number is unknown)
- stays under {max_chars} characters
- keeps every fact from the original and invents no employers, tools or numbers

Return only a valid JSON array of strings, one rewritten bullet per input bullet, in the same order.

Bullets:
{bullets}"#;

/// Fill the rewrite template. Bullets are numbered so the model can keep order.
pub fn render_rewrite_prompt(role: &str, bullets: &[String], max_chars: usize) -> String {
    let numbered = bullets
        .iter()
        .enumerate()
        .map(|(i, bullet)| format!("{}. {}", i + 1, bullet))
        .collect::<Vec<_>>()
        .join("\n");

    REWRITE_TEMPLATE
        .replace("{role}", role)
        .replace("{max_chars}", &max_chars.to_string())
        .replace("{bullets}", &numbered)
}

/// Pull the JSON array of rewritten bullets out of a model reply, tolerating
/// prose or code fences around it.
pub fn parse_rewrite_response(reply: &str) -> Result<Vec<String>> {
    let start = reply.find('[');
    let end = reply.rfind(']');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => {
            return Err(ResumeScorerError::Processing(
                "Rewrite reply did not contain a JSON array".to_string(),
            ))
        }
    };

    let rewrites: Vec<String> = serde_json::from_str(json)?;
    Ok(rewrites.into_iter().map(|r| r.trim().to_string()).collect())
}
