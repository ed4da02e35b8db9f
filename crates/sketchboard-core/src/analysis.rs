//! Parsing of drawing-analysis service responses.
//!
//! The service answers `{"analysisResult": "..."}` where the text embeds a
//! fenced diagram or markdown. Transport lives outside the engine.

use serde::Deserialize;
use thiserror::Error;

const MERMAID_FENCE: &str = "```mermaid\n";
const MARKDOWN_FENCE: &str = "```markdown\n";
const FENCE: &str = "```";

/// Analysis errors.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Malformed analysis response: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Analysis response has no diagram block")]
    NoDiagram,
    #[error("Analysis response is empty")]
    Empty,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisResponse {
    analysis_result: Option<String>,
}

fn analysis_text(response: &str) -> Result<String, AnalysisError> {
    let response: AnalysisResponse = serde_json::from_str(response)?;
    match response.analysis_result {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(AnalysisError::Empty),
    }
}

/// Body of the first mermaid block in the response, trimmed.
pub fn extract_diagram(response: &str) -> Result<String, AnalysisError> {
    let text = analysis_text(response)?;
    let start = text.find(MERMAID_FENCE).ok_or(AnalysisError::NoDiagram)? + MERMAID_FENCE.len();
    let rest = &text[start..];
    let end = rest.find(FENCE).ok_or(AnalysisError::NoDiagram)?;
    Ok(rest[..end].trim().to_string())
}

/// Response text with markdown fences stripped, trimmed.
pub fn extract_markdown(response: &str) -> Result<String, AnalysisError> {
    let text = analysis_text(response)?;
    let cleaned = text.replace(MARKDOWN_FENCE, "").replace(FENCE, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(AnalysisError::Empty);
    }
    Ok(cleaned.to_string())
}
