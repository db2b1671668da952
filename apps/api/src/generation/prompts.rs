// All LLM prompt constants for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_MARKUP_INSTRUCTION};

/// System prompt for natural-language edits of the whole portfolio record.
pub fn nl_edit_system() -> String {
    format!(
        "You are an editor for a personal portfolio. You receive the user's \
        current portfolio data as JSON and an instruction describing a change. \
        {JSON_ONLY_SYSTEM} {NO_MARKUP_INSTRUCTION}"
    )
}

/// NL edit prompt. Replace `{payload}` with `{"currentData": ..., "instruction": ...}`.
pub const NL_EDIT_PROMPT_TEMPLATE: &str = r#"Apply the instruction to the portfolio data and return the COMPLETE updated record.

Input:
{payload}

Rules:
- Return the full object with the same schema as "currentData", not a diff.
- Keep every "id" value exactly as given. Never invent ids for existing entries.
- Change only what the instruction asks for. Leave every other field byte-identical.
- Never blank out name, title, email, phone or github unless the instruction explicitly says so.
- Free-text fields may use **bold**, *italic*, `code` and [label](url). No HTML.
- If the instruction cannot be applied, return "currentData" unchanged."#;

/// System prompt for filling gaps in a partially-written portfolio.
pub fn fill_system() -> String {
    format!(
        "You are a portfolio writing assistant. You draft short, concrete text \
        for sections the user left empty, using only facts present in their data. \
        {JSON_ONLY_SYSTEM} {NO_MARKUP_INSTRUCTION}"
    )
}

/// Fill prompt. Replace `{portfolio}` and `{gaps}` before sending.
pub const FILL_PROMPT_TEMPLATE: &str = r#"Write text for each gap listed below, grounded in the portfolio data.

Portfolio data:
{portfolio}

Gaps (each has a "target" key and a hint of what is needed):
{gaps}

Return a JSON object with this EXACT schema:
{
  "fills": [
    {
      "target": "about",
      "text": "2-4 sentences",
      "confidence": 0.7,
      "reason": "why this text fits, naming the data it is based on"
    }
  ]
}

Rules:
- One entry per gap, using the gap's "target" verbatim.
- "confidence" is between 0.0 and 1.0: how well the data supports the text.
- Do not invent employers, numbers, dates or technologies that are not in the data.
- Separate paragraphs with a blank line. No HTML."#;
