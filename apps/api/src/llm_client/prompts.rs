// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Generated text is rendered by the template compiler, which owns all markup.
pub const NO_MARKUP_INSTRUCTION: &str = "Never emit HTML tags or provenance \
    markers in text values; block tags such as <p>, <div> or <h2> are forbidden.";
