//! Fixed prompt text for the condensation call.

/// System prompt for every condensation request.
///
/// Applies equally to raw transcript lines and to lower-stage summaries
/// being merged upward, so it speaks of "conversation history" generically.
pub const CONDENSE_SYSTEM_PROMPT: &str = "You condense personal-assistant \
conversation history. Produce one compact summary paragraph that preserves: \
decisions made, facts and preferences stated, names, dates, amounts, open \
questions, and anything the user asked to be remembered. Keep chronological \
order. Do not add commentary, headings, or information that is not in the \
input.";

/// Header placed above the joined input texts in the user message.
pub const CONDENSE_INPUT_HEADER: &str = "===== HISTORY TO CONDENSE =====";
