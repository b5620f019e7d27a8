//! Prompt construction for the planner and validator agents.
//!
//! Prompts are plain functions over the typed contexts, so tests can
//! assert on exactly what the model is shown.

use std::fmt::Write as _;

use scopehound_core::{PlanningContext, RequestCategory, ValidationContext};

pub const PLANNER_SYSTEM: &str = "\
You plan information-gathering for a website change-request that is missing details.

You are given the outstanding questions and the tools still available this request.
Respond with ONLY a JSON object of this exact shape:

{
  \"actions\": [
    {\"tool\": \"<tool name>\", \"question\": \"<which missing question this answers>\", \
\"params\": {…}, \"rationale\": \"<why this tool>\"}
  ],
  \"estimated_tokens\": <integer>,
  \"strategy\": \"<one sentence>\"
}

Rules:
- Only use tools from the available list; never a tool shown as exhausted.
- Every action must target one of the listed missing questions; do not invent new gaps.
- Skip questions that need the client's own preference or opinion (target keywords, \
preferred colours, tone of voice) — no tool can answer those.
- Prefer the cheapest tool that can answer a question. Return an empty actions list \
if no listed tool can help.

Tool parameters: fetch_page/form_detect/social_find/seo_audit take {\"url\"}; \
web_search takes {\"query\"}; image_probe/pdf_extract take {\"path\"}; \
maps_lookup/reviews_lookup take {\"business_name\"}.";

/// Render the user message for a planning pass.
pub fn planner_user_message(ctx: &PlanningContext<'_>) -> String {
    let mut msg = String::new();

    let _ = writeln!(msg, "## Client request\n{}\n", ctx.raw_request);
    let _ = writeln!(
        msg,
        "## Website\n{}\n",
        ctx.website_url.unwrap_or("(no website URL known)")
    );
    let _ = writeln!(msg, "## Client profile\n{}\n", ctx.static_summary);

    let _ = writeln!(msg, "## Missing information (iteration {})", ctx.iteration);
    for question in ctx.missing {
        let _ = writeln!(msg, "- {question}");
    }

    let _ = writeln!(msg, "\n## Available tools");
    for tool in ctx.available_tools {
        let _ = writeln!(
            msg,
            "- {} ({}/{} calls remaining): {}",
            tool.name, tool.remaining_calls, tool.max_calls, tool.description
        );
    }

    if !ctx.dynamic_context.is_empty() {
        let _ = writeln!(msg, "\n## Already gathered (do not re-fetch)");
        for key in ctx.dynamic_context.keys() {
            let _ = writeln!(msg, "- {key}");
        }
    }

    msg
}

pub const VALIDATOR_SYSTEM: &str = "\
You decide whether a website change-request carries enough information for a \
developer to write a correct technical plan, and you classify it.

Valid categories: blog_post, seo_optimization, bug_fix, content_update, \
business_info_update, new_page, form_changes, design_changes, feature_request, unclear.
Use unclear only when the request cannot be mapped to website work at all.

Respond with ONLY a JSON object of this exact shape:

{
  \"primary_category\": \"<category>\",
  \"subcategories\": [\"<category>\", …],
  \"complete\": <true|false>,
  \"missing\": [\"<specific question to ask the client>\", …],
  \"confidence\": <0.0-1.0>,
  \"reasoning\": \"<brief explanation>\"
}

When gathered context answers a previously missing question, drop that question. \
Do not re-request information already sought in earlier iterations.";

/// Posture instruction per iteration; later passes accept more inference.
pub fn validator_posture(iteration: u32) -> &'static str {
    match iteration {
        0 => "Be strict: mark complete only for obviously complete requests.",
        1 => "Be moderate: trust reasonable inferences from the gathered context.",
        2 => "Be lenient: accept sensible defaults for minor details.",
        _ => "Be very lenient: mark complete if a competent developer could proceed.",
    }
}

/// Render the user message for a validation pass.
pub fn validator_user_message(ctx: &ValidationContext<'_>) -> String {
    let mut msg = String::new();

    let _ = writeln!(msg, "## Client request\n{}\n", ctx.raw_request);
    let _ = writeln!(msg, "## Client profile\n{}\n", ctx.static_summary);

    match ctx.website_content {
        Some(content) => {
            let preview: String = content.chars().take(2_000).collect();
            let _ = writeln!(msg, "## Website content\n{preview}\n");
        }
        None => {
            let _ = writeln!(msg, "## Website content\nNo website data available.\n");
        }
    }

    let _ = writeln!(msg, "## Attached files");
    if ctx.file_summaries.is_empty() {
        let _ = writeln!(msg, "No files attached.");
    }
    for fs in ctx.file_summaries {
        match (&fs.error, &fs.text) {
            (Some(err), _) => {
                let _ = writeln!(msg, "- {} ({}): extraction failed: {err}", fs.filename, fs.kind);
            }
            (None, Some(text)) => {
                let preview: String = text.chars().take(500).collect();
                let _ = writeln!(msg, "- {} ({}): {preview}", fs.filename, fs.kind);
            }
            (None, None) => {
                let _ = writeln!(msg, "- {} ({})", fs.filename, fs.kind);
            }
        }
    }

    if !ctx.dynamic_context.is_empty() {
        let _ = writeln!(msg, "\n## Gathered context");
        for (key, obs) in ctx.dynamic_context.iter() {
            let _ = writeln!(
                msg,
                "- {key} = {} (via {}, confidence {:.2})",
                obs.value, obs.source_tool, obs.confidence
            );
        }
    }

    if !ctx.history.is_empty() {
        let _ = writeln!(msg, "\n## Prior enrichment attempts");
        for record in ctx.history {
            let tools: Vec<String> = record
                .actions
                .iter()
                .filter_map(|a| a.tool.map(|t| t.to_string()))
                .collect();
            let _ = writeln!(
                msg,
                "- iteration {}: sought {:?} using [{}]",
                record.iteration,
                record.missing_before,
                tools.join(", ")
            );
        }
    }

    let _ = writeln!(msg, "\n## Posture\n{}", validator_posture(ctx.iteration));
    msg
}

/// The classifier falls back to this shape when its output cannot be
/// parsed; used for logging between the failure and the retry.
pub fn parse_fallback_category() -> RequestCategory {
    RequestCategory::Unclear
}
