//! Step routing and prompt assembly.
//!
//! The keyword tables are data. Tagged step prefixes short-circuit
//! keyword routing entirely.

use mar_adapters::SpecialistRole;
use mar_core::{Step, StepCategory};

/// Tag prefixes that pin a step to a role regardless of keywords.
const TAG_ROUTES: &[(&str, SpecialistRole)] = &[
    ("[COMPONENT]", SpecialistRole::Frontend),
    ("[ARCHITECTURE]", SpecialistRole::Architect),
    ("[INTEGRATION]", SpecialistRole::Backend),
];

/// Keyword → role table, checked in order against the step text.
const KEYWORD_ROUTES: &[(&[&str], SpecialistRole)] = &[
    (&["test", "lint", "qa"], SpecialistRole::Qa),
    (&["deploy", "docker", "ci", "cd", "release"], SpecialistRole::Ops),
    (&["ui", "component", "css", "react", "page", "landing"], SpecialistRole::Frontend),
    (&["api", "endpoint", "database", "auth", "server", "schema"], SpecialistRole::Backend),
    (&["paper", "citation", "glossary", "literature"], SpecialistRole::Academic),
    (&["research", "investigate", "sources", "trends"], SpecialistRole::Research),
    (&["market", "strategy", "pricing", "competitor"], SpecialistRole::Business),
    (&["slide", "pitch", "deck"], SpecialistRole::Presentation),
    (&["architecture", "design the", "structure"], SpecialistRole::Architect),
    (&["write", "copy", "blog", "readme"], SpecialistRole::Content),
];

/// Map a step to its specialist role.
pub fn route_step(step: &Step) -> SpecialistRole {
    for (tag, role) in TAG_ROUTES {
        if step.text.trim_start().starts_with(tag) {
            return *role;
        }
    }
    let lower = step.text.to_lowercase();
    for (keywords, role) in KEYWORD_ROUTES {
        if keywords.iter().any(|k| lower.contains(k)) {
            return *role;
        }
    }
    // fall back to the planner's category
    match step.category {
        StepCategory::Frontend => SpecialistRole::Frontend,
        StepCategory::Backend => SpecialistRole::Backend,
        StepCategory::Research => SpecialistRole::Research,
        StepCategory::Academic => SpecialistRole::Academic,
        StepCategory::Qa => SpecialistRole::Qa,
        StepCategory::Ops => SpecialistRole::Ops,
        StepCategory::Content => SpecialistRole::Content,
        StepCategory::Business => SpecialistRole::Business,
        StepCategory::Presentation => SpecialistRole::Presentation,
        StepCategory::Architecture => SpecialistRole::Architect,
        StepCategory::Core => SpecialistRole::Coder,
    }
}

/// The rigid output contract appended to every dispatch.
const OUTPUT_FORMAT: &str = "\
OUTPUT FORMAT (follow exactly):
- Emit every file as a fenced code block whose opening line carries \
filename=\"relative/path.ext\".
- Commands to run go on their own line as [COMMAND]: <command>.
- No prose before, between, or after the blocks. No explanations.";

/// Assemble the full dispatch prompt.
pub fn assemble_prompt(
    persona: &str,
    type_fragment: &str,
    step_text: &str,
    retrieved_context: &str,
    carried_context: Option<&str>,
) -> String {
    let mut prompt = String::with_capacity(
        persona.len() + type_fragment.len() + step_text.len() + retrieved_context.len() + 512,
    );
    prompt.push_str(persona);
    prompt.push_str("\n\n");
    prompt.push_str(type_fragment);
    prompt.push_str("\n\n");
    if let Some(carried) = carried_context {
        prompt.push_str(carried);
        prompt.push_str("\n\n");
    }
    prompt.push_str("CURRENT STEP: ");
    prompt.push_str(step_text);
    prompt.push_str("\n\n");
    if !retrieved_context.is_empty() {
        prompt.push_str("RELEVANT PROJECT FILES:\n");
        prompt.push_str(retrieved_context);
        prompt.push_str("\n\n");
    }
    prompt.push_str(OUTPUT_FORMAT);
    prompt
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
