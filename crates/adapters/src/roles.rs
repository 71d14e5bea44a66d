//! Specialist roles and the persona provider.
//!
//! The engine routes steps to roles; the provider owns the persona
//! text. Roles are variants of one capability set, not separate types.

use serde::{Deserialize, Serialize};

/// The specialist a step is dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialistRole {
    Frontend,
    Backend,
    Coder,
    Research,
    Academic,
    Qa,
    Ops,
    Content,
    Business,
    Presentation,
    Architect,
}

mar_core::simple_display! {
    SpecialistRole {
        Frontend => "frontend",
        Backend => "backend",
        Coder => "coder",
        Research => "research",
        Academic => "academic",
        Qa => "qa",
        Ops => "ops",
        Content => "content",
        Business => "business",
        Presentation => "presentation",
        Architect => "architect",
    }
}

/// Persona source. The engine never inspects the returned text.
pub trait RoleProvider: Send + Sync {
    fn system_prompt(&self, role: SpecialistRole) -> String;
}

/// Built-in one-line personas. Deployments swap in richer prompt packs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRoles;

impl RoleProvider for StaticRoles {
    fn system_prompt(&self, role: SpecialistRole) -> String {
        let persona = match role {
            SpecialistRole::Frontend => {
                "You are a senior frontend engineer. You ship complete React components and styles."
            }
            SpecialistRole::Backend => {
                "You are a senior backend engineer. You ship complete APIs, models and migrations."
            }
            SpecialistRole::Coder => {
                "You are a pragmatic software engineer. You ship complete, runnable code."
            }
            SpecialistRole::Research => {
                "You are a thorough researcher. You produce sourced, structured findings."
            }
            SpecialistRole::Academic => {
                "You are an academic writer. You produce rigorous papers with citations."
            }
            SpecialistRole::Qa => {
                "You are a QA engineer. You write tests that fail loudly on real defects."
            }
            SpecialistRole::Ops => {
                "You are a deployment engineer. You write CI, Docker and release tooling."
            }
            SpecialistRole::Content => {
                "You are a content writer. You produce clear, complete copy."
            }
            SpecialistRole::Business => {
                "You are a business analyst. You produce concrete market and strategy analysis."
            }
            SpecialistRole::Presentation => {
                "You are a presentation designer. You produce slide outlines and decks."
            }
            SpecialistRole::Architect => {
                "You are a software architect. You produce concrete designs, not options."
            }
        };
        persona.to_string()
    }
}
