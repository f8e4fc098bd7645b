//! # Prompts
//!
//! Fixed text sent to the generation service.

/// System directive for the remote generator: the plan schema and the path-safety rule.
pub const PLAN_DIRECTIVE: &str = include_str!("../../prompts/plan_directive.md");

/// File created by the offline stub.
pub const OFFLINE_TARGET: &str = "README.md";

pub const OFFLINE_NOTES: &str = "Offline mode: stub plan that only creates README.md";

/// Body of the offline stub file. The instruction is embedded verbatim.
pub fn offline_readme(instruction: &str) -> String {
    format!("# Project\n\nInstruction: {instruction}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_states_schema_and_path_rule() {
        assert!(PLAN_DIRECTIVE.contains("\"changes\""));
        assert!(PLAN_DIRECTIVE.contains("\"notes\""));
        for op in ["create", "update", "delete"] {
            assert!(PLAN_DIRECTIVE.contains(op));
        }
        assert!(PLAN_DIRECTIVE.contains("relative to the project root"));
        assert!(PLAN_DIRECTIVE.contains("Never use \"..\""));
    }

    #[test]
    fn test_offline_readme_embeds_instruction() {
        let body = offline_readme("build {{a}} site\nwith two lines");
        assert!(body.contains("build {{a}} site\nwith two lines"));
        assert!(body.starts_with("# Project"));
    }
}
