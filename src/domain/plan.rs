//! # Change Plan
//!
//! Typed representation of a plan returned by a generator, and its JSON contract:
//!
//! ```json
//! { "changes": [ {"op": "create", "path": "src/app.py", "content": "..."},
//!                {"op": "delete", "path": "old.css"} ],
//!   "notes": "short description" }
//! ```
//!
//! Decoding is strict: an unknown `op`, a missing `changes` list, or a create/update
//! without `content` rejects the whole document. Sandbox checks are deferred to the
//! applier so a plan can be previewed before any I/O happens.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::{CoreError, CoreResult};

/// A single file operation. `content` is always the full target file body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Operation {
    Create { path: String, content: String },
    Update { path: String, content: String },
    Delete { path: String },
}

impl Operation {
    pub fn create(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Create {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn update(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Update {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::Delete { path: path.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Operation::Create { .. } => "create",
            Operation::Update { .. } => "update",
            Operation::Delete { .. } => "delete",
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Operation::Create { path, .. }
            | Operation::Update { path, .. }
            | Operation::Delete { path } => path,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Operation::Create { content, .. } | Operation::Update { content, .. } => {
                Some(content)
            }
            Operation::Delete { .. } => None,
        }
    }
}

/// Ordered operations plus free-text notes. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    changes: Vec<Operation>,
    #[serde(default)]
    notes: String,
}

impl Plan {
    pub fn new(changes: Vec<Operation>, notes: impl Into<String>) -> Self {
        Self {
            changes,
            notes: notes.into(),
        }
    }

    pub fn changes(&self) -> &[Operation] {
        &self.changes
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Parse generator output into a plan.
    pub fn decode(raw: &str) -> CoreResult<Self> {
        let doc: Value = serde_json::from_str(raw.trim())
            .map_err(|e| CoreError::malformed(format!("invalid JSON: {e}")))?;

        let Value::Object(mut top) = doc else {
            return Err(CoreError::malformed("top level must be a JSON object"));
        };

        let changes = match top.remove("changes") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(CoreError::malformed("`changes` must be a list")),
            None => return Err(CoreError::malformed("missing `changes` field")),
        };

        let notes = match top.remove("notes") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s,
            Some(_) => return Err(CoreError::malformed("`notes` must be a string")),
        };

        let changes = changes
            .into_iter()
            .enumerate()
            .map(|(idx, item)| decode_operation(idx, item))
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self { changes, notes })
    }

    /// Pretty JSON for echo/logging. `decode(encode(p)) == p`.
    pub fn encode(&self) -> String {
        // Serializing owned strings into a Value tree cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Read-only rendering for review before apply.
    pub fn preview(&self, max_lines: usize) -> Vec<PreviewEntry> {
        self.changes
            .iter()
            .map(|op| PreviewEntry {
                op: op.kind(),
                path: op.path().to_string(),
                status: PREPARED,
                content_preview: op.content().map(|c| {
                    c.lines().take(max_lines).collect::<Vec<_>>().join("\n")
                }),
            })
            .collect()
    }
}

pub const PREPARED: &str = "prepared";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewEntry {
    pub op: &'static str,
    pub path: String,
    pub status: &'static str,
    /// First lines of content. `None` for deletes.
    pub content_preview: Option<String>,
}

fn decode_operation(idx: usize, item: Value) -> CoreResult<Operation> {
    if !item.is_object() {
        return Err(CoreError::malformed(format!(
            "change #{idx}: expected an object"
        )));
    }
    let op: Operation = serde_json::from_value(item)
        .map_err(|e| CoreError::malformed(format!("change #{idx}: {e}")))?;
    if op.path().is_empty() {
        return Err(CoreError::malformed(format!(
            "change #{idx}: `path` must be a non-empty string"
        )));
    }
    Ok(op)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_malformed(raw: &str) {
        match Plan::decode(raw) {
            Err(CoreError::MalformedPlan(_)) => {}
            other => panic!("expected MalformedPlan for {raw}, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_full_plan() {
        let raw = r#"{
            "changes": [
                {"op": "create", "path": "src/app.py", "content": "print('hi')\n"},
                {"op": "update", "path": "index.html", "content": ""},
                {"op": "delete", "path": "old.css"}
            ],
            "notes": "three changes"
        }"#;
        let plan = Plan::decode(raw).unwrap();
        assert_eq!(
            plan.changes(),
            &[
                Operation::create("src/app.py", "print('hi')\n"),
                Operation::update("index.html", ""),
                Operation::delete("old.css"),
            ]
        );
        assert_eq!(plan.notes(), "three changes");
    }

    #[test]
    fn test_notes_default_to_empty() {
        let plan = Plan::decode(r#"{"changes": []}"#).unwrap();
        assert!(plan.is_empty());
        assert_eq!(plan.notes(), "");
    }

    #[test]
    fn test_delete_ignores_stray_content() {
        let plan =
            Plan::decode(r#"{"changes": [{"op": "delete", "path": "a.txt", "content": "x"}]}"#)
                .unwrap();
        assert_eq!(plan.changes(), &[Operation::delete("a.txt")]);
    }

    #[test]
    fn test_missing_changes_is_malformed() {
        assert_malformed(r#"{"notes": "nothing"}"#);
    }

    #[test]
    fn test_unknown_op_is_malformed() {
        assert_malformed(r#"{"changes": [{"op": "rename", "path": "a", "content": "b"}]}"#);
        assert_malformed(r#"{"changes": [{"op": "Create", "path": "a", "content": "b"}]}"#);
        assert_malformed(r#"{"changes": [{"path": "a", "content": "b"}]}"#);
    }

    #[test]
    fn test_missing_content_is_malformed() {
        assert_malformed(r#"{"changes": [{"op": "create", "path": "a.txt"}]}"#);
        assert_malformed(r#"{"changes": [{"op": "update", "path": "a.txt"}]}"#);
        assert_malformed(r#"{"changes": [{"op": "update", "path": "a.txt", "content": null}]}"#);
    }

    #[test]
    fn test_empty_or_missing_path_is_malformed() {
        assert_malformed(r#"{"changes": [{"op": "delete", "path": ""}]}"#);
        assert_malformed(r#"{"changes": [{"op": "delete"}]}"#);
    }

    #[test]
    fn test_non_object_documents_are_malformed() {
        assert_malformed("not json at all");
        assert_malformed(r#"[[], "notes"]"#);
        assert_malformed(r#"{"changes": {"op": "delete"}}"#);
        assert_malformed(r#"{"changes": ["a.txt"]}"#);
    }

    #[test]
    fn test_unsafe_paths_still_decode() {
        let plan =
            Plan::decode(r#"{"changes": [{"op": "delete", "path": "../../etc/passwd"}]}"#)
                .unwrap();
        assert_eq!(plan.changes()[0].path(), "../../etc/passwd");
    }

    #[test]
    fn test_encode_then_decode_preserves_plan() {
        let plan = Plan::new(
            vec![
                Operation::create("a/b/c.txt", "line1\n\"quoted\"\n"),
                Operation::delete("gone.md"),
                Operation::update("x.txt", ""),
            ],
            "notes with ünïcode",
        );
        assert_eq!(Plan::decode(&plan.encode()).unwrap(), plan);
    }

    #[test]
    fn test_preview_truncates_content() {
        let body = (1..=50).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
        let plan = Plan::new(
            vec![Operation::create("big.txt", body), Operation::delete("old.txt")],
            "",
        );
        let preview = plan.preview(40);
        assert_eq!(preview.len(), 2);
        assert_eq!(preview[0].op, "create");
        assert_eq!(preview[0].status, PREPARED);
        let shown = preview[0].content_preview.as_deref().unwrap();
        assert_eq!(shown.lines().count(), 40);
        assert!(shown.ends_with("line 40"));
        assert_eq!(preview[1].content_preview, None);
    }
}
