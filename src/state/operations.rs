//! Operation application.

use crate::error::ApplyError;
use crate::types::{DocumentState, Operation};
use serde::Deserialize;
use serde_json::{Map, Value};

/// Field of the json0 document that holds the text.
const TEXT_FIELD: &str = "text";

/// Type names accepted in `create` payloads.
const JSON0_TYPES: &[&str] = &["json0", "http://sharejs.org/types/JSONv0"];

/// Payload of a logged operation, once interpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// Create the document with starter text.
    Create(String),

    /// Ordered text edits.
    Edit(Vec<TextEdit>),

    /// Delete the document.
    Delete,

    /// Nothing to apply; the version still advances.
    Noop,
}

/// A single json0 string component on the text field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TextEdit {
    /// `si`: insert at a char offset.
    Insert { offset: usize, text: String },

    /// `sd`: delete text that must currently sit at a char offset.
    Delete { offset: usize, text: String },
}

#[derive(Deserialize)]
struct RawComponent {
    p: Vec<Value>,
    #[serde(default)]
    si: Option<String>,
    #[serde(default)]
    sd: Option<String>,
}

#[derive(Deserialize)]
struct RawCreate {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    data: Option<Map<String, Value>>,
}

impl Payload {
    /// Interpret the opaque payload of an operation.
    pub fn parse(payload: &Map<String, Value>) -> Result<Self, ApplyError> {
        let present: Vec<&str> = ["create", "op", "del"]
            .into_iter()
            .filter(|key| payload.contains_key(*key))
            .collect();

        match present.as_slice() {
            [] => Ok(Payload::Noop),
            ["create"] => parse_create(&payload["create"]),
            ["op"] => parse_edit(&payload["op"]),
            ["del"] => Ok(Payload::Delete),
            _ => Err(ApplyError::malformed(format!(
                "payload mixes {}",
                present.join(" and ")
            ))),
        }
    }
}

fn parse_create(value: &Value) -> Result<Payload, ApplyError> {
    let create: RawCreate = serde_json::from_value(value.clone())
        .map_err(|e| ApplyError::malformed(format!("create: {}", e)))?;

    if !JSON0_TYPES.contains(&create.type_name.as_str()) {
        return Err(ApplyError::malformed(format!(
            "unknown document type {}",
            create.type_name
        )));
    }

    let text = match create.data.as_ref().and_then(|data| data.get(TEXT_FIELD)) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(ApplyError::malformed(format!(
                "create text is not a string: {}",
                other
            )))
        }
    };

    Ok(Payload::Create(text))
}

fn parse_edit(value: &Value) -> Result<Payload, ApplyError> {
    let components: Vec<RawComponent> = serde_json::from_value(value.clone())
        .map_err(|e| ApplyError::malformed(format!("op: {}", e)))?;

    components
        .into_iter()
        .map(parse_component)
        .collect::<Result<Vec<_>, _>>()
        .map(Payload::Edit)
}

fn parse_component(component: RawComponent) -> Result<TextEdit, ApplyError> {
    let offset = match component.p.as_slice() {
        [Value::String(field), Value::Number(n)] if field == TEXT_FIELD => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| ApplyError::malformed(format!("invalid offset {}", n)))?,
        _ => {
            return Err(ApplyError::malformed(format!(
                "path {:?} does not address the text field",
                component.p
            )))
        }
    };

    match (component.si, component.sd) {
        (Some(text), None) => Ok(TextEdit::Insert { offset, text }),
        (None, Some(text)) => Ok(TextEdit::Delete { offset, text }),
        (Some(_), Some(_)) => Err(ApplyError::malformed("component has both si and sd")),
        (None, None) => Err(ApplyError::malformed("component has neither si nor sd")),
    }
}

/// Byte index of the `offset`-th char, allowing one past the end.
fn byte_index(text: &str, offset: usize) -> Option<usize> {
    if offset == 0 {
        return Some(0);
    }
    match text.char_indices().nth(offset) {
        Some((idx, _)) => Some(idx),
        None if text.chars().count() == offset => Some(text.len()),
        None => None,
    }
}

fn apply_edit(text: &mut String, edit: &TextEdit) -> Result<(), ApplyError> {
    match edit {
        TextEdit::Insert { offset, text: inserted } => {
            let at = byte_index(text, *offset).ok_or_else(|| {
                ApplyError::malformed(format!("insert offset {} past end of text", offset))
            })?;
            text.insert_str(at, inserted);
        }
        TextEdit::Delete { offset, text: deleted } => {
            let at = byte_index(text, *offset).ok_or_else(|| {
                ApplyError::malformed(format!("delete offset {} past end of text", offset))
            })?;
            if !text[at..].starts_with(deleted.as_str()) {
                return Err(ApplyError::malformed(format!(
                    "deleted text does not match document at offset {}",
                    offset
                )));
            }
            text.replace_range(at..at + deleted.len(), "");
        }
    }
    Ok(())
}

/// Apply an operation to a document state.
///
/// The input state is left untouched; a new state with `version + 1` is
/// returned on success.
pub fn apply_operation(state: &DocumentState, op: &Operation) -> Result<DocumentState, ApplyError> {
    if let Some(found) = op.version {
        if found != state.version {
            return Err(ApplyError::VersionMismatch {
                expected: state.version,
                found,
            });
        }
    }

    let text = match Payload::parse(&op.payload)? {
        Payload::Create(text) => text,
        Payload::Delete => String::new(),
        Payload::Noop => state.text.clone(),
        Payload::Edit(edits) => {
            let mut text = state.text.clone();
            for edit in &edits {
                apply_edit(&mut text, edit)?;
            }
            text
        }
    };

    Ok(DocumentState {
        version: state.version + 1,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApplyErrorKind;
    use serde_json::json;

    fn op(payload: Value) -> Operation {
        match payload {
            Value::Object(map) => Operation::new(0, map),
            _ => panic!("payload must be an object"),
        }
    }

    fn state(version: u64, text: &str) -> DocumentState {
        DocumentState {
            version,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_create() {
        let result =
            apply_operation(&DocumentState::empty(), &Operation::create(0, "hello\n")).unwrap();
        assert_eq!(result, state(1, "hello\n"));
    }

    #[test]
    fn test_create_without_data() {
        let create = op(json!({ "create": { "type": "json0" } }));
        let result = apply_operation(&DocumentState::empty(), &create).unwrap();
        assert_eq!(result.text, "");
        assert_eq!(result.version, 1);
    }

    #[test]
    fn test_insert_and_delete() {
        let s = state(4, "hello world");

        let s = apply_operation(&s, &Operation::insert(0, 5, ",")).unwrap();
        assert_eq!(s, state(5, "hello, world"));

        let s = apply_operation(&s, &Operation::delete(0, 0, "hello")).unwrap();
        assert_eq!(s, state(6, ", world"));
    }

    #[test]
    fn test_offsets_count_chars() {
        let s = state(0, "héllo");
        let s = apply_operation(&s, &Operation::insert(0, 2, "X")).unwrap();
        assert_eq!(s.text, "héXllo");

        let s = apply_operation(&s, &Operation::delete(0, 1, "éX")).unwrap();
        assert_eq!(s.text, "hllo");
    }

    #[test]
    fn test_multiple_components_apply_in_order() {
        let payload = json!({ "op": [
            { "p": ["text", 0], "si": "ab" },
            { "p": ["text", 2], "si": "cd" },
            { "p": ["text", 1], "sd": "bc" },
        ]});
        let s = apply_operation(&DocumentState::empty(), &op(payload)).unwrap();
        assert_eq!(s.text, "ad");
    }

    #[test]
    fn test_input_state_untouched() {
        let before = state(1, "abc");
        let after = apply_operation(&before, &Operation::insert(0, 3, "d")).unwrap();
        assert_eq!(before, state(1, "abc"));
        assert_eq!(after.text, "abcd");
    }

    #[test]
    fn test_delete_document_and_noop() {
        let s = apply_operation(&state(2, "text"), &Operation::delete_document(0)).unwrap();
        assert_eq!(s, state(3, ""));

        let s = apply_operation(&state(2, "text"), &op(json!({ "src": "client" }))).unwrap();
        assert_eq!(s, state(3, "text"));
    }

    #[test]
    fn test_version_mismatch() {
        let err = apply_operation(&state(2, ""), &Operation::insert(0, 0, "x").with_version(5))
            .unwrap_err();
        assert_eq!(err, ApplyError::VersionMismatch { expected: 2, found: 5 });
        assert_eq!(err.kind(), ApplyErrorKind::VersionMismatch);

        let current = Operation::insert(0, 0, "x").with_version(2);
        assert!(apply_operation(&state(2, ""), &current).is_ok());
    }

    #[test]
    fn test_malformed_payloads() {
        let cases = vec![
            json!({ "op": "not a list" }),
            json!({ "op": [{ "p": ["title", 0], "si": "x" }] }),
            json!({ "op": [{ "p": ["text", -1], "si": "x" }] }),
            json!({ "op": [{ "p": ["text", 0], "si": "x", "sd": "y" }] }),
            json!({ "op": [{ "p": ["text", 0] }] }),
            json!({ "op": [{ "p": ["text", 9], "si": "x" }] }),
            json!({ "op": [{ "p": ["text", 0], "sd": "zzz" }] }),
            json!({ "create": { "type": "rich-text" } }),
            json!({ "create": { "type": "json0", "data": { "text": 7 } } }),
            json!({ "create": { "type": "json0" }, "del": true }),
        ];

        for payload in cases {
            let err = apply_operation(&state(0, "abc"), &op(payload.clone())).unwrap_err();
            assert_eq!(err.kind(), ApplyErrorKind::MalformedOperation, "{}", payload);
        }
    }

    #[test]
    fn test_byte_index() {
        assert_eq!(byte_index("", 0), Some(0));
        assert_eq!(byte_index("ab", 2), Some(2));
        assert_eq!(byte_index("ab", 3), None);
        assert_eq!(byte_index("éa", 1), Some(2));
    }
}
