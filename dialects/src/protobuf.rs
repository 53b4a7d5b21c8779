//! Protocol Buffer IDL parser.
//!
//! Extracts one message's tree from a `.proto` source in two passes. The
//! structural pass strips comments, splits the source into statements on
//! `{`/`}`/`;` boundaries, and walks them with a block stack, recording per
//! message: its field list (name, raw type token, `repeated`/`required`
//! labels, declaring scope) and a parent→children index of nested type
//! *definitions* (as opposed to type *usages*). `oneof` members are
//! recorded as ordinary fields of the enclosing message.
//!
//! The resolution pass classifies each field's raw type token as a scalar,
//! a `map<K,V>` (flattened to the opaque object scalar), or a message/enum
//! reference. References resolve via lexical scoping: the declaring scope
//! first, then each enclosing ancestor scope, then the package, then the
//! bare name; an absolute `.pkg.Type` token bypasses scoping entirely.
//! Enum references become `str`; resolved messages expand inline, with
//! `repeated` wrapping the result in an array. A message's nested
//! definitions that no field references are still exposed as extra object
//! properties.
//!
//! Recursive or mutually-recursive messages are detected with an expansion
//! stack; a reference already being expanded resolves to the opaque
//! `object` placeholder instead of recursing, in both tree building and
//! required-path collection.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use schema_drift_core::{ParsedSchema, ScalarKind, TypeNode, join_path};
use tracing::debug;

use crate::error::{ParseError, Result};

static PACKAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*package\s+([A-Za-z_][\w.]*)\s*$").expect("static regex must compile")
});

static MESSAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*message\s+([A-Za-z_]\w*)\s*$").expect("static regex must compile")
});

static ENUM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*enum\s+([A-Za-z_]\w*)\s*$").expect("static regex must compile")
});

static ONEOF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*oneof\s+([A-Za-z_]\w*)\s*$").expect("static regex must compile")
});

static MAP_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:repeated\s+)?(map\s*<[^>]+>)\s+([A-Za-z_]\w*)\s*=\s*\d+")
        .expect("static regex must compile")
});

static FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:(optional|required|repeated)\s+)?(\.?[A-Za-z_][\w.]*)\s+([A-Za-z_]\w*)\s*=\s*\d+")
        .expect("static regex must compile")
});

/// Statement directives that carry no schema information.
static SKIPPED_PREFIXES: [&str; 5] = ["syntax", "import", "option", "reserved", "extensions"];

#[derive(Debug)]
struct FieldDecl {
    name: String,
    type_token: String,
    repeated: bool,
    required: bool,
    /// FQN (package-relative) of the declaring message.
    scope: String,
}

#[derive(Debug, Default)]
struct MessageDecl {
    fields: Vec<FieldDecl>,
    /// Nested message definitions, in declaration order.
    children: Vec<String>,
}

#[derive(Debug, Default)]
struct ProtoIndex {
    package: Option<String>,
    /// Message declarations keyed by package-relative FQN.
    messages: HashMap<String, MessageDecl>,
    /// Declaration order, for deterministic listings.
    message_order: Vec<String>,
    enums: BTreeSet<String>,
}

#[derive(Debug)]
enum Frame {
    Message(String),
    Enum,
    Oneof,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delimiter {
    BlockOpen,
    BlockClose,
    Terminator,
    End,
}

#[derive(Debug)]
struct Statement {
    text: String,
    line: usize,
    delimiter: Delimiter,
}

enum FieldKind {
    Scalar(ScalarKind),
    Map,
    Message(String),
    Enum,
    Unknown,
}

/// Parses a `.proto` source and returns the schema of one message.
///
/// The message is selected by exact package-relative name, absolute dotted
/// path (leading `.`), or unique unqualified suffix; an ambiguous suffix is
/// an error. With no selector, the lexicographically first top-level
/// message is chosen.
///
/// # Examples
///
/// ```
/// use schema_drift_dialects::protobuf;
///
/// let proto = "\
/// message M { repeated N items = 1; }
/// message N { int32 x = 1; }
/// ";
/// let schema = protobuf::parse(proto, Some("M")).unwrap();
/// assert_eq!(schema.root.canonical_form(), "{items: [{x: int}]}");
/// ```
pub fn parse(source: &str, selector: Option<&str>) -> Result<ParsedSchema> {
    let index = index_source(source)?;
    if index.messages.is_empty() {
        return Err(ParseError::syntax(None, "no message definitions found"));
    }

    let chosen = select_message(&index, selector)?;
    debug!(message = %chosen, "resolving protobuf message tree");

    let root = build_message_tree(&index, &chosen, &mut Vec::new());
    let mut required = BTreeSet::new();
    collect_required(&index, &chosen, "", &mut Vec::new(), &mut required);

    Ok(ParsedSchema::new(root, required, chosen))
}

// ---- structural pass ----

fn index_source(source: &str) -> Result<ProtoIndex> {
    let stripped = strip_comments(source);
    let statements = split_statements(&stripped);

    let mut index = ProtoIndex::default();
    let mut stack: Vec<Frame> = Vec::new();

    for statement in &statements {
        let text = statement.text.trim();
        match statement.delimiter {
            Delimiter::BlockOpen => open_block(text, &mut stack, &mut index),
            Delimiter::BlockClose => {
                record_statement(text, &stack, &mut index);
                if stack.pop().is_none() {
                    return Err(ParseError::syntax(
                        Some(statement.line),
                        "unbalanced '}'",
                    ));
                }
            }
            Delimiter::Terminator | Delimiter::End => {
                record_statement(text, &stack, &mut index);
            }
        }
    }

    if !stack.is_empty() {
        return Err(ParseError::syntax(
            None,
            format!("unexpected end of input: {} unclosed block(s)", stack.len()),
        ));
    }

    Ok(index)
}

fn open_block(text: &str, stack: &mut Vec<Frame>, index: &mut ProtoIndex) {
    if let Some(caps) = MESSAGE_RE.captures(text) {
        let fqn = qualify(stack, &caps[1]);
        if let Some(parent) = enclosing_message(stack) {
            index
                .messages
                .entry(parent.to_string())
                .or_default()
                .children
                .push(fqn.clone());
        }
        index.messages.entry(fqn.clone()).or_default();
        index.message_order.push(fqn.clone());
        stack.push(Frame::Message(fqn));
    } else if let Some(caps) = ENUM_RE.captures(text) {
        let fqn = qualify(stack, &caps[1]);
        index.enums.insert(fqn);
        stack.push(Frame::Enum);
    } else if ONEOF_RE.is_match(text) {
        stack.push(Frame::Oneof);
    } else {
        // service/extend/unknown blocks: kept on the stack for balance only.
        stack.push(Frame::Other);
    }
}

fn record_statement(text: &str, stack: &[Frame], index: &mut ProtoIndex) {
    if text.is_empty() {
        return;
    }

    if stack.is_empty()
        && let Some(caps) = PACKAGE_RE.captures(text)
    {
        index.package = Some(caps[1].to_string());
        return;
    }

    let first_word = text.split_whitespace().next().unwrap_or_default();
    if SKIPPED_PREFIXES.contains(&first_word) {
        return;
    }
    if matches!(stack.last(), Some(Frame::Enum) | Some(Frame::Other) | None) {
        return;
    }

    let Some(scope) = enclosing_message(stack) else {
        return;
    };
    let in_oneof = matches!(stack.last(), Some(Frame::Oneof));

    if let Some(caps) = MAP_FIELD_RE.captures(text) {
        let field = FieldDecl {
            name: caps[2].to_string(),
            type_token: caps[1].to_string(),
            repeated: false,
            required: false,
            scope: scope.to_string(),
        };
        push_field(index, scope, field);
        return;
    }

    if let Some(caps) = FIELD_RE.captures(text) {
        let label = caps.get(1).map(|m| m.as_str());
        let field = FieldDecl {
            name: caps[3].to_string(),
            type_token: caps[2].to_string(),
            repeated: label == Some("repeated"),
            // oneof members are never required; other labels govern
            // array-ness and the required flag.
            required: label == Some("required") && !in_oneof,
            scope: scope.to_string(),
        };
        push_field(index, scope, field);
    }
}

fn push_field(index: &mut ProtoIndex, scope: &str, field: FieldDecl) {
    index
        .messages
        .entry(scope.to_string())
        .or_default()
        .fields
        .push(field);
}

fn qualify(stack: &[Frame], name: &str) -> String {
    match enclosing_message(stack) {
        Some(scope) => format!("{scope}.{name}"),
        None => name.to_string(),
    }
}

/// The innermost `message` frame, looking through `oneof` groups.
fn enclosing_message(stack: &[Frame]) -> Option<&str> {
    for frame in stack.iter().rev() {
        match frame {
            Frame::Message(fqn) => return Some(fqn),
            Frame::Oneof => continue,
            Frame::Enum | Frame::Other => return None,
        }
    }
    None
}

/// Replaces `//` line comments and `/* */` block comments with spaces,
/// preserving newlines and string literals.
fn strip_comments(source: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Normal,
        LineComment,
        BlockComment,
        Quoted,
    }

    let mut out = String::with_capacity(source.len());
    let mut state = State::Normal;
    let mut chars = source.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            State::Normal => match ch {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::BlockComment;
                }
                '"' => {
                    out.push(ch);
                    state = State::Quoted;
                }
                _ => out.push(ch),
            },
            State::LineComment => {
                if ch == '\n' {
                    out.push('\n');
                    state = State::Normal;
                } else {
                    out.push(' ');
                }
            }
            State::BlockComment => {
                if ch == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("  ");
                    state = State::Normal;
                } else if ch == '\n' {
                    out.push('\n');
                } else {
                    out.push(' ');
                }
            }
            State::Quoted => {
                out.push(ch);
                if ch == '"' {
                    state = State::Normal;
                }
            }
        }
    }

    out
}

/// Splits a comment-stripped source into statements on `{`, `}`, and `;`
/// boundaries, tracking line numbers for error reporting.
fn split_statements(source: &str) -> Vec<Statement> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut line = 1usize;

    for ch in source.chars() {
        match ch {
            '{' | '}' | ';' => {
                let delimiter = match ch {
                    '{' => Delimiter::BlockOpen,
                    '}' => Delimiter::BlockClose,
                    _ => Delimiter::Terminator,
                };
                out.push(Statement {
                    text: std::mem::take(&mut current),
                    line,
                    delimiter,
                });
            }
            '\n' => {
                line += 1;
                current.push(' ');
            }
            _ => current.push(ch),
        }
    }

    if !current.trim().is_empty() {
        out.push(Statement {
            text: current,
            line,
            delimiter: Delimiter::End,
        });
    }

    out
}

// ---- resolution pass ----

fn build_message_tree(index: &ProtoIndex, fqn: &str, visiting: &mut Vec<String>) -> TypeNode {
    if visiting.iter().any(|entry| entry == fqn) {
        debug!(message = %fqn, "recursive message reference, substituting opaque placeholder");
        return TypeNode::opaque();
    }
    let Some(decl) = index.messages.get(fqn) else {
        return TypeNode::any();
    };
    visiting.push(fqn.to_string());

    let mut fields: Vec<(String, TypeNode)> = Vec::new();
    let mut referenced: BTreeSet<String> = BTreeSet::new();

    for field in &decl.fields {
        let ty = match classify_field(index, field) {
            FieldKind::Scalar(kind) => TypeNode::scalar(kind),
            FieldKind::Map => TypeNode::opaque(),
            FieldKind::Enum => TypeNode::scalar(ScalarKind::Str),
            FieldKind::Message(target) => {
                referenced.insert(target.clone());
                build_message_tree(index, &target, visiting)
            }
            FieldKind::Unknown => {
                debug!(token = %field.type_token, "unknown protobuf type token, defaulting to any");
                TypeNode::any()
            }
        };
        let ty = if field.repeated {
            TypeNode::array(ty)
        } else {
            ty
        };
        fields.push((field.name.clone(), ty));
    }

    // Nested definitions used only as a namespace still surface as object
    // properties, keyed by their short name.
    for child in &decl.children {
        if referenced.contains(child) {
            continue;
        }
        let short = child.rsplit('.').next().unwrap_or(child).to_string();
        fields.push((short, build_message_tree(index, child, visiting)));
    }

    visiting.pop();
    TypeNode::object(fields)
}

fn collect_required(
    index: &ProtoIndex,
    fqn: &str,
    prefix: &str,
    visiting: &mut Vec<String>,
    out: &mut BTreeSet<String>,
) {
    if visiting.iter().any(|entry| entry == fqn) {
        return;
    }
    let Some(decl) = index.messages.get(fqn) else {
        return;
    };
    visiting.push(fqn.to_string());

    let mut referenced: BTreeSet<String> = BTreeSet::new();

    for field in &decl.fields {
        let path = join_path(prefix, &field.name);
        if field.required {
            out.insert(path.clone());
        }
        if let FieldKind::Message(target) = classify_field(index, field) {
            referenced.insert(target.clone());
            collect_required(index, &target, &path, visiting, out);
        }
    }

    for child in &decl.children {
        if referenced.contains(child) {
            continue;
        }
        let short = child.rsplit('.').next().unwrap_or(child);
        collect_required(index, child, &join_path(prefix, short), visiting, out);
    }

    visiting.pop();
}

fn classify_field(index: &ProtoIndex, field: &FieldDecl) -> FieldKind {
    let token = field.type_token.as_str();
    if token.starts_with("map") && token.contains('<') {
        return FieldKind::Map;
    }
    if let Some(kind) = proto_scalar_kind(token) {
        return FieldKind::Scalar(kind);
    }
    if token.trim_start_matches('.') == "google.protobuf.Timestamp" {
        return FieldKind::Scalar(ScalarKind::Timestamp);
    }

    match resolve_reference(index, token, &field.scope) {
        Some(Resolved::Message(fqn)) => FieldKind::Message(fqn),
        Some(Resolved::Enum) => FieldKind::Enum,
        None => FieldKind::Unknown,
    }
}

enum Resolved {
    Message(String),
    Enum,
}

/// Lexical-scope resolution of a message/enum reference.
///
/// Candidates are tried in order: the declaring scope, each enclosing
/// ancestor scope, the package-stripped token, and the bare token. The
/// first FQN present in the known-types set wins. An absolute `.pkg.Type`
/// token bypasses scoping entirely.
fn resolve_reference(index: &ProtoIndex, token: &str, scope: &str) -> Option<Resolved> {
    if let Some(absolute) = token.strip_prefix('.') {
        return lookup(index, &strip_package(index, absolute));
    }

    let mut parts: Vec<&str> = scope.split('.').filter(|part| !part.is_empty()).collect();
    loop {
        let candidate = if parts.is_empty() {
            token.to_string()
        } else {
            format!("{}.{token}", parts.join("."))
        };
        if let Some(resolved) = lookup(index, &candidate) {
            return Some(resolved);
        }
        if parts.pop().is_none() {
            break;
        }
        if parts.is_empty() {
            // One final bare-name attempt happens on the next iteration.
            if let Some(resolved) = lookup(index, token) {
                return Some(resolved);
            }
            break;
        }
    }

    lookup(index, &strip_package(index, token))
}

fn strip_package<'a>(index: &ProtoIndex, token: &'a str) -> std::borrow::Cow<'a, str> {
    if let Some(package) = &index.package
        && let Some(stripped) = token.strip_prefix(package.as_str())
        && let Some(stripped) = stripped.strip_prefix('.')
    {
        return std::borrow::Cow::Borrowed(stripped);
    }
    std::borrow::Cow::Borrowed(token)
}

fn lookup(index: &ProtoIndex, fqn: &str) -> Option<Resolved> {
    if index.messages.contains_key(fqn) {
        return Some(Resolved::Message(fqn.to_string()));
    }
    if index.enums.contains(fqn) {
        return Some(Resolved::Enum);
    }
    None
}

fn proto_scalar_kind(token: &str) -> Option<ScalarKind> {
    Some(match token {
        "double" | "float" => ScalarKind::Float,
        "int32" | "int64" | "uint32" | "uint64" | "sint32" | "sint64" | "fixed32" | "fixed64"
        | "sfixed32" | "sfixed64" => ScalarKind::Int,
        "bool" => ScalarKind::Bool,
        "string" | "bytes" => ScalarKind::Str,
        _ => return None,
    })
}

// ---- selection ----

fn select_message(index: &ProtoIndex, selector: Option<&str>) -> Result<String> {
    let mut available: Vec<String> = index.message_order.clone();
    available.sort();

    match selector {
        None => {
            let mut top_level: Vec<&String> = index
                .message_order
                .iter()
                .filter(|fqn| !fqn.contains('.'))
                .collect();
            top_level.sort();
            match top_level.first() {
                Some(first) => Ok((*first).clone()),
                None => Err(ParseError::syntax(None, "no top-level message definitions")),
            }
        }
        Some(requested) => {
            let normalized = match requested.strip_prefix('.') {
                Some(absolute) => strip_package(index, absolute).into_owned(),
                None => strip_package(index, requested).into_owned(),
            };

            if index.messages.contains_key(&normalized) {
                return Ok(normalized);
            }

            let suffix = format!(".{normalized}");
            let candidates: Vec<String> = available
                .iter()
                .filter(|fqn| fqn.ends_with(&suffix))
                .cloned()
                .collect();
            match candidates.len() {
                1 => Ok(candidates.into_iter().next().expect("len checked")),
                0 => Err(ParseError::SelectorNotFound {
                    name: requested.to_string(),
                    available,
                }),
                _ => Err(ParseError::AmbiguousSelector {
                    name: requested.to_string(),
                    candidates,
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_message_field_expands_inline() {
        let proto = "\
message M { repeated N items = 1; }
message N { int32 x = 1; }
";
        let schema = parse(proto, Some("M")).unwrap();
        assert_eq!(schema.root.canonical_form(), "{items: [{x: int}]}");
        assert_eq!(schema.label, "M");
    }

    #[test]
    fn test_scalar_field_mapping() {
        let proto = "\
message Types {
  int64 count = 1;
  double ratio = 2;
  bool ok = 3;
  string name = 4;
  bytes payload = 5;
}
";
        let schema = parse(proto, None).unwrap();
        assert_eq!(
            schema.root.canonical_form(),
            "{count: int, name: str, ok: bool, payload: str, ratio: float}"
        );
    }

    #[test]
    fn test_lexical_scoping_prefers_nested_definition() {
        let proto = "\
package demo;
message Outer {
  message Inner { string name = 1; }
  Inner inner = 1;
  Other other = 2;
}
message Inner { int32 code = 1; }
message Other { bool flag = 1; }
";
        let schema = parse(proto, Some("Outer")).unwrap();
        // `Inner` resolves to the nested definition, not the top-level one;
        // `Other` falls through scoping to the top level.
        assert_eq!(
            schema.root.canonical_form(),
            "{inner: {name: str}, other: {flag: bool}}"
        );
    }

    #[test]
    fn test_absolute_reference_bypasses_scoping() {
        let proto = "\
package demo;
message Outer {
  message Inner { string name = 1; }
  .demo.Inner inner = 1;
}
message Inner { int32 code = 1; }
";
        let schema = parse(proto, Some("Outer")).unwrap();
        // The absolute path picks the top-level `Inner`; the shadowed
        // nested definition is still exposed as a namespace property.
        assert_eq!(
            schema.root.canonical_form(),
            "{Inner: {name: str}, inner: {code: int}}"
        );
    }

    #[test]
    fn test_enum_reference_becomes_str() {
        let proto = "\
message Job {
  enum Status { PENDING = 0; DONE = 1; }
  Status status = 1;
}
";
        let schema = parse(proto, None).unwrap();
        assert_eq!(schema.root.canonical_form(), "{status: str}");
    }

    #[test]
    fn test_map_field_flattens_to_opaque_object() {
        let proto = "message M { map<string, int64> tags = 1; }";
        let schema = parse(proto, None).unwrap();
        assert_eq!(schema.root.canonical_form(), "{tags: object}");
    }

    #[test]
    fn test_oneof_members_are_plain_optional_fields() {
        let proto = "\
message Event {
  oneof payload {
    string text = 1;
    int64 number = 2;
  }
  required string id = 3;
}
";
        let schema = parse(proto, None).unwrap();
        assert_eq!(
            schema.root.canonical_form(),
            "{id: str, number: int, text: str}"
        );
        assert_eq!(schema.required.iter().collect::<Vec<_>>(), vec!["id"]);
    }

    #[test]
    fn test_required_paths_cross_message_boundaries() {
        let proto = "\
message Person {
  required string name = 1;
  optional int32 age = 2;
  Address address = 3;
}
message Address {
  required string city = 1;
  optional string zip = 2;
}
";
        let schema = parse(proto, Some("Person")).unwrap();
        assert_eq!(
            schema.required.iter().collect::<Vec<_>>(),
            vec!["address.city", "name"]
        );
    }

    #[test]
    fn test_unreferenced_nested_definition_is_exposed() {
        let proto = "\
message Wrapper {
  message Meta { string note = 1; }
  int32 id = 1;
}
";
        let schema = parse(proto, None).unwrap();
        assert_eq!(
            schema.root.canonical_form(),
            "{Meta: {note: str}, id: int}"
        );
    }

    #[test]
    fn test_recursive_message_substitutes_placeholder() {
        let proto = "\
message TreeNode {
  string value = 1;
  repeated TreeNode children = 2;
}
";
        let schema = parse(proto, None).unwrap();
        assert_eq!(
            schema.root.canonical_form(),
            "{children: [object], value: str}"
        );
    }

    #[test]
    fn test_mutually_recursive_messages_terminate() {
        let proto = "\
message A { B b = 1; }
message B { A a = 1; }
";
        let schema = parse(proto, Some("A")).unwrap();
        assert_eq!(schema.root.canonical_form(), "{b: {a: object}}");
    }

    #[test]
    fn test_unknown_type_token_degrades_to_any() {
        let proto = "message M { Unknown ref = 1; }";
        let schema = parse(proto, None).unwrap();
        assert_eq!(schema.root.canonical_form(), "{ref: any}");
    }

    #[test]
    fn test_suffix_selector_must_be_unique() {
        let proto = "\
message A { message Item { int32 x = 1; } }
message B { message Item { int32 y = 1; } }
";
        let err = parse(proto, Some("Item")).unwrap_err();
        assert!(matches!(err, ParseError::AmbiguousSelector { .. }), "got: {err}");

        let schema = parse(proto, Some("A.Item")).unwrap();
        assert_eq!(schema.root.canonical_form(), "{x: int}");
    }

    #[test]
    fn test_unknown_selector_is_an_error() {
        let proto = "message M { int32 x = 1; }";
        let err = parse(proto, Some("Absent")).unwrap_err();
        assert!(matches!(err, ParseError::SelectorNotFound { .. }), "got: {err}");
    }

    #[test]
    fn test_default_selection_picks_first_top_level_message() {
        let proto = "\
message Zeta { int32 z = 1; }
message Alpha { int32 a = 1; }
";
        let schema = parse(proto, None).unwrap();
        assert_eq!(schema.label, "Alpha");
    }

    #[test]
    fn test_unbalanced_braces_error() {
        let proto = "message M { int32 x = 1;";
        let err = parse(proto, None).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }), "got: {err}");
    }

    #[test]
    fn test_comments_and_options_are_ignored() {
        let proto = "\
syntax = \"proto3\";
// a leading comment
message M {
  /* block comment */
  option deprecated = true;
  int32 x = 1; // trailing
}
";
        let schema = parse(proto, None).unwrap();
        assert_eq!(schema.root.canonical_form(), "{x: int}");
    }

    #[test]
    fn test_timestamp_well_known_type() {
        let proto = "message M { google.protobuf.Timestamp created_at = 1; }";
        let schema = parse(proto, None).unwrap();
        assert_eq!(schema.root.canonical_form(), "{created_at: timestamp}");
    }
}
