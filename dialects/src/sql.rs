//! SQL DDL parser.
//!
//! Extracts one table's column names, types, nesting, and nullability from
//! `CREATE TABLE` statements, or from a bare loose column list when the
//! source carries no `CREATE TABLE` at all. This is deliberately not a SQL
//! grammar: the scanner tracks open-paren depth from each table header
//! until the block closes, skips table-level constraint rows, and matches
//! column definitions line by line.
//!
//! Nested types are handled three ways: `ARRAY<...>`/`STRUCT<...>`
//! (BigQuery) are extracted with balanced angle-bracket scanning, since the
//! inner type may itself contain angle brackets; a Postgres-style trailing
//! `[]` marks an array; everything else strips a trailing
//! `(precision,scale)` parenthetical before the fixed type-map lookup.
//! `STRUCT` element fields are not exploded: structure presence is modeled
//! as the opaque `object` scalar.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use schema_drift_core::{ParsedSchema, ScalarKind, TypeNode};
use tracing::debug;

use crate::error::{ParseError, Result};

static CREATE_TABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)^\s*create\s+(?:or\s+replace\s+)?(?:temp(?:orary)?\s+)?(?:external\s+)?table\s+(?:if\s+not\s+exists\s+)?([`"\[]?[\w$.-]+[`"\]]?)"#,
    )
    .expect("static regex must compile")
});

static COLUMN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[`"\[]?([A-Za-z_][\w$]*)[`"\]]?\s+(.+)$"#).expect("static regex must compile")
});

static CONSTRAINT_ROW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(primary\s+key|foreign\s+key|unique\b|check\b|constraint\b)")
        .expect("static regex must compile")
});

/// Keywords terminating the non-greedy type-token capture.
static TYPE_BOUNDARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(not\s+null|null|default|options|constraint|references|primary\s+key|unique|check|collate|comment|generated)\b",
    )
    .expect("static regex must compile")
});

static NOT_NULL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bnot\s+null\b").expect("static regex must compile"));

static NULLABILITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:not\s+)?null\b").expect("static regex must compile"));

static TRAILING_PRECISION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([\d\s,]*\)\s*$").expect("static regex must compile"));

#[derive(Debug)]
struct TableBlock {
    name: String,
    body: String,
    line: usize,
}

/// Parses SQL DDL text and returns the schema of one table.
///
/// With no `selector`, the lexicographically first table is chosen; a bare
/// loose column list (no `CREATE TABLE` at all) parses under the label
/// `inline`. An explicit selector that matches nothing is an error, as is
/// one matching more than one table.
///
/// # Examples
///
/// ```
/// use schema_drift_dialects::sql;
///
/// let ddl = "CREATE TABLE t (id INT NOT NULL, name TEXT);";
/// let schema = sql::parse(ddl, None).unwrap();
/// assert_eq!(schema.label, "t");
/// assert_eq!(schema.root.canonical_form(), "{id: int, name: str}");
/// assert!(schema.required.contains("id"));
/// assert!(!schema.required.contains("name"));
/// ```
pub fn parse(source: &str, selector: Option<&str>) -> Result<ParsedSchema> {
    let stripped = strip_comments(source);
    let tables = collect_tables(&stripped)?;

    if tables.is_empty() {
        if let Some(name) = selector {
            return Err(ParseError::SelectorNotFound {
                name: name.to_string(),
                available: Vec::new(),
            });
        }
        let (columns, required) = parse_column_block(&stripped, None, true)?;
        if columns.is_empty() {
            return Err(ParseError::syntax(
                None,
                "no CREATE TABLE statements or column definitions found",
            ));
        }
        return Ok(ParsedSchema::new(
            TypeNode::object(columns),
            required,
            "inline",
        ));
    }

    let table = select_table(&tables, selector)?;
    debug!(table = %table.name, line = table.line, "parsing CREATE TABLE block");
    let (columns, required) = parse_column_block(&table.body, Some(table.line), false)?;
    Ok(ParsedSchema::new(
        TypeNode::object(columns),
        required,
        table.name.clone(),
    ))
}

/// Replaces `--` line comments and `/* */` block comments with spaces,
/// preserving newlines so later errors keep their line numbers. Quoted
/// strings are left untouched.
fn strip_comments(sql: &str) -> String {
    #[derive(PartialEq)]
    enum State {
        Normal,
        LineComment,
        BlockComment,
        SingleQuote,
        DoubleQuote,
    }

    let mut out = String::with_capacity(sql.len());
    let mut state = State::Normal;
    let mut chars = sql.chars().peekable();

    while let Some(ch) = chars.next() {
        match state {
            State::Normal => match ch {
                '-' if chars.peek() == Some(&'-') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::LineComment;
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    out.push_str("  ");
                    state = State::BlockComment;
                }
                '\'' => {
                    out.push(ch);
                    state = State::SingleQuote;
                }
                '"' => {
                    out.push(ch);
                    state = State::DoubleQuote;
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
            State::SingleQuote => {
                out.push(ch);
                if ch == '\'' {
                    state = State::Normal;
                }
            }
            State::DoubleQuote => {
                out.push(ch);
                if ch == '"' {
                    state = State::Normal;
                }
            }
        }
    }

    out
}

/// Scans for `CREATE TABLE ... ( ... )` blocks, tracking paren depth from
/// each header (including column text trailing the header on the same
/// line) until depth returns to zero.
fn collect_tables(text: &str) -> Result<Vec<TableBlock>> {
    let lines: Vec<&str> = text.lines().collect();
    let mut tables = Vec::new();
    let mut index = 0;

    while index < lines.len() {
        let Some(caps) = CREATE_TABLE_RE.captures(lines[index]) else {
            index += 1;
            continue;
        };

        let name = unquote(&caps[1]);
        let header_line = index + 1;
        let mut depth = 0usize;
        let mut started = false;
        let mut closed = false;
        let mut body = String::new();
        let mut row = index;
        let mut offset = caps.get(0).map_or(0, |m| m.end());

        'scan: while row < lines.len() {
            for ch in lines[row][offset..].chars() {
                match ch {
                    '(' => {
                        depth += 1;
                        if depth == 1 {
                            started = true;
                            continue;
                        }
                    }
                    ')' => {
                        if depth == 0 {
                            return Err(ParseError::syntax(
                                Some(row + 1),
                                format!("unbalanced ')' in CREATE TABLE {name}"),
                            ));
                        }
                        depth -= 1;
                        if depth == 0 {
                            closed = true;
                            break 'scan;
                        }
                    }
                    // `CREATE TABLE ... AS SELECT` and similar headers have
                    // no column list; stop at the statement terminator.
                    ';' if !started => break 'scan,
                    _ => {}
                }
                if started {
                    body.push(ch);
                }
            }
            if started {
                body.push('\n');
            }
            row += 1;
            offset = 0;
        }

        if started && !closed {
            return Err(ParseError::syntax(
                Some(header_line),
                format!("unterminated CREATE TABLE {name}"),
            ));
        }

        if started {
            tables.push(TableBlock {
                name,
                body,
                line: header_line,
            });
        }
        index = row + 1;
    }

    Ok(tables)
}

fn unquote(raw: &str) -> String {
    raw.trim_matches(|ch| matches!(ch, '`' | '"' | '[' | ']'))
        .to_string()
}

fn select_table<'a>(tables: &'a [TableBlock], selector: Option<&str>) -> Result<&'a TableBlock> {
    match selector {
        None => Ok(tables
            .iter()
            .min_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .expect("tables checked non-empty")),
        Some(requested) => {
            let matches: Vec<&TableBlock> = tables
                .iter()
                .filter(|table| table_name_matches(&table.name, requested))
                .collect();
            match matches.len() {
                1 => Ok(matches[0]),
                0 => Err(ParseError::SelectorNotFound {
                    name: requested.to_string(),
                    available: tables.iter().map(|t| t.name.clone()).collect(),
                }),
                _ => Err(ParseError::AmbiguousSelector {
                    name: requested.to_string(),
                    candidates: matches.iter().map(|t| t.name.clone()).collect(),
                }),
            }
        }
    }
}

/// Case-insensitive, optionally-qualified table-name match: an unqualified
/// request matches a qualified definition's last segment and vice versa.
fn table_name_matches(defined: &str, requested: &str) -> bool {
    let defined = defined.to_lowercase();
    let requested = requested.to_lowercase();
    if defined == requested {
        return true;
    }
    let defined_leaf = defined.rsplit('.').next().unwrap_or(&defined);
    let requested_leaf = requested.rsplit('.').next().unwrap_or(&requested);
    defined_leaf == requested || defined == requested_leaf
}

/// Parses the inside of a table block (or a loose column list) into ordered
/// columns plus the set of `NOT NULL` column paths.
///
/// In `loose` mode (no surrounding `CREATE TABLE`) an entry only counts as
/// a column when its type token is recognized or it carries an explicit
/// nullability marker; otherwise arbitrary SQL text would read as columns
/// of type `any`.
fn parse_column_block(
    body: &str,
    header_line: Option<usize>,
    loose: bool,
) -> Result<(Vec<(String, TypeNode)>, BTreeSet<String>)> {
    let mut columns: Vec<(String, TypeNode)> = Vec::new();
    let mut required = BTreeSet::new();

    for entry in split_top_level_commas(body) {
        let flattened = entry.split_whitespace().collect::<Vec<_>>().join(" ");
        if flattened.is_empty() || CONSTRAINT_ROW_RE.is_match(&flattened) {
            continue;
        }

        let Some(caps) = COLUMN_RE.captures(&flattened) else {
            continue;
        };
        let name = caps[1].to_string();
        let rest = caps[2].trim();

        let type_token = match TYPE_BOUNDARY_RE.find(rest) {
            Some(found) => rest[..found.start()].trim(),
            None => rest,
        };

        let (ty, recognized) = resolve_type_token(type_token, header_line)?;
        if loose && !recognized && !NULLABILITY_RE.is_match(rest) {
            debug!(entry = %flattened, "skipping unrecognized loose entry");
            continue;
        }
        if NOT_NULL_RE.is_match(rest) {
            required.insert(name.clone());
        }
        if columns.iter().all(|(existing, _)| existing != &name) {
            columns.push((name, ty));
        }
    }

    Ok((columns, required))
}

/// Splits a column-list body on commas at zero paren/angle depth, so
/// `NUMERIC(10,2)` and `STRUCT<a INT64, b STRING>` stay intact.
fn split_top_level_commas(body: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current = String::new();
    let mut paren_depth = 0i32;
    let mut angle_depth = 0i32;

    for ch in body.chars() {
        match ch {
            '(' => paren_depth += 1,
            ')' => paren_depth -= 1,
            '<' => angle_depth += 1,
            '>' => angle_depth -= 1,
            ',' if paren_depth == 0 && angle_depth == 0 => {
                entries.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }
    if !current.trim().is_empty() {
        entries.push(current);
    }

    entries
}

/// Normalizes one SQL type token into a [`TypeNode`].
///
/// Recognizes `ARRAY<...>`/`STRUCT<...>` via balanced angle-bracket
/// scanning, Postgres trailing `[]`, and otherwise strips a trailing
/// `(precision,scale)` before the fixed map lookup. Unknown tokens degrade
/// to `any`; only structurally broken brackets are errors.
pub(crate) fn normalize_type_token(raw: &str, line: Option<usize>) -> Result<TypeNode> {
    resolve_type_token(raw, line).map(|(ty, _)| ty)
}

/// Like [`normalize_type_token`], additionally reporting whether the token
/// was recognized (as opposed to falling back to `any`).
fn resolve_type_token(raw: &str, line: Option<usize>) -> Result<(TypeNode, bool)> {
    let token = raw.trim().trim_end_matches([',', ';']).trim();
    if token.is_empty() {
        return Ok((TypeNode::any(), false));
    }

    if let Some(base) = token.strip_suffix("[]") {
        let (element, recognized) = resolve_type_token(base, line)?;
        return Ok((TypeNode::array(element), recognized));
    }

    let lower = token.to_lowercase();
    if lower.starts_with("array") {
        if !token.contains('<') {
            return Ok((TypeNode::unknown_array(), true));
        }
        let inner = angle_bracket_inner(token, line)?;
        let (element, _) = resolve_type_token(inner, line)?;
        return Ok((TypeNode::array(element), true));
    }
    if lower.starts_with("struct") {
        if token.contains('<') {
            // Validate bracket balance, then deliberately leave the struct
            // opaque: element fields are not exploded.
            angle_bracket_inner(token, line)?;
        }
        return Ok((TypeNode::opaque(), true));
    }

    let stripped = TRAILING_PRECISION_RE.replace(&lower, "");
    let normalized = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    match scalar_kind_for(&normalized) {
        Some(ScalarKind::Object) => Ok((TypeNode::opaque(), true)),
        Some(kind) => Ok((TypeNode::scalar(kind), true)),
        None => {
            debug!(token = %token, "unknown SQL type token, defaulting to any");
            Ok((TypeNode::any(), false))
        }
    }
}

/// Extracts the text between the first `<` and its balanced closing `>`.
///
/// Depth-counting, not a regex: the inner type may itself contain angle
/// brackets (`ARRAY<STRUCT<a INT64>>`).
fn angle_bracket_inner(token: &str, line: Option<usize>) -> Result<&str> {
    let open = token.find('<').ok_or_else(|| {
        ParseError::syntax(line, format!("expected '<' in type `{token}`"))
    })?;

    let mut depth = 0usize;
    for (offset, ch) in token[open..].char_indices() {
        match ch {
            '<' => depth += 1,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    let close = open + offset;
                    let trailing = token[close + 1..].trim();
                    if !trailing.is_empty() {
                        return Err(ParseError::syntax(
                            line,
                            format!("unexpected trailing text after '>' in type `{token}`"),
                        ));
                    }
                    return Ok(&token[open + 1..close]);
                }
            }
            _ => {}
        }
    }

    Err(ParseError::syntax(
        line,
        format!("unbalanced angle brackets in type `{token}`"),
    ))
}

fn scalar_kind_for(name: &str) -> Option<ScalarKind> {
    Some(match name {
        "int" | "integer" | "smallint" | "bigint" | "tinyint" | "mediumint" | "int2" | "int4"
        | "int8" | "int64" | "serial" | "smallserial" | "bigserial" => ScalarKind::Int,
        "float" | "float4" | "float8" | "float64" | "double" | "double precision" | "real"
        | "numeric" | "decimal" | "bignumeric" | "money" => ScalarKind::Float,
        "bool" | "boolean" => ScalarKind::Bool,
        "string" | "text" | "char" | "varchar" | "nvarchar" | "character"
        | "character varying" | "uuid" | "bytes" | "blob" | "clob" | "binary" | "varbinary" => {
            ScalarKind::Str
        }
        "date" => ScalarKind::Date,
        "time" | "time with time zone" | "time without time zone" => ScalarKind::Time,
        "timestamp" | "datetime" | "timestamptz" | "timestamp with time zone"
        | "timestamp without time zone" | "smalldatetime" => ScalarKind::Timestamp,
        "json" | "jsonb" | "record" | "variant" => ScalarKind::Object,
        _ => return None,
    })
}
