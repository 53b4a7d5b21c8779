//! Dialect parsers producing canonical type trees.
//!
//! Every parser in this crate satisfies the same contract: given source
//! text and an optional selector (table, message, or model name), it
//! returns a [`ParsedSchema`] — an object-rooted type tree, a presence set
//! of required dotted paths, and a label — or a [`ParseError`].
//!
//! - [`sql`] — `CREATE TABLE` DDL and bare loose column lists.
//! - [`protobuf`] — `.proto` message/enum/oneof definitions.
//! - [`spark`] — Spark `printSchema()` text.
//! - [`jsonschema`] — JSON Schema documents.
//! - [`dbt`] — dbt `schema.yml` files and compiled `manifest.json`.
//! - [`records`] — sampled data records (NDJSON or a JSON array), merged
//!   through the union algebra.
//!
//! Parsers fail fast on structurally malformed input but degrade unknown
//! *type names* to `any`: open-world type vocabularies are expected, and
//! the diff engine treats `any` as matching everything.
//!
//! # Example
//!
//! ```
//! use schema_drift_core::MergeConfig;
//! use schema_drift_dialects::{parse_source, Dialect};
//!
//! let ddl = "CREATE TABLE users (id INT NOT NULL, name TEXT);";
//! let schema = parse_source(Dialect::Sql, ddl, None, &MergeConfig::default()).unwrap();
//! assert_eq!(schema.label, "users");
//! assert_eq!(schema.root.canonical_form(), "{id: int, name: str}");
//! ```

pub mod dbt;
pub mod error;
pub mod jsonschema;
pub mod protobuf;
pub mod records;
pub mod spark;
pub mod sql;

use std::path::Path;

use schema_drift_core::{MergeConfig, ParsedSchema};

pub use error::{ParseError, Result};

/// The schema dialects this crate can ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// SQL `CREATE TABLE` DDL or a loose column list.
    Sql,
    /// Protocol Buffer IDL.
    Protobuf,
    /// Spark `printSchema()` text.
    Spark,
    /// JSON Schema document.
    JsonSchema,
    /// dbt `schema.yml` or compiled `manifest.json`.
    Dbt,
    /// Sampled data records (NDJSON or JSON array).
    Records,
}

impl Dialect {
    /// Stable lowercase name, used in CLI output and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::Protobuf => "protobuf",
            Self::Spark => "spark",
            Self::JsonSchema => "jsonschema",
            Self::Dbt => "dbt",
            Self::Records => "records",
        }
    }

    /// Detects the dialect of a source file from its extension, falling
    /// back to content sniffing for `.json` (JSON Schema vs. dbt manifest
    /// vs. record samples) and extension-less input.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use schema_drift_dialects::Dialect;
    ///
    /// let dialect = Dialect::detect(Path::new("users.sql"), "CREATE TABLE t (id INT);");
    /// assert_eq!(dialect.unwrap(), Dialect::Sql);
    /// ```
    pub fn detect(path: &Path, source: &str) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("sql") | Some("ddl") => Ok(Self::Sql),
            Some("proto") => Ok(Self::Protobuf),
            Some("txt") => Ok(Self::Spark),
            Some("yml") | Some("yaml") => Ok(Self::Dbt),
            Some("ndjson") | Some("jsonl") => Ok(Self::Records),
            Some("json") => Ok(sniff_json(source)),
            _ => sniff_content(path, source),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn sniff_json(source: &str) -> Dialect {
    if source.trim_start().starts_with('[') {
        return Dialect::Records;
    }
    if source.contains("\"nodes\"") {
        return Dialect::Dbt;
    }
    if source.contains("\"$schema\"") || source.contains("\"properties\"") {
        return Dialect::JsonSchema;
    }
    Dialect::Records
}

fn sniff_content(path: &Path, source: &str) -> Result<Dialect> {
    let lowered = source.to_lowercase();
    if lowered.contains("create table") {
        return Ok(Dialect::Sql);
    }
    if source.contains("|--") {
        return Ok(Dialect::Spark);
    }
    if lowered.contains("message ") && source.contains('{') && !source.trim_start().starts_with('{')
    {
        return Ok(Dialect::Protobuf);
    }
    let trimmed = source.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return Ok(sniff_json(source));
    }
    Err(ParseError::UnknownDialect {
        path: path.display().to_string(),
    })
}

/// Parses `source` as the given dialect.
///
/// `selector` names the table/message/model to extract where the dialect
/// has more than one (`sql`, `protobuf`, `dbt`); the remaining dialects
/// describe exactly one schema and ignore it. `config` controls sample
/// inference for [`Dialect::Records`].
pub fn parse_source(
    dialect: Dialect,
    source: &str,
    selector: Option<&str>,
    config: &MergeConfig,
) -> Result<ParsedSchema> {
    match dialect {
        Dialect::Sql => sql::parse(source, selector),
        Dialect::Protobuf => protobuf::parse(source, selector),
        Dialect::Spark => spark::parse(source, selector),
        Dialect::JsonSchema => jsonschema::parse(source, selector),
        Dialect::Dbt => dbt::parse(source, selector),
        Dialect::Records => records::parse(source, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_extension() {
        let cases = [
            ("schema.sql", Dialect::Sql),
            ("api.proto", Dialect::Protobuf),
            ("frame.txt", Dialect::Spark),
            ("models.yml", Dialect::Dbt),
            ("samples.ndjson", Dialect::Records),
        ];
        for (name, expected) in cases {
            let detected = Dialect::detect(Path::new(name), "").unwrap();
            assert_eq!(detected, expected, "for {name}");
        }
    }

    #[test]
    fn test_detect_json_variants_by_content() {
        let schema = r#"{"type": "object", "properties": {"a": {"type": "integer"}}}"#;
        assert_eq!(
            Dialect::detect(Path::new("x.json"), schema).unwrap(),
            Dialect::JsonSchema
        );

        let manifest = r#"{"nodes": {"model.demo.users": {"name": "users"}}}"#;
        assert_eq!(
            Dialect::detect(Path::new("manifest.json"), manifest).unwrap(),
            Dialect::Dbt
        );

        let samples = r#"[{"a": 1}, {"a": 2}]"#;
        assert_eq!(
            Dialect::detect(Path::new("x.json"), samples).unwrap(),
            Dialect::Records
        );
    }

    #[test]
    fn test_detect_by_content_without_extension() {
        assert_eq!(
            Dialect::detect(Path::new("schema"), "CREATE TABLE t (id INT);").unwrap(),
            Dialect::Sql
        );
        assert_eq!(
            Dialect::detect(Path::new("schema"), "root\n |-- id: long (nullable = true)\n")
                .unwrap(),
            Dialect::Spark
        );
        assert_eq!(
            Dialect::detect(Path::new("schema"), "message M { int32 x = 1; }").unwrap(),
            Dialect::Protobuf
        );
    }

    #[test]
    fn test_undetectable_input_is_an_error() {
        let err = Dialect::detect(Path::new("mystery.bin"), "???").unwrap_err();
        assert!(matches!(err, ParseError::UnknownDialect { .. }), "got: {err}");
    }
}
