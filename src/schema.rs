//! Field registry and per-field orchestration.
//!
//! A `Schema` declares which fields a search form exposes and with what
//! types, then turns a bundle of raw parameters into one SQL predicate:
//! each present parameter is parsed under its field's type and rendered
//! against `table.column` (or a raw SQL override), and the per-field
//! fragments are joined with `AND`.
//!
//! Failures are per-field: a parameter that does not parse is reported
//! to the errors sink under the field's name and simply omitted from the
//! predicate, so one bad input never invalidates the rest of the form.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::ast::FieldType;
use crate::clock::Clock;
use crate::generator::{Generator, SqlValue};
use crate::parser::Parser;

/// A named, typed, table-qualified column the query language can filter
/// on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub table: Option<String>,
    /// Raw SQL target overriding the `table.column` form.
    #[serde(default)]
    pub sql_expr: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::default(),
            table: None,
            sql_expr: None,
        }
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_sql_expr(mut self, sql_expr: impl Into<String>) -> Self {
        self.sql_expr = Some(sql_expr.into());
        self
    }

    /// The SQL expression this field's predicate compares against.
    fn target(&self) -> String {
        if let Some(sql_expr) = &self.sql_expr {
            return sql_expr.clone();
        }
        match &self.table {
            Some(table) => format!("{table}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl From<&str> for Field {
    fn from(name: &str) -> Self {
        Field::new(name)
    }
}

impl From<(&str, FieldType)> for Field {
    fn from((name, field_type): (&str, FieldType)) -> Self {
        Field::new(name).with_type(field_type)
    }
}

impl From<(&str, FieldType, &str)> for Field {
    fn from((name, field_type, table): (&str, FieldType, &str)) -> Self {
        Field::new(name).with_type(field_type).with_table(table)
    }
}

/// An external table description: table name plus ordered column
/// name/type pairs, e.g. as reported by a live schema dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDesc {
    pub name: String,
    pub columns: Vec<ColumnDesc>,
}

/// One column of a [`TableDesc`]. The type is the external name
/// (`text`, `integer`, `date`, …) and is normalized on registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDesc {
    pub name: String,
    #[serde(rename = "type", alias = "typ")]
    pub typ: String,
}

impl TableDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, name: impl Into<String>, typ: impl Into<String>) -> Self {
        self.columns.push(ColumnDesc {
            name: name.into(),
            typ: typ.into(),
        });
        self
    }

    /// Load a table description from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Looks up raw parameter values by field name. The schema never needs
/// more than `get`.
pub trait ParameterSource {
    fn get(&self, name: &str) -> Option<&str>;
}

impl ParameterSource for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<&str> {
        BTreeMap::get(self, name).map(String::as_str)
    }
}

impl ParameterSource for std::collections::HashMap<String, String> {
    fn get(&self, name: &str) -> Option<&str> {
        std::collections::HashMap::get(self, name).map(String::as_str)
    }
}

impl ParameterSource for [(&str, &str)] {
    fn get(&self, name: &str) -> Option<&str> {
        self.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }
}

/// Receives per-field failure messages.
pub trait ErrorSink {
    fn add(&mut self, name: &str, message: &str);
}

/// Ordered collection of per-field error messages, usable as a stand-in
/// for a web framework's record errors object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    by_field: BTreeMap<String, Vec<String>>,
    count: usize,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn len(&self) -> usize {
        self.count
    }

    /// Messages recorded for one field, oldest first.
    pub fn get(&self, name: &str) -> &[String] {
        self.by_field.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_field.iter().flat_map(|(name, messages)| {
            messages
                .iter()
                .map(move |message| (name.as_str(), message.as_str()))
        })
    }
}

impl ErrorSink for FieldErrors {
    fn add(&mut self, name: &str, message: &str) {
        self.by_field
            .entry(name.to_string())
            .or_default()
            .push(message.to_string());
        self.count += 1;
    }
}

/// Declares how query parameters are interpreted.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    table: Option<String>,
    fields: Vec<Field>,
    seen: HashSet<(Option<String>, String)>,
    clock: Clock,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// A schema whose fields default to the given table qualifier.
    pub fn for_table(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::default()
        }
    }

    /// Reference clock handed to every parser this schema builds.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Declare a field. Accepts a name, a `(name, type)` or
    /// `(name, type, table)` tuple, or a full [`Field`]. The first
    /// declaration per (table, name) wins; later duplicates are ignored.
    pub fn field(mut self, field: impl Into<Field>) -> Self {
        self.add_field(field);
        self
    }

    pub fn add_field(&mut self, field: impl Into<Field>) {
        let mut field = field.into();
        if field.table.is_none() {
            field.table = self.table.clone();
        }
        let key = (field.table.clone(), field.name.clone());
        if self.seen.insert(key) {
            self.fields.push(field);
        }
    }

    /// Register every column of a table description as a field,
    /// normalizing the external type names.
    pub fn table(mut self, desc: &TableDesc) -> Self {
        self.add_table(desc);
        self
    }

    pub fn add_table(&mut self, desc: &TableDesc) {
        for column in &desc.columns {
            self.add_field(
                Field::new(&column.name)
                    .with_type(FieldType::from_sql_name(&column.typ))
                    .with_table(&desc.name),
            );
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Build the WHERE-clause predicate with literals inlined.
    ///
    /// Fields whose parameter is absent are skipped; fields whose
    /// parameter fails to parse are reported to `errors` and omitted.
    /// `None` when no field produced a fragment.
    pub fn sql<P, E>(&self, parameters: &P, errors: &mut E) -> Option<String>
    where
        P: ParameterSource + ?Sized,
        E: ErrorSink + ?Sized,
    {
        let fragments = self.evaluate(parameters, errors, true)?.0;
        Some(fragments)
    }

    /// Build the predicate with `?` placeholders, returning the ordered
    /// bound values alongside.
    pub fn sql_with_values<P, E>(
        &self,
        parameters: &P,
        errors: &mut E,
    ) -> Option<(String, Vec<SqlValue>)>
    where
        P: ParameterSource + ?Sized,
        E: ErrorSink + ?Sized,
    {
        self.evaluate(parameters, errors, false)
    }

    fn evaluate<P, E>(
        &self,
        parameters: &P,
        errors: &mut E,
        inline: bool,
    ) -> Option<(String, Vec<SqlValue>)>
    where
        P: ParameterSource + ?Sized,
        E: ErrorSink + ?Sized,
    {
        let mut fragments: Vec<String> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        for field in &self.fields {
            let Some(parameter) = parameters.get(&field.name) else {
                continue;
            };

            let mut parser = Parser::new(field.field_type).with_clock(self.clock);
            let expr = match parser.parse(parameter) {
                Ok(expr) => expr,
                Err(err) => {
                    errors.add(&field.name, &err.to_string());
                    continue;
                }
            };

            let mut generator = if inline {
                Generator::new(field.target())
            } else {
                Generator::with_placeholders(field.target())
            };
            if let Some(fragment) = generator.sql(expr.as_ref()) {
                fragments.push(fragment);
                values.extend_from_slice(generator.values());
            }
        }

        if fragments.is_empty() {
            None
        } else {
            Some((fragments.join(" AND "), values))
        }
    }
}
