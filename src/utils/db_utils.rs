use chrono::NaiveDate;
use sqlx::{Arguments, mysql::MySqlArguments};

use crate::model::Paging;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    U64(u64),
    Date(NaiveDate),
}

impl From<u64> for SqlValue {
    fn from(v: u64) -> Self {
        SqlValue::U64(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::String(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::String(v.to_string())
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Date(v)
    }
}

/// ===============================
/// Dynamic WHERE clause, always tenant-scoped
/// ===============================
#[derive(Debug, Clone)]
pub struct Conditions {
    clauses: Vec<String>,
    values: Vec<SqlValue>,
}

impl Conditions {
    /// Starts with `<company_column> = ?` so no query can skip the tenant filter.
    pub fn scoped(company_column: &str, company_id: u64) -> Self {
        Self {
            clauses: vec![format!("{} = ?", company_column)],
            values: vec![SqlValue::U64(company_id)],
        }
    }

    pub fn push(&mut self, clause: &str, value: impl Into<SqlValue>) -> &mut Self {
        self.clauses.push(clause.to_string());
        self.values.push(value.into());
        self
    }

    /// Adds `clause` once and binds `value` for every `?` it contains.
    pub fn push_repeated(&mut self, clause: &str, value: impl Into<SqlValue>) -> &mut Self {
        let value = value.into();
        let placeholders = clause.matches('?').count();
        self.clauses.push(clause.to_string());
        self.values
            .extend(std::iter::repeat(value).take(placeholders));
        self
    }

    pub fn where_clause(&self) -> String {
        format!("WHERE {}", self.clauses.join(" AND "))
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn arguments(&self) -> MySqlArguments {
        let mut args = MySqlArguments::default();
        for value in &self.values {
            match value.clone() {
                SqlValue::String(v) => args.add(v),
                SqlValue::U64(v) => args.add(v),
                SqlValue::Date(v) => args.add(v),
            }
        }
        args
    }

    /// Same as [`arguments`](Self::arguments) followed by LIMIT/OFFSET values
    /// when paging is requested.
    pub fn arguments_paged(&self, paging: Option<&Paging>) -> MySqlArguments {
        let mut args = self.arguments();
        if let Some(p) = paging {
            args.add(p.per_page() as u64);
            args.add(p.offset());
        }
        args
    }
}

/// `%term%` with LIKE wildcards in `term` matched literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub fn limit_clause(paging: Option<&Paging>) -> &'static str {
    if paging.is_some() { "LIMIT ? OFFSET ?" } else { "" }
}
