//! Dynamic WHERE-clause building shared by the filtered listings.

use atelier_core::types::Timestamp;
use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::Postgres;

/// Typed bind value for dynamically-built queries.
pub(crate) enum BindValue {
    BigInt(i64),
    Bool(bool),
    Text(String),
    Timestamp(Timestamp),
}

/// Accumulates `AND`-joined conditions with sequential `$n` placeholders.
pub(crate) struct Filter {
    conditions: Vec<String>,
    pub(crate) values: Vec<BindValue>,
}

impl Filter {
    pub(crate) fn new() -> Self {
        Self {
            conditions: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Push a condition. `{}` in `template` is replaced with the next placeholder.
    pub(crate) fn push(&mut self, template: &str, value: BindValue) {
        self.values.push(value);
        let placeholder = format!("${}", self.values.len());
        self.conditions.push(template.replace("{}", &placeholder));
    }

    /// Empty when no condition is active, otherwise starts with `WHERE `.
    pub(crate) fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Index of the next free placeholder, for trailing LIMIT/OFFSET binds.
    pub(crate) fn next_index(&self) -> usize {
        self.values.len() + 1
    }
}

pub(crate) fn bind_all<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    values: &'q [BindValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for val in values {
        q = match val {
            BindValue::BigInt(v) => q.bind(*v),
            BindValue::Bool(v) => q.bind(*v),
            BindValue::Text(v) => q.bind(v.as_str()),
            BindValue::Timestamp(v) => q.bind(*v),
        };
    }
    q
}

pub(crate) fn bind_all_scalar<'q>(
    mut q: QueryScalar<'q, Postgres, i64, PgArguments>,
    values: &'q [BindValue],
) -> QueryScalar<'q, Postgres, i64, PgArguments> {
    for val in values {
        q = match val {
            BindValue::BigInt(v) => q.bind(*v),
            BindValue::Bool(v) => q.bind(*v),
            BindValue::Text(v) => q.bind(v.as_str()),
            BindValue::Timestamp(v) => q.bind(*v),
        };
    }
    q
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_sequential() {
        let mut f = Filter::new();
        assert_eq!(f.where_clause(), "");
        f.push("role = {}", BindValue::Text("tailor".into()));
        f.push("(full_name ILIKE {} OR email ILIKE {})", BindValue::Text("%a%".into()));
        assert_eq!(
            f.where_clause(),
            "WHERE role = $1 AND (full_name ILIKE $2 OR email ILIKE $2)"
        );
        assert_eq!(f.next_index(), 3);
    }
}
