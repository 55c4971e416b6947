use sqlx::MySql;
use sqlx::mysql::MySqlArguments;
use sqlx::query::{QueryAs, QueryScalar};

use crate::auth::auth::Scope;

/// SQL bindable filter value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    U64(u64),
    I32(i32),
    Str(String),
}

/// Dynamic `WHERE` clause with its bind values, kept in placeholder order.
#[derive(Debug, Clone)]
pub struct WhereClause {
    sql: String,
    values: Vec<SqlValue>,
}

impl Default for WhereClause {
    fn default() -> Self {
        Self {
            sql: String::from(" WHERE 1=1"),
            values: Vec::new(),
        }
    }
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `AND <condition>`; the condition holds exactly one `?`.
    pub fn and(&mut self, condition: &str, value: SqlValue) -> &mut Self {
        self.sql.push_str(" AND ");
        self.sql.push_str(condition);
        self.values.push(value);
        self
    }

    /// Append a condition that binds nothing.
    pub fn and_raw(&mut self, condition: &str) -> &mut Self {
        self.sql.push_str(" AND ");
        self.sql.push_str(condition);
        self
    }

    pub fn and_opt(&mut self, condition: &str, value: Option<SqlValue>) -> &mut Self {
        if let Some(v) = value {
            self.and(condition, v);
        }
        self
    }

    /// Pin rows of table `alias` to what the session may see.
    pub fn scope(&mut self, scope: Scope, alias: &str) -> &mut Self {
        match scope {
            Scope::All => self,
            Scope::Skpd(id) => self.and(&format!("{alias}.skpd_id = ?"), SqlValue::U64(id)),
            Scope::Subunit(id) => self.and(&format!("{alias}.subunit_id = ?"), SqlValue::U64(id)),
            Scope::Own(id) => self.and(&format!("{alias}.pegawai_id = ?"), SqlValue::U64(id)),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    pub fn bind_as<'q, O>(
        &'q self,
        mut query: QueryAs<'q, MySql, O, MySqlArguments>,
    ) -> QueryAs<'q, MySql, O, MySqlArguments> {
        for value in &self.values {
            query = match value {
                SqlValue::U64(v) => query.bind(*v),
                SqlValue::I32(v) => query.bind(*v),
                SqlValue::Str(s) => query.bind(s.as_str()),
            };
        }
        query
    }

    pub fn bind_scalar<'q, O>(
        &'q self,
        mut query: QueryScalar<'q, MySql, O, MySqlArguments>,
    ) -> QueryScalar<'q, MySql, O, MySqlArguments> {
        for value in &self.values {
            query = match value {
                SqlValue::U64(v) => query.bind(*v),
                SqlValue::I32(v) => query.bind(*v),
                SqlValue::Str(s) => query.bind(s.as_str()),
            };
        }
        query
    }
}
