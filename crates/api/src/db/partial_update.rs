//! Partial-update builder.
//!
//! Turns a sparse set of column assignments into a single parameterized
//! `UPDATE`. Column names come only from a per-table [`Column`] enum, so the
//! SQL text never contains caller-provided strings; every value is bound.
//!
//! ```rust,ignore
//! let mut update = PartialUpdate::new();
//! update.set(UserColumn::Nombre, FieldValue::text("Ana"));
//! update.set(UserColumn::Telefono, FieldValue::Text(None));
//! update.execute(&pool, rut).await?;
//! // UPDATE ferremas.usuario SET nombre = $1, telefono = $2 WHERE rut = $3
//! ```

use std::fmt::Debug;

use sqlx::{Encode, Executor, Postgres, QueryBuilder, Type};

use super::RepositoryError;

/// Message returned when an update carries no fields.
pub const EMPTY_UPDATE_MESSAGE: &str = "Debe enviar al menos 1 dato";

/// A whitelisted, updatable column of one table.
pub trait Column: Copy + PartialEq + Debug {
    /// Schema-qualified table name.
    const TABLE: &'static str;
    /// Primary key column used in the `WHERE` clause.
    const KEY: &'static str;

    /// SQL column name.
    fn name(self) -> &'static str;

    /// Whether the column accepts `NULL`.
    fn nullable(self) -> bool;
}

/// A value to bind for one column.
///
/// `None` inside a variant means SQL `NULL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(Option<String>),
    Int(Option<i32>),
    Bool(bool),
}

impl FieldValue {
    /// Non-null text value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(Some(value.into()))
    }

    const fn is_null(&self) -> bool {
        matches!(self, Self::Text(None) | Self::Int(None))
    }
}

/// Sparse set of column assignments for one row of `C::TABLE`.
#[derive(Debug, Clone)]
pub struct PartialUpdate<C: Column> {
    assignments: Vec<(C, FieldValue)>,
}

impl<C: Column> Default for PartialUpdate<C> {
    fn default() -> Self {
        Self {
            assignments: Vec::new(),
        }
    }
}

impl<C: Column> PartialUpdate<C> {
    /// Create an empty update.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign `value` to `column`, replacing any earlier assignment to it.
    pub fn set(&mut self, column: C, value: FieldValue) -> &mut Self {
        if let Some(slot) = self.assignments.iter_mut().find(|(c, _)| *c == column) {
            slot.1 = value;
        } else {
            self.assignments.push((column, value));
        }
        self
    }

    /// Assign `value` only when it is `Some`.
    pub fn set_if(&mut self, column: C, value: Option<FieldValue>) -> &mut Self {
        if let Some(value) = value {
            self.set(column, value);
        }
        self
    }

    /// Whether no column has been assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// The value currently assigned to `column`, if any.
    #[must_use]
    pub fn get(&self, column: C) -> Option<&FieldValue> {
        self.assignments
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, value)| value)
    }

    /// Check the update can be applied: at least one column, no `NULL` for a
    /// non-nullable column.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` describing the problem.
    pub fn validate(&self) -> Result<(), RepositoryError> {
        if self.assignments.is_empty() {
            return Err(RepositoryError::Validation(EMPTY_UPDATE_MESSAGE.to_owned()));
        }

        if let Some((column, _)) = self
            .assignments
            .iter()
            .find(|(column, value)| value.is_null() && !column.nullable())
        {
            return Err(RepositoryError::Validation(format!(
                "El campo {} no puede ser nulo",
                column.name()
            )));
        }

        Ok(())
    }

    /// Build the `UPDATE` statement for the row identified by `key`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if [`Self::validate`] fails.
    pub fn build<K>(&self, key: K) -> Result<QueryBuilder<'static, Postgres>, RepositoryError>
    where
        K: 'static + Encode<'static, Postgres> + Type<Postgres>,
    {
        self.validate()?;

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE ");
        builder.push(C::TABLE).push(" SET ");

        let mut assignments = builder.separated(", ");
        for (column, value) in &self.assignments {
            assignments.push(column.name()).push_unseparated(" = ");
            match value.clone() {
                FieldValue::Text(v) => assignments.push_bind_unseparated(v),
                FieldValue::Int(v) => assignments.push_bind_unseparated(v),
                FieldValue::Bool(v) => assignments.push_bind_unseparated(v),
            };
        }

        builder.push(" WHERE ").push(C::KEY).push(" = ").push_bind(key);
        Ok(builder)
    }

    /// Validate, then apply the update in a single statement.
    ///
    /// Nothing touches `executor` when validation fails.
    ///
    /// # Errors
    ///
    /// - `RepositoryError::Validation` for an empty update or illegal `NULL`
    /// - `RepositoryError::NotFound` if no row matches `key`
    /// - `Conflict`/`InvalidReference`/`Validation` for constraint violations
    /// - `RepositoryError::Database` for other database errors
    pub async fn execute<'c, E, K>(&self, executor: E, key: K) -> Result<(), RepositoryError>
    where
        E: Executor<'c, Database = Postgres>,
        K: 'static + Encode<'static, Postgres> + Type<Postgres>,
    {
        let mut builder = self.build(key)?;

        let result = builder
            .build()
            .execute(executor)
            .await
            .map_err(RepositoryError::from_write)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
