//! Row batches shared by [`Insert`](crate::Insert) and [`Upsert`](crate::Upsert).

use crate::client::GenericClient;
use crate::error::{BatchError, BatchResult};
use crate::ident::check_field_name;
use crate::value::Value;
use std::collections::HashSet;

/// Target table, declared columns and pending rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Batch {
    pub(crate) table: String,
    pub(crate) default_fields: Vec<String>,
    pub(crate) fields: Vec<String>,
    pub(crate) rows: Vec<Vec<Value>>,
    pub(crate) comments: Vec<String>,
}

impl Batch {
    pub(crate) fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Self::default()
        }
    }

    pub(crate) fn set_fields<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
    }

    pub(crate) fn set_defaults<I, S>(&mut self, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_fields = fields.into_iter().map(Into::into).collect();
    }

    pub(crate) fn push_row<I, V>(&mut self, row: I)
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    /// Append a row given as `(field, value)` pairs.
    ///
    /// The first named row declares the fields when none are declared yet;
    /// later rows are reordered to the declared order and must name every
    /// field exactly once.
    pub(crate) fn push_named_row<I, K, V>(&mut self, row: I) -> BatchResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let pairs: Vec<(String, Value)> = row
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();

        if self.fields.is_empty() {
            let (fields, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
            check_unique(&fields)?;
            self.fields = fields;
            self.rows.push(values);
            return Ok(());
        }

        if pairs.len() != self.fields.len() {
            return Err(BatchError::validation(format!(
                "Row has {} named values but {} fields are declared",
                pairs.len(),
                self.fields.len()
            )));
        }
        let mut slots: Vec<Option<Value>> = vec![None; self.fields.len()];
        for (name, value) in pairs {
            let Some(idx) = self.fields.iter().position(|f| *f == name) else {
                return Err(BatchError::validation(format!(
                    "Row names undeclared field '{name}'"
                )));
            };
            if slots[idx].replace(value).is_some() {
                return Err(BatchError::validation(format!(
                    "Row names field '{name}' twice"
                )));
            }
        }
        // Lengths match and no slot was filled twice, so every slot is set.
        self.rows.push(slots.into_iter().flatten().collect());
        Ok(())
    }

    /// Check the declared shape and every pending row.
    pub(crate) fn validate(&self, what: &str) -> BatchResult<()> {
        if self.table.is_empty() {
            return Err(BatchError::validation(format!("{what} requires a table")));
        }
        for field in self.default_fields.iter().chain(&self.fields) {
            check_field_name(field)?;
        }
        check_unique(&self.fields)?;
        check_unique(&self.default_fields)?;
        if let Some(overlap) = self
            .default_fields
            .iter()
            .find(|d| self.fields.contains(d))
        {
            return Err(BatchError::validation(format!(
                "Field '{overlap}' is declared both as a default and as a value"
            )));
        }
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() != self.fields.len() {
                return Err(BatchError::validation(format!(
                    "Row {i} has {} values but {} fields are declared",
                    row.len(),
                    self.fields.len()
                )));
            }
        }
        Ok(())
    }

    /// Escaped table name and rendered comment prefix for `client`.
    pub(crate) fn head<C: GenericClient>(&self, client: &C) -> (String, String) {
        (
            client.escape_table(&self.table),
            client.make_comment(&self.comments),
        )
    }
}

fn check_unique(fields: &[String]) -> BatchResult<()> {
    let mut seen = HashSet::with_capacity(fields.len());
    for field in fields {
        if !seen.insert(field.as_str()) {
            return Err(BatchError::validation(format!(
                "Field '{field}' is declared twice"
            )));
        }
    }
    Ok(())
}
