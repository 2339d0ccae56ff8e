use crate::error::ClientError;
use crate::filter::{Operand, Operator, Predicate};
use crate::session::Session;
use core_types::{FieldDef, Record, RowSchema};
use std::collections::HashSet;
use std::marker::PhantomData;
use std::time::Duration;

/// A fluent read query against the table behind `T`.
///
/// Created with [`Session::from`]. Every step takes and returns the builder by
/// value; [`QueryBuilder::execute`] consumes it. Field names refer to record
/// fields and are checked against `T::schema()` before anything is sent.
#[must_use = "a query does nothing until it is executed"]
pub struct QueryBuilder<'s, T: Record> {
    session: &'s Session,
    select: Option<Vec<String>>,
    predicates: Vec<Predicate>,
    order: Vec<(String, bool)>,
    limit: Option<usize>,
    timeout: Option<Duration>,
    _record: PhantomData<fn() -> T>,
}

impl<'s, T: Record> QueryBuilder<'s, T> {
    pub(crate) fn new(session: &'s Session) -> Self {
        Self {
            session,
            select: None,
            predicates: Vec::new(),
            order: Vec::new(),
            limit: None,
            timeout: None,
            _record: PhantomData,
        }
    }

    /// Restricts the columns the server returns. Without it, every declared
    /// field is selected. A second call replaces the first.
    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Appends `field operator value`. Successive filters are ANDed.
    pub fn filter(self, field: impl Into<String>, operator: Operator, value: impl Into<Operand>) -> Self {
        self.filter_where(Predicate::condition(field, operator, value))
    }

    /// Appends a composite predicate.
    ///
    /// A top-level [`Predicate::And`] produces exactly the request that the
    /// equivalent chain of [`QueryBuilder::filter`] calls would.
    pub fn filter_where(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn eq(self, field: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.filter(field, Operator::Eq, value)
    }

    pub fn neq(self, field: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.filter(field, Operator::Neq, value)
    }

    pub fn gt(self, field: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.filter(field, Operator::Gt, value)
    }

    pub fn gte(self, field: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.filter(field, Operator::Gte, value)
    }

    pub fn lt(self, field: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.filter(field, Operator::Lt, value)
    }

    pub fn lte(self, field: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.filter(field, Operator::Lte, value)
    }

    pub fn like(self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.filter(field, Operator::Like, pattern.into())
    }

    pub fn ilike(self, field: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.filter(field, Operator::ILike, pattern.into())
    }

    pub fn is_null(self, field: impl Into<String>) -> Self {
        self.filter_where(Predicate::is_null(field))
    }

    pub fn in_list<V: Into<Operand>>(self, field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        self.filter_where(Predicate::in_list(field, values))
    }

    /// Sorts by `field`. Later calls break ties of earlier ones.
    pub fn order(mut self, field: impl Into<String>, ascending: bool) -> Self {
        self.order.push((field.into(), ascending));
        self
    }

    /// Caps the number of returned rows. Without it the server default applies.
    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Bounds how long `execute` waits for the response, overriding the
    /// session default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Validates the query against the record's schema without sending it.
    pub fn build(&self) -> Result<QueryRequest, ClientError> {
        let schema = T::schema();
        if schema.schema != self.session.schema() {
            return Err(ClientError::Validation(format!(
                "{} belongs to schema '{}' but the session is bound to '{}'",
                schema.qualified_name(),
                schema.schema,
                self.session.schema()
            )));
        }

        let projection = match &self.select {
            None => schema.fields.iter().collect(),
            Some(fields) => resolve_projection(schema, fields)?,
        };

        let mut filters = Vec::new();
        for predicate in &self.predicates {
            predicate.write_params(schema, &mut filters)?;
        }

        let order = self
            .order
            .iter()
            .map(|(field, ascending)| {
                let column = schema.column_for(field)?;
                Ok(format!("{}.{}", column, if *ascending { "asc" } else { "desc" }))
            })
            .collect::<Result<Vec<_>, ClientError>>()?;

        Ok(QueryRequest {
            schema,
            projection,
            filters,
            order,
            limit: self.limit,
        })
    }

    /// Sends the query and maps the response into typed records.
    ///
    /// No matching rows is an empty result set, not an error.
    pub async fn execute(self) -> Result<ResultSet<T>, ClientError> {
        let request = self.build()?;
        let mut rows = self.session.fetch::<T>(&request, self.timeout).await?;
        if let Some(limit) = request.limit {
            rows.truncate(limit);
        }
        Ok(ResultSet::new(rows))
    }
}

fn resolve_projection(schema: &'static RowSchema, fields: &[String]) -> Result<Vec<&'static FieldDef>, ClientError> {
    if fields.is_empty() {
        return Err(ClientError::Validation("select needs at least one field".to_string()));
    }

    let mut seen = HashSet::new();
    let mut projection = Vec::with_capacity(fields.len());
    for name in fields {
        let def = schema.field(name).ok_or_else(|| {
            ClientError::Validation(format!("{} has no field named '{}'", schema.qualified_name(), name))
        })?;
        if seen.insert(def.field) {
            projection.push(def);
        }
    }
    Ok(projection)
}

/// A validated read request.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    schema: &'static RowSchema,
    projection: Vec<&'static FieldDef>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<usize>,
}

impl QueryRequest {
    pub fn schema(&self) -> &'static RowSchema {
        self.schema
    }

    pub fn projection(&self) -> &[&'static FieldDef] {
        &self.projection
    }

    /// Rendered filter parameters in the order they were added.
    pub fn filters(&self) -> &[(String, String)] {
        &self.filters
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// The full query string: `select`, filters, `order`, `limit`.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let columns = self.projection.iter().map(|f| f.column).collect::<Vec<_>>();
        let mut pairs = Vec::with_capacity(self.filters.len() + 3);
        pairs.push(("select".to_string(), columns.join(",")));
        pairs.extend(self.filters.iter().cloned());
        if !self.order.is_empty() {
            pairs.push(("order".to_string(), self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        pairs
    }
}

/// The typed rows returned by a query, in server order.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet<T> {
    rows: Vec<T>,
}

impl<T> ResultSet<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self { rows }
    }

    pub fn models(&self) -> &[T] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first(&self) -> Option<&T> {
        self.rows.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.rows.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.rows
    }
}

impl<T> IntoIterator for ResultSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a ResultSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
