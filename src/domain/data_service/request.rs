//! Request descriptions for the remote data service

use serde::Serialize;
use serde_json::{Map, Value};

/// A named remote procedure call with its argument mapping
///
/// Argument names are passed through verbatim and must match the names the
/// remote function declares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcedureCall {
    name: String,
    args: Map<String, Value>,
}

impl ProcedureCall {
    /// Create a call with no arguments
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Map::new(),
        }
    }

    /// Add an argument
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &Map<String, Value> {
        &self.args
    }

    /// Get a single argument by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }
}

/// Comparison operator for a column filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gte,
    Lte,
    /// Case-insensitive pattern match, `*` is the wildcard
    ILike,
}

impl FilterOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::ILike => "ilike",
        }
    }
}

/// Filter on a single column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

impl ColumnFilter {
    pub fn new(column: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(column, FilterOp::Eq, value)
    }

    /// Substring match on a text column
    pub fn contains(column: impl Into<String>, needle: &str) -> Self {
        Self::new(column, FilterOp::ILike, format!("*{}*", needle))
    }

    /// Encoded filter value, e.g. `eq.draft`
    pub fn encoded_value(&self) -> String {
        format!("{}.{}", self.op.as_str(), self.value)
    }
}

/// Sort order for a table read
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }

    pub fn encoded(&self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        format!("{}.{}", self.column, direction)
    }
}

/// Read of rows from a single table
#[derive(Debug, Clone, PartialEq)]
pub struct TableSelect {
    pub table: String,
    pub columns: String,
    pub filters: Vec<ColumnFilter>,
    pub order: Option<Order>,
    pub limit: Option<u32>,
}

impl TableSelect {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn filter(mut self, filter: ColumnFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Everything the data service can be asked to read
#[derive(Debug, Clone, PartialEq)]
pub enum DataRequest {
    Procedure(ProcedureCall),
    Select(TableSelect),
}

impl DataRequest {
    /// Procedure or table name, used in logs and error messages
    pub fn target(&self) -> &str {
        match self {
            Self::Procedure(call) => call.name(),
            Self::Select(select) => &select.table,
        }
    }
}

impl From<ProcedureCall> for DataRequest {
    fn from(call: ProcedureCall) -> Self {
        Self::Procedure(call)
    }
}

impl From<TableSelect> for DataRequest {
    fn from(select: TableSelect) -> Self {
        Self::Select(select)
    }
}
