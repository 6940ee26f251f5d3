//! Report request types (nouns)
//!
//! Plain data handed to the compiler by the dashboard on every edit.

mod config;
mod filter;
mod metric;
mod parameter;

pub use config::{DateFormat, OrderBy, QueryConfig, SortDirection, Website};
pub use filter::{Filter, FilterOperator};
pub use metric::{Metric, MetricFunction};
pub use parameter::{is_parameter_column, sanitize_key, Parameter, ParameterType, PARAM_PREFIX};
