use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A query type for paging through records ordered by time
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct DateTimeRangeQuery {
    /// Only return records strictly before this time
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "optional_time_schema"))]
    pub before: Option<OffsetDateTime>,
    /// Only return records at or after this time
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    #[cfg_attr(feature = "schemars", schemars(schema_with = "optional_time_schema"))]
    pub after: Option<OffsetDateTime>,
}

/// The paginated response to a datetime query
#[derive(Serialize, Deserialize, Debug)]
#[cfg_attr(feature = "schemars", derive(schemars::JsonSchema))]
pub struct DateTimeRangeResponse<T> {
    /// The page of results, newest first
    pub results: Vec<T>,
    /// If present, the query that fetches the next page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub more: Option<DateTimeRangeQuery>,
}

/// JSON schema for time::OffsetDateTime.
///
/// The schemars crate doesn't have built-in support for the time crate's
/// OffsetDateTime type, so we describe the RFC3339 string form directly.
#[cfg(feature = "schemars")]
pub fn time_schema(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
    schemars::json_schema!({
        "type": "string",
        "format": "date-time",
    })
}

/// JSON schema for an optional time::OffsetDateTime
#[cfg(feature = "schemars")]
pub fn optional_time_schema(_: &mut schemars::SchemaGenerator) -> schemars::Schema {
    schemars::json_schema!({
        "type": ["string", "null"],
        "format": "date-time",
    })
}
