use crate::domain::AnalyticsRecord;
use chrono::SecondsFormat;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown analytics field: {0}")]
pub struct UnknownField(pub String);

/// Every analytics field that can be emitted in an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Method,
    Path,
    ResponseCode,
    ApiKey,
    TimeStamp,
    ApiVersion,
    ApiName,
    ApiId,
    OrgId,
    OauthId,
    RawRequest,
    RequestTime,
    RawResponse,
    IpAddress,
}

impl Field {
    /// Fields emitted when no explicit projection is configured.
    pub const DEFAULT_SET: [Field; 14] = [
        Field::Method,
        Field::Path,
        Field::ResponseCode,
        Field::ApiKey,
        Field::TimeStamp,
        Field::ApiVersion,
        Field::ApiName,
        Field::ApiId,
        Field::OrgId,
        Field::OauthId,
        Field::RawRequest,
        Field::RequestTime,
        Field::RawResponse,
        Field::IpAddress,
    ];

    /// Key used for this field in the event payload and in `fields` config.
    pub const fn name(self) -> &'static str {
        match self {
            Field::Method => "method",
            Field::Path => "path",
            Field::ResponseCode => "response_code",
            Field::ApiKey => "api_key",
            Field::TimeStamp => "time_stamp",
            Field::ApiVersion => "api_version",
            Field::ApiName => "api_name",
            Field::ApiId => "api_id",
            Field::OrgId => "org_id",
            Field::OauthId => "oauth_id",
            Field::RawRequest => "raw_request",
            Field::RequestTime => "request_time",
            Field::RawResponse => "raw_response",
            Field::IpAddress => "ip_address",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::DEFAULT_SET.into_iter().find(|field| field.name() == name)
    }

    /// Reads this field's value out of a record, verbatim.
    pub fn extract(self, record: &AnalyticsRecord) -> Value {
        match self {
            Field::Method => Value::from(record.method.as_str()),
            Field::Path => Value::from(record.path.as_str()),
            Field::ResponseCode => Value::from(record.response_code),
            Field::ApiKey => Value::from(record.api_key.as_str()),
            Field::TimeStamp => {
                Value::from(record.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Field::ApiVersion => Value::from(record.api_version.as_str()),
            Field::ApiName => Value::from(record.api_name.as_str()),
            Field::ApiId => Value::from(record.api_id.as_str()),
            Field::OrgId => Value::from(record.org_id.as_str()),
            Field::OauthId => Value::from(record.oauth_id.as_str()),
            Field::RawRequest => Value::from(record.raw_request.as_str()),
            Field::RequestTime => Value::from(record.request_time),
            Field::RawResponse => Value::from(record.raw_response.as_str()),
            Field::IpAddress => Value::from(record.ip_address.as_str()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownField(s.to_string()))
    }
}
