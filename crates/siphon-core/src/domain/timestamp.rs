use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use crate::error::ValidationError;

/// RFC3339 timestamp pinned to UTC.
///
/// Report artifacts serialize this as a `Z`-suffixed string; anything with a
/// non-zero offset is rejected on the way in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let not_utc = || ValidationError::TimestampNotUtc {
            value: input.to_owned(),
        };

        let parsed = OffsetDateTime::parse(input, &Rfc3339).map_err(|_| not_utc())?;
        if parsed.offset() != UtcOffset::UTC {
            return Err(not_utc());
        }

        Ok(Self(parsed))
    }

    pub fn as_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .expect("UTC timestamp must be RFC3339 formattable")
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.as_rfc3339())
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
