//! Geography selection and its `for=`/`in=` query fragment.
//!
//! ### Notes
//! - Block group codes are accepted but not sent: block groups are always
//!   requested as `*` within the selected states and counties.
//! - ZIP code tabulation areas cannot be nested in a state or county by the API,
//!   so state/county codes are ignored for [`GeographyLevel::Zip`].

use crate::error::AcsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wildcard matching every code at a level.
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GeographyLevel {
    State,
    #[default]
    County,
    Place,
    Tract,
    BlockGroup,
    Zip,
}

impl FromStr for GeographyLevel {
    type Err = AcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "state" => Ok(GeographyLevel::State),
            "county" => Ok(GeographyLevel::County),
            "place" => Ok(GeographyLevel::Place),
            "tract" => Ok(GeographyLevel::Tract),
            "blockgroup" | "block group" | "block_group" => Ok(GeographyLevel::BlockGroup),
            "zip" => Ok(GeographyLevel::Zip),
            _ => Err(AcsError::InvalidGeography(s.to_string())),
        }
    }
}

impl fmt::Display for GeographyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GeographyLevel::State => "state",
            GeographyLevel::County => "county",
            GeographyLevel::Place => "place",
            GeographyLevel::Tract => "tract",
            GeographyLevel::BlockGroup => "blockgroup",
            GeographyLevel::Zip => "zip",
        };
        f.write_str(s)
    }
}

/// Ordered FIPS codes for one level. Order and duplicates are kept as given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Codes(Vec<String>);

impl Codes {
    pub fn wildcard() -> Self {
        Codes(vec![WILDCARD.to_string()])
    }

    pub fn is_wildcard(&self) -> bool {
        self.0.iter().all(|c| c == WILDCARD)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Comma-joined form used in the query string. An empty list selects
    /// everything, like the wildcard.
    pub fn to_csv(&self) -> String {
        if self.0.is_empty() {
            return WILDCARD.to_string();
        }
        self.0.join(",")
    }
}

impl Default for Codes {
    fn default() -> Self {
        Codes::wildcard()
    }
}

/// Anything usable as a code list: a single code or a sequence of codes.
pub trait IntoCodes {
    fn into_codes(self) -> Codes;
}

impl IntoCodes for Codes {
    fn into_codes(self) -> Codes {
        self
    }
}

impl IntoCodes for &str {
    fn into_codes(self) -> Codes {
        Codes(vec![self.to_string()])
    }
}

impl IntoCodes for String {
    fn into_codes(self) -> Codes {
        Codes(vec![self])
    }
}

impl IntoCodes for Vec<String> {
    fn into_codes(self) -> Codes {
        Codes(self)
    }
}

impl IntoCodes for &[&str] {
    fn into_codes(self) -> Codes {
        Codes(self.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> IntoCodes for [&str; N] {
    fn into_codes(self) -> Codes {
        Codes(self.iter().map(|s| s.to_string()).collect())
    }
}

/// A geography level plus the codes that select units at and above it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geography {
    pub level: GeographyLevel,
    pub state: Codes,
    pub county: Codes,
    pub place: Codes,
    pub tract: Codes,
    pub blockgroup: Codes,
}

impl Geography {
    pub fn new(level: GeographyLevel) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Build the `for=...&in=...` fragment understood by the Census API.
    pub fn to_query(&self) -> String {
        let state = self.state.to_csv();
        let county = self.county.to_csv();
        match self.level {
            GeographyLevel::State => format!("for=state:{state}"),
            GeographyLevel::County => format!("for=county:{county}&in=state:{state}"),
            GeographyLevel::Place => {
                format!("for=place:{}&in=state:{state}", self.place.to_csv())
            }
            GeographyLevel::Tract => format!(
                "for=tract:{}&in=state:{state}&in=county:{county}",
                self.tract.to_csv()
            ),
            GeographyLevel::BlockGroup => {
                if !self.blockgroup.is_wildcard() {
                    tracing::warn!(
                        codes = %self.blockgroup.to_csv(),
                        "block group codes are not supported; requesting all block groups"
                    );
                }
                format!("for=block%20group:*&in=state:{state}&in=county:{county}")
            }
            GeographyLevel::Zip => "for=zip%20code%20tabulation%20area:*".to_string(),
        }
    }
}
