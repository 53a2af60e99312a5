use crate::error::AcsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ACS data product a table belongs to, derived from the table's leading letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableFamily {
    /// `DP..` tables, served under `/profile`.
    DataProfile,
    /// `B..` tables, served at the dataset root.
    Detailed,
    /// `S..` tables, served under `/subject`.
    Subject,
}

impl TableFamily {
    pub fn from_table(table: &str) -> Option<Self> {
        match table.chars().next()? {
            'D' => Some(TableFamily::DataProfile),
            'B' => Some(TableFamily::Detailed),
            'S' => Some(TableFamily::Subject),
            _ => None,
        }
    }

    /// Path segment appended to the dataset URL.
    pub fn product_path(&self) -> &'static str {
        match *self {
            TableFamily::DataProfile => "/profile",
            TableFamily::Detailed => "",
            TableFamily::Subject => "/subject",
        }
    }
}

/// A table identifier such as `DP03` or `B03002`, validated against [`TableFamily`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableId {
    name: String,
    family: TableFamily,
}

impl TableId {
    pub fn parse(name: &str) -> Result<Self, AcsError> {
        let family =
            TableFamily::from_table(name).ok_or_else(|| AcsError::UnrecognizedTableFamily {
                table: name.to_string(),
            })?;
        Ok(Self {
            name: name.to_string(),
            family,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn family(&self) -> TableFamily {
        self.family
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// What to fetch from one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// Every column of the table, via `get=group(TABLE)`.
    WholeTable,
    /// Explicit variables, in request order, without duplicates.
    Variables(Vec<String>),
}

/// One table and its selection; the unit of a single HTTP request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRequest {
    pub table: TableId,
    pub selection: Selection,
}

/// Which ACS release to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Survey {
    /// 1-year estimates (`acs1`)
    OneYear,
    /// 5-year estimates (`acs5`)
    #[default]
    FiveYear,
}

impl Survey {
    pub fn to_path_param(&self) -> &'static str {
        match *self {
            Survey::OneYear => "1",
            Survey::FiveYear => "5",
        }
    }
}

impl FromStr for Survey {
    type Err = AcsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1" | "acs1" => Ok(Survey::OneYear),
            "5" | "acs5" => Ok(Survey::FiveYear),
            other => Err(AcsError::InvalidSurvey(other.to_string())),
        }
    }
}
