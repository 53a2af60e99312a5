//! Synchronous client for the **Census Bureau American Community Survey API**.
//!
//! One [`Client::call`] turns a flat list of variables and a geography into one
//! request per table, runs those requests one after another, and outer-joins the
//! results on their geographic identifier columns.
//!
//! ### Notes
//! - Variables are namespaced by table: `DP03_0001E` belongs to `DP03`. Listing a
//!   bare table name (`DP03`) fetches every column of that table.
//! - The API serves at most 8 explicit variables per request and table.
//! - Each URL is tried up to 3 times without backoff. A failed table aborts the
//!   whole call; results already merged for earlier tables are dropped.
//! - Every URL is kept in [`Client::calls`], including the ones that failed.
//!
//! Typical usage:
//! ```no_run
//! # use acs_rs::{AcsQuery, Client, GeographyLevel};
//! let mut client = Client::default();
//! let table = client.call(
//!     &AcsQuery::new(["DP03_0001E", "B03002_001E"])
//!         .geography(GeographyLevel::County)
//!         .state("53"),
//! )?;
//! # Ok::<(), acs_rs::AcsError>(())
//! ```
use crate::call_log::{CallLog, redact_key};
use crate::config::{ClientConfig, api_key_from_env};
use crate::error::AcsError;
use crate::geography::{Geography, GeographyLevel, IntoCodes};
use crate::models::{Selection, Survey, TableRequest};
use crate::table::{GEO_COLUMNS, ResultTable};
use crate::transport::{HttpTransport, Transport};
use crate::variables::group_variables;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};
use std::fmt;

/// Upper bound on explicit variables in one request.
pub const MAX_VARIABLES_PER_CALL: usize = 8;

// Allow -, _, . unescaped in keys
const SAFE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Parameters of one [`Client::call`].
///
/// Defaults: county level, year 2020, 5-year estimates, every code a wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcsQuery {
    pub geography: Geography,
    pub year: u16,
    pub survey: Survey,
    pub variables: Vec<String>,
}

impl Default for AcsQuery {
    fn default() -> Self {
        Self {
            geography: Geography::default(),
            year: 2020,
            survey: Survey::default(),
            variables: Vec::new(),
        }
    }
}

impl AcsQuery {
    pub fn new<I, S>(variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variables: variables.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn variable(mut self, variable: impl Into<String>) -> Self {
        self.variables.push(variable.into());
        self
    }

    pub fn geography(mut self, level: GeographyLevel) -> Self {
        self.geography.level = level;
        self
    }

    pub fn year(mut self, year: u16) -> Self {
        self.year = year;
        self
    }

    pub fn survey(mut self, survey: Survey) -> Self {
        self.survey = survey;
        self
    }

    pub fn state(mut self, codes: impl IntoCodes) -> Self {
        self.geography.state = codes.into_codes();
        self
    }

    pub fn county(mut self, codes: impl IntoCodes) -> Self {
        self.geography.county = codes.into_codes();
        self
    }

    pub fn place(mut self, codes: impl IntoCodes) -> Self {
        self.geography.place = codes.into_codes();
        self
    }

    pub fn tract(mut self, codes: impl IntoCodes) -> Self {
        self.geography.tract = codes.into_codes();
        self
    }

    /// Accepted for completeness; block groups are always requested as `*`.
    pub fn blockgroup(mut self, codes: impl IntoCodes) -> Self {
        self.geography.blockgroup = codes.into_codes();
        self
    }
}

pub struct Client {
    /// Census API key. Empty means requests are sent without `key=`.
    pub api_key: String,
    config: ClientConfig,
    transport: Box<dyn Transport>,
    log: CallLog,
}

impl Default for Client {
    fn default() -> Self {
        Self::with_config(ClientConfig::default()).expect("reqwest client build")
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("config", &self.config)
            .field("calls", &self.log.len())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Client with the default configuration and the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Client keyed from the `CENSUS_API_KEY` environment variable, if set.
    pub fn from_env() -> Self {
        Self::new(api_key_from_env().unwrap_or_default())
    }

    /// ### Errors
    /// [`AcsError::Http`] if the HTTP client cannot be built.
    pub fn with_config(config: ClientConfig) -> Result<Self, AcsError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Client that sends every request through `transport`.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            api_key: String::new(),
            config,
            transport: Box::new(transport),
            log: CallLog::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Every URL built so far, oldest first.
    pub fn calls(&self) -> &[String] {
        self.log.as_slice()
    }

    pub fn call_log(&self) -> &CallLog {
        &self.log
    }

    /// Build the request URLs for `query`, one per table, without sending them.
    ///
    /// ### Errors
    /// - [`AcsError::InvalidVariable`] / [`AcsError::UnrecognizedTableFamily`]
    ///   from grouping the variables
    /// - [`AcsError::TooManyVariables`] when a table lists more than
    ///   [`MAX_VARIABLES_PER_CALL`] distinct variables
    pub fn plan(&self, query: &AcsQuery) -> Result<Vec<String>, AcsError> {
        let requests = group_variables(query.variables.as_slice())?;
        let geo = query.geography.to_query();
        let base = format!(
            "{}/{}/acs/acs{}",
            self.config.base_url.trim_end_matches('/'),
            query.year,
            query.survey.to_path_param()
        );
        requests
            .iter()
            .map(|r| self.request_url(&base, r, &geo))
            .collect()
    }

    fn request_url(
        &self,
        base: &str,
        req: &TableRequest,
        geo: &str,
    ) -> Result<String, AcsError> {
        let product = req.table.family().product_path();
        let mut url = match &req.selection {
            Selection::WholeTable => format!("{base}{product}?get=group({})&{geo}", req.table),
            Selection::Variables(vars) => {
                if vars.len() > MAX_VARIABLES_PER_CALL {
                    return Err(AcsError::TooManyVariables {
                        table: req.table.name().to_string(),
                        count: vars.len(),
                        max: MAX_VARIABLES_PER_CALL,
                    });
                }
                format!("{base}{product}?get=NAME,{}&{geo}", vars.join(","))
            }
        };
        let key = self.api_key.trim();
        if !key.is_empty() {
            url.push_str("&key=");
            url.extend(percent_encoding::utf8_percent_encode(key, SAFE));
        }
        Ok(url)
    }

    /// Fetch every table in `query` and merge them into one table.
    ///
    /// The result starts from the geographic identifier columns (`NAME`, `state`,
    /// `county`, `tract`, `block group`, `zip code tabulation area`); each table is
    /// outer-joined on the identifier columns both sides carry. Identifier columns
    /// the geography does not use stay empty.
    ///
    /// All URLs are built before the first request, so invalid input fails without
    /// any network traffic.
    ///
    /// ### Errors
    /// - Anything [`Client::plan`] returns
    /// - [`AcsError::RequestExhausted`] when one URL fails on every attempt; a
    ///   body without any identifier column counts as a failed attempt
    /// - [`AcsError::Merge`] when a table cannot be joined onto the result
    pub fn call(&mut self, query: &AcsQuery) -> Result<ResultTable, AcsError> {
        let urls = self.plan(query)?;
        tracing::debug!(tables = urls.len(), geography = %query.geography.level, "ACS call");

        let mut out = ResultTable::with_geo_columns();
        for url in &urls {
            let table = self.execute(url)?;
            out = out.merge_geo(&table).map_err(|source| AcsError::Merge {
                url: redact_key(url),
                source,
            })?;
        }
        Ok(out)
    }

    fn execute(&mut self, url: &str) -> Result<ResultTable, AcsError> {
        self.log.record(url);
        let shown = redact_key(url);
        let policy = self.config.retry;
        let transport = &self.transport;

        policy
            .run(|attempt| {
                tracing::debug!(url = %shown, attempt, "GET");
                let res = transport
                    .get(url)
                    .and_then(|body| ResultTable::from_json_rows(&body))
                    .and_then(require_geo_columns);
                if res.is_err() {
                    tracing::warn!(
                        url = %shown,
                        attempt,
                        max_attempts = policy.attempts(),
                        "request attempt failed"
                    );
                }
                res
            })
            .map_err(|source| AcsError::RequestExhausted {
                url: shown,
                attempts: policy.attempts(),
                source,
            })
    }
}

fn require_geo_columns(table: ResultTable) -> anyhow::Result<ResultTable> {
    if !GEO_COLUMNS.iter().any(|c| table.has_column(c)) {
        anyhow::bail!(
            "response has no identifier column; got {}",
            table.columns().join(",")
        );
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    fn offline() -> Client {
        Client::with_transport(ClientConfig::default(), |_: &str| -> anyhow::Result<String> {
            bail!("offline")
        })
    }

    #[test]
    fn plans_one_url_per_table() {
        let client = offline();
        let urls = client
            .plan(&AcsQuery::new(["DP02_0001E", "B03002_004E", "S0101_C01_001E"]).state("53"))
            .unwrap();
        assert_eq!(
            urls,
            [
                "https://api.census.gov/data/2020/acs/acs5/profile?get=NAME,DP02_0001E&for=county:*&in=state:53",
                "https://api.census.gov/data/2020/acs/acs5?get=NAME,B03002_004E&for=county:*&in=state:53",
                "https://api.census.gov/data/2020/acs/acs5/subject?get=NAME,S0101_C01_001E&for=county:*&in=state:53",
            ]
        );
    }

    #[test]
    fn whole_table_uses_group() {
        let client = offline();
        let urls = client
            .plan(
                &AcsQuery::new(["S0101"])
                    .geography(GeographyLevel::State)
                    .year(2019)
                    .survey(Survey::OneYear),
            )
            .unwrap();
        assert_eq!(
            urls,
            ["https://api.census.gov/data/2019/acs/acs1/subject?get=group(S0101)&for=state:*"]
        );
    }

    #[test]
    fn appends_key_when_set() {
        let mut client = offline();
        client.api_key = "abc123".into();
        let urls = client.plan(&AcsQuery::new(["DP03_0001E"])).unwrap();
        assert!(urls[0].ends_with("&for=county:*&in=state:*&key=abc123"));

        client.api_key = "  ".into();
        let urls = client.plan(&AcsQuery::new(["DP03_0001E"])).unwrap();
        assert!(!urls[0].contains("key="));
    }

    #[test]
    fn variables_are_uppercased_in_order() {
        let client = offline();
        let urls = client
            .plan(&AcsQuery::new(["dp04_0005e", "DP04_0001E"]))
            .unwrap();
        assert!(urls[0].contains("get=NAME,DP04_0005E,DP04_0001E&"));
    }

    #[test]
    fn eight_variables_allowed_nine_rejected() {
        let client = offline();
        let eight: Vec<String> = (1..=8).map(|i| format!("B01001_{i:03}E")).collect();
        assert!(client.plan(&AcsQuery::new(eight.clone())).is_ok());

        let nine = AcsQuery::new(eight).variable("B01001_009E");
        assert!(matches!(
            client.plan(&nine),
            Err(AcsError::TooManyVariables { count: 9, max: 8, .. })
        ));
    }

    #[test]
    fn duplicates_do_not_count_toward_the_limit() {
        let client = offline();
        let mut vars: Vec<String> = (1..=8).map(|i| format!("B01001_{i:03}E")).collect();
        vars.push("b01001_001e".into());
        let urls = client.plan(&AcsQuery::new(vars)).unwrap();
        assert_eq!(urls[0].matches("B01001_001E").count(), 1);
    }

    #[test]
    fn debug_hides_key() {
        let mut client = Client::with_transport(ClientConfig::default(), |_: &str| {
            Ok::<_, anyhow::Error>(String::new())
        });
        client.api_key = "secret".into();
        assert!(!format!("{client:?}").contains("secret"));
    }
}
