use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Geographic identifier columns the API may return, used as join keys.
pub const GEO_COLUMNS: [&str; 6] = [
    "NAME",
    "state",
    "county",
    "tract",
    "block group",
    "zip code tabulation area",
];

/// A rectangular, header-labeled table of optional string cells.
///
/// The Census API returns every value as a string (or `null`), so cells are kept
/// as text and left to the caller to convert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

impl ResultTable {
    /// Build a table; every row must be as wide as the header.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Result<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.len() != columns.len())
        {
            bail!(
                "row {} has {} cells, expected {}",
                i,
                row.len(),
                columns.len()
            );
        }
        Ok(Self { columns, rows })
    }

    /// Empty table carrying only the geographic identifier columns.
    pub fn with_geo_columns() -> Self {
        Self {
            columns: GEO_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Parse an API body: a JSON array of arrays whose first row is the header.
    pub fn from_json_rows(body: &str) -> Result<Self> {
        let v: Value = serde_json::from_str(body).context("decode json")?;
        let arr = v
            .as_array()
            .ok_or_else(|| anyhow!("unexpected response shape: not a top-level array"))?;
        let (header, data) = arr
            .split_first()
            .ok_or_else(|| anyhow!("unexpected response: empty array"))?;

        let columns = header
            .as_array()
            .ok_or_else(|| anyhow!("unexpected response shape: header is not an array"))?
            .iter()
            .map(|h| {
                h.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| anyhow!("non-string column name: {}", h))
            })
            .collect::<Result<Vec<_>>>()?;

        let rows = data
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let cells = row
                    .as_array()
                    .ok_or_else(|| anyhow!("row {} is not an array", i + 1))?;
                Ok(cells.iter().map(cell_text).collect())
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// All cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = Option<&str>> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |r| r[idx].as_deref()))
    }

    pub fn get(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?[idx].as_deref()
    }

    /// Geographic identifier columns present in both tables, in canonical order.
    pub fn shared_geo_columns(&self, other: &ResultTable) -> Vec<&'static str> {
        GEO_COLUMNS
            .iter()
            .copied()
            .filter(|c| self.has_column(c) && other.has_column(c))
            .collect()
    }

    /// Full outer join on `keys`.
    ///
    /// Left rows keep their order, each followed by its matches from `other`;
    /// unmatched rows of `other` are appended in their original order. Missing
    /// key cells match each other. Non-key columns present on both sides get an
    /// `_x` (left) or `_y` (right) suffix.
    ///
    /// ### Errors
    /// A key column missing from either table.
    pub fn outer_join(self, other: &ResultTable, keys: &[&str]) -> Result<ResultTable> {
        let lkeys = key_indices(&self, keys).context("left side of join")?;
        let rkeys = key_indices(other, keys).context("right side of join")?;
        Ok(self.join_indexed(other, keys, &lkeys, &rkeys))
    }

    /// Outer join on the geographic identifier columns both tables carry.
    ///
    /// ### Errors
    /// The tables share no identifier column, so there is nothing to join on.
    pub fn merge_geo(self, other: &ResultTable) -> Result<ResultTable> {
        let keys = self.shared_geo_columns(other);
        if keys.is_empty() {
            bail!(
                "no shared identifier columns (one of {}) to join on",
                GEO_COLUMNS.join(", ")
            );
        }
        let idx = |t: &ResultTable| -> Vec<usize> {
            keys.iter().filter_map(|k| t.column_index(k)).collect()
        };
        let (lkeys, rkeys) = (idx(&self), idx(other));
        Ok(self.join_indexed(other, &keys, &lkeys, &rkeys))
    }

    fn join_indexed(
        self,
        other: &ResultTable,
        keys: &[&str],
        lkeys: &[usize],
        rkeys: &[usize],
    ) -> ResultTable {
        let lrest: Vec<usize> = (0..self.columns.len())
            .filter(|i| !lkeys.contains(i))
            .collect();
        let rrest: Vec<usize> = (0..other.columns.len())
            .filter(|i| !rkeys.contains(i))
            .collect();

        let clash = |name: &str, side: &ResultTable| {
            !keys.contains(&name) && side.has_column(name)
        };
        let mut columns: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        for &i in &lrest {
            let name = &self.columns[i];
            columns.push(if clash(name.as_str(), other) {
                format!("{name}_x")
            } else {
                name.clone()
            });
        }
        for &i in &rrest {
            let name = &other.columns[i];
            columns.push(if clash(name.as_str(), &self) {
                format!("{name}_y")
            } else {
                name.clone()
            });
        }

        let pick = |row: &[Option<String>], idx: &[usize]| -> Vec<Option<String>> {
            idx.iter().map(|&i| row[i].clone()).collect()
        };

        let rkeyed: Vec<Vec<Option<String>>> =
            other.rows.iter().map(|r| pick(r, rkeys)).collect();
        let mut by_key: HashMap<&[Option<String>], Vec<usize>> = HashMap::new();
        for (j, k) in rkeyed.iter().enumerate() {
            by_key.entry(k.as_slice()).or_default().push(j);
        }
        let mut matched = vec![false; other.rows.len()];
        let mut rows = Vec::with_capacity(self.rows.len().max(other.rows.len()));

        for lrow in &self.rows {
            let k = pick(lrow, lkeys);
            match by_key.get(k.as_slice()) {
                Some(hits) => {
                    for &j in hits {
                        matched[j] = true;
                        let mut row = k.clone();
                        row.extend(pick(lrow, &lrest));
                        row.extend(pick(&other.rows[j], &rrest));
                        rows.push(row);
                    }
                }
                None => {
                    let mut row = k;
                    row.extend(pick(lrow, &lrest));
                    row.extend(std::iter::repeat_n(None, rrest.len()));
                    rows.push(row);
                }
            }
        }
        for (j, rrow) in other.rows.iter().enumerate() {
            if !matched[j] {
                let mut row = rkeyed[j].clone();
                row.extend(std::iter::repeat_n(None, lrest.len()));
                row.extend(pick(rrow, &rrest));
                rows.push(row);
            }
        }

        ResultTable { columns, rows }
    }
}

fn key_indices(table: &ResultTable, keys: &[&str]) -> Result<Vec<usize>> {
    keys.iter()
        .map(|k| {
            table
                .column_index(k)
                .ok_or_else(|| anyhow!("join key `{}` missing", k))
        })
        .collect()
}

fn cell_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
