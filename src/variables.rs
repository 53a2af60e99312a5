//! Grouping of flat variable identifiers into one request per table.
//!
//! A variable is namespaced as `<TABLE>_<SUFFIX>` (e.g. `DP03_0001E`). A bare
//! table name (e.g. `DP02`) asks for the whole table.

use crate::error::AcsError;
use crate::models::{Selection, TableId, TableRequest};

/// Table identifier of a variable: everything before the first `_`.
pub fn table_of(variable: &str) -> &str {
    variable.split('_').next().unwrap_or(variable)
}

/// Group variables by table, in order of first appearance.
///
/// Identifiers are trimmed and upper-cased. A table is fetched whole
/// ([`Selection::WholeTable`]) only when its bare name is the sole way it was
/// requested; explicit variables of the same table take precedence. Duplicate
/// variables are requested once.
///
/// ### Errors
/// - [`AcsError::InvalidVariable`] for an empty identifier or one starting with `_`
/// - [`AcsError::UnrecognizedTableFamily`] when a table is not D, B or S
pub fn group_variables<S: AsRef<str>>(variables: &[S]) -> Result<Vec<TableRequest>, AcsError> {
    let mut out: Vec<TableRequest> = Vec::new();
    for raw in variables {
        let var = raw.as_ref().trim().to_ascii_uppercase();
        let table = table_of(&var);
        if table.is_empty() {
            return Err(AcsError::InvalidVariable(raw.as_ref().to_string()));
        }

        let idx = match out.iter().position(|r| r.table.name() == table) {
            Some(i) => i,
            None => {
                out.push(TableRequest {
                    table: TableId::parse(table)?,
                    selection: Selection::Variables(Vec::new()),
                });
                out.len() - 1
            }
        };

        if var != table {
            if let Selection::Variables(vars) = &mut out[idx].selection {
                if !vars.contains(&var) {
                    vars.push(var);
                }
            }
        }
    }

    // an entry left without variables was only ever named bare
    for req in &mut out {
        if matches!(&req.selection, Selection::Variables(v) if v.is_empty()) {
            req.selection = Selection::WholeTable;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(reqs: &[TableRequest]) -> Vec<&str> {
        reqs.iter().map(|r| r.table.name()).collect()
    }

    #[test]
    fn groups_across_tables() {
        let reqs = group_variables(&["DP03_0001E", "B03002_001E"]).unwrap();
        assert_eq!(names(&reqs), ["DP03", "B03002"]);
        assert_eq!(
            reqs[0].selection,
            Selection::Variables(vec!["DP03_0001E".into()])
        );
        assert_eq!(
            reqs[1].selection,
            Selection::Variables(vec!["B03002_001E".into()])
        );
    }

    #[test]
    fn bare_table_is_whole_table() {
        let reqs = group_variables(&["DP02"]).unwrap();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].selection, Selection::WholeTable);
    }

    #[test]
    fn explicit_variables_win_over_bare_table() {
        let reqs = group_variables(&["DP02", "DP02_0001E"]).unwrap();
        assert_eq!(reqs.len(), 1);
        assert_eq!(
            reqs[0].selection,
            Selection::Variables(vec!["DP02_0001E".into()])
        );

        let reqs = group_variables(&["DP02_0001E", "DP02", "B03002"]).unwrap();
        assert_eq!(
            reqs[0].selection,
            Selection::Variables(vec!["DP02_0001E".into()])
        );
        assert_eq!(reqs[1].selection, Selection::WholeTable);
    }

    #[test]
    fn repeated_bare_table_stays_whole() {
        let reqs = group_variables(&["S0101", "s0101"]).unwrap();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].selection, Selection::WholeTable);
    }

    #[test]
    fn similar_table_prefixes_stay_apart() {
        let reqs = group_variables(&["DP02_0001E", "DP02PR_0001E"]).unwrap();
        assert_eq!(names(&reqs), ["DP02", "DP02PR"]);
    }

    #[test]
    fn normalizes_case_and_duplicates() {
        let reqs = group_variables(&[" dp03_0001e", "DP03_0001E", "DP03_0002E"]).unwrap();
        assert_eq!(
            reqs[0].selection,
            Selection::Variables(vec!["DP03_0001E".into(), "DP03_0002E".into()])
        );
    }

    #[test]
    fn rejects_empty_and_unknown() {
        assert!(matches!(
            group_variables(&[""]),
            Err(AcsError::InvalidVariable(_))
        ));
        assert!(matches!(
            group_variables(&["_001E"]),
            Err(AcsError::InvalidVariable(_))
        ));
        assert!(matches!(
            group_variables(&["X01_001E"]),
            Err(AcsError::UnrecognizedTableFamily { .. })
        ));
    }
}
