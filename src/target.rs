//! Target selection.
//!
//! [`TargetSet`] turns the `-t/--target` spec into a membership test over
//! item ids. The spec is either the sentinel `all`, or a comma-separated
//! mix of literal ids and inclusive integer ranges:
//!
//! ```
//! use vde::TargetSet;
//!
//! let targets = TargetSet::parse("3,7-9").unwrap();
//! assert!(targets.contains("3"));
//! assert!(targets.contains("8"));
//! assert!(!targets.contains("10"));
//!
//! assert!(TargetSet::parse("all").unwrap().contains("anything"));
//! ```

use std::collections::HashSet;

use crate::error::VdeError;

/// A parsed target spec: which item ids a run should touch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSet {
    /// The `all` sentinel: every id matches.
    All,
    /// A finite set of id strings.
    Ids(HashSet<String>),
}

impl TargetSet {
    /// Parse a target spec.
    ///
    /// `"all"` yields the sentinel. Otherwise the spec is split on `,`;
    /// each token is a literal id or a dash-range `s-e` that expands to
    /// the inclusive decimal sequence `s, s+1, ..., e`.
    ///
    /// # Errors
    ///
    /// Returns [`VdeError::MalformedTarget`] for empty tokens, ranges with
    /// non-integer bounds, or ranges where the end precedes the start.
    pub fn parse(spec: &str) -> Result<Self, VdeError> {
        let malformed = |reason: String| VdeError::MalformedTarget {
            spec: spec.to_string(),
            reason,
        };

        if spec == "all" {
            return Ok(TargetSet::All);
        }

        let mut ids = HashSet::new();
        for token in spec.split(',') {
            let token = token.trim();
            if token.is_empty() {
                return Err(malformed("empty token".to_string()));
            }

            match token.split_once('-') {
                Some((start, end)) => {
                    let start: u64 = start
                        .trim()
                        .parse()
                        .map_err(|_| malformed(format!("range start '{start}' is not an integer")))?;
                    let end: u64 = end
                        .trim()
                        .parse()
                        .map_err(|_| malformed(format!("range end '{end}' is not an integer")))?;
                    if end < start {
                        return Err(malformed(format!(
                            "range end {end} precedes range start {start}"
                        )));
                    }
                    ids.extend((start..=end).map(|id| id.to_string()));
                }
                None => {
                    ids.insert(token.to_string());
                }
            }
        }

        Ok(TargetSet::Ids(ids))
    }

    /// Whether the given item id is targeted by this set.
    pub fn contains(&self, id: &str) -> bool {
        match self {
            TargetSet::All => true,
            TargetSet::Ids(ids) => ids.contains(id),
        }
    }
}
