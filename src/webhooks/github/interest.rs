use std::collections::{HashMap, HashSet};

use serde::Deserialize;

/// Which `(event kind, action)` pairs should be announced.
///
/// Matching is exact: there are no wildcards, and an event without an action never matches.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct InterestTable(HashMap<String, HashSet<String>>);

impl InterestTable {
    pub fn is_interesting(&self, kind: &str, action: Option<&str>) -> bool {
        match (self.0.get(kind), action) {
            (Some(actions), Some(action)) => actions.contains(action),
            _ => false,
        }
    }
}

#[cfg(test)]
impl<K, A, I> FromIterator<(K, I)> for InterestTable
where
    K: Into<String>,
    A: Into<String>,
    I: IntoIterator<Item = A>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(kind, actions)| {
                    (
                        kind.into(),
                        actions.into_iter().map(Into::into).collect(),
                    )
                })
                .collect(),
        )
    }
}
