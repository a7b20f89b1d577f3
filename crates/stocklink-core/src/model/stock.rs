use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// One entry of the watch list.
///
/// Persisted under `favoriteStocks` as a read-through cache, with the
/// backend's snake_case field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FavoriteStock {
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub market: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub latest_price: Option<f64>,
    #[serde(default)]
    pub change_percent: Option<f64>,
    #[serde(default)]
    pub added_at: Option<String>,
}

impl FavoriteStock {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Keep the first occurrence of each code, preserving order.
pub fn dedup_by_code(stocks: Vec<FavoriteStock>) -> Vec<FavoriteStock> {
    let mut seen = HashSet::with_capacity(stocks.len());
    stocks
        .into_iter()
        .filter(|s| seen.insert(s.code.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_keeps_first_occurrence_in_order() {
        let list = vec![
            FavoriteStock::new("600519", "a"),
            FavoriteStock::new("000001", "b"),
            FavoriteStock::new("600519", "c"),
        ];
        let out = dedup_by_code(list);
        let names: Vec<_> = out.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }
}
