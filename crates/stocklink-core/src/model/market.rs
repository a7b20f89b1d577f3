use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Level and percent change of one index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexQuote {
    pub value: f64,
    pub change: f64,
}

/// Index quotes keyed by canonical key (`shangzheng`, `hktech`, ...),
/// in backend order. Rebuilt wholesale on every fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketOverview(IndexMap<String, IndexQuote>);

impl MarketOverview {
    /// Known-good snapshot committed when the live fetch fails.
    pub fn fallback() -> Self {
        Self::from_iter([
            (
                "shangzheng".to_owned(),
                IndexQuote {
                    value: 3341.99,
                    change: -0.30,
                },
            ),
            (
                "shenzheng".to_owned(),
                IndexQuote {
                    value: 10126.83,
                    change: -0.70,
                },
            ),
            (
                "chuangye".to_owned(),
                IndexQuote {
                    value: 2011.77,
                    change: -0.87,
                },
            ),
        ])
    }

    pub fn get(&self, key: &str) -> Option<&IndexQuote> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &IndexQuote)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a MarketOverview {
    type Item = (&'a String, &'a IndexQuote);
    type IntoIter = indexmap::map::Iter<'a, String, IndexQuote>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, IndexQuote)> for MarketOverview {
    fn from_iter<I: IntoIterator<Item = (String, IndexQuote)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Map a display name from the backend to its canonical key.
///
/// Unlisted names are stripped of whitespace and lowercased.
pub fn canonical_index_key(name: &str) -> String {
    match name {
        "上证指数" => "shangzheng".into(),
        "深证成指" => "shenzheng".into(),
        "创业板指" => "chuangye".into(),
        "纳斯达克中国金龙指数" => "nasdaqChina".into(),
        "富时中国A50" => "ftseChina".into(),
        "恒生科技指数" => "hktech".into(),
        other => other
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_lowercase(),
    }
}
