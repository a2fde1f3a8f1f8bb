use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Default, Serialize, Deserialize, PartialEq, Eq, Hash, Debug, Clone, PartialOrd, Ord)]
#[serde(transparent)]
pub struct Ticker(String);

impl Ticker {
    pub fn new(s: impl Into<String>) -> Self {
        Ticker(s.into())
    }

    // 去掉引号和首尾空白，空字符串视为无效
    pub fn clean(raw: &str) -> Option<Self> {
        let cleaned = raw.replace(['\'', '"'], "");
        let cleaned = cleaned.trim();

        if cleaned.is_empty() {
            None
        } else {
            Some(Ticker::new(cleaned))
        }
    }

    // 不区分大小写的子串匹配
    pub fn matches(&self, needle: &str) -> bool {
        self.0.to_lowercase().contains(&needle.to_lowercase())
    }

    pub fn is_kas(&self) -> bool {
        self.0.eq_ignore_ascii_case("kas")
    }
}

impl From<String> for Ticker {
    fn from(value: String) -> Self {
        Ticker::new(value)
    }
}

impl From<&str> for Ticker {
    fn from(value: &str) -> Self {
        Ticker::new(value)
    }
}

impl From<&Ticker> for Ticker {
    fn from(value: &Ticker) -> Self {
        value.clone()
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticker_clean() {
        assert_eq!(Ticker::clean(" 'NACHO' "), Some(Ticker::new("NACHO")));
        assert_eq!(Ticker::clean("\"KASPY\""), Some(Ticker::new("KASPY")));
        assert_eq!(Ticker::clean("  "), None);
        assert_eq!(Ticker::clean("''"), None);
    }

    #[test]
    fn test_ticker_matches() {
        let ticker = Ticker::new("NACHO");
        assert!(ticker.matches("ach"));
        assert!(ticker.matches(""));
        assert!(!ticker.matches("kas"));
        assert!(Ticker::new("Kas").is_kas());
    }
}
