use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Default, Serialize, Deserialize, PartialEq, Eq, Hash, Debug, Clone, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ExchangeName(String);

impl ExchangeName {
    pub fn new(s: impl Into<String>) -> Self {
        ExchangeName(s.into())
    }
}

impl From<String> for ExchangeName {
    fn from(value: String) -> Self {
        ExchangeName::new(value)
    }
}

impl From<&str> for ExchangeName {
    fn from(value: &str) -> Self {
        ExchangeName::new(value)
    }
}

impl From<&ExchangeName> for ExchangeName {
    fn from(value: &ExchangeName) -> Self {
        value.clone()
    }
}

impl AsRef<str> for ExchangeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExchangeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
