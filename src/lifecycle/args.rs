//! Positional navigation arguments.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

/// Ordered arguments extracted from a matched URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Args(Vec<String>);

/// Shared empty argument list for phases that carry no arguments.
pub(crate) static NO_ARGS: Args = Args(Vec::new());

impl Args {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Deref for Args {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for Args {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[&str; N]> for Args {
    fn from(values: [&str; N]) -> Self {
        Self(values.iter().map(|v| v.to_string()).collect())
    }
}

impl FromIterator<String> for Args {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}
