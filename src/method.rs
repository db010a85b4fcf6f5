//! HTTP method as a typed enum.
//!
//! Only the methods the server answers are named. Any other token, whether a
//! standard method like `PUT` or something unknown, has no `Method` and is
//! answered with `405 Method Not Allowed` by the handler.

use std::fmt;
use std::str::FromStr;

/// A served HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get  => "GET",
            Self::Post => "POST",
        }
    }

    /// Parses a method token ignoring ASCII case, so `get` and `Get` are
    /// treated as `GET`. Returns `None` for any other token.
    pub fn from_token(token: &str) -> Option<Self> {
        token.to_ascii_uppercase().parse().ok()
    }
}

/// Parses an uppercase method string (e.g. `"GET"`). Case-sensitive per RFC 9110 §9.1.
impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET"  => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            _      => Err(()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
