//! Access rights of the Take-Grant model.
//!
//! The right domain is closed: exactly six symbols. Two of them are
//! ordinary resource rights with a third sibling (READ, WRITE,
//! EXECUTE), two drive the graph rewrites (TAKE, GRANT), and OWN
//! marks ownership for the surrounding object layer.
//!
//! A single right and a set of rights are the same type: each right
//! is one flag constant, a set is any union. This makes the
//! intersection rule of the rewrites (`requested & available`) a
//! bitwise AND.
//!
//! # Example
//!
//! ```
//! use tgsh_types::RightSet;
//!
//! let requested = RightSet::READ | RightSet::WRITE;
//! let available = RightSet::READ | RightSet::EXECUTE;
//!
//! // A take/grant rewrite may move only the intersection.
//! assert_eq!(requested & available, RightSet::READ);
//!
//! // Strict boundary parsing of the shell syntax.
//! let parsed: RightSet = "r,w".parse().unwrap();
//! assert_eq!(parsed, requested);
//! assert!("r,q".parse::<RightSet>().is_err());
//! ```

use crate::ErrorCode;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

bitflags! {
    /// A set of Take-Grant access rights over one graph edge.
    ///
    /// | Flag | Symbol | Meaning |
    /// |------|--------|---------|
    /// | [`READ`](Self::READ) | `r` | read the object |
    /// | [`WRITE`](Self::WRITE) | `w` | write the object |
    /// | [`EXECUTE`](Self::EXECUTE) | `x` | execute the object |
    /// | [`TAKE`](Self::TAKE) | `t` | import rights held by the object |
    /// | [`GRANT`](Self::GRANT) | `g` | export own rights through the object |
    /// | [`OWN`](Self::OWN) | `o` | ownership (object deletion) |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RightSet: u8 {
        /// Read the object: symbol `r`.
        const READ    = 0b00_0001;
        /// Write the object: symbol `w`.
        const WRITE   = 0b00_0010;
        /// Execute the object: symbol `x`.
        const EXECUTE = 0b00_0100;
        /// Import rights held by the object: symbol `t`.
        const TAKE    = 0b00_1000;
        /// Export own rights through the object: symbol `g`.
        const GRANT   = 0b01_0000;
        /// Ownership: symbol `o`.
        const OWN     = 0b10_0000;
    }
}

/// Flag constants paired with their shell symbol and long name,
/// in canonical display order.
const TABLE: [(RightSet, char, &str); 6] = [
    (RightSet::READ, 'r', "READ"),
    (RightSet::WRITE, 'w', "WRITE"),
    (RightSet::EXECUTE, 'x', "EXECUTE"),
    (RightSet::TAKE, 't', "TAKE"),
    (RightSet::GRANT, 'g', "GRANT"),
    (RightSet::OWN, 'o', "OWN"),
];

impl RightSet {
    /// All six rights. The default set handed to a creator.
    pub const ALL: Self = Self::READ
        .union(Self::WRITE)
        .union(Self::EXECUTE)
        .union(Self::TAKE)
        .union(Self::GRANT)
        .union(Self::OWN);

    /// Decodes a single shell symbol (`r`, `w`, `x`, `t`, `g`, `o`).
    ///
    /// # Example
    ///
    /// ```
    /// use tgsh_types::RightSet;
    ///
    /// assert_eq!(RightSet::parse_symbol('t'), Some(RightSet::TAKE));
    /// assert_eq!(RightSet::parse_symbol('q'), None);
    /// ```
    #[must_use]
    pub fn parse_symbol(symbol: char) -> Option<Self> {
        TABLE
            .iter()
            .find(|(_, s, _)| *s == symbol.to_ascii_lowercase())
            .map(|(flag, _, _)| *flag)
    }

    /// Returns the canonical symbol string, e.g. `"r,w,t"`.
    #[must_use]
    pub fn symbols(self) -> String {
        let parts: Vec<String> = TABLE
            .iter()
            .filter(|(flag, _, _)| self.contains(*flag))
            .map(|(_, s, _)| s.to_string())
            .collect();
        parts.join(",")
    }

    /// Returns the long names of the contained rights.
    ///
    /// # Example
    ///
    /// ```
    /// use tgsh_types::RightSet;
    ///
    /// let set = RightSet::READ | RightSet::GRANT;
    /// assert_eq!(set.names(), vec!["READ", "GRANT"]);
    /// ```
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        TABLE
            .iter()
            .filter(|(flag, _, _)| self.contains(*flag))
            .map(|(_, _, name)| *name)
            .collect()
    }
}

impl FromStr for RightSet {
    type Err = RightParseError;

    /// Parses the shell right syntax: comma-separated symbols
    /// (`"r,w,t"`) or long names (`"read,grant"`), case-insensitive.
    ///
    /// Every token must decode; unknown tokens fail the whole parse
    /// rather than vanishing silently.
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut set = Self::empty();
        let mut seen_any = false;
        for token in input.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            seen_any = true;
            let flag = match token.len() {
                1 => Self::parse_symbol(token.chars().next().unwrap_or_default()),
                _ => TABLE
                    .iter()
                    .find(|(_, _, name)| name.eq_ignore_ascii_case(token))
                    .map(|(flag, _, _)| *flag),
            };
            match flag {
                Some(flag) => set |= flag,
                None => {
                    return Err(RightParseError::UnknownToken {
                        token: token.to_string(),
                    })
                }
            }
        }
        if !seen_any {
            return Err(RightParseError::Empty);
        }
        Ok(set)
    }
}

impl std::fmt::Display for RightSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "(none)")
        } else {
            write!(f, "{}", self.symbols())
        }
    }
}

/// Failure to decode free-text right syntax at the shell boundary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RightParseError {
    /// A token matched none of the six rights.
    #[error("unknown right '{token}' (expected r, w, x, t, g or o)")]
    UnknownToken {
        /// The offending token, verbatim.
        token: String,
    },

    /// The input contained no tokens at all.
    #[error("no rights given (expected r, w, x, t, g or o)")]
    Empty,
}

impl ErrorCode for RightParseError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnknownToken { .. } => "RIGHT_UNKNOWN_TOKEN",
            Self::Empty => "RIGHT_EMPTY",
        }
    }

    fn is_recoverable(&self) -> bool {
        // The operator can retype the command.
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_error_codes;

    #[test]
    fn all_contains_every_right() {
        assert!(RightSet::ALL.contains(RightSet::READ));
        assert!(RightSet::ALL.contains(RightSet::WRITE));
        assert!(RightSet::ALL.contains(RightSet::EXECUTE));
        assert!(RightSet::ALL.contains(RightSet::TAKE));
        assert!(RightSet::ALL.contains(RightSet::GRANT));
        assert!(RightSet::ALL.contains(RightSet::OWN));
    }

    #[test]
    fn intersection_is_bitwise_and() {
        let requested = RightSet::READ | RightSet::WRITE;
        let available = RightSet::WRITE | RightSet::OWN;
        assert_eq!(requested & available, RightSet::WRITE);
    }

    #[test]
    fn parse_symbol_known_and_unknown() {
        assert_eq!(RightSet::parse_symbol('r'), Some(RightSet::READ));
        assert_eq!(RightSet::parse_symbol('G'), Some(RightSet::GRANT));
        assert_eq!(RightSet::parse_symbol('q'), None);
    }

    #[test]
    fn parse_comma_symbols() {
        let set: RightSet = "r,w,t".parse().expect("parse");
        assert_eq!(set, RightSet::READ | RightSet::WRITE | RightSet::TAKE);
    }

    #[test]
    fn parse_long_names_case_insensitive() {
        let set: RightSet = "Read,GRANT".parse().expect("parse");
        assert_eq!(set, RightSet::READ | RightSet::GRANT);
    }

    #[test]
    fn parse_rejects_unknown_token() {
        let err = "r,q".parse::<RightSet>().unwrap_err();
        assert_eq!(
            err,
            RightParseError::UnknownToken {
                token: "q".to_string()
            }
        );
    }

    #[test]
    fn parse_rejects_empty_input() {
        assert_eq!("".parse::<RightSet>().unwrap_err(), RightParseError::Empty);
        assert_eq!(
            " , ".parse::<RightSet>().unwrap_err(),
            RightParseError::Empty
        );
    }

    #[test]
    fn parse_does_not_drop_tokens_silently() {
        // A typo must not shrink the requested set to the valid remainder.
        assert!("r,w,z".parse::<RightSet>().is_err());
    }

    #[test]
    fn symbols_roundtrip() {
        let set = RightSet::READ | RightSet::TAKE | RightSet::OWN;
        assert_eq!(set.symbols(), "r,t,o");
        let parsed: RightSet = set.symbols().parse().expect("parse");
        assert_eq!(parsed, set);
    }

    #[test]
    fn display_formatting() {
        assert_eq!(RightSet::WRITE.to_string(), "w");
        assert_eq!((RightSet::READ | RightSet::GRANT).to_string(), "r,g");
        assert_eq!(RightSet::empty().to_string(), "(none)");
    }

    #[test]
    fn names_in_canonical_order() {
        let set = RightSet::OWN | RightSet::READ;
        assert_eq!(set.names(), vec!["READ", "OWN"]);
    }

    #[test]
    fn serde_roundtrip() {
        let set = RightSet::READ | RightSet::EXECUTE;
        let json = serde_json::to_string(&set).expect("serialize");
        let parsed: RightSet = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, set);
    }

    #[test]
    fn error_codes_follow_convention() {
        assert_error_codes(
            &[
                RightParseError::UnknownToken {
                    token: "q".to_string(),
                },
                RightParseError::Empty,
            ],
            "RIGHT_",
        );
    }
}
