use crate::errors::DomainError;
use ipnetwork::IpNetwork;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transport protocol of a game port entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive port interval, parsed from `"N"` or `"N-M"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub fn single(port: u16) -> Self {
        Self {
            start: port,
            end: port,
        }
    }

    /// Standard inclusive interval overlap.
    pub fn overlaps(&self, other: &PortRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl FromStr for PortRange {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |p: &str| {
            p.trim()
                .parse::<u16>()
                .map_err(|_| DomainError::InvalidPortRange(s.to_string()))
        };
        let range = match s.split_once('-') {
            Some((start, end)) => Self {
                start: parse(start)?,
                end: parse(end)?,
            },
            None => Self::single(parse(s)?),
        };
        if range.start > range.end {
            return Err(DomainError::InvalidPortRange(s.to_string()));
        }
        Ok(range)
    }
}

impl TryFrom<String> for PortRange {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PortRange> for String {
    fn from(r: PortRange) -> Self {
        r.to_string()
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// One `(proto, range)` entry from a game definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GamePort {
    pub proto: Protocol,
    pub range: PortRange,
}

/// A game definition from `games.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub label: String,
    #[serde(default)]
    pub default_blocked: bool,
    #[serde(default)]
    pub domains: Vec<String>,
    #[serde(default)]
    pub ports: Vec<GamePort>,
    #[serde(default)]
    pub server_ips: Vec<IpNetwork>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub auto_detected: bool,
}

impl Game {
    /// Lowercased domain set for suffix matching.
    pub fn domain_set(&self) -> FxHashSet<String> {
        self.domains.iter().map(|d| d.to_lowercase()).collect()
    }
}

/// The full game catalog, in file insertion order.
#[derive(Debug, Clone, Default)]
pub struct GameCatalog {
    games: Vec<(String, Game)>,
}

impl GameCatalog {
    pub fn new(games: Vec<(String, Game)>) -> Self {
        Self { games }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Game)> {
        self.games.iter().map(|(k, g)| (k.as_str(), g))
    }

    pub fn get(&self, key: &str) -> Option<&Game> {
        self.games.iter().find(|(k, _)| k == key).map(|(_, g)| g)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.games.iter().any(|(k, _)| k == key)
    }

    pub fn push(&mut self, key: String, game: Game) {
        self.games.push((key, game));
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}
