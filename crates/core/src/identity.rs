//! Instance identity.
//!
//! Every mounted item gets one opaque id, generated once. How ids are made is
//! a policy: random base36 tokens by default, or a plain counter when
//! collisions must be ruled out entirely.

use std::cell::Cell;
use std::fmt;
use std::str::FromStr;

/// Opaque identifier of one accordion item within its group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for InstanceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Source of fresh instance ids.
pub trait IdSource {
    /// Produce a new id. Called exactly once per item mount.
    fn generate(&self) -> InstanceId;
}

/// Random base36 tokens.
///
/// A `u64` renders to at most 13 base36 digits. Uniqueness is probabilistic
/// only.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn generate(&self) -> InstanceId {
        InstanceId(to_base36(rand::random::<u64>()))
    }
}

/// Monotonic counter ids (`item-0`, `item-1`, ...), unique per source.
#[derive(Debug)]
pub struct SequentialIdSource {
    prefix: String,
    next: Cell<u64>,
}

impl SequentialIdSource {
    pub fn new() -> Self {
        Self::with_prefix("item")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: Cell::new(0),
        }
    }
}

impl Default for SequentialIdSource {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for SequentialIdSource {
    fn generate(&self) -> InstanceId {
        let n = self.next.get();
        self.next.set(n + 1);
        InstanceId(format!("{}-{}", self.prefix, n))
    }
}

/// Generate an id with the default (random) policy.
pub fn generate() -> InstanceId {
    RandomIdSource.generate()
}

/// Configurable choice of id policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    #[default]
    Random,
    Sequential,
}

impl IdPolicy {
    pub fn to_str(self) -> &'static str {
        match self {
            IdPolicy::Random => "random",
            IdPolicy::Sequential => "sequential",
        }
    }

    /// Build the id source for this policy.
    pub fn source(self) -> Box<dyn IdSource> {
        match self {
            IdPolicy::Random => Box::new(RandomIdSource),
            IdPolicy::Sequential => Box::new(SequentialIdSource::new()),
        }
    }
}

impl FromStr for IdPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" => Ok(IdPolicy::Random),
            "sequential" | "counter" => Ok(IdPolicy::Sequential),
            _ => Err(format!("Unknown id policy: {}", s)),
        }
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if n == 0 {
        return "0".to_string();
    }

    let mut out = Vec::with_capacity(13);
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    // Only ASCII digits were pushed
    String::from_utf8(out).unwrap_or_default()
}
