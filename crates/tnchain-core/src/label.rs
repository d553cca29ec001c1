//! Axis labels.
//!
//! Every axis of a [`Tensor`](crate::Tensor) carries a [`Label`]. Chains of
//! tensors reserve a handful of roles ([`Role`]) for their virtual and
//! physical axes; decompositions mint fresh [`BondId`]s for the axes they
//! create, so newly created bonds can never collide with existing labels.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BOND_ID: AtomicU64 = AtomicU64::new(0);

/// Reserved axis roles used by one-dimensional tensor networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    /// Virtual axis pointing to the previous site.
    Left,
    /// Virtual axis pointing to the next site.
    Right,
    /// Physical axis of a state.
    Phys,
    /// Input physical axis of an operator.
    PhysIn,
    /// Output physical axis of an operator.
    PhysOut,
}

impl Role {
    fn as_str(self) -> &'static str {
        match self {
            Role::Left => "left",
            Role::Right => "right",
            Role::Phys => "phys",
            Role::PhysIn => "physin",
            Role::PhysOut => "physout",
        }
    }
}

/// Opaque identity of a bond axis created by a decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BondId(u64);

impl BondId {
    /// Mint a bond id that has never been handed out before in this process.
    pub fn fresh() -> Self {
        Self(NEXT_BOND_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Label of a single tensor axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    /// A reserved chain role.
    Role(Role),
    /// A user supplied name.
    Named(String),
    /// A bond freshly created by a decomposition.
    Bond(BondId),
    /// A primed copy of another label, used to keep bra and ket axes apart.
    Prime(Box<Label>),
    /// Another label tagged with the chain site it came from.
    AtSite(Box<Label>, usize),
}

impl Label {
    /// Shorthand for `Label::Role(Role::Left)`.
    pub const LEFT: Label = Label::Role(Role::Left);
    /// Shorthand for `Label::Role(Role::Right)`.
    pub const RIGHT: Label = Label::Role(Role::Right);
    /// Shorthand for `Label::Role(Role::Phys)`.
    pub const PHYS: Label = Label::Role(Role::Phys);
    /// Shorthand for `Label::Role(Role::PhysIn)`.
    pub const PHYS_IN: Label = Label::Role(Role::PhysIn);
    /// Shorthand for `Label::Role(Role::PhysOut)`.
    pub const PHYS_OUT: Label = Label::Role(Role::PhysOut);

    /// Create a named label.
    pub fn named(name: impl Into<String>) -> Self {
        Label::Named(name.into())
    }

    /// Create a label for a fresh bond.
    pub fn fresh_bond() -> Self {
        Label::Bond(BondId::fresh())
    }

    /// Prime this label once.
    #[must_use]
    pub fn prime(&self) -> Self {
        Label::Prime(Box::new(self.clone()))
    }

    /// Prime this label `level` times.
    #[must_use]
    pub fn primed(&self, level: usize) -> Self {
        (0..level).fold(self.clone(), |acc, _| acc.prime())
    }

    /// Tag this label with a chain site.
    #[must_use]
    pub fn at_site(&self, site: usize) -> Self {
        Label::AtSite(Box::new(self.clone()), site)
    }

    /// Number of primes wrapped around the base label.
    pub fn prime_level(&self) -> usize {
        match self {
            Label::Prime(inner) => 1 + inner.prime_level(),
            _ => 0,
        }
    }

    /// The label with every prime removed.
    pub fn base(&self) -> &Label {
        match self {
            Label::Prime(inner) => inner.base(),
            other => other,
        }
    }

    /// The role carried by the base label, if any.
    pub fn role(&self) -> Option<Role> {
        match self.base() {
            Label::Role(role) => Some(*role),
            _ => None,
        }
    }

    /// Whether the base label is a decomposition bond.
    pub fn is_bond(&self) -> bool {
        matches!(self.base(), Label::Bond(_))
    }
}

impl From<Role> for Label {
    fn from(role: Role) -> Self {
        Label::Role(role)
    }
}

impl From<&str> for Label {
    fn from(name: &str) -> Self {
        Label::Named(name.to_string())
    }
}

impl From<String> for Label {
    fn from(name: String) -> Self {
        Label::Named(name)
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Role(role) => f.write_str(role.as_str()),
            Label::Named(name) => f.write_str(name),
            Label::Bond(id) => write!(f, "bond#{}", id.0),
            Label::Prime(inner) => write!(f, "{inner}'"),
            Label::AtSite(inner, site) => write!(f, "{inner}@{site}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_bonds_are_distinct() {
        let a = Label::fresh_bond();
        let b = Label::fresh_bond();
        assert_ne!(a, b);
        assert!(a.is_bond());
        assert!(!Label::LEFT.is_bond());
    }

    #[test]
    fn test_prime_levels() {
        let l = Label::PHYS.primed(2);
        assert_eq!(l.prime_level(), 2);
        assert_eq!(l.base(), &Label::PHYS);
        assert_eq!(l.role(), Some(Role::Phys));
        assert_ne!(l, Label::PHYS.prime());
        assert_eq!(l.to_string(), "phys''");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Label::from("a"), Label::named("a"));
        assert_eq!(Label::from(Role::PhysIn), Label::PHYS_IN);
        assert_eq!(Label::named("site").to_string(), "site");
    }

    #[test]
    fn test_site_tags() {
        let a = Label::PHYS.at_site(0);
        assert_ne!(a, Label::PHYS.at_site(1));
        assert_eq!(a.to_string(), "phys@0");
        assert_eq!(a.role(), None);
        assert_eq!(a.prime().to_string(), "phys@0'");
    }
}
