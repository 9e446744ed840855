use core::fmt;
use serde::Serialize;

/// Subset of item positions encoded as a bitmask (bit `i` = item `i`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct ItemSet(u32);

impl ItemSet {
    pub const EMPTY: ItemSet = ItemSet(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Set containing items `0..n_items`.
    pub const fn full(n_items: usize) -> Self {
        Self(((1u64 << n_items) - 1) as u32)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, item: usize) -> bool {
        (self.0 >> item) & 1 == 1
    }

    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn is_subset_of(self, other: ItemSet) -> bool {
        self.0 & other.0 == self.0
    }

    /// Complement relative to the first `n_items` positions.
    pub const fn complement(self, n_items: usize) -> Self {
        Self(Self::full(n_items).0 ^ self.0)
    }

    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..u32::BITS as usize).filter(move |&item| self.contains(item))
    }
}

impl fmt::Display for ItemSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, item) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("}")
    }
}

/// Complete assignment of item states: bit `i` set means item `i` is clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct World(ItemSet);

impl World {
    pub const fn from_bits(bits: u32) -> Self {
        Self(ItemSet::from_bits(bits))
    }

    pub const fn bits(self) -> u32 {
        self.0.bits()
    }

    pub const fn clean(self) -> ItemSet {
        self.0
    }

    pub const fn contaminated(self, n_items: usize) -> ItemSet {
        self.0.complement(n_items)
    }

    pub const fn is_clean(self, item: usize) -> bool {
        self.0.contains(item)
    }
}

/// The subset of items an answer asserts to have the queried property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Response(ItemSet);

impl Response {
    pub const fn from_bits(bits: u32) -> Self {
        Self(ItemSet::from_bits(bits))
    }

    pub const fn bits(self) -> u32 {
        self.0.bits()
    }

    pub const fn items(self) -> ItemSet {
        self.0
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
