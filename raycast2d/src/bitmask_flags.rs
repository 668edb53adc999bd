use num_traits::{One, PrimInt};
use serde::{Deserialize, Serialize};

/// The primitive storage for layer masks and surface tag sets.
pub type FlagsContainer = u32;

/// Trait implemented by anything that names a single bit of a flag set.
///
/// You choose the backing integer type via the associated `Storage`.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    /// Whether `bit_index()` addresses a bit that `Storage` actually has.
    ///
    /// Flags loaded from data must pass this before `mask()` is used.
    fn fits_storage(&self) -> bool {
        (self.bit_index() as usize) < std::mem::size_of::<Self::Storage>() * 8
    }

    fn mask(&self) -> Self::Storage {
        // Equivalent to: 1 << index
        // NOTE: Ensure your `bit_index()` is < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A plain bitmask container used for collision layer masks and surface tag sets.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    /// Build a set holding exactly the given flags.
    pub fn from_flags<U: FlagBitmask<Storage = T> + Copy>(tags: &[U]) -> Self {
        let mut flags = Self::new(T::zero());
        flags.add_many(tags);
        flags
    }

    /// A set with every bit raised.
    pub fn all() -> Self {
        Self::new(!T::zero())
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }

    // --- Single Tag Operations ---
    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits | tag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, tag: U) {
        self.bits = self.bits & !tag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, tag: U) -> bool {
        (self.bits & tag.mask()) != T::zero()
    }

    // --- Bulk Operations ---
    pub fn add_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, tags: &[U]) {
        for &tag in tags {
            self.add(tag);
        }
    }

    pub fn remove_many<U: FlagBitmask<Storage = T> + Copy>(&mut self, tags: &[U]) {
        for &tag in tags {
            self.remove(tag);
        }
    }

    // --- Logic Gates ---
    pub fn has_all<U: FlagBitmask<Storage = T> + Copy>(&self, tags: &[U]) -> bool {
        if tags.is_empty() {
            return true;
        }
        let combined = tags.iter().fold(T::zero(), |acc, t| acc | t.mask());
        (self.bits & combined) == combined
    }

    pub fn has_any<U: FlagBitmask<Storage = T> + Copy>(&self, tags: &[U]) -> bool {
        if tags.is_empty() {
            return false;
        }
        let combined = tags.iter().fold(T::zero(), |acc, t| acc | t.mask());
        (self.bits & combined) != T::zero()
    }

    pub fn clear(&mut self) {
        self.bits = T::zero();
    }
}

/// A collision layer, identified by its bit index (0..32).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layer(pub u8);

impl Layer {
    /// Static level geometry and moving platforms.
    pub const GROUND: Self = Self(0);
    /// Bodies that platforms may carry or push.
    pub const PASSENGER: Self = Self(1);
}

impl FlagBitmask for Layer {
    type Storage = FlagsContainer;

    fn bit_index(&self) -> u8 {
        self.0
    }
}

/// A surface tag, identified by its bit index (0..32).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag(pub u8);

impl Tag {
    /// One-way platform: blocks falling bodies, lets rising ones pass, can be dropped through.
    pub const THROUGH_PLATFORM: Self = Self(0);
}

impl FlagBitmask for Tag {
    type Storage = FlagsContainer;

    fn bit_index(&self) -> u8 {
        self.0
    }
}

/// Set of collision layers a ray fan reacts to.
pub type LayerMask = BitmaskFlags<FlagsContainer>;

/// Set of tags attached to a collider surface.
pub type SurfaceTags = BitmaskFlags<FlagsContainer>;
