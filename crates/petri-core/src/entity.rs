use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier shared by cells and food.
///
/// Ids are handed out by an [`IdAllocator`] in strictly increasing order, so
/// sorting by id is the same as sorting by creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out monotonically increasing [`EntityId`]s.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Create an allocator whose first id is `#0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a fresh id.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Start over from `#0`.
    pub fn reset(&mut self) {
        self.next = 0;
    }
}

/// A non-owning reference to a live entity, as stored in the spatial index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    /// A cell.
    Cell(EntityId),
    /// A food particle.
    Food(EntityId),
}

impl EntityKey {
    /// The referenced entity's id.
    pub fn id(self) -> EntityId {
        match self {
            Self::Cell(id) | Self::Food(id) => id,
        }
    }
}

impl PartialOrd for EntityKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Keys order by id; cells and food never share an id, the kind only breaks
/// ties to stay consistent with `Eq`.
impl Ord for EntityKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id()
            .cmp(&other.id())
            .then_with(|| self.kind_rank().cmp(&other.kind_rank()))
    }
}

impl EntityKey {
    fn kind_rank(self) -> u8 {
        match self {
            Self::Cell(_) => 0,
            Self::Food(_) => 1,
        }
    }
}
