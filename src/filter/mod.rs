//! # Filter Module
//!
//! Composable boolean predicates over item records.
//!
//! A filter tree is built from leaf comparisons combined with [`And`], [`Or`] and
//! [`Not`]. Every tree reduces to a boolean for any record: an empty [`And`]
//! accepts everything and an empty [`Or`] rejects everything.

pub mod app_filter;

pub use app_filter::*;

use crate::{ItemRecord, ItemType, Rarity};
use std::fmt;

/// A predicate over item records.
pub trait Specification: fmt::Debug + Send + Sync {
    /// Whether `item` satisfies this specification.
    fn is_satisfied_by(&self, item: &ItemRecord) -> bool;
}

/// Boxed specification, the currency of composite nodes.
pub type BoxedSpecification = Box<dyn Specification>;

/// Satisfied when every child is.
#[derive(Debug, Default)]
pub struct And {
    pub children: Vec<BoxedSpecification>,
}

impl And {
    /// Creates a conjunction.
    pub fn new(children: Vec<BoxedSpecification>) -> Self {
        Self { children }
    }
}

impl Specification for And {
    fn is_satisfied_by(&self, item: &ItemRecord) -> bool {
        self.children.iter().all(|child| child.is_satisfied_by(item))
    }
}

/// Satisfied when any child is.
#[derive(Debug, Default)]
pub struct Or {
    pub children: Vec<BoxedSpecification>,
}

impl Or {
    /// Creates a disjunction.
    pub fn new(children: Vec<BoxedSpecification>) -> Self {
        Self { children }
    }
}

impl Specification for Or {
    fn is_satisfied_by(&self, item: &ItemRecord) -> bool {
        self.children.iter().any(|child| child.is_satisfied_by(item))
    }
}

/// Inverts its single child.
#[derive(Debug)]
pub struct Not {
    pub child: BoxedSpecification,
}

impl Not {
    /// Creates a negation.
    pub fn new(child: BoxedSpecification) -> Self {
        Self { child }
    }
}

impl Specification for Not {
    fn is_satisfied_by(&self, item: &ItemRecord) -> bool {
        !self.child.is_satisfied_by(item)
    }
}

/// Item level within an inclusive range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRange {
    pub min: u32,
    pub max: u32,
}

impl LevelRange {
    /// Exactly `level`.
    pub fn exactly(level: u32) -> Self {
        Self {
            min: level,
            max: level,
        }
    }
}

impl Specification for LevelRange {
    fn is_satisfied_by(&self, item: &ItemRecord) -> bool {
        (self.min..=self.max).contains(&item.system.level)
    }
}

/// Item carries a trait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HasTrait(pub String);

impl Specification for HasTrait {
    fn is_satisfied_by(&self, item: &ItemRecord) -> bool {
        item.system.traits.contains(&self.0)
    }
}

/// Spell belongs to a magical tradition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HasTradition(pub String);

impl Specification for HasTradition {
    fn is_satisfied_by(&self, item: &ItemRecord) -> bool {
        item.system
            .spell
            .as_ref()
            .map(|spell| spell.traditions.iter().any(|t| t == &self.0))
            .unwrap_or(false)
    }
}

/// Spell belongs to a school.
///
/// Newer records drop the school field and carry it as a trait instead, so
/// both are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolIs(pub String);

impl Specification for SchoolIs {
    fn is_satisfied_by(&self, item: &ItemRecord) -> bool {
        let by_field = item
            .system
            .spell
            .as_ref()
            .and_then(|spell| spell.school.as_deref())
            .map(|school| school == self.0)
            .unwrap_or(false);
        by_field || item.system.traits.contains(&self.0)
    }
}

/// Item has a rarity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RarityIs(pub Rarity);

impl Specification for RarityIs {
    fn is_satisfied_by(&self, item: &ItemRecord) -> bool {
        item.system.traits.rarity == self.0
    }
}

/// Item has a document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeIs(pub ItemType);

impl Specification for TypeIs {
    fn is_satisfied_by(&self, item: &ItemRecord) -> bool {
        item.item_type == self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SpellDetails;

    fn fireball() -> ItemRecord {
        let mut spell = ItemRecord::new("Fireball", ItemType::Spell).with_level(3);
        spell.system.traits.add("fire");
        spell.system.traits.add("evocation");
        spell.system.spell = Some(SpellDetails {
            traditions: vec!["arcane".to_string(), "primal".to_string()],
            ..SpellDetails::default()
        });
        spell
    }

    #[test]
    fn test_empty_composites() {
        let item = fireball();
        assert!(And::default().is_satisfied_by(&item));
        assert!(!Or::default().is_satisfied_by(&item));
    }

    #[test]
    fn test_not_inverts() {
        let item = fireball();
        let spec = Not::new(Box::new(LevelRange::exactly(3)));
        assert!(!spec.is_satisfied_by(&item));
    }

    #[test]
    fn test_leaves() {
        let item = fireball();
        assert!(LevelRange { min: 1, max: 5 }.is_satisfied_by(&item));
        assert!(!LevelRange::exactly(4).is_satisfied_by(&item));
        assert!(HasTrait("fire".to_string()).is_satisfied_by(&item));
        assert!(HasTradition("primal".to_string()).is_satisfied_by(&item));
        assert!(!HasTradition("divine".to_string()).is_satisfied_by(&item));
        assert!(SchoolIs("evocation".to_string()).is_satisfied_by(&item));
        assert!(RarityIs(Rarity::Common).is_satisfied_by(&item));
        assert!(TypeIs(ItemType::Spell).is_satisfied_by(&item));
    }

    #[test]
    fn test_nested_tree() {
        let item = fireball();
        let spec = And::new(vec![
            Box::new(Or::new(vec![
                Box::new(HasTradition("divine".to_string())),
                Box::new(HasTradition("arcane".to_string())),
            ])),
            Box::new(Not::new(Box::new(RarityIs(Rarity::Rare)))),
        ]);
        assert!(spec.is_satisfied_by(&item));
    }
}
