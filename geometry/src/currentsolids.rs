use crate::{GeometryError, Result};

/// The ids of the solids containing the particle, sorted ascending.
///
/// The default solid pins the bottom of the set and the solid with the
/// highest id is the active one. Entering a solid already present and
/// leaving one that is absent are detected inconsistencies.
#[derive(Clone, Debug, PartialEq)]
pub struct CurrentSolids {
    ids: Vec<i32>,
}

impl CurrentSolids {
    pub fn new(mut ids: Vec<i32>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        Self { ids }
    }

    /// The active solid: highest id in the set.
    pub fn top(&self) -> i32 {
        *self.ids.last().unwrap()
    }

    /// The solid directly below the active one, if any.
    pub fn below_top(&self) -> Option<i32> {
        self.ids.iter().rev().nth(1).copied()
    }

    pub fn contains(&self, id: i32) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    pub fn insert(&mut self, id: i32) -> Result<()> {
        match self.ids.binary_search(&id) {
            Ok(_) => Err(GeometryError::AlreadyInside(id)),
            Err(pos) => {
                self.ids.insert(pos, id);
                Ok(())
            }
        }
    }

    pub fn remove(&mut self, id: i32) -> Result<()> {
        match self.ids.binary_search(&id) {
            Ok(pos) => {
                self.ids.remove(pos);
                Ok(())
            }
            Err(_) => Err(GeometryError::NotInside(id)),
        }
    }

    pub fn ids(&self) -> &[i32] {
        &self.ids
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ordering_and_top() {
        let mut set = CurrentSolids::new(vec![1]);
        set.insert(5).unwrap();
        set.insert(3).unwrap();
        assert_eq!(set.ids(), &[1, 3, 5]);
        assert_eq!(set.top(), 5);
        assert_eq!(set.below_top(), Some(3));
    }

    #[test]
    fn test_consistency_checks() {
        let mut set = CurrentSolids::new(vec![1, 2]);
        assert!(matches!(
            set.insert(2),
            Err(GeometryError::AlreadyInside(2))
        ));
        assert!(matches!(set.remove(7), Err(GeometryError::NotInside(7))));
        set.remove(2).unwrap();
        assert_eq!(set.ids(), &[1]);
    }

    #[test]
    fn test_round_trip_restores_set() {
        let mut set = CurrentSolids::new(vec![1]);
        let before = set.clone();
        set.insert(4).unwrap();
        set.remove(4).unwrap();
        assert_eq!(set, before);
    }
}
