//! Sets of states over a fixed universe `0..universe`, packed into `u64` words.

use std::fmt;

use crate::index::AsIndex;
use crate::StateId;

/// A set of states of one LTS.
///
/// Bits past `universe` in the last word are always zero, so the derived
/// equality is structural equality of the sets.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StateSet {
    words: Vec<u64>,
    universe: usize,
}

impl StateSet {
    const BITS_PER_WORD: usize = 64;

    /// The empty set over `universe` states.
    pub fn empty(universe: usize) -> Self {
        let words = universe.div_ceil(Self::BITS_PER_WORD);
        Self { words: vec![0; words], universe }
    }

    /// The set containing every state of the universe.
    pub fn full(universe: usize) -> Self {
        let mut set = Self::empty(universe);
        set.insert_all();
        set
    }

    pub fn from_states(universe: usize, states: impl IntoIterator<Item = StateId>) -> Self {
        let mut set = Self::empty(universe);
        states.into_iter().for_each(|s| set.insert(s));
        set
    }

    #[inline]
    fn word_and_bit(state: StateId) -> (usize, u64) {
        let index = state.to_usize();
        (index / Self::BITS_PER_WORD, 1 << (index % Self::BITS_PER_WORD))
    }

    #[inline]
    pub fn contains(&self, state: StateId) -> bool {
        if state.to_usize() >= self.universe {
            return false;
        }
        let (word, bit) = Self::word_and_bit(state);
        self.words[word] & bit != 0
    }

    /// Adds `state`, which must belong to the universe.
    #[inline]
    pub fn insert(&mut self, state: StateId) {
        assert!(state.to_usize() < self.universe, "state {state:?} outside of the universe");
        let (word, bit) = Self::word_and_bit(state);
        self.words[word] |= bit;
    }

    #[inline]
    pub fn remove(&mut self, state: StateId) {
        if state.to_usize() < self.universe {
            let (word, bit) = Self::word_and_bit(state);
            self.words[word] &= !bit;
        }
    }

    pub fn insert_all(&mut self) {
        self.words.fill(!0);
        let tail = self.universe % Self::BITS_PER_WORD;
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last = (1 << tail) - 1;
            }
        }
    }

    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    pub fn union_with(&mut self, other: &StateSet) {
        debug_assert_eq!(self.universe, other.universe);
        self.words.iter_mut().zip(&other.words).for_each(|(a, b)| *a |= b);
    }

    pub fn intersect_with(&mut self, other: &StateSet) {
        debug_assert_eq!(self.universe, other.universe);
        self.words.iter_mut().zip(&other.words).for_each(|(a, b)| *a &= b);
    }

    pub fn intersects(&self, other: &StateSet) -> bool {
        self.words.iter().zip(&other.words).any(|(a, b)| a & b != 0)
    }

    pub fn is_subset(&self, other: &StateSet) -> bool {
        self.words.iter().zip(&other.words).all(|(a, b)| a & !b == 0)
    }

    /// Number of states in the set.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.universe
    }

    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.words.iter().enumerate().flat_map(|(i, &word)| {
            let base = i * Self::BITS_PER_WORD;
            let mut word = word;
            std::iter::from_fn(move || {
                if word == 0 {
                    return None;
                }
                let bit = word.trailing_zeros() as usize;
                word &= word - 1;
                Some(StateId(base + bit))
            })
        })
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|s| s.to_usize())).finish()
    }
}

/// Lists at most the first 20 states, like `[0, 3, 7, ...]`.
impl fmt::Display for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SHOWN: usize = 20;

        write!(f, "[")?;
        for (i, state) in self.iter().enumerate() {
            if i == SHOWN {
                return write!(f, ", ...]");
            }
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", state.to_usize())?;
        }
        write!(f, "]")
    }
}
