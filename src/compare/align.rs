//! Label selections and the alignment rule for positional pairing

use std::hash::Hash;
use std::ops::Index;

use indexmap::IndexSet;

/// Container kind of a [`Selection`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Sequence,
    Set,
}

/// Column names or row keys picked out of a table for comparison
///
/// Both kinds are paired position by position; the kind only matters to
/// [`can_align`], which refuses to pair a `Set` with a `Sequence` even when
/// they hold the same labels. Callers mixing the two kinds will see
/// comparisons rejected, so build both sides the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T: Hash + Eq> {
    /// Ordered labels, duplicates allowed
    Sequence(Vec<T>),
    /// Unique labels in insertion order
    Set(IndexSet<T>),
}

impl<T: Hash + Eq> Selection<T> {
    /// Build an ordered selection
    pub fn sequence<I, U>(items: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<T>,
    {
        Selection::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Build a set selection; repeated labels collapse
    pub fn set<I, U>(items: I) -> Self
    where
        I: IntoIterator<Item = U>,
        U: Into<T>,
    {
        Selection::Set(items.into_iter().map(Into::into).collect())
    }

    pub fn kind(&self) -> SelectionKind {
        match self {
            Selection::Sequence(_) => SelectionKind::Sequence,
            Selection::Set(_) => SelectionKind::Set,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Selection::Sequence(items) => items.len(),
            Selection::Set(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label at a position
    pub fn get(&self, index: usize) -> Option<&T> {
        match self {
            Selection::Sequence(items) => items.get(index),
            Selection::Set(items) => items.get_index(index),
        }
    }

    /// Labels in pairing order
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

impl<T: Hash + Eq> Index<usize> for Selection<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self {
            Selection::Sequence(items) => &items[index],
            Selection::Set(items) => &items[index],
        }
    }
}

impl<T: Hash + Eq> From<Vec<T>> for Selection<T> {
    fn from(items: Vec<T>) -> Self {
        Selection::Sequence(items)
    }
}

impl<T: Hash + Eq> From<IndexSet<T>> for Selection<T> {
    fn from(items: IndexSet<T>) -> Self {
        Selection::Set(items)
    }
}

/// Whether two selections can be compared position by position
///
/// True only when both are the same container kind, both are non-empty and
/// both have the same length. Nothing is checked about the labels
/// themselves.
pub fn can_align<A, B>(xs: &Selection<A>, ys: &Selection<B>) -> bool
where
    A: Hash + Eq,
    B: Hash + Eq,
{
    xs.kind() == ys.kind() && !xs.is_empty() && xs.len() == ys.len()
}
