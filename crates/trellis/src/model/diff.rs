//! Ordered sequence differences.
//!
//! [`difference`] computes the edit script that turns one sequence into
//! another using Myers' O(ND) algorithm in its linear-space, divide and
//! conquer form. Equal prefixes and suffixes are trimmed before every search,
//! so the common "a few rows changed" case only searches the changed window.
//!
//! The search for a window gives up after [`MAX_SEARCH_COST`] rounds. That
//! window is then replaced wholesale, which keeps a reconciliation of two
//! unrelated lists linear in their length instead of quadratic.
//!
//! The script is ordered so that it can be applied change by change to the
//! old sequence: removals first, from the highest offset to the lowest, then
//! insertions from the lowest offset to the highest. Removal offsets index the
//! old sequence, insertion offsets index the new one.

use std::ops::Range;

/// Rounds of the middle-snake search allowed per window.
pub const MAX_SEARCH_COST: usize = 1024;

/// A single edit in a difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change<T> {
    /// Remove `element` at `offset`.
    Remove { offset: usize, element: T },
    /// Insert `element` at `offset`.
    Insert { offset: usize, element: T },
}

impl<T> Change<T> {
    /// The position this change applies to.
    pub fn offset(&self) -> usize {
        match self {
            Self::Remove { offset, .. } | Self::Insert { offset, .. } => *offset,
        }
    }

    /// The element being inserted or removed.
    pub fn element(&self) -> &T {
        match self {
            Self::Remove { element, .. } | Self::Insert { element, .. } => element,
        }
    }

    /// Whether this is an insertion.
    pub fn is_insert(&self) -> bool {
        matches!(self, Self::Insert { .. })
    }
}

impl<T: Clone> Change<T> {
    /// Apply this change to `sequence`.
    ///
    /// Returns `false`, leaving `sequence` untouched, if the offset is out of
    /// range for the current contents.
    pub fn apply_to(&self, sequence: &mut Vec<T>) -> bool {
        match self {
            Self::Remove { offset, .. } => {
                if *offset >= sequence.len() {
                    return false;
                }
                sequence.remove(*offset);
            }
            Self::Insert { offset, element } => {
                if *offset > sequence.len() {
                    return false;
                }
                sequence.insert(*offset, element.clone());
            }
        }
        true
    }
}

/// Compute the changes that transform `old` into `new`.
///
/// Elements are compared with `==`. Elements that appear in both sequences in
/// the same relative order are kept rather than removed and reinserted; a
/// reordered element shows up as a removal plus an insertion.
///
/// Duplicate elements are allowed by the algorithm, but callers that key
/// widgets by identity should keep their sequences free of duplicates.
pub fn difference<T: PartialEq + Clone>(old: &[T], new: &[T]) -> Vec<Change<T>> {
    let rounds = search_rounds(old.len(), new.len());
    let mut search = Search {
        forward: Diagonals::new(rounds),
        backward: Diagonals::new(rounds),
        removed: Vec::new(),
        inserted: Vec::new(),
    };
    search.compare(old, 0..old.len(), new, 0..new.len());

    let mut changes = Vec::with_capacity(search.removed.len() + search.inserted.len());
    // Both index lists come out ascending.
    for index in search.removed.into_iter().rev() {
        changes.push(Change::Remove {
            offset: index,
            element: old[index].clone(),
        });
    }
    for index in search.inserted {
        changes.push(Change::Insert {
            offset: index,
            element: new[index].clone(),
        });
    }
    changes
}

fn search_rounds(n: usize, m: usize) -> usize {
    ((n + m + 1) / 2 + 1).min(MAX_SEARCH_COST)
}

fn common_prefix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Furthest x reached on each diagonal `k = x - y`.
struct Diagonals {
    offset: isize,
    x: Vec<usize>,
}

impl Diagonals {
    fn new(rounds: usize) -> Self {
        Self {
            offset: rounds as isize + 1,
            x: vec![0; 2 * rounds + 3],
        }
    }

    fn get(&self, k: isize) -> usize {
        self.x[(k + self.offset) as usize]
    }

    fn set(&mut self, k: isize, x: usize) {
        self.x[(k + self.offset) as usize] = x;
    }
}

struct Search {
    forward: Diagonals,
    backward: Diagonals,
    removed: Vec<usize>,
    inserted: Vec<usize>,
}

impl Search {
    fn compare<T: PartialEq>(
        &mut self,
        old: &[T],
        mut old_range: Range<usize>,
        new: &[T],
        mut new_range: Range<usize>,
    ) {
        let prefix = common_prefix(&old[old_range.clone()], &new[new_range.clone()]);
        old_range.start += prefix;
        new_range.start += prefix;
        let suffix = common_suffix(&old[old_range.clone()], &new[new_range.clone()]);
        old_range.end -= suffix;
        new_range.end -= suffix;

        if old_range.is_empty() || new_range.is_empty() {
            self.removed.extend(old_range);
            self.inserted.extend(new_range);
            return;
        }

        match self.middle_snake(old, old_range.clone(), new, new_range.clone()) {
            Some((x, y)) => {
                self.compare(old, old_range.start..x, new, new_range.start..y);
                self.compare(old, x..old_range.end, new, y..new_range.end);
            }
            None => {
                tracing::trace!(
                    target: trellis_core::logging::targets::MODEL,
                    removed = old_range.len(),
                    inserted = new_range.len(),
                    "diff window too costly, replacing it"
                );
                self.removed.extend(old_range);
                self.inserted.extend(new_range);
            }
        }
    }

    /// Find a point on an optimal path through the middle of the window.
    ///
    /// Both ranges must be non-empty and must differ in their first and last
    /// elements. Returns `None` if the search exceeds its round budget.
    fn middle_snake<T: PartialEq>(
        &mut self,
        old: &[T],
        old_range: Range<usize>,
        new: &[T],
        new_range: Range<usize>,
    ) -> Option<(usize, usize)> {
        let n = old_range.len();
        let m = new_range.len();
        let delta = n as isize - m as isize;
        let odd = delta & 1 == 1;
        let vf = &mut self.forward;
        let vb = &mut self.backward;
        vf.set(1, 0);
        vb.set(1, 0);

        for d in 0..search_rounds(n, m) as isize {
            for k in (-d..=d).rev().step_by(2) {
                let mut x = if k == -d || (k != d && vf.get(k - 1) < vf.get(k + 1)) {
                    vf.get(k + 1)
                } else {
                    vf.get(k - 1) + 1
                };
                let y = (x as isize - k) as usize;
                let (x0, y0) = (x, y);
                if x < n && y < m {
                    x += common_prefix(
                        &old[old_range.start + x..old_range.end],
                        &new[new_range.start + y..new_range.end],
                    );
                }
                vf.set(k, x);
                if odd && (k - delta).abs() < d && vf.get(k) + vb.get(delta - k) >= n {
                    return Some((old_range.start + x0, new_range.start + y0));
                }
            }

            for k in (-d..=d).rev().step_by(2) {
                let mut x = if k == -d || (k != d && vb.get(k - 1) < vb.get(k + 1)) {
                    vb.get(k + 1)
                } else {
                    vb.get(k - 1) + 1
                };
                let mut y = (x as isize - k) as usize;
                if x < n && y < m {
                    let run = common_suffix(
                        &old[old_range.start..old_range.start + n - x],
                        &new[new_range.start..new_range.start + m - y],
                    );
                    x += run;
                    y += run;
                }
                vb.set(k, x);
                if !odd && (k - delta).abs() <= d && vb.get(k) + vf.get(delta - k) >= n {
                    return Some((old_range.start + n - x, new_range.start + m - y));
                }
            }
        }
        None
    }
}
