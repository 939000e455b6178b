//! Contains the utility functions for ordering and deduplicating columns.
use super::{group_by_util::GroupKey, OwnedColumn, OwnedNullableColumn};
use crate::base::{if_rayon, map::IndexSet};
use core::cmp::Ordering;
#[cfg(feature = "rayon")]
use rayon::prelude::ParallelSliceMut;

/// Compares the values at rows `i` and `j`, ignoring nulls.
pub(crate) fn compare_indexes_by_owned_column(column: &OwnedColumn, i: usize, j: usize) -> Ordering {
    match column {
        OwnedColumn::Boolean(col) => col[i].cmp(&col[j]),
        OwnedColumn::BigInt(col) => col[i].cmp(&col[j]),
        OwnedColumn::Float64(col) => col[i].total_cmp(&col[j]),
        OwnedColumn::VarChar(col) => col[i].cmp(&col[j]),
        OwnedColumn::Decimal(_, col) => col[i].cmp(&col[j]),
    }
}

impl OwnedNullableColumn {
    /// Compares rows `i` and `j` in the given direction. Nulls come last either way.
    fn compare_rows(&self, i: usize, j: usize, descending: bool) -> Ordering {
        match (self.is_present(i), self.is_present(j)) {
            (true, true) if descending => compare_indexes_by_owned_column(&self.values, j, i),
            (true, true) => compare_indexes_by_owned_column(&self.values, i, j),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => Ordering::Equal,
        }
    }

    /// The row indices that sort the column. The sort is stable and nulls come last.
    #[tracing::instrument(name = "OwnedNullableColumn::arg_sort", level = "debug", skip(self))]
    #[must_use]
    pub fn arg_sort(&self, descending: bool) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        if_rayon!(
            indices.par_sort_by(|&i, &j| self.compare_rows(i, j, descending)),
            indices.sort_by(|&i, &j| self.compare_rows(i, j, descending))
        );
        indices
    }

    /// The column sorted, nulls last.
    #[must_use]
    pub fn sort(&self, descending: bool) -> Self {
        self.take(&self.arg_sort(descending))
    }

    /// The index of the first occurrence of every distinct value, in row order. All nulls
    /// count as one value.
    #[must_use]
    pub fn arg_unique(&self) -> Vec<usize> {
        let mut seen: IndexSet<GroupKey> = IndexSet::default();
        (0..self.len())
            .filter(|row| seen.insert(GroupKey::from_column_row(self, *row)))
            .collect()
    }

    /// The distinct values in order of first appearance.
    #[must_use]
    pub fn unique(&self) -> Self {
        self.take(&self.arg_unique())
    }

    /// The number of distinct values, counting null as one value.
    #[must_use]
    pub fn n_unique(&self) -> usize {
        (0..self.len())
            .map(|row| GroupKey::from_column_row(self, row))
            .collect::<IndexSet<_>>()
            .len()
    }
}
