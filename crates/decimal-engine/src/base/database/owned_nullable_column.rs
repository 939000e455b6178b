use super::{ColumnOperationError, ColumnOperationResult, ColumnType, DecimalType, OwnedColumn};
use crate::base::math::{decimal_format::DecimalFormatOptions, DecimalValue};
use serde::{Deserialize, Serialize};

/// An [`OwnedColumn`] with an optional presence vector, where `false` marks a null row.
///
/// A missing presence vector means every row is present.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OwnedNullableColumn {
    /// The values. Rows that are null hold an arbitrary value.
    pub values: OwnedColumn,
    /// `true` for present rows, `false` for nulls
    pub presence: Option<Vec<bool>>,
}

impl OwnedNullableColumn {
    /// Create a column without nulls
    #[must_use]
    pub fn new(values: OwnedColumn) -> Self {
        Self {
            values,
            presence: None,
        }
    }

    /// Create a column with an optional presence vector of the same length
    pub fn with_presence(
        values: OwnedColumn,
        presence: Option<Vec<bool>>,
    ) -> ColumnOperationResult<Self> {
        if let Some(presence) = &presence {
            if presence.len() != values.len() {
                return Err(ColumnOperationError::PresenceLengthMismatch {
                    presence_len: presence.len(),
                    column_len: values.len(),
                });
            }
        }
        Ok(Self { values, presence })
    }

    /// Create a decimal column from optional mantissas, validating the precision of present rows.
    pub fn try_from_decimal_options(
        decimal_type: DecimalType,
        values: Vec<Option<i128>>,
    ) -> ColumnOperationResult<Self> {
        let presence: Vec<bool> = values.iter().map(Option::is_some).collect();
        let mantissas: Vec<i128> = values.into_iter().map(Option::unwrap_or_default).collect();
        let values = OwnedColumn::try_new_decimal(decimal_type, mantissas)?;
        Ok(Self::from_parts(values, presence))
    }

    /// Create a column from values and a presence vector, dropping the vector when it has no nulls.
    pub(crate) fn from_parts(values: OwnedColumn, presence: Vec<bool>) -> Self {
        let presence = presence.contains(&false).then_some(presence);
        Self { values, presence }
    }

    /// A column of `len` nulls.
    #[must_use]
    pub fn nulls(column_type: ColumnType, len: usize) -> Self {
        Self {
            values: OwnedColumn::zeros(column_type, len),
            presence: Some(vec![false; len]),
        }
    }

    /// Returns the length of the column.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the column is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the type of the column.
    #[must_use]
    pub fn column_type(&self) -> ColumnType {
        self.values.column_type()
    }

    /// Check if a specific value is present
    #[must_use]
    pub fn is_present(&self, index: usize) -> bool {
        self.presence
            .as_ref()
            .map_or(true, |presence| presence.get(index).copied().unwrap_or(false))
    }

    /// Check if a specific value is null
    #[must_use]
    pub fn is_null(&self, index: usize) -> bool {
        !self.is_present(index)
    }

    /// The number of null rows
    #[must_use]
    pub fn null_count(&self) -> usize {
        self.presence
            .as_ref()
            .map_or(0, |presence| presence.iter().filter(|present| !**present).count())
    }

    /// The presence of every row, materialized.
    #[must_use]
    pub fn presence_or_all_present(&self) -> Vec<bool> {
        self.presence
            .clone()
            .unwrap_or_else(|| vec![true; self.len()])
    }

    /// The decimal value at `index`, or `None` for nulls and non-exact columns.
    #[must_use]
    pub fn decimal_value(&self, index: usize) -> Option<DecimalValue> {
        if self.is_present(index) {
            self.values.decimal_value(index)
        } else {
            None
        }
    }

    /// Repeats a single-row column `len` times. Columns that already have `len` rows are
    /// returned unchanged.
    pub fn broadcast_to(&self, len: usize) -> ColumnOperationResult<Self> {
        match self.len() {
            current if current == len => Ok(self.clone()),
            1 => Ok(self.take(&vec![0; len])),
            current => Err(ColumnOperationError::DifferentColumnLength {
                len_a: current,
                len_b: len,
            }),
        }
    }

    /// Gathers the rows at `indices`, in that order.
    ///
    /// # Panics
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn take(&self, indices: &[usize]) -> Self {
        Self {
            values: self.values.take(indices),
            presence: self
                .presence
                .as_ref()
                .map(|presence| indices.iter().map(|&i| presence[i]).collect()),
        }
    }

    /// Gathers rows by optional index, where `None` produces a null row.
    ///
    /// # Panics
    /// Panics if an index is out of bounds.
    #[must_use]
    pub fn take_optional(&self, indices: &[Option<usize>]) -> Self {
        if self.is_empty() {
            return Self::nulls(self.column_type(), indices.len());
        }
        let values = self
            .values
            .take(&indices.iter().map(|i| i.unwrap_or(0)).collect::<Vec<_>>());
        let presence = indices
            .iter()
            .map(|i| i.is_some_and(|i| self.is_present(i)))
            .collect();
        Self::from_parts(values, presence)
    }

    /// Returns `len` rows starting at `offset`, clamped to the column.
    #[must_use]
    pub fn slice(&self, offset: usize, len: usize) -> Self {
        let start = offset.min(self.len());
        let end = start.saturating_add(len).min(self.len());
        Self {
            values: self.values.slice(start, end),
            presence: self
                .presence
                .as_ref()
                .map(|presence| presence[start..end].to_vec()),
        }
    }

    /// Keeps the rows where `mask` is true.
    pub fn filter(&self, mask: &[bool]) -> ColumnOperationResult<Self> {
        if mask.len() != self.len() {
            return Err(ColumnOperationError::DifferentColumnLength {
                len_a: self.len(),
                len_b: mask.len(),
            });
        }
        let indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, keep)| keep.then_some(i))
            .collect();
        Ok(self.take(&indices))
    }

    /// Moves rows down by `periods` (up when negative), filling the vacated rows with nulls.
    #[must_use]
    pub fn shift(&self, periods: i64) -> Self {
        let len = self.len();
        let offset = usize::try_from(periods.unsigned_abs()).unwrap_or(usize::MAX);
        let indices: Vec<Option<usize>> = (0..len)
            .map(|row| {
                if periods >= 0 {
                    row.checked_sub(offset)
                } else {
                    row.checked_add(offset).filter(|source| *source < len)
                }
            })
            .collect();
        self.take_optional(&indices)
    }

    /// Concatenates two columns of the same type.
    pub fn try_append(&self, other: &Self) -> ColumnOperationResult<Self> {
        let values = self.values.try_append(&other.values)?;
        let presence = match (&self.presence, &other.presence) {
            (None, None) => None,
            _ => Some(
                [self.presence_or_all_present(), other.presence_or_all_present()].concat(),
            ),
        };
        Ok(Self { values, presence })
    }

    /// Renders every row as text, with `null` for missing rows.
    #[must_use]
    pub fn format_values(&self, options: &DecimalFormatOptions) -> Vec<String> {
        (0..self.len())
            .map(|row| {
                if self.is_present(row) {
                    self.values.format_value(row, options)
                } else {
                    "null".to_string()
                }
            })
            .collect()
    }
}

/// Combines the presence of two columns of equal length: a row is present only when it is
/// present on both sides.
pub(crate) fn combine_presence(
    lhs: &OwnedNullableColumn,
    rhs: &OwnedNullableColumn,
) -> Option<Vec<bool>> {
    match (&lhs.presence, &rhs.presence) {
        (Some(lhs), Some(rhs)) => Some(lhs.iter().zip(rhs).map(|(l, r)| *l && *r).collect()),
        (Some(presence), None) | (None, Some(presence)) => Some(presence.clone()),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimals(scale: u8, values: Vec<Option<i128>>) -> OwnedNullableColumn {
        OwnedNullableColumn::try_from_decimal_options(
            DecimalType::unconstrained(scale).unwrap(),
            values,
        )
        .unwrap()
    }

    #[test]
    fn we_cannot_create_columns_with_mismatched_presence() {
        assert_eq!(
            OwnedNullableColumn::with_presence(OwnedColumn::BigInt(vec![1, 2]), Some(vec![true])),
            Err(ColumnOperationError::PresenceLengthMismatch {
                presence_len: 1,
                column_len: 2
            })
        );
    }

    #[test]
    fn we_can_create_decimal_columns_from_options() {
        let column = decimals(2, vec![Some(10), None, Some(-5)]);
        assert_eq!(column.presence, Some(vec![true, false, true]));
        assert_eq!(column.null_count(), 1);
        assert!(column.is_null(1));
        assert_eq!(column.decimal_value(1), None);
        assert_eq!(column.decimal_value(2), Some("-0.05".parse().unwrap()));
        let column = decimals(2, vec![Some(10)]);
        assert_eq!(column.presence, None);
    }

    #[test]
    fn we_can_broadcast_single_rows() {
        let column = decimals(1, vec![Some(15)]);
        let broadcast = column.broadcast_to(3).unwrap();
        assert_eq!(broadcast, decimals(1, vec![Some(15), Some(15), Some(15)]));
        assert_eq!(
            decimals(1, vec![Some(1), Some(2)]).broadcast_to(3),
            Err(ColumnOperationError::DifferentColumnLength { len_a: 2, len_b: 3 })
        );
    }

    #[test]
    fn we_can_shift_columns_in_both_directions() {
        let column = decimals(1, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(column.shift(1), decimals(1, vec![None, Some(1), Some(2)]));
        assert_eq!(column.shift(-2), decimals(1, vec![Some(3), None, None]));
        assert_eq!(column.shift(5), decimals(1, vec![None, None, None]));
        assert_eq!(column.shift(0), column);
    }

    #[test]
    fn we_can_filter_slice_and_append() {
        let column = decimals(1, vec![Some(1), None, Some(3)]);
        assert_eq!(
            column.filter(&[true, true, false]).unwrap(),
            decimals(1, vec![Some(1), None])
        );
        assert!(column.filter(&[true]).is_err());
        assert_eq!(column.slice(1, 10), decimals(1, vec![None, Some(3)]));
        assert_eq!(column.slice(5, 1).len(), 0);
        let appended = column.try_append(&decimals(1, vec![Some(4)])).unwrap();
        assert_eq!(appended, decimals(1, vec![Some(1), None, Some(3), Some(4)]));
    }

    #[test]
    fn we_can_format_nullable_columns() {
        let column = decimals(2, vec![Some(0), None, Some(-150)]);
        assert_eq!(
            column.format_values(&DecimalFormatOptions::trimmed()),
            vec!["0", "null", "-1.5"]
        );
        assert_eq!(
            column.format_values(&DecimalFormatOptions::default()),
            vec!["0.00", "null", "-1.50"]
        );
    }

    #[test]
    fn we_can_combine_presence() {
        let lhs = decimals(0, vec![Some(1), None, Some(3)]);
        let rhs = decimals(0, vec![None, Some(2), Some(3)]);
        assert_eq!(
            combine_presence(&lhs, &rhs),
            Some(vec![false, false, true])
        );
        let all = decimals(0, vec![Some(1), Some(2), Some(3)]);
        assert_eq!(combine_presence(&all, &all), None);
        assert_eq!(combine_presence(&lhs, &all), lhs.presence);
    }
}
