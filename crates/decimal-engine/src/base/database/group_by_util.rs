//! Group-wise aggregation keyed by a column, in first-appearance order of the keys.
use super::{
    aggregate_util::QuantileMethod, ColumnOperationError, ColumnOperationResult, DecimalType,
    OwnedColumn, OwnedNullableColumn,
};
use crate::base::{
    if_rayon,
    map::IndexMap,
    math::DecimalValue,
};
use decimal_engine_parser::operator::UnaryOperator;
#[cfg(feature = "rayon")]
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

/// The hashable value of one row, used to assign rows to groups. Nulls form one group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// A null row
    Null,
    /// A boolean
    Boolean(bool),
    /// An integer
    BigInt(i64),
    /// The bit pattern of a float
    Float64(u64),
    /// A string
    VarChar(String),
    /// A decimal, compared by value
    Decimal(DecimalValue),
}

impl GroupKey {
    /// The key of the row at `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn from_column_row(column: &OwnedNullableColumn, index: usize) -> Self {
        if column.is_null(index) {
            return GroupKey::Null;
        }
        match &column.values {
            OwnedColumn::Boolean(values) => GroupKey::Boolean(values[index]),
            OwnedColumn::BigInt(values) => GroupKey::BigInt(values[index]),
            OwnedColumn::Float64(values) => GroupKey::Float64(values[index].to_bits()),
            OwnedColumn::VarChar(values) => GroupKey::VarChar(values[index].clone()),
            OwnedColumn::Decimal(decimal_type, values) => {
                DecimalValue::new(values[index], decimal_type.scale())
                    .map_or(GroupKey::Null, GroupKey::Decimal)
            }
        }
    }
}

/// Rows of a column partitioned by key.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBy {
    keys: OwnedNullableColumn,
    groups: Vec<Vec<usize>>,
    row_groups: Vec<usize>,
}

impl GroupBy {
    /// Groups the rows of `keys` by value.
    #[tracing::instrument(name = "GroupBy::new", level = "debug", skip_all)]
    #[must_use]
    pub fn new(keys: &OwnedNullableColumn) -> Self {
        let mut map: IndexMap<GroupKey, Vec<usize>> = IndexMap::default();
        let row_groups = (0..keys.len())
            .map(|row| {
                let entry = map.entry(GroupKey::from_column_row(keys, row));
                let group = entry.index();
                entry.or_default().push(row);
                group
            })
            .collect();
        let groups: Vec<Vec<usize>> = map.into_values().collect();
        let first_rows: Vec<usize> = groups.iter().map(|rows| rows[0]).collect();
        Self {
            keys: keys.take(&first_rows),
            groups,
            row_groups,
        }
    }

    /// One row per group holding its key.
    #[must_use]
    pub fn keys(&self) -> &OwnedNullableColumn {
        &self.keys
    }

    /// The rows of every group.
    #[must_use]
    pub fn groups(&self) -> &[Vec<usize>] {
        &self.groups
    }

    /// The number of groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn check_len(&self, column: &OwnedNullableColumn) -> ColumnOperationResult<()> {
        if column.len() == self.row_groups.len() {
            Ok(())
        } else {
            Err(ColumnOperationError::DifferentColumnLength {
                len_a: self.row_groups.len(),
                len_b: column.len(),
            })
        }
    }

    /// Applies `f` to the rows of each group of `column`.
    fn try_map_groups<T, F>(
        &self,
        column: &OwnedNullableColumn,
        operator: UnaryOperator,
        f: F,
    ) -> ColumnOperationResult<(DecimalType, Vec<T>)>
    where
        T: Send,
        F: Fn(&OwnedNullableColumn) -> ColumnOperationResult<T> + Send + Sync,
    {
        self.check_len(column)?;
        let OwnedColumn::Decimal(decimal_type, _) = &column.values else {
            return Err(ColumnOperationError::UnaryOperationInvalidColumnType {
                operator,
                operand_type: column.column_type(),
            });
        };
        let results = if_rayon!(
            self.groups
                .par_iter()
                .map(|rows| f(&column.take(rows)))
                .collect::<ColumnOperationResult<Vec<_>>>(),
            self.groups
                .iter()
                .map(|rows| f(&column.take(rows)))
                .collect::<ColumnOperationResult<Vec<_>>>()
        )?;
        Ok((*decimal_type, results))
    }

    fn try_agg_f64<F>(
        &self,
        column: &OwnedNullableColumn,
        operator: UnaryOperator,
        f: F,
    ) -> ColumnOperationResult<OwnedNullableColumn>
    where
        F: Fn(&OwnedNullableColumn) -> ColumnOperationResult<Option<f64>> + Send + Sync,
    {
        let (_, results) = self.try_map_groups(column, operator, f)?;
        Ok(OwnedNullableColumn::from_parts(
            OwnedColumn::Float64(results.iter().map(|value| value.unwrap_or_default()).collect()),
            results.iter().map(Option::is_some).collect(),
        ))
    }

    fn try_agg_decimal<F>(
        &self,
        column: &OwnedNullableColumn,
        operator: UnaryOperator,
        f: F,
    ) -> ColumnOperationResult<OwnedNullableColumn>
    where
        F: Fn(&OwnedNullableColumn) -> ColumnOperationResult<Option<DecimalValue>> + Send + Sync,
    {
        let (decimal_type, results) = self.try_map_groups(column, operator, f)?;
        OwnedNullableColumn::try_from_decimal_options(
            decimal_type,
            results
                .iter()
                .map(|value| value.map(|value| value.mantissa()))
                .collect(),
        )
    }

    /// The sum of each group at the column's scale. Groups without present rows sum to zero.
    pub fn agg_sum(&self, column: &OwnedNullableColumn) -> ColumnOperationResult<OwnedNullableColumn> {
        let (decimal_type, sums) =
            self.try_map_groups(column, UnaryOperator::Sum, OwnedNullableColumn::sum)?;
        Ok(OwnedNullableColumn::new(OwnedColumn::Decimal(
            DecimalType::unconstrained(decimal_type.scale())?,
            sums.iter().map(DecimalValue::mantissa).collect(),
        )))
    }

    /// The smallest value of each group, null for groups without present rows.
    pub fn agg_min(&self, column: &OwnedNullableColumn) -> ColumnOperationResult<OwnedNullableColumn> {
        self.try_agg_decimal(column, UnaryOperator::Min, OwnedNullableColumn::min)
    }

    /// The largest value of each group, null for groups without present rows.
    pub fn agg_max(&self, column: &OwnedNullableColumn) -> ColumnOperationResult<OwnedNullableColumn> {
        self.try_agg_decimal(column, UnaryOperator::Max, OwnedNullableColumn::max)
    }

    /// The mean of each group.
    pub fn agg_mean(&self, column: &OwnedNullableColumn) -> ColumnOperationResult<OwnedNullableColumn> {
        self.try_agg_f64(column, UnaryOperator::Mean, OwnedNullableColumn::mean)
    }

    /// The median of each group.
    pub fn agg_median(
        &self,
        column: &OwnedNullableColumn,
    ) -> ColumnOperationResult<OwnedNullableColumn> {
        self.try_agg_f64(column, UnaryOperator::Median, OwnedNullableColumn::median)
    }

    /// The standard deviation of each group.
    pub fn agg_std(
        &self,
        column: &OwnedNullableColumn,
        ddof: u8,
    ) -> ColumnOperationResult<OwnedNullableColumn> {
        self.try_agg_f64(column, UnaryOperator::Std, |group| group.std(ddof))
    }

    /// The variance of each group.
    pub fn agg_var(
        &self,
        column: &OwnedNullableColumn,
        ddof: u8,
    ) -> ColumnOperationResult<OwnedNullableColumn> {
        self.try_agg_f64(column, UnaryOperator::Var, |group| group.var(ddof))
    }

    /// The `q`-quantile of each group.
    pub fn agg_quantile(
        &self,
        column: &OwnedNullableColumn,
        q: f64,
        method: QuantileMethod,
    ) -> ColumnOperationResult<OwnedNullableColumn> {
        self.try_agg_f64(column, UnaryOperator::Quantile, |group| {
            group.quantile(q, method)
        })
    }

    /// The rows of each group, in row order.
    pub fn agg_list(
        &self,
        column: &OwnedNullableColumn,
    ) -> ColumnOperationResult<Vec<OwnedNullableColumn>> {
        self.check_len(column)?;
        Ok(self.groups.iter().map(|rows| column.take(rows)).collect())
    }

    /// Broadcasts one value per group back to every row of that group.
    pub fn over(&self, aggregated: &OwnedNullableColumn) -> ColumnOperationResult<OwnedNullableColumn> {
        if aggregated.len() != self.groups.len() {
            return Err(ColumnOperationError::ParameterLengthMismatch {
                parameter_len: aggregated.len(),
                column_len: self.groups.len(),
            });
        }
        Ok(aggregated.take(&self.row_groups))
    }

    /// Shifts `column` by `periods` within each group. Rows shifted in from outside their
    /// group are null.
    pub fn shift_over(
        &self,
        column: &OwnedNullableColumn,
        periods: i64,
    ) -> ColumnOperationResult<OwnedNullableColumn> {
        self.check_len(column)?;
        let offset = usize::try_from(periods.unsigned_abs()).unwrap_or(usize::MAX);
        let mut sources = vec![None; column.len()];
        for rows in &self.groups {
            for (position, row) in rows.iter().enumerate() {
                let source = if periods >= 0 {
                    position.checked_sub(offset)
                } else {
                    position.checked_add(offset)
                };
                sources[*row] = source.and_then(|source| rows.get(source).copied());
            }
        }
        Ok(column.take_optional(&sources))
    }
}
