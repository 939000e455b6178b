use super::{
    aggregate_util::QuantileMethod,
    group_by_util::{GroupBy, GroupKey},
    ColumnOperationError, DecimalType, OwnedColumn, OwnedNullableColumn,
};
use crate::base::math::{decimal_format::DecimalFormatOptions, DecimalValue};

fn decimal_type(scale: u8) -> DecimalType {
    DecimalType::unconstrained(scale).unwrap()
}

fn decimals(scale: u8, values: Vec<i128>) -> OwnedNullableColumn {
    OwnedNullableColumn::new(OwnedColumn::Decimal(decimal_type(scale), values))
}

fn nullable_decimals(scale: u8, values: Vec<Option<i128>>) -> OwnedNullableColumn {
    OwnedNullableColumn::try_from_decimal_options(decimal_type(scale), values).unwrap()
}

fn floats(values: Vec<Option<f64>>) -> OwnedNullableColumn {
    OwnedNullableColumn::from_parts(
        OwnedColumn::Float64(values.iter().map(|v| v.unwrap_or_default()).collect()),
        values.iter().map(Option::is_some).collect(),
    )
}

fn formatted(column: &OwnedNullableColumn) -> Vec<String> {
    column.format_values(&DecimalFormatOptions::default())
}

// Keys x, y, x, null, y
fn keys() -> OwnedNullableColumn {
    OwnedNullableColumn::with_presence(
        OwnedColumn::VarChar(vec![
            "x".into(),
            "y".into(),
            "x".into(),
            String::new(),
            "y".into(),
        ]),
        Some(vec![true, true, true, false, true]),
    )
    .unwrap()
}

// 1.0, 2.0, 3.0, 4.0, null
fn values() -> OwnedNullableColumn {
    nullable_decimals(1, vec![Some(10), Some(20), Some(30), Some(40), None])
}

#[test]
fn we_can_group_rows_in_first_appearance_order() {
    let group_by = GroupBy::new(&keys());
    assert_eq!(group_by.group_count(), 3);
    assert_eq!(group_by.groups(), &[vec![0, 2], vec![1, 4], vec![3]]);
    assert_eq!(formatted(group_by.keys()), vec!["x", "y", "null"]);
}

#[test]
fn we_can_sum_prices_by_group() {
    let keys = OwnedNullableColumn::new(OwnedColumn::BigInt(vec![1, 1, 2, 2]));
    // 0.1, 10.1, 100.01, 9000.12
    let prices = decimals(2, vec![10, 1_010, 10_001, 900_012]);
    let group_by = GroupBy::new(&keys);
    assert_eq!(
        group_by.agg_sum(&prices).unwrap(),
        decimals(2, vec![1_020, 910_013])
    );
}

#[test]
fn we_can_aggregate_each_group_exactly() {
    let group_by = GroupBy::new(&keys());
    let values = values();
    assert_eq!(group_by.agg_sum(&values).unwrap(), decimals(1, vec![40, 20, 40]));
    assert_eq!(group_by.agg_min(&values).unwrap(), decimals(1, vec![10, 20, 40]));
    assert_eq!(group_by.agg_max(&values).unwrap(), decimals(1, vec![30, 20, 40]));
}

#[test]
fn we_can_aggregate_each_group_statistically() {
    let group_by = GroupBy::new(&keys());
    let values = values();
    assert_eq!(
        group_by.agg_mean(&values).unwrap(),
        floats(vec![Some(2.0), Some(2.0), Some(4.0)])
    );
    assert_eq!(
        group_by.agg_median(&values).unwrap(),
        floats(vec![Some(2.0), Some(2.0), Some(4.0)])
    );
    assert_eq!(
        group_by.agg_var(&values, 1).unwrap(),
        floats(vec![Some(2.0), None, None])
    );
    assert_eq!(
        group_by.agg_std(&values, 0).unwrap(),
        floats(vec![Some(1.0), Some(0.0), Some(0.0)])
    );
    assert_eq!(
        group_by
            .agg_quantile(&values, 1.0, QuantileMethod::Lower)
            .unwrap(),
        floats(vec![Some(3.0), Some(2.0), Some(4.0)])
    );
}

#[test]
fn groups_without_present_rows_aggregate_to_null_or_zero() {
    let keys = OwnedNullableColumn::new(OwnedColumn::BigInt(vec![1, 2]));
    let values = nullable_decimals(1, vec![Some(5), None]);
    let group_by = GroupBy::new(&keys);
    assert_eq!(group_by.agg_sum(&values).unwrap(), decimals(1, vec![5, 0]));
    assert_eq!(
        group_by.agg_max(&values).unwrap(),
        nullable_decimals(1, vec![Some(5), None])
    );
    assert_eq!(
        group_by.agg_mean(&values).unwrap(),
        floats(vec![Some(0.5), None])
    );
}

#[test]
fn we_can_list_the_rows_of_each_group() {
    let group_by = GroupBy::new(&keys());
    let lists = group_by.agg_list(&values()).unwrap();
    assert_eq!(lists.len(), 3);
    assert_eq!(formatted(&lists[0]), vec!["1.0", "3.0"]);
    assert_eq!(formatted(&lists[1]), vec!["2.0", "null"]);
    assert_eq!(formatted(&lists[2]), vec!["4.0"]);
}

#[test]
fn we_can_broadcast_group_results_over_rows() {
    let group_by = GroupBy::new(&keys());
    let sums = group_by.agg_sum(&values()).unwrap();
    assert_eq!(
        group_by.over(&sums).unwrap(),
        decimals(1, vec![40, 20, 40, 40, 20])
    );
    assert_eq!(
        group_by.over(&decimals(1, vec![1])),
        Err(ColumnOperationError::ParameterLengthMismatch {
            parameter_len: 1,
            column_len: 3
        })
    );
}

#[test]
fn we_can_shift_within_groups() {
    let group_by = GroupBy::new(&keys());
    let values = values();
    assert_eq!(
        formatted(&group_by.shift_over(&values, 1).unwrap()),
        vec!["null", "null", "1.0", "null", "2.0"]
    );
    assert_eq!(
        formatted(&group_by.shift_over(&values, -1).unwrap()),
        vec!["3.0", "null", "null", "null", "null"]
    );
    assert_eq!(
        formatted(&group_by.shift_over(&values, 0).unwrap()),
        formatted(&values)
    );
}

#[test]
fn we_cannot_aggregate_columns_of_another_length_or_type() {
    let group_by = GroupBy::new(&keys());
    assert_eq!(
        group_by.agg_sum(&decimals(1, vec![1, 2, 3])),
        Err(ColumnOperationError::DifferentColumnLength { len_a: 5, len_b: 3 })
    );
    assert!(matches!(
        group_by.agg_mean(&OwnedNullableColumn::new(OwnedColumn::BigInt(vec![1; 5]))),
        Err(ColumnOperationError::UnaryOperationInvalidColumnType { .. })
    ));
}

#[test]
fn decimal_keys_group_by_value() {
    let keys = decimals(2, vec![110, 110, 250]);
    assert_eq!(
        GroupKey::from_column_row(&keys, 0),
        GroupKey::Decimal(DecimalValue::new(11, 1).unwrap())
    );
    assert_eq!(GroupBy::new(&keys).group_count(), 2);
}
