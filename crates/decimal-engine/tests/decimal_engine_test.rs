use decimal_engine::base::{
    database::{
        aggregate_util::{max_horizontal, min_horizontal, sum_horizontal},
        decimal_inference::{infer_decimal_type, try_decimal_column_from_literals, InferenceMode},
        group_by_util::GroupBy,
        try_binary_operation, CastOptions, ColumnOperationError, ColumnType, ColumnarValue,
        DecimalType, LiteralValue, OwnedColumn, OwnedNullableColumn,
    },
    math::{
        decimal::DecimalError, decimal_format::DecimalFormatOptions, DecimalValue, Precision,
    },
};
use decimal_engine_parser::operator::BinaryOperator;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn decimal(text: &str) -> LiteralValue {
    LiteralValue::Decimal(text.parse::<DecimalValue>().unwrap())
}

fn text(value: &str) -> LiteralValue {
    LiteralValue::VarChar(value.to_string())
}

fn untrimmed(column: &OwnedNullableColumn) -> Vec<String> {
    column.format_values(&DecimalFormatOptions::default())
}

fn trimmed(column: &OwnedNullableColumn) -> Vec<String> {
    column.format_values(&DecimalFormatOptions::trimmed())
}

fn into_column(value: ColumnarValue) -> OwnedNullableColumn {
    match value {
        ColumnarValue::Column(column) => column,
        ColumnarValue::Literal(literal) => panic!("expected a column, got {literal:?}"),
    }
}

// 0.1, 10.1, 100.01, 9000.12 and a null
fn prices() -> OwnedNullableColumn {
    try_decimal_column_from_literals(
        &[
            text("0.1"),
            text("10.1"),
            text("100.01"),
            text("9000.12"),
            LiteralValue::Null,
        ],
        None,
        InferenceMode::Lenient,
    )
    .unwrap()
}

#[test]
fn we_can_infer_a_strict_decimal_column_and_render_it() {
    init_tracing();
    let values = [decimal("0.1"), decimal("0.10"), decimal("1.0121")];
    let column = try_decimal_column_from_literals(&values, None, InferenceMode::Strict).unwrap();
    assert_eq!(
        column.column_type(),
        ColumnType::Decimal(DecimalType::unconstrained(4).unwrap())
    );
    assert_eq!(untrimmed(&column), vec!["0.1000", "0.1000", "1.0121"]);
    assert_eq!(trimmed(&column), vec!["0.1", "0.1", "1.0121"]);
}

#[test]
fn strict_inference_rejects_floats_and_lenient_inference_rounds_them() {
    init_tracing();
    let values = [LiteralValue::Float(1.005), LiteralValue::Float(1.015)];
    assert!(matches!(
        infer_decimal_type(&values, None, InferenceMode::Strict),
        Err(ColumnOperationError::CastingError { .. })
    ));
    let target = DecimalType::try_with_precision(10, 2).unwrap();
    let column =
        try_decimal_column_from_literals(&values, Some(target), InferenceMode::Lenient).unwrap();
    assert_eq!(untrimmed(&column), vec!["1.00", "1.02"]);
}

#[test]
fn we_can_render_a_value_with_and_without_trailing_zeros() {
    let value = DecimalValue::new(100, 4).unwrap();
    assert_eq!(value.format(&DecimalFormatOptions::trimmed()), "0.01");
    assert_eq!(value.format(&DecimalFormatOptions::default()), "0.0100");
}

#[test]
fn we_cannot_declare_a_precision_beyond_38() {
    assert!(Precision::new(38).is_ok());
    assert!(matches!(
        DecimalType::try_with_precision(76, 2),
        Err(DecimalError::PrecisionOverflow { precision: 38, .. })
    ));
    assert!(serde_json::from_str::<DecimalType>(r#"{"precision":76,"scale":2}"#).is_err());
}

#[test]
fn we_cannot_cast_floats_to_a_decimal_wider_than_38_digits() {
    init_tracing();
    let floats = OwnedNullableColumn::new(OwnedColumn::Float64(vec![0.1, 2.5]));
    let cast = DecimalType::try_with_precision(76, 38)
        .map_err(ColumnOperationError::from)
        .and_then(|target| floats.try_cast(ColumnType::Decimal(target), CastOptions::default()));
    assert_eq!(
        cast,
        Err(ColumnOperationError::DecimalConversionError {
            source: DecimalError::PrecisionOverflow {
                value: "DECIMAL(76, 38)".to_string(),
                precision: 38
            }
        })
    );
}

#[test]
fn we_can_aggregate_prices_inferred_from_text() {
    init_tracing();
    let prices = prices();
    assert_eq!(prices.null_count(), 1);
    let sum = prices.sum().unwrap();
    assert_eq!(sum.format(&DecimalFormatOptions::default()), "9110.33");
    assert_eq!(
        prices.min().unwrap(),
        Some(DecimalValue::new(10, 2).unwrap())
    );
    assert_eq!(
        prices.max().unwrap(),
        Some(DecimalValue::new(900_012, 2).unwrap())
    );
    let mean = prices.mean().unwrap().unwrap();
    assert!((mean - 2_277.582_5).abs() < 1e-9);
    let median = prices.median().unwrap().unwrap();
    assert!((median - 55.055).abs() < 1e-9);
    assert_eq!(prices.sum_chunked(2).unwrap(), sum);
    assert_eq!(
        untrimmed(&prices.cum_sum().unwrap()),
        vec!["0.10", "10.20", "110.21", "9110.33", "null"]
    );
}

#[test]
fn literals_take_the_scale_of_the_decimal_operand() {
    init_tracing();
    let prices = ColumnarValue::Column(
        try_decimal_column_from_literals(
            &[decimal("1.50"), decimal("2.25")],
            None,
            InferenceMode::Strict,
        )
        .unwrap(),
    );
    let doubled = try_binary_operation(
        &prices,
        &ColumnarValue::Literal(LiteralValue::Integer(2)),
        BinaryOperator::Multiply,
    )
    .unwrap();
    assert_eq!(untrimmed(&into_column(doubled.clone())), vec!["3.0000", "4.5000"]);
    let thirds = try_binary_operation(
        &doubled,
        &ColumnarValue::Literal(LiteralValue::Integer(3)),
        BinaryOperator::Division,
    )
    .unwrap();
    assert_eq!(
        untrimmed(&into_column(thirds)),
        vec!["1.00000000", "1.50000000"]
    );
    let shifted = try_binary_operation(
        &prices,
        &ColumnarValue::Literal(LiteralValue::Float(0.5)),
        BinaryOperator::Add,
    )
    .unwrap();
    assert_eq!(untrimmed(&into_column(shifted)), vec!["2.00", "2.75"]);
}

#[test]
fn we_can_reduce_columns_horizontally() {
    init_tracing();
    let a = try_decimal_column_from_literals(
        &[decimal("1.111"), decimal("5"), LiteralValue::Null],
        None,
        InferenceMode::Strict,
    )
    .unwrap();
    let b = try_decimal_column_from_literals(
        &[decimal("2.22"), LiteralValue::Null, LiteralValue::Null],
        None,
        InferenceMode::Strict,
    )
    .unwrap();
    let c = try_decimal_column_from_literals(
        &[decimal("3.3"), LiteralValue::Null, LiteralValue::Null],
        None,
        InferenceMode::Strict,
    )
    .unwrap();
    let columns = [a, b, c];
    assert_eq!(
        untrimmed(&sum_horizontal(&columns).unwrap()),
        vec!["6.631", "5.000", "null"]
    );
    assert_eq!(
        untrimmed(&min_horizontal(&columns).unwrap()),
        vec!["1.111", "5.000", "null"]
    );
    assert_eq!(
        untrimmed(&max_horizontal(&columns).unwrap()),
        vec!["3.300", "5.000", "null"]
    );
}

#[test]
fn we_can_sum_prices_by_group_and_broadcast_the_sums_back() {
    init_tracing();
    let keys = OwnedNullableColumn::new(OwnedColumn::VarChar(vec![
        "a".to_string(),
        "b".to_string(),
        "a".to_string(),
    ]));
    let prices = try_decimal_column_from_literals(
        &[text("0.10"), text("9000.12"), text("10.10")],
        None,
        InferenceMode::Lenient,
    )
    .unwrap();
    let group_by = GroupBy::new(&keys);
    let sums = group_by.agg_sum(&prices).unwrap();
    assert_eq!(untrimmed(&sums), vec!["10.20", "9000.12"]);
    assert_eq!(
        untrimmed(&group_by.over(&sums).unwrap()),
        vec!["10.20", "9000.12", "10.20"]
    );
}

#[test]
fn we_can_cast_decimals_to_text_and_back() {
    init_tracing();
    let column = try_decimal_column_from_literals(
        &[decimal("0.0100"), LiteralValue::Null],
        None,
        InferenceMode::Strict,
    )
    .unwrap();
    let text_column = column
        .try_cast(ColumnType::VarChar, CastOptions::default())
        .unwrap();
    assert_eq!(untrimmed(&text_column), vec!["0.0100", "null"]);
    let decimal_type = column.column_type();
    assert_eq!(
        text_column
            .try_cast(decimal_type, CastOptions::default())
            .unwrap(),
        column
    );
}

#[test]
fn non_strict_casts_turn_failing_rows_into_nulls() {
    init_tracing();
    let column = OwnedNullableColumn::new(OwnedColumn::VarChar(vec![
        "1.5".to_string(),
        "abc".to_string(),
        "1.25".to_string(),
    ]));
    let to_type = ColumnType::Decimal(DecimalType::try_with_precision(5, 1).unwrap());
    assert!(matches!(
        column.try_cast(to_type, CastOptions::default()),
        Err(ColumnOperationError::RowConversionError { row: 1, .. })
    ));
    let cast = column.try_cast(to_type, CastOptions::non_strict()).unwrap();
    assert_eq!(untrimmed(&cast), vec!["1.5", "null", "null"]);
}

#[cfg(feature = "arrow")]
#[test]
fn we_can_round_trip_a_nullable_decimal_column_through_arrow() {
    use arrow::array::{Array, ArrayRef};

    init_tracing();
    let prices = prices();
    let array = ArrayRef::try_from(&prices).unwrap();
    assert_eq!(array.len(), 5);
    assert_eq!(array.null_count(), 1);
    let read_back = OwnedNullableColumn::try_from(array).unwrap();
    assert_eq!(
        read_back.column_type(),
        ColumnType::Decimal(DecimalType::try_with_precision(38, 2).unwrap())
    );
    assert_eq!(untrimmed(&read_back), untrimmed(&prices));
}
