use chrono::NaiveDate;
use user_query::prelude::*;

fn schema() -> Schema {
    let clock = Clock::fixed(
        NaiveDate::from_ymd_opt(2006, 2, 4)
            .unwrap()
            .and_hms_opt(0, 30, 15)
            .unwrap(),
    );
    Schema::for_table("entries")
        .with_clock(clock)
        .field(("id", FieldType::Number))
        .field(("memo", FieldType::String))
        .field(("posted_at", FieldType::Datetime))
        .field(("amount", FieldType::Money))
        .field(("flagged", FieldType::Boolean))
}

#[test]
fn test_full_form_submission() {
    let params = [
        ("id", "> 100"),
        ("memo", "lunch OR dinner"),
        ("amount", "BETWEEN $5 AND $20"),
    ];
    let mut errors = FieldErrors::new();
    let sql = schema().sql(&params[..], &mut errors).expect("predicate");
    assert_eq!(
        sql,
        "(entries.id > 100) AND \
         ((entries.memo LIKE '%lunch%') OR (entries.memo LIKE '%dinner%')) AND \
         ((entries.amount >= 500) AND (entries.amount <= 2000))"
    );
    assert!(errors.is_empty());
}

#[test]
fn test_one_bad_field_does_not_block_the_rest() {
    let params = [("id", "$$$"), ("memo", "lunch")];
    let mut errors = FieldErrors::new();
    let sql = schema().sql(&params[..], &mut errors).expect("predicate");
    assert_eq!(sql, "(entries.memo LIKE '%lunch%')");
    assert_eq!(errors.len(), 1);
    assert!(errors.get("id")[0].contains("number field"));
}

#[test]
fn test_all_fields_failing_yields_no_sql() {
    let params = [("id", "abc"), ("flagged", "maybe")];
    let mut errors = FieldErrors::new();
    assert_eq!(schema().sql(&params[..], &mut errors), None);
    assert_eq!(errors.len(), 2);
}

#[test]
fn test_unknown_parameters_are_ignored() {
    let params = [("utm_source", "newsletter"), ("memo", "lunch")];
    let mut errors = FieldErrors::new();
    let sql = schema().sql(&params[..], &mut errors).unwrap();
    assert_eq!(sql, "(entries.memo LIKE '%lunch%')");
    assert!(errors.is_empty());
}

#[test]
fn test_datetime_inputs_widen_to_ranges() {
    let cases = [
        (
            "2006",
            "((entries.posted_at >= '2006-01-01 00:00:00') AND \
             (entries.posted_at < '2007-01-01 00:00:00'))",
        ),
        (
            "12/31/2005 11:59:59pm",
            "((entries.posted_at >= '2005-12-31 23:59:59') AND \
             (entries.posted_at < '2006-01-01 00:00:00'))",
        ),
        ("BEFORE 2005", "(entries.posted_at < '2005-01-01 00:00:00')"),
        (
            "yesterday",
            "((entries.posted_at >= '2006-02-03 00:00:00') AND \
             (entries.posted_at < '2006-02-04 00:00:00'))",
        ),
    ];
    for (input, expected) in cases {
        let params = [("posted_at", input)];
        let mut errors = FieldErrors::new();
        let sql = schema().sql(&params[..], &mut errors).unwrap();
        assert_eq!(sql, expected, "for input {input:?}");
        assert!(errors.is_empty(), "for input {input:?}");
    }
}

#[test]
fn test_boolean_and_null() {
    let params = [("flagged", "true"), ("memo", "NULL")];
    let mut errors = FieldErrors::new();
    let sql = schema().sql(&params[..], &mut errors).unwrap();
    assert_eq!(sql, "(entries.flagged = 1) AND (entries.memo IS NULL)");
}

#[test]
fn test_placeholder_mode_binds_in_field_order() {
    let params = [("id", "BETWEEN 1 AND 5"), ("memo", "lunch")];
    let mut errors = FieldErrors::new();
    let (sql, values) = schema()
        .sql_with_values(&params[..], &mut errors)
        .expect("predicate");
    assert_eq!(
        sql,
        "((entries.id >= ?) AND (entries.id <= ?)) AND (entries.memo LIKE ?)"
    );
    assert_eq!(
        values,
        [
            SqlValue::Int(1),
            SqlValue::Int(5),
            SqlValue::Text("%lunch%".into()),
        ]
    );
}

#[test]
fn test_schema_built_from_table_description() {
    let desc = TableDesc::from_json(
        r#"{
            "name": "entries",
            "columns": [
                { "name": "memo", "type": "varchar" },
                { "name": "total", "type": "integer" }
            ]
        }"#,
    )
    .expect("valid table description");

    let schema = Schema::new().table(&desc);
    let params = [("total", ">= 10")];
    let mut errors = FieldErrors::new();
    let sql = schema.sql(&params[..], &mut errors).unwrap();
    assert_eq!(sql, "(entries.total >= 10)");
}

#[test]
fn test_parser_keywords_surface_search_terms() {
    let mut parser = Parser::new(FieldType::String);
    parser.parse("foo \"bar baz\" OR quux").unwrap();
    assert_eq!(parser.keywords(), ["foo", "bar baz", "quux"]);
}
