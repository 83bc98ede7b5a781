//! End-to-end checks of the full bind/check pipeline.

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use vetter::prelude::*;

fn map(value: Value) -> ValueMap {
    value.as_object().cloned().unwrap_or_default()
}

fn user_engine() -> Engine {
    let mut engine = Engine::new();
    engine
        .bind("age", ParamKind::Int, "年龄")
        .required()
        .between(0, 150)
        .gt(18);
    engine
        .bind("name", ParamKind::String, "用户名")
        .required()
        .length(2, 32);
    engine
        .bind("status", ParamKind::Array, "状态")
        .value_type([ParamKind::Int])
        .one_of([json!(0), json!(1)])
        .default_to(json!([0, 1]));
    engine
}

#[test]
fn happy_path_coerces_and_keys_output() {
    let engine = user_engine();
    let out = engine
        .check(&map(json!({"age": "42", "name": "阿白"})))
        .unwrap();
    assert_eq!(out["age"], json!(42));
    assert_eq!(out["name"], json!("阿白"));
    // The injected default passes its own rules and is coerced.
    assert_eq!(out["status"], json!([0, 1]));
}

#[test]
fn missing_required_uses_display_comment() {
    let engine = user_engine();
    let err = engine.check(&map(json!({"name": "阿白"}))).unwrap_err();
    assert_eq!(err.to_string(), "很抱歉、年龄不能为空！");
    assert_eq!(err.category(), "required");
}

#[test]
fn out_of_range_age_renders_between_message() {
    let engine = user_engine();
    let err = engine
        .check(&map(json!({"age": "200", "name": "阿白"})))
        .unwrap_err();
    match err {
        VetError::RuleFailed { param, rule, message } => {
            assert_eq!(param, "age");
            assert_eq!(rule, "between");
            assert_eq!(message, "很抱歉、年龄只能在0,150之间！");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn gt_failure_renders_condition() {
    let engine = user_engine();
    let err = engine
        .check(&map(json!({"age": 18, "name": "阿白"})))
        .unwrap_err();
    assert_eq!(err.to_string(), "很抱歉、年龄必须大于18！");
}

#[rstest]
#[case(json!("a"), false)] // too short
#[case(json!("ab"), true)]
#[case(json!("一二三四"), true)] // counted in chars, not bytes
#[case(json!("x".repeat(33)), false)]
fn name_length_range(#[case] name: Value, #[case] ok: bool) {
    let engine = user_engine();
    let result = engine.check(&map(json!({"age": 30, "name": name})));
    assert_eq!(result.is_ok(), ok, "{result:?}");
}

#[test]
fn length_exact_differs_from_range() {
    let mut engine = Engine::new();
    engine.bind("pin", ParamKind::String, "").length(6, None);
    assert!(engine.check(&map(json!({"pin": "123456"}))).is_ok());
    let err = engine.check(&map(json!({"pin": "12345"}))).unwrap_err();
    assert_eq!(err.to_string(), "很抱歉、pin的长度必须是[6]位！");
}

#[rstest]
#[case(json!(-3), true)]
#[case(json!(10), true)]
#[case(json!(11), false)]
fn open_low_range_matches_elt(#[case] value: Value, #[case] ok: bool) {
    let mut ranged = Engine::new();
    ranged.bind("n", ParamKind::Int, "").between("-inf", 10);
    let mut compared = Engine::new();
    compared.bind("n", ParamKind::Int, "").elt(10);

    let input = map(json!({"n": value}));
    assert_eq!(ranged.check(&input).is_ok(), ok);
    assert_eq!(compared.check(&input).is_ok(), ok);
}

#[rstest]
#[case(json!(5), true)]
#[case(json!(4), false)]
fn open_high_range_matches_egt(#[case] value: Value, #[case] ok: bool) {
    let mut ranged = Engine::new();
    ranged.bind("n", ParamKind::Int, "").between(5, "+inf");
    let mut compared = Engine::new();
    compared.bind("n", ParamKind::Int, "").egt(5);

    let input = map(json!({"n": value}));
    assert_eq!(ranged.check(&input).is_ok(), ok);
    assert_eq!(compared.check(&input).is_ok(), ok);
}

#[test]
fn bare_patterns_are_anchored() {
    let mut engine = Engine::new();
    engine
        .bind("code", ParamKind::String, "编码")
        .pattern("alphaNum")
        .unwrap();
    assert!(engine.check(&map(json!({"code": "abc123"}))).is_ok());
    let err = engine.check(&map(json!({"code": "abc-123"}))).unwrap_err();
    // Named patterns render their own message.
    assert_eq!(err.to_string(), "很抱歉、编码只能是字母和数字！");
}

#[test]
fn mobile_pattern() {
    let mut engine = Engine::new();
    engine
        .bind("phone", ParamKind::String, "手机号")
        .required()
        .pattern("mobile")
        .unwrap();
    assert!(engine.check(&map(json!({"phone": "13912345678"}))).is_ok());
    let err = engine.check(&map(json!({"phone": "0912345678"}))).unwrap_err();
    assert_eq!(err.to_string(), "很抱歉、手机号格式不正确！");
}

#[test]
fn confirm_checks_the_raw_input() {
    let mut engine = Engine::new();
    engine
        .bind("password", ParamKind::String, "密码")
        .required()
        .length(6, 32);
    engine
        .bind("password2", ParamKind::String, "确认密码")
        .required()
        .confirm("password");

    assert!(
        engine
            .check(&map(json!({"password": "secret1", "password2": "secret1"})))
            .is_ok()
    );
    let err = engine
        .check(&map(json!({"password": "secret1", "password2": "secret2"})))
        .unwrap_err();
    assert_eq!(err.to_string(), "很抱歉、确认密码必须和密码保持一致！");
}

#[test]
fn backing_field_keys_the_output() {
    let mut engine = Engine::new();
    engine
        .bind_to("createdAt", ParamKind::Timestamp, "创建时间", "created_at")
        .required();
    let out = engine
        .check(&map(json!({"createdAt": "2020-08-08 12:00:00"})))
        .unwrap();
    assert!(!out.contains_key("createdAt"));
    assert_eq!(out["created_at"], json!("2020-08-08 12:00:00"));
}

#[test]
fn schema_backed_binding() {
    let schema: FieldSchema = [
        FieldInfo::new("money", ParamKind::Float, "金额"),
        FieldInfo::new("created_at", ParamKind::Timestamp, "创建时间"),
    ]
    .into_iter()
    .collect();
    let mut engine = Engine::new().with_schema(schema);
    engine.bind_field("money").required().egt(0);
    engine.bind_alias("createdAt", "created_at").required();

    let err = engine
        .check(&map(json!({"money": "-1", "createdAt": "2020-08-08 12:00:00"})))
        .unwrap_err();
    assert_eq!(err.to_string(), "很抱歉、金额必须大于等于0！");

    let out = engine
        .check(&map(json!({"money": "12.345678", "createdAt": "2020-08-08 12:00:00"})))
        .unwrap();
    assert_eq!(out["money"], json!(12.3457));
    assert_eq!(out["created_at"], json!("2020-08-08 12:00:00"));
}

#[test]
fn listing_scenario() {
    let schema: FieldSchema = [
        FieldInfo::new("created_at", ParamKind::Timestamp, "创建时间"),
        FieldInfo::new("money", ParamKind::Float, "金额"),
    ]
    .into_iter()
    .collect();
    let mut engine = Engine::new().with_schema(schema);
    engine.bind_alias("createdAt", "created_at");
    engine.bind_field("money");
    engine
        .order(&["createdAt", "money"], ("createdAt", "desc"))
        .unwrap();
    engine.page(1, 20);

    // Empty input: everything optional or defaulted.
    let out = engine.check(&ValueMap::new()).unwrap();
    assert_eq!(out["order"], json!({"created_at": "desc"}));
    assert_eq!(out["page"], json!([1, 20]));
    assert!(!out.contains_key("money"));

    // Explicit ordering and paging, with string page numbers coerced.
    let out = engine
        .check(&map(json!({"order": {"money": "asc"}, "page": ["2", "100"]})))
        .unwrap();
    assert_eq!(out["order"], json!({"money": "asc"}));
    assert_eq!(out["page"], json!([2, 100]));

    // A sort key that is not bound fails the key rule.
    let err = engine
        .check(&map(json!({"order": {"secret": "asc"}})))
        .unwrap_err();
    assert_eq!(err.category(), "validation");

    // Non-numeric page entries fail the element-type rule.
    let err = engine
        .check(&map(json!({"page": ["x", "20"]})))
        .unwrap_err();
    assert_eq!(err.to_string(), "很抱歉、分页字段的元素类型必须是整数类型！");
}

#[test]
fn status_membership_over_sequences() {
    let engine = user_engine();
    let out = engine
        .check(&map(json!({"age": 30, "name": "阿白", "status": ["0", 1]})))
        .unwrap();
    assert_eq!(out["status"], json!([0, 1]));

    let err = engine
        .check(&map(json!({"age": 30, "name": "阿白", "status": [2]})))
        .unwrap_err();
    assert_eq!(err.to_string(), "很抱歉、状态只能在[0,1]之间！");
}

#[test]
fn message_overrides_take_precedence() {
    let mut engine = Engine::new().with_messages([
        ("age.gt", "age must be over :condition"),
        ("required", ":attribute is required"),
    ]);
    engine.bind("age", ParamKind::Int, "年龄").required().gt(18);

    let err = engine.check(&ValueMap::new()).unwrap_err();
    assert_eq!(err.to_string(), "年龄 is required");
    let err = engine.check(&map(json!({"age": 10}))).unwrap_err();
    assert_eq!(err.to_string(), "age must be over 18");
}

#[test]
fn output_is_stable_under_recheck() {
    // Feeding a validated output back through produces the same map.
    let engine = user_engine();
    let first = engine
        .check(&map(json!({"age": "42", "name": "阿白", "status": ["1"]})))
        .unwrap();
    let second = engine.check(&first).unwrap();
    assert_eq!(first, second);
}
