use assay_cond::{EditConditionParser, EvalError, InstanceContext, ParseError};
use assay_model::decode::RawObject;
use assay_model::parser::parse_types;
use assay_model::{Object, TypeCategory, TypeRegistry};
use pretty_assertions::assert_eq;

const TYPES: &str = r#"{
    "enums": [{ "name": "ESimpleEnum", "members": { "None": 0, "One": 1, "Two": 2 } }],
    "classes": [{
        "name": "ConditionTestObject",
        "package": "/Script/AssayTests",
        "properties": [
            { "name": "Bool", "kind": "bool" },
            { "name": "Int", "kind": "int" },
            { "name": "Enum", "kind": "enum", "enum": "ESimpleEnum" },
            { "name": "Pointer", "kind": "object", "class": "Object" }
        ]
    }]
}"#;

fn setup() -> (TypeRegistry, Object) {
    let file = parse_types(TYPES, "conditions.types.json").unwrap();
    let mut types = TypeRegistry::new();
    for def in file.enums {
        types.add_enum(def).unwrap();
    }
    for def in file.classes {
        types.add_class(def).unwrap();
    }
    let raw: RawObject = serde_json::from_value(serde_json::json!({
        "path": "/Game/Tests/Probe.Probe",
        "class": "ConditionTestObject",
        "fields": { "Bool": true, "Int": 32, "Enum": "ESimpleEnum::Two", "Pointer": null }
    }))
    .unwrap();
    let object = raw.decode(&types).unwrap();
    (types, object)
}

fn evaluate(source: &str) -> Result<bool, EvalError> {
    let (types, object) = setup();
    let context = InstanceContext::new(&types, TypeCategory::Class, &object.class, &object.fields);
    let parser = EditConditionParser::new();
    let expression = parser.parse(source).unwrap();
    parser.evaluate(&expression, &context)
}

#[test]
fn test_conditions_on_probe_object() {
    let cases = [
        ("Bool == false", false),
        ("Bool == true", true),
        ("Enum == ESimpleEnum::One", false),
        ("Enum != ESimpleEnum::None", true),
        ("Int == 8", false),
        ("Int >= 20", true),
        ("Pointer != nullptr", false),
        ("Pointer == nullptr", true),
        (
            "Pointer == nullptr && Bool == true && (Int < 10 || Enum == ESimpleEnum::None)",
            false,
        ),
        (
            "Pointer == nullptr || Bool == false || (Int == 32 && Enum == ESimpleEnum::Two)",
            true,
        ),
    ];
    for (source, expected) in cases {
        assert_eq!(evaluate(source), Ok(expected), "{source}");
    }
}

#[test]
fn test_bare_bool_property() {
    assert_eq!(evaluate("Bool"), Ok(true));
    assert_eq!(evaluate("!Bool"), Ok(false));
}

#[test]
fn test_unknown_property_is_an_error() {
    assert_eq!(
        evaluate("Missing == true"),
        Err(EvalError::InvalidOperand("Missing".to_string()))
    );
}

#[test]
fn test_enum_type_mismatch() {
    assert_eq!(
        evaluate("Enum == EOtherEnum::Two"),
        Err(EvalError::TypeMismatch(
            "Enum".to_string(),
            "EOtherEnum::Two".to_string()
        ))
    );
}

#[test]
fn test_expression_is_reusable_across_instances() {
    let (types, first) = setup();
    let mut second = first.clone();
    second.fields.insert("Int".to_string(), assay_model::Value::Int(4));

    let parser = EditConditionParser::new();
    let expression = parser.parse("Int < 10").unwrap();
    let on = |object: &Object| {
        let context = InstanceContext::new(&types, TypeCategory::Class, &object.class, &object.fields);
        parser.evaluate(&expression, &context)
    };
    assert_eq!(on(&first), Ok(false));
    assert_eq!(on(&second), Ok(true));
    // Evaluation does not mutate the compiled expression
    assert_eq!(on(&first), Ok(false));
}

#[test]
fn test_parse_is_deterministic() {
    let parser = EditConditionParser::new();
    let source = "Pointer == nullptr || Bool == false || (Int == 32 && Enum == ESimpleEnum::Two)";
    assert_eq!(parser.parse(source).unwrap(), parser.parse(source).unwrap());
}

#[test]
fn test_parse_errors_surface_messages() {
    let parser = EditConditionParser::new();
    let err = parser.parse("Enum == ESimpleEnum:Two").unwrap_err();
    assert_eq!(err, ParseError::SingleColon("ESimpleEnum:Two".to_string()));
    assert_eq!(
        err.to_string(),
        "EditCondition contains single colon in property name \"ESimpleEnum:Two\", expected double colons."
    );
}
