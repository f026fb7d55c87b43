use pm2_core::buffer::{SAVE_FILE_SIZE, SaveBuffer};
use pm2_core::core_api::CoreErrorCode;
use pm2_core::field::{FieldAccessor, StatValue};
use pm2_core::registry::{FieldRegistry, StatId, definition_for};

fn zeroed_buffer() -> SaveBuffer {
    SaveBuffer::from_bytes(&vec![0u8; SAVE_FILE_SIZE]).expect("failed to build zeroed buffer")
}

#[test]
fn registry_holds_one_entry_per_stat() {
    let mut buffer = zeroed_buffer();
    let registry = FieldRegistry::build(&mut buffer).expect("registry build");

    assert_eq!(registry.len(), StatId::ALL.len());
    let stats: Vec<StatId> = registry.stats().collect();
    for stat in StatId::ALL {
        assert_eq!(
            stats.iter().filter(|&&s| s == stat).count(),
            1,
            "expected exactly one registry entry for {stat}"
        );
        registry.definition(stat).expect("definition lookup");
    }
}

#[test]
fn int_field_roundtrips_at_both_range_ends() {
    let mut buffer = zeroed_buffer();
    let mut registry = FieldRegistry::build(&mut buffer).expect("registry build");

    let FieldAccessor::Int(mut field) = registry.field(StatId::Stamina).expect("accessor") else {
        panic!("stamina should be an integer field");
    };
    let (min, max) = field.range();

    field.set(min).expect("set at min");
    assert_eq!(field.get().expect("get"), min);

    field.set(max).expect("set at max");
    assert_eq!(field.get().expect("get"), max);
}

#[test]
fn int_field_rejects_values_one_past_the_range() {
    let mut buffer = zeroed_buffer();
    let mut registry = FieldRegistry::build(&mut buffer).expect("registry build");

    let FieldAccessor::Int(mut field) = registry.field(StatId::Glamour).expect("accessor") else {
        panic!("glamour should be an integer field");
    };
    let (min, max) = field.range();
    field.set(42).expect("baseline set");

    for value in [min - 1, max + 1] {
        let err = field.set(value).expect_err("expected range violation");
        assert_eq!(err.code, CoreErrorCode::RangeViolation, "value {value}");
    }
    // Rejected writes leave the old value in place.
    assert_eq!(field.get().expect("get"), 42);
}

#[test]
fn text_field_pads_and_roundtrips() {
    let mut buffer = zeroed_buffer();

    {
        let mut registry = FieldRegistry::build(&mut buffer).expect("registry build");
        let FieldAccessor::Text(mut field) =
            registry.field(StatId::DaughtersName).expect("accessor")
        else {
            panic!("daughter's name should be a text field");
        };
        field.set("Maria").expect("set name");
        assert_eq!(field.get().expect("get"), "Maria");

        // Longest value that still fits with its terminator.
        let longest = "M".repeat(field.max_len());
        field.set(&longest).expect("set longest name");
        assert_eq!(field.get().expect("get"), longest);

        // A shorter rewrite NUL-pads the remainder of the field.
        field.set("Ann").expect("set short name");
        assert_eq!(field.get().expect("get"), "Ann");
    }

    let def = definition_for(StatId::DaughtersName).expect("definition");
    let raw = buffer.read_at(def.offset, def.width).expect("raw read");
    assert_eq!(&raw[..3], b"Ann");
    assert!(raw[3..].iter().all(|&b| b == 0));
}

#[test]
fn text_field_rejects_one_byte_too_long() {
    let mut buffer = zeroed_buffer();
    let mut registry = FieldRegistry::build(&mut buffer).expect("registry build");

    let FieldAccessor::Text(mut field) = registry.field(StatId::FathersName).expect("accessor")
    else {
        panic!("father's name should be a text field");
    };
    field.set("Rio").expect("baseline set");

    let too_long = "X".repeat(field.max_len() + 1);
    let err = field.set(&too_long).expect_err("expected too-long rejection");
    assert_eq!(err.code, CoreErrorCode::TooLong);
    assert_eq!(field.get().expect("get"), "Rio");
}

#[test]
fn float_field_roundtrips_with_two_decimals() {
    let mut buffer = zeroed_buffer();
    let mut registry = FieldRegistry::build(&mut buffer).expect("registry build");

    let FieldAccessor::Float(mut field) = registry.field(StatId::Height).expect("accessor") else {
        panic!("height should be a float field");
    };
    field.set(134.25).expect("set height");
    assert_eq!(field.get().expect("get"), 134.25);

    let (_, max) = field.range();
    let err = field.set(max + 0.01).expect_err("expected range violation");
    assert_eq!(err.code, CoreErrorCode::RangeViolation);
    assert_eq!(field.get().expect("get"), 134.25);
}

#[test]
fn accessors_always_reflect_the_buffer() {
    let mut buffer = zeroed_buffer();
    let def = definition_for(StatId::Strength).expect("definition");

    // Raw write first, accessor read second: no cached value may hide it.
    buffer
        .write_at(def.offset, 2, &999u16.to_le_bytes())
        .expect("raw write");

    let mut registry = FieldRegistry::build(&mut buffer).expect("registry build");
    let FieldAccessor::Int(field) = registry.field(StatId::Strength).expect("accessor") else {
        panic!("strength should be an integer field");
    };
    assert_eq!(field.get().expect("get"), 999);
}

#[test]
fn set_value_rejects_kind_mismatches() {
    let mut buffer = zeroed_buffer();
    let mut registry = FieldRegistry::build(&mut buffer).expect("registry build");

    let mut accessor = registry.field(StatId::Cooking).expect("accessor");
    let err = accessor
        .set_value(&StatValue::Text("pie".to_string()))
        .expect_err("text into an integer field must fail");
    assert_eq!(err.code, CoreErrorCode::UnsupportedOperation);

    accessor
        .set_value(&StatValue::Int(120))
        .expect("matching kind should succeed");
    assert_eq!(accessor.value().expect("value"), StatValue::Int(120));
}
