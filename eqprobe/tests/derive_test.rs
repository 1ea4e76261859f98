//! The derive-generated descriptor tables and lenses.

use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use eqprobe::{Inspect, ShapeKind, Verifier, verify};

#[derive(Debug, Clone, Inspect)]
struct Mixed {
    id: u64,
    color: Option<String>,
    ratio: f64,
    samples: Vec<u8>,
    boxed: Box<u32>,
}

impl PartialEq for Mixed {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.color == other.color
            && self.ratio.to_bits() == other.ratio.to_bits()
            && self.samples == other.samples
            && self.boxed == other.boxed
    }
}

impl Hash for Mixed {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.color.hash(state);
        self.ratio.to_bits().hash(state);
        self.samples.hash(state);
        self.boxed.hash(state);
    }
}

#[test]
fn shape_records_names_types_and_order() {
    let shape = Mixed::shape();
    assert!(shape.type_name.contains("Mixed"));
    assert_eq!(shape.kind, ShapeKind::Struct);
    let names: Vec<_> = shape.fields.iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["id", "color", "ratio", "samples", "boxed"]);
    assert_eq!(shape.field_named("color").unwrap().type_name, "Option<String>");
    for (index, field) in shape.fields.iter().enumerate() {
        assert_eq!(field.index, index);
    }
}

#[test]
fn shape_classifies_field_types() {
    let shape = Mixed::shape();
    assert!(shape.field_named("color").unwrap().flags.optional);
    assert!(shape.field_named("ratio").unwrap().flags.float);
    assert!(shape.field_named("samples").unwrap().flags.sequence);
    assert!(shape.field_named("boxed").unwrap().flags.shared_ref);
    assert!(!shape.field_named("id").unwrap().flags.optional);
}

#[test]
fn mixed_struct_verifies() {
    let result = verify::<Mixed>();
    assert!(result.is_success(), "{result}");
}

#[derive(Debug, Clone, PartialEq, Hash, Inspect)]
struct WithScratch {
    name: String,
    #[inspect(skip)]
    scratch: u64,
}

#[test]
fn skipped_fields_are_flagged_and_not_probed() {
    let shape = WithScratch::shape();
    assert!(shape.field_named("scratch").unwrap().flags.skipped);
    assert_eq!(shape.probed_fields().count(), 1);
    // `scratch` participates in derived eq/hash, but holding it at its
    // default keeps it from tripping the unused-field rule.
    Verifier::<WithScratch>::new().assert_valid();
}

#[derive(Debug, Clone, PartialEq, Hash, Inspect)]
struct Coord(i32, i32);

#[test]
fn tuple_structs_use_positional_field_names() {
    let shape = Coord::shape();
    assert_eq!(shape.kind, ShapeKind::TupleStruct);
    let names: Vec<_> = shape.fields.iter().map(|f| f.name).collect();
    assert_eq!(names, vec!["0", "1"]);
    Verifier::<Coord>::new().assert_valid();
}

#[derive(Debug, Clone, PartialEq, Hash, Inspect)]
struct Marker;

#[test]
fn unit_structs_verify_trivially() {
    assert_eq!(Marker::shape().kind, ShapeKind::UnitStruct);
    Verifier::<Marker>::new().assert_valid();
}

#[derive(Debug, Clone, PartialEq, Hash, Inspect)]
enum Command {
    Get { key: String },
    Put { key: String, value: u32 },
    Clear,
}

#[test]
fn enums_are_leaf_values_with_distinct_variants() {
    let shape = Command::shape();
    assert_eq!(shape.kind, ShapeKind::Enum { variants: 3 });
    assert!(shape.fields.is_empty());
    Verifier::<Command>::new().assert_valid();
}

#[derive(Debug, Clone, PartialEq, Hash, Inspect)]
struct Request {
    command: Command,
    sequence: u64,
}

#[test]
fn enum_valued_fields_are_probed_through_their_variants() {
    Verifier::<Request>::new().assert_valid();
}

#[derive(Debug, Clone, PartialEq, Hash, Inspect)]
struct Labelled<T> {
    value: T,
    label: String,
}

#[test]
fn generic_types_verify_per_instantiation() {
    Verifier::<Labelled<String>>::new().assert_valid();
    Verifier::<Labelled<u32>>::new().assert_valid();
    assert!(Labelled::<u32>::shape().type_name.contains("Labelled"));
}

#[derive(Debug, Clone, PartialEq, Hash, Inspect)]
struct Phantomed {
    value: u32,
    _marker: PhantomData<fn() -> String>,
}

#[test]
fn phantom_data_fields_are_skipped_automatically() {
    let shape = Phantomed::shape();
    assert!(shape.field_named("_marker").unwrap().flags.skipped);
    Verifier::<Phantomed>::new().assert_valid();
}
