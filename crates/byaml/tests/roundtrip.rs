//! Binary -> XML -> binary round trips.

use byaml::path::encode_points;
use byaml::{Byaml, Endian, Node, PathPoint, Value, XmlElement};

fn course(endian: Endian) -> Byaml {
    let mut doc = Byaml::new(endian, 1);

    let route = encode_points(
        &[
            PathPoint {
                position: [12.5, -3.0, 1000.25],
                normal: [0.0, 1.0, 0.0],
                value: 0,
            },
            PathPoint {
                position: [0.1, 0.2, 0.3],
                normal: [0.5, 0.5, -0.70710677],
                value: 42,
            },
        ],
        endian,
    );
    let route = doc.paths.intern(route.as_slice());

    let name = doc.strings.intern("Mario Circuit");
    let accent = doc.strings.intern("caf\u{E9}");
    let empty = doc.strings.intern("");

    let obj = |doc: &mut Byaml, entries: Vec<(&str, Node)>| {
        Node::Object(
            entries
                .into_iter()
                .map(|(k, v)| (doc.names.intern(k), v))
                .collect(),
        )
    };

    let enemy = obj(
        &mut doc,
        vec![
            ("UnitIdNum", Node::Int32(7)),
            ("type", Node::Int32(3)),
            ("Scale", Node::Float32(1.5)),
            ("Path", Node::PathData(route)),
            ("Label", Node::StringRef(accent)),
        ],
    );
    let item_box = obj(
        &mut doc,
        vec![
            ("UnitIdNum", Node::Int32(8)),
            ("Visible", Node::Bool(false)),
            ("Path", Node::PathData(route)),
            ("Params", Node::Array(vec![Node::Float32(-0.0), Node::Float32(1e-7)])),
        ],
    );

    doc.root = obj(
        &mut doc,
        vec![
            ("CourseName", Node::StringRef(name)),
            ("Comment", Node::StringRef(empty)),
            ("LapCount", Node::Int32(3)),
            ("Gravity", Node::Float32(-9.81)),
            ("Nothing", Node::Null),
            ("Obj", Node::Array(vec![enemy, item_box, Node::Array(Vec::new())])),
            ("Extra", Node::Object(Vec::new())),
        ],
    );
    doc
}

fn assert_same_structure(a: &Byaml, b: &Byaml) {
    assert_eq!(
        a.to_value().unwrap().normalized(),
        b.to_value().unwrap().normalized()
    );
}

#[test]
fn test_binary_xml_binary_round_trip() {
    for endian in [Endian::Big, Endian::Little] {
        let bytes = course(endian).to_bytes().unwrap();
        let decoded = Byaml::parse(&bytes).unwrap();
        assert_eq!(decoded.endian, endian);

        let xml = decoded.to_xml_string().unwrap();
        let reified = Byaml::from_xml_str(&xml).unwrap();
        assert_eq!(reified.endian, endian);
        assert_same_structure(&decoded, &reified);

        let rebuilt = Byaml::parse(&reified.to_bytes().unwrap()).unwrap();
        assert_same_structure(&decoded, &rebuilt);

        // the writer's canonical ordering makes a second pass byte-identical
        assert_eq!(rebuilt.to_bytes().unwrap(), reified.to_bytes().unwrap());
    }
}

#[test]
fn test_shared_values_stay_interned() {
    let decoded = Byaml::parse(&course(Endian::Big).to_bytes().unwrap()).unwrap();
    let reified = Byaml::from_xml_str(&decoded.to_xml_string().unwrap()).unwrap();

    assert_eq!(reified.paths.len(), 1);
    assert_eq!(reified.paths.get(0).map(Vec::len), Some(56));
    assert_eq!(reified.strings.len(), 3);
    assert!(reified.names.find("UnitIdNum").is_some());
}

#[test]
fn test_xml_shape() {
    let decoded = Byaml::parse(&course(Endian::Big).to_bytes().unwrap()).unwrap();
    let root = decoded.to_xml_element().unwrap();

    assert_eq!(root.attribute("LapCount"), Some("3"));
    assert_eq!(root.attribute("Gravity"), Some("-9.81f"));

    let child = |e: &XmlElement, name: &str| -> XmlElement {
        e.elements()
            .find(|c| c.name == name)
            .cloned()
            .unwrap_or_else(|| panic!("missing <{}>", name))
    };

    assert_eq!(child(&root, "CourseName").attribute("type"), Some("string"));
    assert_eq!(child(&root, "Nothing").attribute("type"), Some("null"));

    let objs = child(&root, "Obj");
    assert_eq!(objs.attribute("type"), Some("array"));
    let enemy = objs.elements().next().cloned().unwrap();
    assert_eq!(enemy.name, "value");
    assert_eq!(enemy.attribute("UnitIdNum"), Some("7"));
    assert_eq!(enemy.attribute("Scale"), Some("1.5f"));
    assert_eq!(enemy.attribute("type"), None);
    assert_eq!(child(&enemy, "type").inner_text(), "3");

    let path = child(&enemy, "Path");
    assert_eq!(path.attribute("type"), Some("path"));
    let points: Vec<_> = path.elements().collect();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].attribute("z"), Some("1000.25f"));
    assert_eq!(points[1].attribute("val"), Some("42"));
}

#[test]
fn test_float_bits_survive() {
    let decoded = Byaml::parse(&course(Endian::Big).to_bytes().unwrap()).unwrap();
    let reified = Byaml::from_xml_str(&decoded.to_xml_string().unwrap()).unwrap();

    let value = reified.to_value().unwrap();
    let Some(Value::Float(g)) = value.get("Gravity") else {
        panic!("missing Gravity");
    };
    assert_eq!(g.to_bits(), (-9.81f32).to_bits());

    let Some(Value::Array(objs)) = value.get("Obj") else {
        panic!("missing Obj");
    };
    let Some(Value::Array(params)) = objs[1].get("Params") else {
        panic!("missing Params");
    };
    assert_eq!(params[0], Value::Float(-0.0));
    assert!(matches!(params[0], Value::Float(v) if v.is_sign_negative()));
    assert_eq!(params[1], Value::Float(1e-7));
}

#[test]
fn test_reify_then_project_is_stable() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<yaml xmlns:yamlconv="yamlconv" yamlconv:endianness="big" yamlconv:version="1" Id="5" Speed="2.5f" On="true">
  <Name type="string">Toad Harbor</Name>
  <List type="array">
    <value>1</value>
    <value type="string">two</value>
    <value type="null" />
  </List>
</yaml>"#;

    let first = Byaml::from_xml_str(xml).unwrap();
    let second = Byaml::from_xml_str(&first.to_xml_string().unwrap()).unwrap();
    assert_same_structure(&first, &second);
    assert_eq!(first.to_value().unwrap(), second.to_value().unwrap());
}
