use rust_decimal::Decimal;
use time::macros::datetime;
use zxml::{LazyText, Mapping, RendererConfig, Value, XmlRenderer, from_xml_str, to_xml_string};

fn map<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Mapping(Mapping::from(entries))
}

fn complex_data() -> Value {
    map([
        ("creation_date", Value::from(datetime!(2011-12-25 12:45:00))),
        ("name", Value::text("name")),
        (
            "sub_data_list",
            Value::from(vec![
                map([("sub_id", Value::from(1)), ("sub_name", Value::text("first"))]),
                map([("sub_id", Value::from(2)), ("sub_name", Value::text("second"))]),
            ]),
        ),
    ])
}

fn order_data() -> Value {
    let messages = || {
        Value::from(vec![
            map([("type", Value::text("O")), ("code", Value::text("xyz"))]),
            map([("type", Value::text("L")), ("code", Value::text("zyx"))]),
        ])
    };
    map([
        ("creation_date", Value::from(datetime!(2017-07-01 14:30:00))),
        ("orderId", Value::from(1)),
        (
            "positions",
            Value::from(vec![
                map([
                    ("posNo", Value::from(1)),
                    ("amount", Value::from(3)),
                    ("messages", messages()),
                ]),
                map([
                    ("posNo", Value::from(2)),
                    ("amount", Value::from(1)),
                    ("messages", messages()),
                ]),
            ]),
        ),
    ])
}

fn assert_xml_contains(xml: &str, needle: &str, root: &str) {
    assert!(
        xml.starts_with(&format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<{root}>"
        )),
        "bad prologue in {xml:?}"
    );
    assert!(xml.ends_with(&format!("</{root}>")), "bad ending in {xml:?}");
    assert!(xml.contains(needle), "{needle:?} not in {xml:?}");
}

#[test]
fn test_render_string() -> Result<(), zxml::Error> {
    let xml = to_xml_string(&map([("field", Value::text("astring"))]))?;
    assert_xml_contains(&xml, "<field>astring</field>", "root");
    Ok(())
}

#[test]
fn test_render_integer() -> Result<(), zxml::Error> {
    let xml = to_xml_string(&map([("field", Value::from(111))]))?;
    assert_xml_contains(&xml, "<field>111</field>", "root");
    Ok(())
}

#[test]
fn test_render_datetime() -> Result<(), zxml::Error> {
    let xml = to_xml_string(&map([(
        "field",
        Value::from(datetime!(2011-12-25 12:45:00)),
    )]))?;
    assert_xml_contains(&xml, "<field>2011-12-25 12:45:00</field>", "root");
    Ok(())
}

#[test]
fn test_render_float() -> Result<(), zxml::Error> {
    let xml = to_xml_string(&map([("field", Value::from(123.4))]))?;
    assert_xml_contains(&xml, "<field>123.4</field>", "root");
    Ok(())
}

#[test]
fn test_render_decimal() -> Result<(), zxml::Error> {
    let xml = to_xml_string(&map([("field", Value::from(Decimal::new(1112, 1)))]))?;
    assert_xml_contains(&xml, "<field>111.2</field>", "root");
    Ok(())
}

#[test]
fn test_render_none() -> Result<(), zxml::Error> {
    let xml = to_xml_string(&map([("field", Value::Null)]))?;
    assert_xml_contains(&xml, "<field></field>", "root");
    Ok(())
}

#[test]
fn test_render_null_document_is_empty() -> Result<(), zxml::Error> {
    assert_eq!(to_xml_string(&Value::Null)?, "");
    Ok(())
}

#[test]
fn test_render_empty_mapping_is_a_document() -> Result<(), zxml::Error> {
    let xml = to_xml_string(&Value::Mapping(Mapping::new()))?;
    assert_eq!(xml, "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<root></root>");
    Ok(())
}

#[test]
fn test_render_complex_data() -> Result<(), zxml::Error> {
    let xml = to_xml_string(&complex_data())?;
    assert_xml_contains(&xml, "<sub_name>first</sub_name>", "root");
    assert_xml_contains(&xml, "<sub_name>second</sub_name>", "root");
    Ok(())
}

#[test]
fn test_render_list() -> Result<(), zxml::Error> {
    let xml = to_xml_string(&complex_data())?;
    assert_xml_contains(&xml, "<sub_data_list><list-item>", "root");
    assert_xml_contains(&xml, "</list-item></sub_data_list>", "root");
    Ok(())
}

#[test]
fn test_render_lazy() -> Result<(), zxml::Error> {
    let lazy = LazyText::new(|| "hello".to_string());
    let xml = to_xml_string(&map([("field", Value::from(lazy))]))?;
    assert_xml_contains(&xml, "<field>hello</field>", "root");
    Ok(())
}

#[test]
fn test_render_escapes_text() -> Result<(), zxml::Error> {
    let xml = to_xml_string(&map([("field", Value::text("<a & b>"))]))?;
    assert_xml_contains(&xml, "<field>&lt;a &amp; b&gt;</field>", "root");
    Ok(())
}

#[test]
fn test_render_override_list_item() -> Result<(), zxml::Error> {
    let renderer = XmlRenderer::with_config(
        RendererConfig::default()
            .with_root_tag_name("order")
            .override_item_tag_name(true),
    );
    let xml = renderer.render(&order_data())?;
    assert_xml_contains(&xml, "<positions><position><posNo>1</posNo>", "order");
    assert_xml_contains(&xml, "<messages><message><type>O</type>", "order");
    assert!(!xml.contains("list-item"));
    Ok(())
}

#[test]
fn test_render_custom_item_tag() -> Result<(), zxml::Error> {
    let renderer = XmlRenderer::with_config(RendererConfig::default().with_item_tag_name("entry"));
    let xml = renderer.render(&map([("l", Value::from(vec![Value::text("a")]))]))?;
    assert_xml_contains(&xml, "<l><entry>a</entry></l>", "root");
    Ok(())
}

#[test]
fn test_render_and_parse_complex_data() -> Result<(), zxml::Error> {
    let xml = to_xml_string(&complex_data())?;
    let parsed = from_xml_str(&xml)?;
    assert_eq!(parsed.type_converted(), complex_data());
    Ok(())
}

#[test]
fn test_overridden_tags_still_decode_as_sequences() -> Result<(), zxml::Error> {
    let renderer = XmlRenderer::with_config(
        RendererConfig::default()
            .with_root_tag_name("order")
            .override_item_tag_name(true),
    );
    let parsed = from_xml_str(&renderer.render(&order_data())?)?;
    let positions = parsed.as_mapping().and_then(|m| m.get("positions"));
    assert_eq!(positions.and_then(Value::as_sequence).map(|s| s.len()), Some(2));
    Ok(())
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_renderers_can_be_shared_between_threads() {
    assert_send_sync::<XmlRenderer>();
    assert_send_sync::<zxml::SoapRenderer>();
    assert_send_sync::<Value>();
}

#[test]
fn test_render_rejects_unrepresentable_text() {
    let value = map([("a", Value::text("\u{0}"))]);
    let err = to_xml_string(&value).err();
    assert_eq!(
        err.map(|e| e.kind().clone()),
        Some(zxml::ErrorKind::UnrepresentableChar { code: 0 })
    );
}
