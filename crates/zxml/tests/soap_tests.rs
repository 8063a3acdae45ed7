use zxml::{Mapping, Sequence, SoapRenderer, SoapSchema, Value, from_xml_str, to_soap_string};

fn map<const N: usize>(entries: [(&str, Value); N]) -> Value {
    Value::Mapping(Mapping::from(entries))
}

#[test]
fn test_envelope_structure() -> Result<(), zxml::Error> {
    let xml = to_soap_string(&map([("status", Value::text("ok"))]))?;
    assert_eq!(
        xml,
        concat!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
            "<soap:Envelope xmlns:soap=\"http://schemas.xmlsoap.org/soap/envelope/\" ",
            "xmlns:tns=\"http://tempuri.org/\">",
            "<soap:Header/>",
            "<soap:Body><tns:Response><status>ok</status></tns:Response></soap:Body>",
            "</soap:Envelope>"
        )
    );
    Ok(())
}

#[test]
fn test_configured_schema() -> Result<(), zxml::Error> {
    let mut renderer = SoapRenderer::new();
    renderer.set_schema_attrs("env", "https://api.example.com/orders", "ord");
    let xml = renderer.render(&map([("id", Value::from(7))]))?;

    assert!(xml.contains(
        "<env:Envelope xmlns:env=\"http://schemas.xmlsoap.org/soap/envelope/\" xmlns:ord=\"https://api.example.com/orders\">"
    ));
    assert!(xml.contains("<env:Header/><env:Body><ord:Response><id>7</id></ord:Response></env:Body>"));
    assert!(xml.ends_with("</env:Envelope>"));
    Ok(())
}

#[test]
fn test_schema_built_up_front() -> Result<(), zxml::Error> {
    let renderer = SoapRenderer::with_schema(SoapSchema::new("s", "urn:x", "x"));
    let xml = renderer.render(&Value::text("pong"))?;
    assert!(xml.contains("<x:Response>pong</x:Response>"));
    Ok(())
}

#[test]
fn test_empty_inputs_render_nothing() -> Result<(), zxml::Error> {
    let renderer = SoapRenderer::new();
    assert_eq!(renderer.render(&Value::Null)?, "");
    assert_eq!(renderer.render(&Value::Mapping(Mapping::new()))?, "");
    assert_eq!(renderer.render(&Value::Sequence(Sequence::new()))?, "");
    Ok(())
}

#[test]
fn test_falsy_scalars_still_render() -> Result<(), zxml::Error> {
    let xml = to_soap_string(&Value::from(0))?;
    assert!(xml.contains("<tns:Response>0</tns:Response>"));
    Ok(())
}

#[test]
fn test_sequences_have_no_item_wrapper() -> Result<(), zxml::Error> {
    let value = map([(
        "orders",
        Value::from(vec![
            map([("id", Value::text("1"))]),
            map([("id", Value::text("2"))]),
        ]),
    )]);
    let xml = to_soap_string(&value)?;
    assert!(xml.contains("<orders><id>1</id><id>2</id></orders>"));
    assert!(!xml.contains("list-item"));
    Ok(())
}

#[test]
fn test_envelope_is_well_formed() -> Result<(), zxml::Error> {
    let value = map([("a", Value::text("x & y")), ("b", Value::Null)]);
    let decoded = from_xml_str(&to_soap_string(&value)?)?;
    let response = decoded
        .as_mapping()
        .and_then(|m| m.get("soap:Body"))
        .and_then(Value::as_mapping)
        .and_then(|m| m.get("tns:Response"));
    assert_eq!(response, Some(&value));
    Ok(())
}

#[test]
fn test_invalid_prefix_is_a_render_error() {
    let mut renderer = SoapRenderer::new();
    renderer.set_schema_attrs("bad prefix", "urn:x", "x");
    let err = renderer.render(&Value::text("x")).err();
    assert!(err.is_some_and(|e| !e.is_parse_error()));
}
