use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use zxml::{Decoder, DecoderConfig, Value, from_xml_str};

const SIMPLE_XML: &str = "<root><child>text</child></root>";
const ATTR_XML: &str = "<root id=\"1\" name='test'><item value=\"42\" /></root>";

fn list_xml(items: usize) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<root><orders>");
    for i in 0..items {
        xml.push_str(&format!(
            "<list-item><id>{i}</id><price>{i}.50</price><note>a &amp; b</note></list-item>"
        ));
    }
    xml.push_str("</orders></root>");
    xml
}

fn bench_simple(c: &mut Criterion) {
    c.bench_function("zxml_decode_simple", |b| {
        b.iter(|| from_xml_str(black_box(SIMPLE_XML)))
    });
}

fn bench_attr(c: &mut Criterion) {
    c.bench_function("zxml_decode_attr", |b| {
        b.iter(|| from_xml_str(black_box(ATTR_XML)))
    });
}

fn bench_list(c: &mut Criterion) {
    let xml = list_xml(1_000);
    c.bench_function("zxml_decode_list_1000", |b| {
        b.iter(|| from_xml_str(black_box(&xml)))
    });
}

fn bench_typed(c: &mut Criterion) {
    let xml = list_xml(1_000);
    let decoder = Decoder::with_config(DecoderConfig::default());
    c.bench_function("zxml_decode_typed_list_1000", |b| {
        b.iter(|| {
            decoder
                .decode_str(black_box(&xml))
                .map(|value| Value::type_converted(&value))
        })
    });
}

criterion_group!(benches, bench_simple, bench_attr, bench_list, bench_typed);
criterion_main!(benches);
