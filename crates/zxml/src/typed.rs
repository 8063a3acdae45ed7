//! Optional typed reading of decoded text
//!
//! Decoding keeps every leaf as raw text. Callers that want typed leaves run
//! this pass explicitly over the decoded tree.

use std::str::FromStr;

use rust_decimal::Decimal;
use time::PrimitiveDateTime;
use time::macros::format_description;

use crate::value::{Scalar, Value};

/// Interpret text as a datetime, integer or decimal, in that order,
/// falling back to the text itself
pub fn type_convert(text: &str) -> Scalar {
    let datetime_format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(dt) = PrimitiveDateTime::parse(text, datetime_format) {
        return Scalar::Datetime(dt);
    }
    if let Ok(n) = text.trim().parse::<i64>() {
        return Scalar::Integer(n);
    }
    if let Ok(d) = Decimal::from_str(text.trim()) {
        return Scalar::Decimal(d);
    }
    if let Ok(d) = Decimal::from_scientific(text.trim()) {
        return Scalar::Decimal(d);
    }
    Scalar::Text(text.to_string())
}

impl Value {
    /// Copy of this tree with every text leaf passed through [`type_convert`]
    pub fn type_converted(&self) -> Self {
        match self {
            Self::Null => Self::Null,
            Self::Scalar(Scalar::Text(text)) => Self::Scalar(type_convert(text)),
            Self::Scalar(other) => Self::Scalar(other.clone()),
            Self::Sequence(seq) => seq.iter().map(Self::type_converted).collect::<Vec<_>>().into(),
            Self::Mapping(map) => Self::Mapping(
                map.iter()
                    .map(|(key, value)| (key.clone(), value.type_converted()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Mapping;
    use time::macros::datetime;

    #[test]
    fn test_datetime() {
        assert_eq!(
            type_convert("2011-12-25 12:45:00"),
            Scalar::Datetime(datetime!(2011-12-25 12:45:00))
        );
    }

    #[test]
    fn test_integer() {
        assert_eq!(type_convert("121"), Scalar::Integer(121));
        assert_eq!(type_convert("-7"), Scalar::Integer(-7));
    }

    #[test]
    fn test_decimal() {
        assert_eq!(type_convert("121.0"), Scalar::Decimal(Decimal::new(1210, 1)));
        assert_eq!(type_convert("1e3"), Scalar::Decimal(Decimal::new(1000, 0)));
    }

    #[test]
    fn test_text_fallback() {
        assert_eq!(type_convert("dasd"), Scalar::Text("dasd".to_string()));
        assert_eq!(type_convert("2011-13-45 99:00:00"), Scalar::Text("2011-13-45 99:00:00".to_string()));
    }

    #[test]
    fn test_tree_conversion_keeps_nulls_and_shape() {
        let tree = Value::from(Mapping::from([
            ("id", Value::text("1")),
            ("note", Value::Null),
            ("items", vec![Value::text("2.5"), Value::text("x")].into()),
        ]));
        let converted = tree.type_converted();
        let expected = Value::from(Mapping::from([
            ("id", Value::from(1)),
            ("note", Value::Null),
            (
                "items",
                vec![
                    Value::from(Decimal::new(25, 1)),
                    Value::text("x"),
                ]
                .into(),
            ),
        ]));
        assert_eq!(converted, expected);
    }
}
