use log::debug;

use crate::catalog::{AttributeRef, DataType, RelationLayout};
use crate::config::ParseMode;
use crate::error::QuillQueryResult;
use crate::storage::codec::ValueCodec;
use crate::storage::tuple::Tuple;

/// A value as a caller supplies it: text for numeric attributes, raw bytes for
/// strings.
#[derive(derive_new::new, Debug, Clone, PartialEq, Eq)]
pub struct AttributeValue {
    pub relation: String,
    pub attribute: String,
    pub data_type: DataType,
    pub value: Vec<u8>,
}

impl AttributeValue {
    pub fn text(
        relation: impl Into<String>,
        attribute: impl Into<String>,
        data_type: DataType,
        text: &str,
    ) -> Self {
        Self::new(
            relation.into(),
            attribute.into(),
            data_type,
            text.as_bytes().to_vec(),
        )
    }
}

/// Lays `values` out as one record of `layout`. Each attribute takes the first value
/// with its name and is encoded with the attribute's stored type; attributes without
/// a value stay zeroed.
pub fn build_tuple(
    layout: &RelationLayout,
    values: &[AttributeValue],
    mode: ParseMode,
) -> QuillQueryResult<Tuple> {
    let mut tuple = Tuple::zeroed(layout.tuple_len)?;
    for attr in layout.attributes.iter() {
        let Some(input) = values.iter().find(|v| v.attribute == attr.name) else {
            continue;
        };
        if input.data_type != attr.data_type {
            debug!(
                "{}.{} declared {} but stored as {}",
                layout.relation, attr.name, input.data_type, attr.data_type
            );
        }
        ValueCodec::encode_into(
            &input.value,
            attr.data_type,
            tuple.attribute_mut(attr)?,
            mode,
        )?;
    }
    for input in values {
        if layout.attribute(&input.attribute).is_none() {
            debug!(
                "ignore value for unknown attribute {}.{}",
                layout.relation, input.attribute
            );
        }
    }
    Ok(tuple)
}

/// Copies the projected attributes out of `source`, in list order, into a new
/// contiguous record.
pub fn project_tuple(source: &Tuple, projection: &[AttributeRef]) -> QuillQueryResult<Tuple> {
    let width = projection.iter().map(|attr| attr.length).sum();
    let mut tuple = Tuple::zeroed(width)?;
    let mut offset = 0;
    for attr in projection {
        let bytes = source.attribute(attr)?;
        tuple.as_bytes_mut()[offset..offset + attr.length].copy_from_slice(bytes);
        offset += attr.length;
    }
    Ok(tuple)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{build_tuple, project_tuple, AttributeValue};
    use crate::catalog::{AttributeDescriptor, DataType, RelationLayout};
    use crate::config::ParseMode;
    use crate::error::QuillQueryError;
    use crate::storage::tuple::Tuple;
    use rand::Rng;

    fn layout() -> RelationLayout {
        RelationLayout::new(
            "Employees",
            vec![
                Arc::new(AttributeDescriptor::new(
                    "Employees".into(),
                    "id".into(),
                    0,
                    4,
                    DataType::Integer,
                )),
                Arc::new(AttributeDescriptor::new(
                    "Employees".into(),
                    "name".into(),
                    4,
                    10,
                    DataType::String,
                )),
                Arc::new(AttributeDescriptor::new(
                    "Employees".into(),
                    "salary".into(),
                    14,
                    4,
                    DataType::Float,
                )),
            ],
        )
    }

    #[test]
    fn build_places_values_at_offsets() {
        let values = vec![
            AttributeValue::text("Employees", "name", DataType::String, "Ann"),
            AttributeValue::text("Employees", "id", DataType::Integer, "7"),
        ];
        let tuple = build_tuple(&layout(), &values, ParseMode::Lenient).unwrap();

        let mut expected = 7i32.to_ne_bytes().to_vec();
        expected.extend_from_slice(b"Ann\0\0\0\0\0\0\0");
        expected.extend_from_slice(&[0; 4]);
        assert_eq!(tuple.as_bytes(), expected.as_slice());
    }

    #[test]
    fn first_duplicate_wins_and_unknown_is_ignored() {
        let values = vec![
            AttributeValue::text("Employees", "id", DataType::Integer, "1"),
            AttributeValue::text("Employees", "id", DataType::Integer, "2"),
            AttributeValue::text("Employees", "bonus", DataType::Integer, "3"),
        ];
        let tuple = build_tuple(&layout(), &values, ParseMode::Lenient).unwrap();
        assert_eq!(&tuple.as_bytes()[..4], &1i32.to_ne_bytes());
        assert_eq!(tuple.len(), 18);
    }

    #[test]
    fn stored_type_overrides_declared_type() {
        let values = vec![AttributeValue::text(
            "Employees",
            "salary",
            DataType::String,
            "2.5",
        )];
        let tuple = build_tuple(&layout(), &values, ParseMode::Lenient).unwrap();
        assert_eq!(&tuple.as_bytes()[14..], &2.5f32.to_ne_bytes());
    }

    #[test]
    fn strict_mode_propagates_invalid_value() {
        let values = vec![AttributeValue::text("Employees", "id", DataType::Integer, "seven")];
        assert!(matches!(
            build_tuple(&layout(), &values, ParseMode::Strict),
            Err(QuillQueryError::InvalidValue(_))
        ));
        let lenient = build_tuple(&layout(), &values, ParseMode::Lenient).unwrap();
        assert_eq!(&lenient.as_bytes()[..4], &0i32.to_ne_bytes());
    }

    #[test]
    fn projection_follows_list_order() {
        let layout = layout();
        let values = vec![
            AttributeValue::text("Employees", "id", DataType::Integer, "9"),
            AttributeValue::text("Employees", "name", DataType::String, "Bo"),
        ];
        let source = build_tuple(&layout, &values, ParseMode::Lenient).unwrap();
        let projection = vec![layout.attributes[1].clone(), layout.attributes[0].clone()];
        let projected = project_tuple(&source, &projection).unwrap();

        let mut expected = b"Bo\0\0\0\0\0\0\0\0".to_vec();
        expected.extend_from_slice(&9i32.to_ne_bytes());
        assert_eq!(projected.as_bytes(), expected.as_slice());
    }

    #[test]
    fn projection_outside_source_fails() {
        let layout = layout();
        let short = Tuple::zeroed(8).unwrap();
        assert!(matches!(
            project_tuple(&short, &layout.attributes),
            Err(QuillQueryError::Internal(_))
        ));
    }

    #[test]
    fn build_then_project_round_trips() {
        let layout = layout();
        let mut rng = rand::rng();
        for _ in 0..64 {
            let id: i32 = rng.random();
            let salary: f32 = rng.random_range(-1.0e6..1.0e6);
            let name_len = rng.random_range(0..16);
            let name = (0..name_len)
                .map(|_| rng.random_range(b'a'..=b'z') as char)
                .collect::<String>();
            let values = vec![
                AttributeValue::text("Employees", "id", DataType::Integer, &id.to_string()),
                AttributeValue::text("Employees", "name", DataType::String, &name),
                AttributeValue::text(
                    "Employees",
                    "salary",
                    DataType::Float,
                    &salary.to_string(),
                ),
            ];
            let tuple = build_tuple(&layout, &values, ParseMode::Strict).unwrap();
            assert!(layout.is_tiled());
            assert_eq!(tuple.len(), layout.tuple_len);

            for attr in layout.attributes.iter() {
                let field = project_tuple(&tuple, std::slice::from_ref(attr)).unwrap();
                match attr.data_type {
                    DataType::Integer => assert_eq!(field.as_bytes(), &id.to_ne_bytes()),
                    DataType::Float => assert_eq!(field.as_bytes(), &salary.to_ne_bytes()),
                    DataType::String => {
                        let kept = name.len().min(attr.length - 1);
                        assert_eq!(&field.as_bytes()[..kept], &name.as_bytes()[..kept]);
                        assert!(field.as_bytes()[kept..].iter().all(|b| *b == 0));
                    }
                }
            }
        }
    }
}
