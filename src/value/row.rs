use super::Value;
use crate::error::Error;
use crate::reflect::{Entity, Outline};
use std::sync::Arc;

/// One immutable result record. Column names are shared by all rows of a result.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Row { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Cell by column name; exact match first, then ASCII case-insensitive.
    pub fn get(&self, column: &str) -> Option<&Value> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == column)
            .or_else(|| self.columns.iter().position(|c| c.eq_ignore_ascii_case(column)))?;
        self.values.get(idx)
    }

    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Decode into an entity: every column naming a property is assigned through the coercion
    /// switch, read-only properties included. Other columns are ignored.
    pub fn decode<T: Entity>(&self, outline: &Outline<T>) -> Result<T, Error> {
        let mut entity = T::default();
        for (column, value) in self.columns.iter().zip(&self.values) {
            let Ok(property) = outline.property_named(column) else {
                continue;
            };
            property.hydrate(&mut entity, value)?;
        }
        Ok(entity)
    }

    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .columns
            .iter()
            .zip(&self.values)
            .map(|(c, v)| (c.clone(), v.as_json().unwrap_or(serde_json::Value::Null)))
            .collect();
        serde_json::Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::CaseConvention;

    crate::entity! {
        #[derive(Debug, Default, PartialEq)]
        struct Particle: ParticleFields {
            id: i64,
            name: String,
            rest_mass: Option<f64>,
            #[read_only]
            label: String,
        }
    }

    fn row(columns: &[&str], values: Vec<Value>) -> Row {
        let columns: Arc<[String]> = columns.iter().map(|c| c.to_string()).collect();
        Row::new(columns, values)
    }

    #[test]
    fn cells_by_name_and_index() {
        let r = row(&["id", "Name"], vec![Value::Int(1), Value::from("muon")]);
        assert_eq!(r.get("id"), Some(&Value::Int(1)));
        assert_eq!(r.get("name"), Some(&Value::from("muon")));
        assert_eq!(r.get_index(1), Some(&Value::from("muon")));
        assert_eq!(r.get("missing"), None);
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn decodes_matching_columns() {
        let outline = Outline::<Particle>::build(CaseConvention::Snake).unwrap();
        let r = row(
            &["id", "name", "rest_mass", "label", "unrelated"],
            vec![
                Value::from("3"),
                Value::from("tau"),
                Value::Null,
                Value::from("generated"),
                Value::Bool(true),
            ],
        );
        let particle = r.decode(&outline).unwrap();
        assert_eq!(
            particle,
            Particle {
                id: 3,
                name: "tau".into(),
                rest_mass: None,
                label: "generated".into(),
            }
        );
    }

    #[test]
    fn camel_columns_decode_under_camel_outline() {
        let outline = Outline::<Particle>::build(CaseConvention::Camel).unwrap();
        let r = row(&["restMass"], vec![Value::Float(1.77)]);
        assert_eq!(r.decode(&outline).unwrap().rest_mass, Some(1.77));
    }

    #[test]
    fn case_folded_columns_decode_under_camel_outline() {
        let outline = Outline::<Particle>::build(CaseConvention::Camel).unwrap();
        let r = row(&["id", "restmass"], vec![Value::Int(1), Value::Float(1.77)]);
        let particle = r.decode(&outline).unwrap();
        assert_eq!(particle.id, 1);
        assert_eq!(particle.rest_mass, Some(1.77));
    }
}
