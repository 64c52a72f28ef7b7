use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// A single student record as persisted in the `mahasiswa` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Mahasiswa {
    /// Server-assigned primary key. Never changes once the row exists.
    pub id: i32,
    /// Student identifier, unique across all records.
    pub nim: String,
    pub nama: String,
    pub jurusan: String,
    /// Cohort year, kept as text.
    pub angkatan: String,
}

/// The body accepted by the create and update endpoints.
///
/// Fields are kept as raw JSON values so that `validate` can decide what
/// counts as "present": clients are not forced to send strings, but empty
/// strings, `null`, `false` and `0` are all treated as missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MahasiswaPayload {
    #[serde(default)]
    pub nim: Option<Value>,
    #[serde(default)]
    pub nama: Option<Value>,
    #[serde(default)]
    pub jurusan: Option<Value>,
    #[serde(default)]
    pub angkatan: Option<Value>,
}

/// A validated set of business fields, ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMahasiswa {
    pub nim: String,
    pub nama: String,
    pub jurusan: String,
    pub angkatan: String,
}

impl MahasiswaPayload {
    /// Checks that all four fields are present and non-empty.
    pub fn validate(&self) -> Result<NewMahasiswa, CoreError> {
        Ok(NewMahasiswa {
            nim: required_text(self.nim.as_ref())?,
            nama: required_text(self.nama.as_ref())?,
            jurusan: required_text(self.jurusan.as_ref())?,
            angkatan: required_text(self.angkatan.as_ref())?,
        })
    }
}

impl NewMahasiswa {
    /// Attaches a store-assigned id, producing the persisted record.
    pub fn with_id(self, id: i32) -> Mahasiswa {
        Mahasiswa {
            id,
            nim: self.nim,
            nama: self.nama,
            jurusan: self.jurusan,
            angkatan: self.angkatan,
        }
    }
}

fn required_text(value: Option<&Value>) -> Result<String, CoreError> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Ok(n.to_string()),
        Some(Value::Bool(true)) => Ok("true".to_string()),
        _ => Err(CoreError::MissingFields),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(body: Value) -> MahasiswaPayload {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn accepts_complete_payload() {
        let p = payload(json!({"nim": "123", "nama": "Ann", "jurusan": "CS", "angkatan": "2024"}));
        let new = p.validate().unwrap();
        assert_eq!(new.nim, "123");
        assert_eq!(new.angkatan, "2024");
    }

    #[test]
    fn numeric_fields_are_stored_as_text() {
        let p = payload(json!({"nim": 123, "nama": "Ann", "jurusan": "CS", "angkatan": 2024}));
        let new = p.validate().unwrap();
        assert_eq!(new.nim, "123");
        assert_eq!(new.angkatan, "2024");
    }

    #[test]
    fn rejects_missing_field() {
        let p = payload(json!({"nim": "123", "nama": "Ann", "jurusan": "CS"}));
        assert_eq!(p.validate(), Err(CoreError::MissingFields));
    }

    #[test]
    fn rejects_falsy_values() {
        for falsy in [json!(""), json!(null), json!(false), json!(0)] {
            let p = payload(json!({
                "nim": "1",
                "nama": falsy.clone(),
                "jurusan": "CS",
                "angkatan": "2024",
            }));
            assert_eq!(p.validate(), Err(CoreError::MissingFields), "value: {falsy}");
        }
    }

    #[test]
    fn rejects_structured_values() {
        let p = payload(json!({"nim": ["1"], "nama": "Ann", "jurusan": "CS", "angkatan": "2024"}));
        assert!(p.validate().is_err());
    }

    #[test]
    fn record_serializes_with_all_fields() {
        let record = NewMahasiswa {
            nim: "123".into(),
            nama: "Ann".into(),
            jurusan: "CS".into(),
            angkatan: "2024".into(),
        }
        .with_id(1);
        assert_eq!(
            serde_json::to_value(&record).unwrap(),
            json!({"id": 1, "nim": "123", "nama": "Ann", "jurusan": "CS", "angkatan": "2024"})
        );
    }
}
