// src/models/mod.rs
pub mod course;
pub mod enrollment;
pub mod user;

use serde::{de, Deserialize, Deserializer};

/// O frontend envia ids tanto como número (`5`) como texto (`"5"`).
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(i64),
    Text(String),
}

/// Deserializa um id opcional aceitando número ou texto numérico.
/// Texto vazio conta como ausente.
pub fn deserialize_optional_id<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<IdRepr>::deserialize(deserializer)? {
        None => Ok(None),
        Some(IdRepr::Number(n)) => Ok(Some(n)),
        Some(IdRepr::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(IdRepr::Text(s)) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("id inválido: '{}'", s))),
    }
}
