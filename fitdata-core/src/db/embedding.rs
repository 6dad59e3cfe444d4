//! Fixed-length embedding vectors stored on workouts and workout exercises.
//!
//! Vectors are produced by an external embedding worker. Here they are only
//! validated, stored and read back: a BLOB of `EMBEDDING_DIM` little-endian
//! `f32` values.

use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Binary;
use diesel::sqlite::Sqlite;
use serde::Serialize;
use thiserror::Error;

pub const EMBEDDING_DIM: usize = 1024;

const F32_BYTES: usize = std::mem::size_of::<f32>();

#[derive(Debug, Error, PartialEq)]
pub enum EmbeddingError {
    #[error("embedding must have {expected} dimensions, got {0}", expected = EMBEDDING_DIM)]
    WrongDimension(usize),
    #[error("embedding blob must be {expected} bytes, got {0}", expected = EMBEDDING_DIM * F32_BYTES)]
    WrongByteLength(usize),
}

#[derive(Debug, Clone, PartialEq, Serialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Binary)]
pub struct Embedding(Vec<f32>);

impl Embedding {
    pub fn new(values: Vec<f32>) -> Result<Self, EmbeddingError> {
        if values.len() != EMBEDDING_DIM {
            return Err(EmbeddingError::WrongDimension(values.len()));
        }
        Ok(Self(values))
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }

    pub fn into_values(self) -> Vec<f32> {
        self.0
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EmbeddingError> {
        if bytes.len() != EMBEDDING_DIM * F32_BYTES {
            return Err(EmbeddingError::WrongByteLength(bytes.len()));
        }
        let values = bytes
            .chunks_exact(F32_BYTES)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Ok(Self(values))
    }
}

impl TryFrom<Vec<f32>> for Embedding {
    type Error = EmbeddingError;

    fn try_from(values: Vec<f32>) -> Result<Self, Self::Error> {
        Self::new(values)
    }
}

impl ToSql<Binary, Sqlite> for Embedding {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.to_bytes());
        Ok(IsNull::No)
    }
}

impl FromSql<Binary, Sqlite> for Embedding {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let raw = <Vec<u8> as FromSql<Binary, Sqlite>>::from_sql(bytes)?;
        Ok(Self::from_bytes(&raw)?)
    }
}
