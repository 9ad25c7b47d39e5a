//! 컨테이너 메타데이터 맵
//!
//! 문자열 키와 바이트 값의 맵을 Avro `map<bytes>` 바이너리 형식으로
//! 기록하고 읽습니다. 키는 정렬된 순서로 기록되므로 같은 메타데이터는
//! 항상 같은 바이트를 만듭니다.

use std::collections::BTreeMap;

use tracing::{debug, trace};

use super::{CODEC_KEY, NULL_CODEC, SCHEMA_KEY};
use crate::error::SerializerError;
use crate::schema::SchemaDefinition;
use crate::varint::{decode_long, encode_long};

/// 메타데이터 맵
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerMetadata {
    entries: BTreeMap<String, Vec<u8>>,
}

impl ContainerMetadata {
    /// 빈 메타데이터를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 스키마용 메타데이터 (null 코덱 + 스키마 JSON)를 생성합니다.
    pub fn for_schema(schema: &SchemaDefinition) -> Self {
        let mut metadata = Self::new();
        metadata.set(CODEC_KEY, NULL_CODEC);
        metadata.set(SCHEMA_KEY, schema.canonical_json());
        metadata
    }

    /// 키에 값을 설정합니다.
    pub fn set(&mut self, key: impl Into<String>, value: impl AsRef<[u8]>) {
        let key = key.into();
        debug!(key = %key, "setting metadata key");
        trace!(
            key = %key,
            value = %String::from_utf8_lossy(value.as_ref()),
            "metadata value"
        );
        self.entries.insert(key, value.as_ref().to_vec());
    }

    /// 키의 값을 반환합니다.
    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// 키의 값을 UTF-8 문자열로 반환합니다.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| std::str::from_utf8(v).ok())
    }

    /// 코덱 식별자
    pub fn codec(&self) -> Option<&str> {
        self.get_str(CODEC_KEY)
    }

    /// 스키마 JSON
    pub fn schema_json(&self) -> Option<&str> {
        self.get_str(SCHEMA_KEY)
    }

    /// 엔트리 수
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (키, 값)을 키 순서로 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Avro `map<bytes>` 형식으로 `out` 뒤에 기록합니다.
    ///
    /// 엔트리가 있으면 양수 개수 블록 하나, 마지막에 0 개수 블록.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        if !self.entries.is_empty() {
            encode_long(self.entries.len() as i64, out);
            for (key, value) in &self.entries {
                write_bytes(key.as_bytes(), out);
                write_bytes(value, out);
            }
        }
        encode_long(0, out);
    }

    /// `buf` 앞부분에서 메타데이터를 읽습니다.
    ///
    /// (메타데이터, 읽은 바이트 수)를 반환합니다. 음수 개수 블록
    /// (뒤따르는 블록 바이트 크기 포함)도 허용합니다.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize), SerializerError> {
        let mut cursor = Cursor::new(buf);
        let mut metadata = Self::new();

        loop {
            let count = cursor.long("metadata block count")?;
            if count == 0 {
                break;
            }

            let count = if count < 0 {
                // 음수 개수 뒤에는 블록 바이트 크기가 옵니다.
                cursor.long("metadata block size")?;
                count.unsigned_abs()
            } else {
                count as u64
            };

            for _ in 0..count {
                let key = cursor.bytes("metadata key")?;
                let key = String::from_utf8(key.to_vec()).map_err(|_| SerializerError::Decode {
                    offset: cursor.pos,
                    reason: "metadata key is not valid UTF-8".to_owned(),
                })?;
                let value = cursor.bytes("metadata value")?.to_vec();
                metadata.entries.insert(key, value);
            }
        }

        Ok((metadata, cursor.pos))
    }
}

fn write_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    encode_long(bytes.len() as i64, out);
    out.extend_from_slice(bytes);
}

/// 오프셋을 추적하는 읽기 커서
pub(crate) struct Cursor<'a> {
    pub(crate) buf: &'a [u8],
    pub(crate) pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub(crate) fn long(&mut self, what: &str) -> Result<i64, SerializerError> {
        let (value, read) =
            decode_long(&self.buf[self.pos..]).ok_or_else(|| SerializerError::Decode {
                offset: self.pos,
                reason: format!("truncated or invalid varint for {what}"),
            })?;
        self.pos += read;
        Ok(value)
    }

    pub(crate) fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8], SerializerError> {
        if self.remaining() < len {
            return Err(SerializerError::Decode {
                offset: self.pos,
                reason: format!(
                    "{what} needs {len} bytes, only {} left",
                    self.remaining()
                ),
            });
        }
        let slice = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub(crate) fn bytes(&mut self, what: &str) -> Result<&'a [u8], SerializerError> {
        let len = self.long(what)?;
        let len = usize::try_from(len).map_err(|_| SerializerError::Decode {
            offset: self.pos,
            reason: format!("negative length {len} for {what}"),
        })?;
        self.take(len, what)
    }
}
