//! 컨테이너 디코더
//!
//! 인코더가 만든 컨테이너 (또는 같은 형식의 외부 파일)를 메타데이터와
//! 레코드 목록으로 되돌립니다. `null` 코덱만 지원합니다.

use apache_avro::from_avro_datum;
use tracing::debug;

use super::metadata::Cursor;
use super::{ContainerMetadata, MAGIC, NULL_CODEC, SYNC_SIZE, SyncMarker};
use crate::error::SerializerError;
use crate::record::DecodedRecord;
use crate::schema::{AvroSchemaSource, SchemaDefinition, SchemaSource};

/// 디코딩된 컨테이너
#[derive(Debug, Clone)]
pub struct DecodedContainer {
    /// 헤더 메타데이터
    pub metadata: ContainerMetadata,
    /// 동기화 마커
    pub sync: SyncMarker,
    /// 메타데이터에서 컴파일한 스키마
    pub schema: SchemaDefinition,
    /// 모든 블록의 레코드
    pub records: Vec<DecodedRecord>,
}

/// 컨테이너 디코더
pub struct ContainerDecoder {
    source: Box<dyn SchemaSource>,
}

impl Default for ContainerDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerDecoder {
    /// 기본 스키마 소스로 디코더를 생성합니다.
    pub fn new() -> Self {
        Self::with_source(Box::new(AvroSchemaSource))
    }

    /// 지정한 스키마 소스로 디코더를 생성합니다.
    pub fn with_source(source: Box<dyn SchemaSource>) -> Self {
        Self { source }
    }

    /// 컨테이너 바이트를 디코딩합니다.
    ///
    /// # Errors
    /// 매직 불일치, 지원하지 않는 코덱, 스키마 누락, 동기화 마커 불일치,
    /// 블록 크기와 레코드 바이트 불일치 시 [`SerializerError::Decode`]
    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedContainer, SerializerError> {
        let mut cursor = Cursor::new(bytes);

        let magic = cursor.take(MAGIC.len(), "magic")?;
        if magic != MAGIC {
            return Err(SerializerError::Decode {
                offset: 0,
                reason: "not a container (bad magic)".to_owned(),
            });
        }

        let (metadata, meta_len) = ContainerMetadata::decode(&bytes[cursor.pos..])?;
        let meta_offset = cursor.pos;
        cursor.pos += meta_len;

        match metadata.codec() {
            None | Some(NULL_CODEC) => {}
            Some(other) => {
                return Err(SerializerError::Decode {
                    offset: meta_offset,
                    reason: format!("unsupported codec '{other}'"),
                });
            }
        }

        let schema_json = metadata.schema_json().ok_or_else(|| SerializerError::Decode {
            offset: meta_offset,
            reason: "metadata has no schema".to_owned(),
        })?;
        let schema = self.source.compile(schema_json)?;

        let mut sync = [0u8; SYNC_SIZE];
        sync.copy_from_slice(cursor.take(SYNC_SIZE, "sync marker")?);

        let mut records = Vec::new();
        while cursor.remaining() > 0 {
            let block_offset = cursor.pos;
            let count = cursor.long("block object count")?;
            if count < 0 {
                return Err(SerializerError::Decode {
                    offset: block_offset,
                    reason: format!("negative block object count {count}"),
                });
            }
            let payload = cursor.bytes("block payload")?;
            let payload_offset = cursor.pos - payload.len();

            // 객체 수는 페이로드 바이트 수(최소 1)를 넘을 수 없음
            let max_count = payload.len().max(1) as i64;
            if count > max_count {
                return Err(SerializerError::Decode {
                    offset: block_offset,
                    reason: format!(
                        "block declares {count} objects in {} payload bytes",
                        payload.len()
                    ),
                });
            }

            let mut reader = payload;
            for _ in 0..count {
                let value = from_avro_datum(schema.avro(), &mut reader, None).map_err(|e| {
                    SerializerError::Decode {
                        offset: payload_offset + (payload.len() - reader.len()),
                        reason: e.to_string(),
                    }
                })?;
                let record = DecodedRecord::from_avro(value).map_err(|reason| {
                    SerializerError::Decode {
                        offset: payload_offset,
                        reason,
                    }
                })?;
                records.push(record);
            }
            if !reader.is_empty() {
                return Err(SerializerError::Decode {
                    offset: cursor.pos - reader.len(),
                    reason: format!("{} trailing bytes in block payload", reader.len()),
                });
            }

            let trailer = cursor.take(SYNC_SIZE, "block sync marker")?;
            if trailer != sync {
                return Err(SerializerError::Decode {
                    offset: cursor.pos - SYNC_SIZE,
                    reason: "sync marker mismatch".to_owned(),
                });
            }
        }

        debug!(
            schema = schema.name(),
            records = records.len(),
            bytes = bytes.len(),
            "container decoded"
        );

        Ok(DecodedContainer {
            metadata,
            sync,
            schema,
            records,
        })
    }
}
