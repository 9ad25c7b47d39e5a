//! 컨테이너 인코더
//!
//! 레코드 하나를 헤더 + 데이터 블록 하나로 구성된 컨테이너로 인코딩합니다.
//! 동기화 마커는 컨테이너마다 새로 생성되며, 같은 컨테이너의 헤더와
//! 블록 끝에 동일한 값이 기록됩니다.

use apache_avro::to_avro_datum;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::trace;

use super::{ContainerMetadata, MAGIC, SyncMarker, SYNC_SIZE};
use crate::error::SerializerError;
use crate::record::RecordInstance;
use crate::varint::{encode_long, long_len, MAX_VARINT_LEN};

/// 컨테이너 인코더
///
/// 동기화 마커 생성용 난수 생성기를 보유합니다. 테스트에서는
/// [`ContainerEncoder::with_rng`]로 시드를 고정할 수 있습니다.
#[derive(Debug)]
pub struct ContainerEncoder<R = StdRng> {
    rng: R,
}

impl ContainerEncoder<StdRng> {
    /// OS 엔트로피로 시드한 인코더를 생성합니다.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl Default for ContainerEncoder<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RngCore> ContainerEncoder<R> {
    /// 지정한 난수 생성기로 인코더를 생성합니다.
    pub fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// 새 동기화 마커를 생성합니다.
    pub fn make_sync(&mut self) -> SyncMarker {
        let mut sync = [0u8; SYNC_SIZE];
        self.rng.fill_bytes(&mut sync);
        sync
    }

    /// 레코드를 컨테이너 바이트로 인코딩합니다.
    ///
    /// 레코드 페이로드를 먼저 인코딩하므로, 실패하면 아무 바이트도
    /// 만들지 않습니다.
    pub fn encode(
        &mut self,
        record: &RecordInstance<'_>,
        metadata: &ContainerMetadata,
    ) -> Result<Vec<u8>, SerializerError> {
        let payload = encode_payload(record)?;
        let sync = self.make_sync();

        let mut out = Vec::with_capacity(payload.len() + metadata_hint(metadata));
        write_header(metadata, &sync, &mut out);
        write_block(&payload, 1, &sync, &mut out);

        trace!(
            payload_bytes = payload.len(),
            container_bytes = out.len(),
            "container encoded"
        );

        Ok(out)
    }
}

fn metadata_hint(metadata: &ContainerMetadata) -> usize {
    let entries: usize = metadata
        .iter()
        .map(|(k, v)| k.len() + v.len() + long_len(k.len() as i64) + long_len(v.len() as i64))
        .sum();
    MAGIC.len() + entries + SYNC_SIZE * 2 + MAX_VARINT_LEN * 4
}

/// 레코드를 스키마 바이너리 인코딩으로 변환합니다.
pub fn encode_payload(record: &RecordInstance<'_>) -> Result<Vec<u8>, SerializerError> {
    to_avro_datum(record.schema().avro(), record.to_avro())
        .map_err(|e| SerializerError::Encode(e.to_string()))
}

/// 매직, 메타데이터, 동기화 마커를 기록합니다.
pub fn write_header(metadata: &ContainerMetadata, sync: &SyncMarker, out: &mut Vec<u8>) {
    out.extend_from_slice(&MAGIC);
    metadata.encode_into(out);
    out.extend_from_slice(sync);
}

/// 레코드 하나를 데이터 블록으로 기록합니다.
///
/// 인코딩에 실패하면 `out`은 변경되지 않습니다.
pub fn write_data_block(
    record: &RecordInstance<'_>,
    sync: &SyncMarker,
    out: &mut Vec<u8>,
) -> Result<(), SerializerError> {
    let payload = encode_payload(record)?;
    write_block(&payload, 1, sync, out);
    Ok(())
}

/// 객체 수, 바이트 길이, 페이로드, 동기화 마커를 기록합니다.
pub fn write_block(payload: &[u8], count: i64, sync: &SyncMarker, out: &mut Vec<u8>) {
    encode_long(count, out);
    encode_long(payload.len() as i64, out);
    out.extend_from_slice(payload);
    out.extend_from_slice(sync);
}
