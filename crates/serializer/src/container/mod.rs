//! 컨테이너 프레이밍 -- 매직, 메타데이터, 동기화 마커로 감싼 단일 블록
//!
//! 직렬화 호출 하나가 독립적으로 디코딩 가능한 컨테이너 하나를 만듭니다.
//!
//! ```text
//! offset  field                         size
//! 0       magic ("Obj" + 0x01)          4 bytes
//! 4..     metadata map (string->bytes)  variable
//! ..      sync marker                   16 bytes
//! ..      object count (=1)             varint
//! ..      payload byte length           varint
//! ..      encoded record payload        <payload byte length> bytes
//! ..      sync marker (repeated)        16 bytes
//! ```
//!
//! - [`ContainerEncoder`]: 레코드를 컨테이너로 인코딩
//! - [`ContainerDecoder`]: 컨테이너를 메타데이터와 레코드로 디코딩
//! - [`ContainerMetadata`]: 코덱과 스키마 JSON을 담는 메타데이터 맵

pub mod decoder;
pub mod encoder;
pub mod metadata;

pub use decoder::{ContainerDecoder, DecodedContainer};
pub use encoder::ContainerEncoder;
pub use metadata::ContainerMetadata;

/// 컨테이너 매직 바이트 (형식 + 버전)
pub const MAGIC: [u8; 4] = *b"Obj\x01";

/// 동기화 마커 크기
pub const SYNC_SIZE: usize = 16;

/// 블록 구분용 16바이트 난수
pub type SyncMarker = [u8; SYNC_SIZE];

/// 메타데이터 키: 코덱
pub const CODEC_KEY: &str = "avro.codec";

/// 메타데이터 키: 스키마 JSON
pub const SCHEMA_KEY: &str = "avro.schema";

/// 압축 없음 코덱 식별자
pub const NULL_CODEC: &str = "null";

/// 바이트가 컨테이너 매직으로 시작하는지 확인합니다.
pub fn has_magic(bytes: &[u8]) -> bool {
    bytes.starts_with(&MAGIC)
}
