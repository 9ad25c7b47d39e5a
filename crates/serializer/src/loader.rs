//! 스키마 설정 파일 로더
//!
//! 설정 파일은 헤더와 스키마 본문으로 나뉩니다.
//!
//! ```text
//! # 헤더 (선택): pattern 지시어 외의 라인은 무시
//! pattern: (\d+) (\w+)
//! //--AVRO--
//! {"type": "record", "name": "Access", "fields": [...]}
//! ```
//!
//! 마커 라인 (`//--AVRO--`를 포함하는 라인) 이전이 헤더이고, 마커 라인
//! 다음부터 파일 끝까지가 스키마 본문입니다. 마커가 없으면 본문은 비어
//! 있습니다.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::SerializerError;

/// 헤더와 스키마 본문을 구분하는 마커
pub const SCHEMA_MARKER: &str = "//--AVRO--";

/// 설정 파일 최대 크기
const MAX_CONFIG_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// 파싱된 스키마 설정 문서
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDocument {
    /// 헤더의 마지막 `pattern:` 지시어 값
    pub pattern: Option<String>,
    /// 마커 이후의 스키마 JSON 텍스트
    pub schema_text: String,
    /// 마커 라인을 찾았는지 여부
    pub marker_found: bool,
}

impl SchemaDocument {
    /// 설정 문서 텍스트를 파싱합니다.
    ///
    /// 헤더의 `pattern:` 지시어는 나올 때마다 이전 값을 대체합니다.
    pub fn parse(text: &str) -> Self {
        let mut doc = Self::default();
        let mut offset = 0;

        for line in text.split_inclusive('\n') {
            offset += line.len();

            if line.contains(SCHEMA_MARKER) {
                doc.marker_found = true;
                doc.schema_text = text[offset..].to_owned();
                break;
            }

            if let Some(pattern) = parse_pattern_directive(line) {
                trace!(pattern = pattern, "pattern directive");
                doc.pattern = Some(pattern.to_owned());
            }
        }

        debug!(
            has_pattern = doc.pattern.is_some(),
            marker_found = doc.marker_found,
            schema_len = doc.schema_text.len(),
            "schema document parsed"
        );

        doc
    }
}

/// `pattern: <regex>` 형식의 헤더 라인에서 정규식을 꺼냅니다.
///
/// 키워드와 콜론 주변, 값의 앞뒤 공백은 무시합니다.
fn parse_pattern_directive(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("pattern")?;
    let rest = rest.trim_start().strip_prefix(':')?;
    Some(rest.trim())
}

/// 설정 파일 경로를 해석합니다.
///
/// 앞뒤 공백을 제거하고, 비어 있으면 `None`을 반환합니다.
/// 상대 경로는 `config_dir` 기준으로 해석합니다.
pub fn resolve_config_path(path: &str, config_dir: &Path) -> Option<PathBuf> {
    let path = path.trim();
    if path.is_empty() {
        return None;
    }

    let path = Path::new(path);
    if path.is_absolute() {
        Some(path.to_path_buf())
    } else {
        Some(config_dir.join(path))
    }
}

/// 설정 파일을 읽어 파싱합니다.
///
/// # Errors
/// 파일을 열 수 없거나, 너무 크거나, UTF-8이 아니면
/// [`SerializerError::ConfigUnavailable`]
pub fn read_document(path: &Path) -> Result<SchemaDocument, SerializerError> {
    let unavailable = |reason: String| SerializerError::ConfigUnavailable {
        path: path.display().to_string(),
        reason,
    };

    let meta = std::fs::metadata(path).map_err(|e| unavailable(e.to_string()))?;
    if !meta.is_file() {
        return Err(unavailable("not a regular file".to_owned()));
    }
    if meta.len() > MAX_CONFIG_FILE_SIZE {
        return Err(unavailable(format!(
            "file too large: {} bytes (max: {MAX_CONFIG_FILE_SIZE})",
            meta.len()
        )));
    }

    let text = std::fs::read_to_string(path).map_err(|e| unavailable(e.to_string()))?;
    Ok(SchemaDocument::parse(&text))
}
