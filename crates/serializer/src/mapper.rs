//! 패턴 매퍼 -- 정규식 캡처 그룹을 레코드 필드로 매핑
//!
//! [`PatternMapper`]는 생성 시점에 정규식을 한 번만 컴파일합니다.
//! 매칭은 라인 전체 기준이며 (부분 일치는 거부), 필드 `i`는 캡처 그룹
//! `i + 1`에서 값을 가져옵니다.
//!
//! # 사용 예시
//! ```ignore
//! let mapper = PatternMapper::compile(r"(\d+) (\w+)")?;
//! let mut record = RecordInstance::new(&schema);
//! mapper.map(&mut record, "200 GET")?;
//! ```

use regex::Regex;
use tracing::trace;

use crate::coerce::{CoercionMode, FieldCoercer};
use crate::error::SerializerError;
use crate::record::RecordInstance;

/// 컴파일된 매핑 패턴
#[derive(Debug, Clone)]
pub struct PatternMapper {
    /// 원본 패턴 문자열
    pattern: String,
    /// 라인 전체에 고정된 정규식
    anchored: Regex,
    /// 캡처 그룹 수 (그룹 0 제외)
    capture_count: usize,
    /// 필드 변환기
    coercer: FieldCoercer,
}

impl PatternMapper {
    /// 패턴을 컴파일합니다.
    ///
    /// 원본 패턴을 먼저 단독으로 검증한 뒤, 라인 전체 매칭을 위해
    /// `\A(?:...)\z`로 감싼 정규식을 만듭니다. 패턴이 verbose 모드 주석으로
    /// 끝나면 닫는 괄호 앞에 줄바꿈을 넣습니다.
    pub fn compile(pattern: impl Into<String>) -> Result<Self, SerializerError> {
        let pattern = pattern.into();

        let compile_err = |e: regex::Error| SerializerError::PatternCompile {
            pattern: pattern.clone(),
            reason: e.to_string(),
        };

        let bare = Regex::new(&pattern).map_err(compile_err)?;
        // 원본은 유효한데 감싼 정규식만 실패하면 `(?x)` 주석이 `)\z`를 삼킨 경우
        let anchored = Regex::new(&format!(r"\A(?:{pattern})\z"))
            .or_else(|_| Regex::new(&format!("\\A(?:{pattern}\n)\\z")))
            .map_err(compile_err)?;

        Ok(Self {
            capture_count: bare.captures_len().saturating_sub(1),
            pattern,
            anchored,
            coercer: FieldCoercer::default(),
        })
    }

    /// 필드 변환 실패 처리 방식을 설정합니다.
    pub fn with_coercion(mut self, mode: CoercionMode) -> Self {
        self.coercer = FieldCoercer::new(mode);
        self
    }

    /// 원본 패턴 문자열을 반환합니다.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// 캡처 그룹 수를 반환합니다.
    pub fn capture_count(&self) -> usize {
        self.capture_count
    }

    /// 라인 전체가 패턴과 일치하는지 확인합니다.
    pub fn is_match(&self, line: &str) -> bool {
        self.anchored.is_match(line)
    }

    /// 라인을 매칭하여 레코드 필드를 채웁니다.
    ///
    /// 매칭에 참여하지 않은 캡처 그룹이나 존재하지 않는 그룹은 빈 문자열로
    /// 변환합니다. 변환 중 에러가 나면 레코드는 변경되지 않습니다.
    ///
    /// # Errors
    /// - 라인이 패턴 전체와 일치하지 않으면 [`SerializerError::LineMismatch`]
    /// - strict 모드에서 변환 실패 시 [`SerializerError::Coercion`]
    pub fn map(&self, record: &mut RecordInstance<'_>, line: &str) -> Result<(), SerializerError> {
        let captures =
            self.anchored
                .captures(line)
                .ok_or_else(|| SerializerError::LineMismatch {
                    pattern: self.pattern.clone(),
                })?;

        let values = record
            .schema()
            .fields()
            .iter()
            .enumerate()
            .map(|(i, field)| {
                let text = captures.get(i + 1).map_or("", |m| m.as_str());
                self.coercer.coerce_field(field, text)
            })
            .collect::<Result<Vec<_>, _>>()?;

        trace!(fields = values.len(), "line mapped");

        record.replace_values(values);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coerce::FieldValue;
    use crate::schema::{AvroSchemaSource, SchemaDefinition, SchemaSource};

    fn access_schema() -> SchemaDefinition {
        AvroSchemaSource
            .compile(
                r#"{"type":"record","name":"Access","fields":[
                    {"name":"status","type":"int"},
                    {"name":"method","type":"string"}
                ]}"#,
            )
            .unwrap()
    }

    #[test]
    fn maps_captures_in_field_order() {
        let schema = access_schema();
        let mapper = PatternMapper::compile(r"^(\d+) (\w+)$").unwrap();
        let mut record = RecordInstance::new(&schema);

        mapper.map(&mut record, "200 GET").unwrap();

        assert_eq!(record.get("status"), Some(&FieldValue::Int32(200)));
        assert_eq!(record.get("method"), Some(&FieldValue::String("GET".to_owned())));
    }

    #[test]
    fn partial_match_is_rejected() {
        let schema = access_schema();
        let mapper = PatternMapper::compile(r"(\d+) (\w+)").unwrap();
        let mut record = RecordInstance::new(&schema);

        assert!(mapper.is_match("200 GET"));
        assert!(!mapper.is_match("xx 200 GET yy"));

        let err = mapper.map(&mut record, "xx 200 GET yy").unwrap_err();
        assert!(matches!(err, SerializerError::LineMismatch { .. }));
    }

    #[test]
    fn alternation_is_anchored_as_a_whole() {
        let mapper = PatternMapper::compile(r"a|b").unwrap();
        assert!(mapper.is_match("a"));
        assert!(mapper.is_match("b"));
        assert!(!mapper.is_match("ab"));
    }

    #[test]
    fn mismatch_leaves_record_untouched() {
        let schema = access_schema();
        let mapper = PatternMapper::compile(r"(\d+) (\w+)").unwrap();
        let mut record = RecordInstance::new(&schema);

        assert!(mapper.map(&mut record, "abc GET").is_err());
        assert_eq!(record.get("status"), Some(&FieldValue::Int32(0)));
    }

    #[test]
    fn unparseable_capture_defaults_to_zero() {
        let schema = access_schema();
        let mapper = PatternMapper::compile(r"(\S+) (\w+)").unwrap();
        let mut record = RecordInstance::new(&schema);

        mapper.map(&mut record, "abc GET").unwrap();
        assert_eq!(record.get("status"), Some(&FieldValue::Int32(0)));
    }

    #[test]
    fn strict_mode_rejects_unparseable_capture() {
        let schema = access_schema();
        let mapper = PatternMapper::compile(r"(\S+) (\w+)")
            .unwrap()
            .with_coercion(CoercionMode::Strict);
        let mut record = RecordInstance::new(&schema);

        let err = mapper.map(&mut record, "abc GET").unwrap_err();
        assert!(matches!(err, SerializerError::Coercion { .. }));
        assert_eq!(record.get("method"), Some(&FieldValue::String(String::new())));
    }

    #[test]
    fn missing_groups_map_to_empty_text() {
        let schema = access_schema();
        let mapper = PatternMapper::compile(r"(\d+) \w+").unwrap();
        assert_eq!(mapper.capture_count(), 1);

        let mut record = RecordInstance::new(&schema);
        mapper.map(&mut record, "201 PUT").unwrap();
        assert_eq!(record.get("status"), Some(&FieldValue::Int32(201)));
        assert_eq!(record.get("method"), Some(&FieldValue::String(String::new())));
    }

    #[test]
    fn invalid_pattern_fails_compilation() {
        let err = PatternMapper::compile(r"(unclosed").unwrap_err();
        assert!(matches!(err, SerializerError::PatternCompile { .. }));
    }

    #[test]
    fn unbalanced_close_paren_is_not_smuggled_through_wrapper() {
        assert!(PatternMapper::compile(r"a)(b").is_err());
    }

    #[test]
    fn verbose_pattern_with_trailing_comment_compiles() {
        let schema = access_schema();
        let mapper = PatternMapper::compile(r"(?x)(\d+)\ (\w+) # status and method").unwrap();
        assert_eq!(mapper.capture_count(), 2);

        let mut record = RecordInstance::new(&schema);
        mapper.map(&mut record, "200 GET").unwrap();
        assert_eq!(record.get("status"), Some(&FieldValue::Int32(200)));
        assert!(!mapper.is_match("200 GET trailing"));
    }

    #[test]
    fn capture_count_ignores_non_capturing_groups() {
        let mapper = PatternMapper::compile(r"(?:x)(\d+)-(\d+)").unwrap();
        assert_eq!(mapper.capture_count(), 2);
        assert_eq!(mapper.pattern(), r"(?:x)(\d+)-(\d+)");
    }
}
