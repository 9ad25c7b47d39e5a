//! 레코드 인스턴스 -- 스키마에 묶인 필드 값 슬롯
//!
//! [`RecordInstance`]는 라인마다 새로 만들어지고 인코딩 후 버려집니다.
//! 생성 시점에 모든 슬롯이 타입의 0 값으로 채워지므로, 인코더는
//! 항상 완전한 레코드만 보게 됩니다.
//!
//! [`DecodedRecord`]는 컨테이너에서 읽어 낸 레코드의 소유형 표현입니다.

use apache_avro::types::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::coerce::FieldValue;
use crate::schema::SchemaDefinition;

/// 스키마에 묶인 레코드
#[derive(Debug, Clone)]
pub struct RecordInstance<'s> {
    schema: &'s SchemaDefinition,
    values: Vec<FieldValue>,
}

impl<'s> RecordInstance<'s> {
    /// 모든 필드를 0 값으로 채운 레코드를 생성합니다.
    pub fn new(schema: &'s SchemaDefinition) -> Self {
        let values = schema
            .fields()
            .iter()
            .map(|f| FieldValue::zero(f.kind))
            .collect();
        Self { schema, values }
    }

    /// 레코드가 묶인 스키마를 반환합니다.
    pub fn schema(&self) -> &'s SchemaDefinition {
        self.schema
    }

    /// 필드 값 목록을 스키마 순서대로 반환합니다.
    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    /// 이름으로 필드 값을 조회합니다.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.schema.position(name).and_then(|i| self.values.get(i))
    }

    /// 위치로 필드 값을 설정합니다. 범위를 벗어나면 `false`를 반환합니다.
    pub fn set(&mut self, index: usize, value: FieldValue) -> bool {
        match self.values.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// 모든 필드 값을 한 번에 교체합니다.
    ///
    /// 개수가 스키마 필드 수와 다르면 아무것도 바꾸지 않고 `false`를 반환합니다.
    pub fn replace_values(&mut self, values: Vec<FieldValue>) -> bool {
        if values.len() != self.values.len() {
            return false;
        }
        self.values = values;
        true
    }

    /// (필드 이름, 값) 쌍을 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.schema
            .fields()
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }

    /// Avro 레코드 값으로 변환합니다.
    pub fn to_avro(&self) -> Value {
        Value::Record(
            self.iter()
                .map(|(name, value)| (name.to_owned(), value.to_avro()))
                .collect(),
        )
    }

    /// 소유형 레코드로 변환합니다.
    pub fn to_decoded(&self) -> DecodedRecord {
        DecodedRecord {
            fields: self
                .iter()
                .map(|(name, value)| (name.to_owned(), value.clone()))
                .collect(),
        }
    }
}

/// 컨테이너에서 읽은 레코드
///
/// JSON으로 직렬화하면 필드 순서를 유지한 객체가 됩니다.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRecord {
    /// (필드 이름, 값) 목록 -- 스키마 순서
    pub fields: Vec<(String, FieldValue)>,
}

impl DecodedRecord {
    /// Avro 레코드 값에서 변환합니다.
    ///
    /// 레코드가 아니거나 원시 타입이 아닌 필드가 있으면 에러 사유를 반환합니다.
    pub fn from_avro(value: Value) -> Result<Self, String> {
        let Value::Record(entries) = value else {
            return Err("decoded value is not a record".to_owned());
        };

        let fields = entries
            .into_iter()
            .map(|(name, value)| match FieldValue::from_avro(value) {
                Some(v) => Ok((name, v)),
                None => Err(format!("field '{name}' has a non-primitive value")),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { fields })
    }

    /// 이름으로 필드 값을 조회합니다.
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

impl Serialize for DecodedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
