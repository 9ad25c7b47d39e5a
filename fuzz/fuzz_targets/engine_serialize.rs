#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use logfwd_serializer::{
    CoercionMode, ContainerDecoder, MismatchPolicy, SerializationEngine, SerializerConfig,
    Serialized,
};

const DOC: &str = r#"pattern: ^(\S*) (\S*) (\S*) (\S*) (.*)$
//--AVRO--
{"type":"record","name":"Fuzz","fields":[
  {"name":"flag","type":"boolean"},
  {"name":"small","type":"int"},
  {"name":"big","type":"long"},
  {"name":"ratio","type":"double"},
  {"name":"rest","type":"string"}
]}"#;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    line: String,
    strict: bool,
    fail: bool,
}

fuzz_target!(|input: FuzzInput| {
    let mut builder = SerializerConfig::builder();
    if input.strict {
        builder = builder.coercion(CoercionMode::Strict);
    }
    if input.fail {
        builder = builder.on_mismatch(MismatchPolicy::Fail);
    }
    let Ok(config) = builder.build() else {
        return;
    };

    let mut engine = SerializationEngine::new(config);
    engine.configure_from_str(DOC);

    // 인코딩된 컨테이너는 항상 다시 디코딩 가능해야 한다
    if let Ok(Serialized::Encoded(bytes)) = engine.serialize(&input.line) {
        let decoded = ContainerDecoder::new().decode(&bytes);
        assert!(decoded.is_ok(), "encoded container must decode: {decoded:?}");
    }
});
