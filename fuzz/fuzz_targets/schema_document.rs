#![no_main]

use libfuzzer_sys::fuzz_target;
use logfwd_serializer::{SchemaDocument, SerializationEngine, SerializerConfig};

fuzz_target!(|text: &str| {
    let doc = SchemaDocument::parse(text);
    if let Some(pattern) = &doc.pattern {
        assert!(!pattern.starts_with(char::is_whitespace));
    }

    // 어떤 설정 문서든 엔진은 schema 또는 raw 모드로 끝나야 한다
    let mut engine = SerializationEngine::new(SerializerConfig::default());
    let _ = engine.configure_from_str(text);
    let _ = engine.serialize("probe line");
});
