#![no_main]

use libfuzzer_sys::fuzz_target;
use logfwd_serializer::ContainerDecoder;

fuzz_target!(|data: &[u8]| {
    let decoder = ContainerDecoder::new();

    // 크래시나 패닉 없이 Ok 또는 Err을 반환해야 한다
    let _ = decoder.decode(data);
});
