//! 가변 길이 정수 인코딩 (zig-zag + LEB128)
//!
//! 컨테이너의 블록 개수, 바이트 길이, 메타데이터 맵 길이 필드에 쓰이는
//! Avro `long` 인코딩입니다.
//!
//! ```text
//! zigzag(n) = (n << 1) ^ (n >> 63)
//! 7비트씩 하위부터 기록, 다음 바이트가 있으면 최상위 비트 1
//! ```
//!
//! | 값                   | 바이트        |
//! |----------------------|---------------|
//! | 0                    | `00`          |
//! | -1                   | `01`          |
//! | 1                    | `02`          |
//! | 64                   | `80 01`       |
//! | i64::MIN             | 10바이트      |

/// 인코딩된 값의 최대 길이
pub const MAX_VARINT_LEN: usize = 10;

/// `value`를 인코딩했을 때의 바이트 수
pub fn long_len(value: i64) -> usize {
    let mut z = zigzag(value);
    let mut len = 1;
    while z >= 0x80 {
        z >>= 7;
        len += 1;
    }
    len
}

/// `value`를 `out` 뒤에 덧붙입니다.
pub fn encode_long(value: i64, out: &mut Vec<u8>) {
    let mut z = zigzag(value);
    while z >= 0x80 {
        out.push((z as u8 & 0x7f) | 0x80);
        z >>= 7;
    }
    out.push(z as u8);
}

/// `buf` 앞부분에서 값을 읽습니다.
///
/// (값, 읽은 바이트 수)를 반환합니다. 입력이 잘렸거나 10바이트를 넘으면
/// `None`을 반환합니다.
pub fn decode_long(buf: &[u8]) -> Option<(i64, usize)> {
    let mut z: u64 = 0;
    for (i, &byte) in buf.iter().take(MAX_VARINT_LEN).enumerate() {
        z |= u64::from(byte & 0x7f) << (7 * i);
        if byte & 0x80 == 0 {
            return Some((unzigzag(z), i + 1));
        }
    }
    None
}

fn zigzag(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

fn unzigzag(z: u64) -> i64 {
    ((z >> 1) as i64) ^ -((z & 1) as i64)
}
