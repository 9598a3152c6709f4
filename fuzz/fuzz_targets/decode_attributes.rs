#![no_main]

use attributes_codec::{
    decode_with, AttributeCodec, EmitNone, FieldDecoder, FrameMode, LengthPrefix, Schema,
};
use libfuzzer_sys::fuzz_target;

fn handler(key: u8, _: &Vec<u64>) -> Option<FieldDecoder<'static, Vec<u64>>> {
    (key < 0x80).then(|| {
        decode_with(|c, mut head: Vec<u64>| {
            head.push(c.read_varint()?);
            Ok(head)
        })
    })
}

fuzz_target!(|data: &[u8]| {
    // Fuzz attribute decoding under every prefix shape - test for panics and overreads
    for prefix in [LengthPrefix::default(), LengthPrefix::varint()] {
        let codec = AttributeCodec::new(Schema::new(handler, EmitNone))
            .with_prefix(prefix)
            .with_mode(FrameMode::Limited(1 << 16));
        let _ = codec.decode_slice::<Vec<u64>>(data);
    }
});
