#![no_main]

use attributes_codec::{AttributeCodec, NoAttributes, Schema};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Any frame an opaque schema accepts must re-encode to exactly the input
    let codec = AttributeCodec::new(Schema::opaque());
    if let Ok(attrs) = codec.decode_slice::<NoAttributes>(data) {
        let encoded = codec.encode(&attrs).expect("re-encode accepted frame");
        assert_eq!(&encoded[..], data);
    }
});
