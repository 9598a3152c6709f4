//! Shared schemas for integration tests.
//!
//! `PaymentV1` and `PaymentV2` model two releases of the same attribute set: V2 adds a memo
//! (key 0x02), a tip (0x10) and bincode-encoded tags (0x20) on top of V1's fee (0x01) and
//! expiry (0x03).

#![allow(dead_code, clippy::unwrap_used)]

use attributes_codec::{
    BincodeField, ByteOrder, CodecError, Cursor, FieldTable, FieldWriter, LengthPrefix,
    LengthWidth, SizedWrite, Varint,
};

pub const U8_PREFIX: LengthPrefix = LengthPrefix::new(LengthWidth::U8, ByteOrder::Big);

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaymentV1 {
    pub fee: Option<u32>,
    pub expiry: Option<u16>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaymentV2 {
    pub fee: Option<u32>,
    pub memo: Option<String>,
    pub expiry: Option<u16>,
    pub tip: Option<u64>,
    pub tags: Option<Vec<String>>,
}

fn boxed<W: SizedWrite + 'static>(writer: W) -> FieldWriter<'static> {
    Box::new(writer)
}

fn read_memo(cursor: &mut Cursor) -> attributes_codec::Result<String> {
    let len = cursor.read_varint()? as usize;
    let raw = cursor.read_bytes(len)?;
    String::from_utf8(raw.to_vec()).map_err(|e| CodecError::Field(e.to_string()))
}

fn write_memo(memo: &str) -> FieldWriter<'static> {
    let mut out = Varint(memo.len() as u64).to_bytes().to_vec();
    out.extend_from_slice(memo.as_bytes());
    boxed(out)
}

pub fn v1_table() -> FieldTable<PaymentV1> {
    let mut table = FieldTable::<PaymentV1>::new();
    table
        .register_with_writer(
            0x01,
            "fee",
            |c, p| Ok(PaymentV1 { fee: Some(c.read_u32()?), ..p }),
            |p: &PaymentV1| p.fee.map(boxed),
        )
        .unwrap();
    table
        .register_with_writer(
            0x03,
            "expiry",
            |c, p| Ok(PaymentV1 { expiry: Some(c.read_u16()?), ..p }),
            |p: &PaymentV1| p.expiry.map(boxed),
        )
        .unwrap();
    table
}

pub fn v2_table() -> FieldTable<PaymentV2> {
    let mut table = FieldTable::<PaymentV2>::new();
    table
        .register_with_writer(
            0x01,
            "fee",
            |c, p| Ok(PaymentV2 { fee: Some(c.read_u32()?), ..p }),
            |p: &PaymentV2| p.fee.map(boxed),
        )
        .unwrap();
    table
        .register_with_writer(
            0x02,
            "memo",
            |c, p| Ok(PaymentV2 { memo: Some(read_memo(c)?), ..p }),
            |p: &PaymentV2| p.memo.as_deref().map(write_memo),
        )
        .unwrap();
    table
        .register_with_writer(
            0x03,
            "expiry",
            |c, p| Ok(PaymentV2 { expiry: Some(c.read_u16()?), ..p }),
            |p: &PaymentV2| p.expiry.map(boxed),
        )
        .unwrap();
    table
        .register_with_writer(
            0x10,
            "tip",
            |c, p| Ok(PaymentV2 { tip: Some(c.read_u64()?), ..p }),
            |p: &PaymentV2| p.tip.map(boxed),
        )
        .unwrap();
    table
        .register_with_writer(
            0x20,
            "tags",
            |c, p| Ok(PaymentV2 { tags: Some(c.read_bincode()?), ..p }),
            |p: &PaymentV2| {
                p.tags
                    .as_ref()
                    .and_then(|tags| BincodeField::new(tags).ok())
                    .map(boxed)
            },
        )
        .unwrap();
    table
}

pub fn full_v2() -> PaymentV2 {
    PaymentV2 {
        fee: Some(1_500),
        memo: Some("coffee".to_string()),
        expiry: Some(3_600),
        tip: Some(42),
        tags: Some(vec!["retail".to_string(), "eu".to_string()]),
    }
}
