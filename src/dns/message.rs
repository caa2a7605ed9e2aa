//! DNS 报文构造与应答解析 (hickory-proto)

use std::net::IpAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, RData, RecordType};

use crate::error::{Error, Result};

static NEXT_ID: AtomicU16 = AtomicU16::new(0);

/// 查询 ID: 计数器与时间混合
pub fn next_id() -> u16 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    NEXT_ID.fetch_add(1, Ordering::Relaxed) ^ (nanos as u16)
}

/// 构造递归查询报文
pub fn build_query(id: u16, host: &str, record_type: RecordType) -> Result<Vec<u8>> {
    let mut fqdn = host.trim_end_matches('.').to_string();
    fqdn.push('.');
    let name = Name::from_ascii(&fqdn)?;

    let mut msg = Message::new();
    msg.set_id(id)
        .set_message_type(MessageType::Query)
        .set_op_code(OpCode::Query)
        .set_recursion_desired(true);
    msg.add_query(Query::query(name, record_type));
    Ok(msg.to_vec()?)
}

/// 解析应答, 只取与查询类型一致的地址记录
pub fn parse_response(id: u16, bytes: &[u8], record_type: RecordType) -> Result<Vec<IpAddr>> {
    let msg = Message::from_vec(bytes)?;
    if msg.id() != id {
        return Err(Error::Dns(format!("response id {} does not match query id {}", msg.id(), id)));
    }
    if msg.message_type() != MessageType::Response {
        return Err(Error::Dns("not a response".into()));
    }
    if msg.response_code() != ResponseCode::NoError {
        return Err(Error::Dns(format!("server returned {}", msg.response_code())));
    }

    let ips = msg
        .answers()
        .iter()
        .filter_map(|record| match (record.data(), record_type) {
            (Some(RData::A(a)), RecordType::A) => Some(IpAddr::V4(a.0)),
            (Some(RData::AAAA(aaaa)), RecordType::AAAA) => Some(IpAddr::V6(aaaa.0)),
            _ => None,
        })
        .collect();
    Ok(ips)
}
