//! The hickory-proto wire boundary.
//!
//! Cached records cross into wire form only through the explicit conversion
//! functions here, which compute the remaining (decayed) TTL at conversion
//! time.

use chrono::{DateTime, Utc};
use ember_dns_application::ports::HarvestedRecord;
use ember_dns_domain::record::CachedRecord;
use ember_dns_domain::{ARecord, DomainError, NsRecord};
use hickory_proto::op::{Message, MessageType};
use hickory_proto::rr::{rdata, Name, RData, Record};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::net::IpAddr;
use std::str::FromStr;

/// A decoded request, reduced to its first question. Multi-question
/// requests are legal on the wire but only the first question is processed.
pub struct ParsedQuery {
    pub name: String,
    pub type_code: u16,
    pub message: Message,
}

/// Names are keyed without the trailing root dot; case is preserved.
fn normalize_name(name: &Name) -> String {
    name.to_utf8().trim_end_matches('.').to_string()
}

/// Decode a request datagram into its first question.
pub fn decode_query(bytes: &[u8]) -> Result<ParsedQuery, DomainError> {
    let message =
        Message::from_vec(bytes).map_err(|e| DomainError::InvalidDnsMessage(e.to_string()))?;

    let query = message
        .queries()
        .first()
        .ok_or(DomainError::EmptyQuestion)?;
    let name = normalize_name(query.name());
    let type_code = u16::from(query.query_type());

    Ok(ParsedQuery {
        name,
        type_code,
        message,
    })
}

/// Decode an upstream reply datagram.
pub fn decode_response(bytes: &[u8]) -> Result<Message, DomainError> {
    Message::from_vec(bytes).map_err(|e| DomainError::InvalidDnsResponse(e.to_string()))
}

/// Harvest cache-relevant records from an upstream response, in section
/// order: answers, then additionals, then authority. A and NS records are
/// cached; CNAMEs become alias directives; everything else is ignored.
pub fn harvest_records(message: &Message) -> Vec<HarvestedRecord> {
    let sections = message
        .answers()
        .iter()
        .chain(message.additionals().iter())
        .chain(message.name_servers().iter());

    let mut harvested = Vec::new();
    for record in sections {
        let name = normalize_name(record.name());
        match record.data() {
            RData::A(a) => harvested.push(HarvestedRecord::Address {
                name,
                ttl_secs: record.ttl(),
                ip: IpAddr::V4(a.0),
            }),
            RData::NS(ns) => harvested.push(HarvestedRecord::NameServer {
                name,
                ttl_secs: record.ttl(),
                ns_domain: normalize_name(&ns.0),
            }),
            RData::CNAME(cname) => harvested.push(HarvestedRecord::Alias {
                name,
                canonical: normalize_name(&cname.0),
            }),
            _ => {}
        }
    }
    harvested
}

/// Build the response for an A cache hit: the request's id, opcode, and
/// recursion-desired flag echoed, the question carried back, and the valid
/// cached records as answers with decayed TTLs. Entries that are not V4
/// addresses (possible only in a hand-edited snapshot) are skipped so the
/// answer section stays consistent with the A question.
pub fn build_address_response(
    request: &Message,
    records: &[ARecord],
    now: DateTime<Utc>,
) -> Result<Vec<u8>, DomainError> {
    let mut answers = Vec::with_capacity(records.len());
    for record in records {
        if let Some(answer) = address_to_wire(record, now)? {
            answers.push(answer);
        }
    }
    build_response(request, answers)
}

/// Build the response for an NS cache hit.
pub fn build_name_server_response(
    request: &Message,
    records: &[NsRecord],
    now: DateTime<Utc>,
) -> Result<Vec<u8>, DomainError> {
    let answers = records
        .iter()
        .map(|record| name_server_to_wire(record, now))
        .collect::<Result<Vec<_>, _>>()?;
    build_response(request, answers)
}

fn address_to_wire(record: &ARecord, now: DateTime<Utc>) -> Result<Option<Record>, DomainError> {
    let IpAddr::V4(ipv4) = record.ip else {
        return Ok(None);
    };
    let name = parse_name(&record.domain)?;
    Ok(Some(Record::from_rdata(
        name,
        record.remaining_ttl(now),
        RData::A(rdata::A(ipv4)),
    )))
}

fn name_server_to_wire(record: &NsRecord, now: DateTime<Utc>) -> Result<Record, DomainError> {
    let name = parse_name(&record.domain)?;
    let ns_name = parse_name(&record.ns_domain)?;
    Ok(Record::from_rdata(
        name,
        record.remaining_ttl(now),
        RData::NS(rdata::NS(ns_name)),
    ))
}

fn parse_name(domain: &str) -> Result<Name, DomainError> {
    Name::from_str(domain)
        .map_err(|e| DomainError::InvalidDomainName(format!("'{}': {}", domain, e)))
}

fn build_response(request: &Message, answers: Vec<Record>) -> Result<Vec<u8>, DomainError> {
    let mut response = Message::new(request.id(), MessageType::Response, request.op_code());
    response.set_recursion_desired(request.recursion_desired());

    if let Some(query) = request.queries().first() {
        response.add_query(query.clone());
    }
    for answer in answers {
        response.add_answer(answer);
    }

    serialize_message(&response)
}

/// Serialize a Message to wire format bytes.
pub fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
    let mut buf = Vec::with_capacity(512);
    let mut encoder = BinEncoder::new(&mut buf);

    message
        .emit(&mut encoder)
        .map_err(|e| DomainError::InvalidDnsMessage(format!("Failed to serialize: {}", e)))?;

    Ok(buf)
}
