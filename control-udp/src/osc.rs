//! Just enough of OSC 1.0 to read a single numeric argument from a message.

use anyhow::{anyhow, bail};

/// Read a null-terminated string padded to a multiple of 4 bytes. Returns the string and the
/// remaining bytes.
fn read_padded_str(bytes: &[u8]) -> anyhow::Result<(&str, &[u8])> {
    let len = bytes
        .iter()
        .position(|&b| b == 0)
        .ok_or(anyhow!("unterminated OSC string"))?;
    let s = std::str::from_utf8(&bytes[..len])?;
    let padded_len = (len + 4) & !3;
    if padded_len > bytes.len() {
        bail!("OSC string padding runs past the end of the packet");
    }
    Ok((s, &bytes[padded_len..]))
}

fn read_4(bytes: &[u8]) -> anyhow::Result<[u8; 4]> {
    bytes
        .get(0..4)
        .and_then(|b| b.try_into().ok())
        .ok_or(anyhow!("OSC argument truncated"))
}

fn read_8(bytes: &[u8]) -> anyhow::Result<[u8; 8]> {
    bytes
        .get(0..8)
        .and_then(|b| b.try_into().ok())
        .ok_or(anyhow!("OSC argument truncated"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct OscScalar<'a> {
    pub address: &'a str,
    pub value: f32,
}

/// Parse an OSC message and return its address and first argument, which must be numeric (`f`,
/// `i` or `d`).
pub fn parse_scalar(bytes: &[u8]) -> anyhow::Result<OscScalar<'_>> {
    if bytes.starts_with(b"#bundle") {
        bail!("OSC bundles are not supported");
    }
    let (address, rest) = read_padded_str(bytes)?;
    if !address.starts_with('/') {
        bail!("OSC address must start with '/' (got {:?})", address);
    }
    let (type_tags, args) = read_padded_str(rest)?;
    let mut tags = type_tags.chars();
    if tags.next() != Some(',') {
        bail!("OSC type tag string must start with ','");
    }
    let value = match tags.next() {
        Some('f') => f32::from_be_bytes(read_4(args)?),
        Some('i') => i32::from_be_bytes(read_4(args)?) as f32,
        Some('d') => f64::from_be_bytes(read_8(args)?) as f32,
        Some(other) => bail!("unsupported OSC argument type '{}'", other),
        None => bail!("OSC message has no arguments"),
    };
    Ok(OscScalar { address, value })
}

/// Encode a message with a single float argument.
pub fn encode_f32(address: &str, value: f32, out: &mut Vec<u8>) {
    fn push_padded(s: &str, out: &mut Vec<u8>) {
        out.extend_from_slice(s.as_bytes());
        let padded_len = (s.len() + 4) & !3;
        out.resize(out.len() + padded_len - s.len(), 0);
    }
    out.clear();
    push_padded(address, out);
    push_padded(",f", out);
    out.extend_from_slice(&value.to_be_bytes());
}
