use std::collections::BTreeMap;

/// Settings read back from a chain's own config file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChainConf {
    pub rpc_user: Option<String>,
    pub rpc_password: Option<String>,
    pub rpc_port: Option<u16>,
    pub slot: Option<u32>,
    pub refresh_bmm: bool,
    pub bmm_fee: bool,
}

impl ChainConf {
    pub fn parse(content: &str) -> Self {
        let entries = parse_entries(content);
        let int = |key: &str| entries.get(key).and_then(|v| parse_int(v));
        let flag = |key: &str| match entries.get(key) {
            Some(v) => parse_int(v).map_or(v.eq_ignore_ascii_case("true"), |v| v != 0),
            None => false,
        };
        ChainConf {
            rpc_user: entries.get("rpcuser").cloned(),
            rpc_password: entries.get("rpcpassword").cloned(),
            rpc_port: int("rpcport").and_then(|v| u16::try_from(v).ok()),
            slot: int("slot").and_then(|v| u32::try_from(v).ok()),
            refresh_bmm: flag("refreshbmm"),
            bmm_fee: flag("bmmfee"),
        }
    }
}

/// Split `key=value` lines. Lines without exactly one `=` (section headers,
/// comments, blanks) are skipped; later keys override earlier ones.
pub fn parse_entries(content: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();
    for line in content.lines() {
        let parts: Vec<&str> = line.split('=').collect();
        if parts.len() != 2 {
            continue;
        }
        let key = parts[0].trim();
        let value = parts[1].trim();
        if key.is_empty() {
            continue;
        }
        entries.insert(key.to_string(), value.to_string());
    }
    entries
}

/// Integer with radix prefix detection: `0x`, `0o`, `0b`, or a leading `0` for octal.
pub fn parse_int(s: &str) -> Option<i64> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let lower = digits.to_ascii_lowercase();
    let (radix, body) = if let Some(b) = lower.strip_prefix("0x") {
        (16, b)
    } else if let Some(b) = lower.strip_prefix("0o") {
        (8, b)
    } else if let Some(b) = lower.strip_prefix("0b") {
        (2, b)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (8, &lower[1..])
    } else {
        (10, lower.as_str())
    };
    if body.is_empty() {
        return None;
    }
    let v = i64::from_str_radix(body, radix).ok()?;
    Some(if negative { -v } else { v })
}
