//! "Fabricate channel from event" — the inverse of `build_record`, used by
//! backends that need to feed a CEL record through channel-variable
//! templating logic (§4.12).

use std::collections::HashMap;

use crate::event::{CelEventRecord, CelEventType};

/// A dummy channel-shaped value built from a `CelEventRecord`, carrying
/// the named variables backends expect when templating against a
/// channel-like object.
#[derive(Debug, Clone, Default)]
pub struct FabricatedChannel {
    pub name: String,
    pub uniqueid: String,
    pub linkedid: String,
    pub accountcode: String,
    pub peeraccount: String,
    pub userfield: String,
    pub amaflags: i32,
    pub context: String,
    pub exten: String,
    pub application_name: String,
    pub application_data: String,
    pub variables: HashMap<String, String>,
}

impl FabricatedChannel {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }
}

/// Formats `event_time` per §4.12: `dateformat` if given, else
/// `"<sec>.<usec zero-padded to 6>"`.
fn format_event_time(record: &CelEventRecord, dateformat: Option<&str>) -> String {
    match dateformat {
        Some(fmt) if !fmt.is_empty() => strftime_like(fmt, record.event_time_sec),
        _ => format!("{}.{:06}", record.event_time_sec, record.event_time_usec),
    }
}

/// Minimal strftime-pattern formatter covering the handful of directives
/// a `dateformat` config value is expected to use. Unknown directives
/// pass through verbatim rather than erroring, since `dateformat` is an
/// optional display hint, not a parsed wire value.
fn strftime_like(fmt: &str, epoch_sec: i64) -> String {
    // Days since epoch, civil-from-days (Howard Hinnant's algorithm),
    // kept dependency-free since this is a display-only convenience.
    let days = epoch_sec.div_euclid(86_400);
    let secs_of_day = epoch_sec.rem_euclid(86_400);
    let (hh, mm, ss) = (secs_of_day / 3600, (secs_of_day / 60) % 60, secs_of_day % 60);
    let (y, m, d) = civil_from_days(days);

    let mut out = String::with_capacity(fmt.len());
    let mut chars = fmt.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('Y') => out.push_str(&format!("{y:04}")),
            Some('m') => out.push_str(&format!("{m:02}")),
            Some('d') => out.push_str(&format!("{d:02}")),
            Some('H') => out.push_str(&format!("{hh:02}")),
            Some('M') => out.push_str(&format!("{mm:02}")),
            Some('S') => out.push_str(&format!("{ss:02}")),
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }
    out
}

fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if m <= 2 { y + 1 } else { y }, m, d)
}

/// Builds a `FabricatedChannel` from a `CelEventRecord`.
///
/// Reproduces a discrepancy present in the original engine's record-fill
/// path: `peeraccount` here is read from the record's `account_code`
/// field, not its `peer_account` field, matching `ast_cel_fill_record`'s
/// behavior exactly. See DESIGN.md for the grounding and the open
/// question this resolves.
pub fn fabricate_channel_from_event(
    record: &CelEventRecord,
    dateformat: Option<&str>,
) -> FabricatedChannel {
    let display_name = if record.event_type == CelEventType::UserDefined {
        record.user_defined_name.clone()
    } else {
        record.event_type.to_string()
    };

    let mut variables = HashMap::new();
    variables.insert("eventtype".to_string(), display_name);
    variables.insert(
        "eventtime".to_string(),
        format_event_time(record, dateformat),
    );
    variables.insert("eventenum".to_string(), record.event_type.code().to_string());
    variables.insert("userdeftype".to_string(), record.user_defined_name.clone());
    variables.insert("eventextra".to_string(), record.extra.clone());
    variables.insert("BRIDGEPEER".to_string(), record.peer.clone());

    FabricatedChannel {
        name: record.channel_name.clone(),
        uniqueid: record.uniqueid.clone(),
        linkedid: record.linkedid.clone(),
        accountcode: record.account_code.clone(),
        // Mirrors ast_cel_fill_record: peer_account comes from the
        // ACCTCODE info element a second time, not from PEERACCT.
        peeraccount: record.account_code.clone(),
        userfield: record.userfield.clone(),
        amaflags: record.amaflags,
        context: record.context.clone(),
        exten: record.exten.clone(),
        application_name: record.application_name.clone(),
        application_data: record.application_data.clone(),
        variables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> CelEventRecord {
        CelEventRecord {
            event_type: CelEventType::Hangup,
            event_time_sec: 1_700_000_000,
            event_time_usec: 5,
            user_defined_name: String::new(),
            caller_id_name: String::new(),
            caller_id_number: String::new(),
            caller_id_ani: String::new(),
            caller_id_rdnis: String::new(),
            caller_id_dnid: String::new(),
            exten: "1000".into(),
            context: "default".into(),
            channel_name: "SIP/foo-0001".into(),
            application_name: "".into(),
            application_data: "".into(),
            account_code: "acct1".into(),
            peer_account: "peeracct1".into(),
            uniqueid: "u1".into(),
            linkedid: "L1".into(),
            userfield: "".into(),
            amaflags: 3,
            extra: "{}".into(),
            peer: "".into(),
        }
    }

    #[test]
    fn peeraccount_mirrors_accountcode_not_peer_account() {
        let record = sample_record();
        let chan = fabricate_channel_from_event(&record, None);
        assert_eq!(chan.peeraccount, "acct1");
        assert_ne!(chan.peeraccount, record.peer_account);
    }

    #[test]
    fn eventtime_falls_back_to_epoch_dot_usec_padded() {
        let record = sample_record();
        let chan = fabricate_channel_from_event(&record, None);
        assert_eq!(chan.get("eventtime").unwrap(), "1700000000.000005");
    }

    #[test]
    fn eventtime_uses_dateformat_when_given() {
        let record = sample_record();
        let chan = fabricate_channel_from_event(&record, Some("%Y-%m-%d %H:%M:%S"));
        assert_eq!(chan.get("eventtime").unwrap(), "2023-11-14 22:13:20");
    }

    #[test]
    fn display_name_uses_user_defined_name_for_user_events() {
        let mut record = sample_record();
        record.event_type = CelEventType::UserDefined;
        record.user_defined_name = "MyCustomEvent".into();
        let chan = fabricate_channel_from_event(&record, None);
        assert_eq!(chan.get("eventtype").unwrap(), "MyCustomEvent");
    }

    #[test]
    fn display_name_uses_canonical_name_otherwise() {
        let record = sample_record();
        let chan = fabricate_channel_from_event(&record, None);
        assert_eq!(chan.get("eventtype").unwrap(), "HANGUP");
    }
}
