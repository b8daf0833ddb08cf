//! Event record builder — turns a snapshot + event type into the
//! immutable `CelEventRecord` fanned out to backends (§4.12).

use serde_json::Value;

use crate::event::{CelEventRecord, CelEventType};
use crate::snapshot::ChannelSnapshot;

/// `now()` as (seconds, microseconds) UTC. Exposed as a trait so tests can
/// supply a fixed clock instead of depending on wall time.
pub trait Clock {
    fn now(&self) -> (i64, i64);
}

/// Production clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> (i64, i64) {
        let dur = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();
        (dur.as_secs() as i64, dur.subsec_micros() as i64)
    }
}

/// Builds an immutable event record from a channel snapshot, carrying
/// every snapshot string field plus the event-specific `extra` blob.
/// `user_defined_name` is only meaningful when `event_type == UserDefined`;
/// callers pass `""` otherwise.
pub fn build_record(
    clock: &dyn Clock,
    snapshot: &ChannelSnapshot,
    event_type: CelEventType,
    user_defined_name: &str,
    extra: Option<&Value>,
) -> CelEventRecord {
    let (sec, usec) = clock.now();
    CelEventRecord {
        event_type,
        event_time_sec: sec,
        event_time_usec: usec,
        user_defined_name: if event_type == CelEventType::UserDefined {
            user_defined_name.to_string()
        } else {
            String::new()
        },
        caller_id_name: snapshot.caller_id.name.clone(),
        caller_id_number: snapshot.caller_id.number.clone(),
        caller_id_ani: snapshot.caller_id.ani.clone(),
        caller_id_rdnis: snapshot.caller_id.rdnis.clone(),
        caller_id_dnid: snapshot.caller_id.dnid.clone(),
        exten: snapshot.exten.clone(),
        context: snapshot.context.clone(),
        channel_name: snapshot.name.clone(),
        application_name: snapshot.appl.clone(),
        application_data: snapshot.data.clone(),
        account_code: snapshot.accountcode.clone(),
        peer_account: snapshot.peeraccount.clone(),
        uniqueid: snapshot.uniqueid.clone(),
        linkedid: snapshot.linkedid.clone(),
        userfield: snapshot.userfield.clone(),
        amaflags: snapshot.amaflags,
        extra: extra.map(|v| v.to_string()).unwrap_or_default(),
        peer: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::CallerId;
    use serde_json::json;

    struct FixedClock;
    impl Clock for FixedClock {
        fn now(&self) -> (i64, i64) {
            (1_700_000_000, 123_456)
        }
    }

    fn snapshot() -> ChannelSnapshot {
        ChannelSnapshot {
            uniqueid: "u1".into(),
            linkedid: "L1".into(),
            name: "SIP/foo-0001".into(),
            appl: "Dial".into(),
            data: "SIP/bar".into(),
            context: "default".into(),
            exten: "1000".into(),
            amaflags: 3,
            accountcode: "acct1".into(),
            peeraccount: "peer1".into(),
            userfield: "uf".into(),
            caller_id: CallerId {
                name: "Alice".into(),
                number: "1000".into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn builds_record_with_all_string_fields_and_extra() {
        let snap = snapshot();
        let extra = json!({"hangupcause": 16});
        let record = build_record(
            &FixedClock,
            &snap,
            CelEventType::Hangup,
            "",
            Some(&extra),
        );
        assert_eq!(record.event_time_sec, 1_700_000_000);
        assert_eq!(record.event_time_usec, 123_456);
        assert_eq!(record.uniqueid, "u1");
        assert_eq!(record.linkedid, "L1");
        assert_eq!(record.account_code, "acct1");
        assert_eq!(record.peer_account, "peer1");
        assert_eq!(record.extra, r#"{"hangupcause":16}"#);
        assert_eq!(record.peer, "");
        assert_eq!(record.user_defined_name, "");
    }

    #[test]
    fn no_extra_gives_empty_string() {
        let snap = snapshot();
        let record = build_record(&FixedClock, &snap, CelEventType::ChannelStart, "", None);
        assert_eq!(record.extra, "");
    }

    #[test]
    fn user_defined_name_only_set_for_user_defined_events() {
        let snap = snapshot();
        let record = build_record(
            &FixedClock,
            &snap,
            CelEventType::UserDefined,
            "CustomEvent",
            None,
        );
        assert_eq!(record.user_defined_name, "CustomEvent");

        let record2 = build_record(&FixedClock, &snap, CelEventType::Answer, "CustomEvent", None);
        assert_eq!(record2.user_defined_name, "");
    }
}
