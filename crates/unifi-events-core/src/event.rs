// ── Event classification ──
//
// Controller event records carry a `key` such as `EVT_WU_Connected`.
// The two letters after `EVT_` name the group; the remainder, lowercased,
// names the event. Records without a recognisable key are dropped.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use strum::EnumString;
use tracing::debug;

static EVENT_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"EVT_([A-Z]{2})_(.*)").expect("event key pattern is valid"));

/// Two-letter event group, lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum EventGroup {
    /// Access points (`EVT_AP_*`).
    Ap,
    /// Gateways (`EVT_GW_*`).
    Gw,
    /// Switches (`EVT_SW_*`).
    Sw,
    /// UniFi Security Gateway XG (`EVT_XG_*`).
    Xg,
    /// Dream machines.
    Dm,
    /// Wireless users.
    Wu,
    /// Wireless guests.
    Wg,
    /// Wired users.
    Lu,
    /// Wired guests.
    Lg,
    /// Admin activity.
    Ad,
    /// Any other two-letter group, lowercased.
    #[strum(default)]
    Other(String),
}

impl EventGroup {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ap => "ap",
            Self::Gw => "gw",
            Self::Sw => "sw",
            Self::Xg => "xg",
            Self::Dm => "dm",
            Self::Wu => "wu",
            Self::Wg => "wg",
            Self::Lu => "lu",
            Self::Lg => "lg",
            Self::Ad => "ad",
            Self::Other(code) => code,
        }
    }

    /// Parse a group code, keeping unknown codes as [`EventGroup::Other`].
    pub fn from_code(code: &str) -> Self {
        let code = code.to_ascii_lowercase();
        code.parse().unwrap_or(Self::Other(code))
    }
}

impl fmt::Display for EventGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record whose key matched `EVT_<GROUP>_<NAME>`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedEvent {
    pub group: EventGroup,
    /// Lowercased event name (`login`, `lost_contact`, ...).
    pub name: String,
    /// The raw record, untouched.
    pub payload: Value,
}

impl ClassifiedEvent {
    /// Hierarchical channel name, e.g. `lu.login`.
    pub fn channel(&self) -> String {
        format!("{}.{}", self.group, self.name)
    }

    /// The original `key` field.
    pub fn key(&self) -> Option<&str> {
        self.payload.get("key").and_then(Value::as_str)
    }
}

/// Classify one raw record. Returns `None` when the record has no string
/// `key` or the key does not match the event pattern.
pub fn classify(record: Value) -> Option<ClassifiedEvent> {
    let Some(key) = record.get("key").and_then(Value::as_str) else {
        debug!("event record has no key, dropping");
        return None;
    };
    let Some(caps) = EVENT_KEY.captures(key) else {
        debug!(key, "unrecognised event key, dropping");
        return None;
    };

    let group = EventGroup::from_code(&caps[1]);
    let name = caps[2].to_lowercase();

    Some(ClassifiedEvent {
        group,
        name,
        payload: record,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn login_key_becomes_lu_login() {
        let record = json!({ "key": "EVT_LU_Login", "user": "x" });
        let event = classify(record.clone()).unwrap();

        assert_eq!(event.group, EventGroup::Lu);
        assert_eq!(event.name, "login");
        assert_eq!(event.channel(), "lu.login");
        assert_eq!(event.payload, record);
    }

    #[test]
    fn name_keeps_underscores() {
        let event = classify(json!({ "key": "EVT_AP_Lost_Contact" })).unwrap();
        assert_eq!(event.channel(), "ap.lost_contact");
    }

    #[test]
    fn known_groups_round_trip_through_codes() {
        let known = [
            EventGroup::Ap,
            EventGroup::Gw,
            EventGroup::Sw,
            EventGroup::Xg,
            EventGroup::Dm,
            EventGroup::Wu,
            EventGroup::Wg,
            EventGroup::Lu,
            EventGroup::Lg,
            EventGroup::Ad,
        ];
        for group in known {
            assert_eq!(EventGroup::from_code(&group.as_str().to_uppercase()), group);
        }
        let event = classify(json!({ "key": "EVT_XG_Connected" })).unwrap();
        assert_eq!(event.group, EventGroup::Xg);
    }

    #[test]
    fn unknown_group_is_kept() {
        let event = classify(json!({ "key": "EVT_ZZ_Something" })).unwrap();
        assert_eq!(event.group, EventGroup::Other("zz".into()));
        assert_eq!(event.channel(), "zz.something");
    }

    #[test]
    fn key_may_have_a_prefix() {
        let event = classify(json!({ "key": "X_EVT_GW_WANTransition" })).unwrap();
        assert_eq!(event.channel(), "gw.wantransition");
    }

    #[test]
    fn lowercase_group_does_not_match() {
        assert!(classify(json!({ "key": "EVT_lu_Login" })).is_none());
    }

    #[test]
    fn records_without_key_are_dropped() {
        assert!(classify(json!({ "msg": "hello" })).is_none());
        assert!(classify(json!({ "key": 42 })).is_none());
        assert!(classify(json!({ "key": "OTHER" })).is_none());
    }

    #[test]
    fn empty_name_is_allowed() {
        let event = classify(json!({ "key": "EVT_SW_" })).unwrap();
        assert_eq!(event.name, "");
    }
}
