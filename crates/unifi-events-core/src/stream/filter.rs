// ── Topic filters for subscriptions ──
//
// Topics use the same dotted names notifications are published under,
// with a trailing `*` to take a whole namespace.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::event::EventGroup;
use crate::notification::{LIFECYCLE_NAMESPACE, Notification};

const LIFECYCLE_NAMES: [&str; 4] = ["connect", "disconnect", "reconnect", "error"];

/// What a subscription listens to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    /// Every notification (`*`).
    All,
    /// Every `unifi.*` lifecycle notification.
    Lifecycle,
    /// Every event in one group (`wu.*`).
    Group(EventGroup),
    /// One exact channel (`lu.login`, `unifi.connect`).
    Channel(String),
}

impl Topic {
    pub fn matches(&self, notification: &Notification) -> bool {
        match self {
            Self::All => true,
            Self::Lifecycle => notification.is_lifecycle(),
            Self::Group(group) => notification
                .as_event()
                .is_some_and(|event| &event.group == group),
            Self::Channel(channel) => notification.channel() == channel.as_str(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid topic '{topic}': {reason}")]
pub struct TopicParseError {
    pub topic: String,
    pub reason: &'static str,
}

impl FromStr for Topic {
    type Err = TopicParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| TopicParseError {
            topic: s.to_owned(),
            reason,
        };

        let s = s.trim();
        if s == "*" || s == "**" {
            return Ok(Self::All);
        }

        let (namespace, name) = s
            .split_once('.')
            .ok_or_else(|| err("expected '<group>.<name>' or '<group>.*'"))?;
        if name.is_empty() {
            return Err(err("event name is empty"));
        }

        let namespace = namespace.to_ascii_lowercase();
        if namespace == LIFECYCLE_NAMESPACE {
            if name == "*" {
                return Ok(Self::Lifecycle);
            }
            let name = name.to_ascii_lowercase();
            if !LIFECYCLE_NAMES.contains(&name.as_str()) {
                return Err(err("unknown lifecycle notification"));
            }
            return Ok(Self::Channel(format!("{LIFECYCLE_NAMESPACE}.{name}")));
        }

        if namespace.len() != 2 || !namespace.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(err("event group must be two letters"));
        }

        let group = EventGroup::from_code(&namespace);
        if name == "*" {
            Ok(Self::Group(group))
        } else {
            Ok(Self::Channel(format!("{group}.{}", name.to_lowercase())))
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Lifecycle => write!(f, "{LIFECYCLE_NAMESPACE}.*"),
            Self::Group(group) => write!(f, "{group}.*"),
            Self::Channel(channel) => f.write_str(channel),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::error::CoreError;
    use crate::event::classify;

    fn event(key: &str) -> Notification {
        Notification::Event(classify(json!({ "key": key })).unwrap())
    }

    #[test]
    fn parses_wildcards() {
        assert_eq!("*".parse::<Topic>().unwrap(), Topic::All);
        assert_eq!("unifi.*".parse::<Topic>().unwrap(), Topic::Lifecycle);
        assert_eq!("LU.*".parse::<Topic>().unwrap(), Topic::Group(EventGroup::Lu));
    }

    #[test]
    fn parses_exact_channels() {
        assert_eq!(
            "lu.Login".parse::<Topic>().unwrap(),
            Topic::Channel("lu.login".into())
        );
        assert_eq!(
            "unifi.connect".parse::<Topic>().unwrap(),
            Topic::Channel("unifi.connect".into())
        );
    }

    #[test]
    fn rejects_bad_topics() {
        assert!("login".parse::<Topic>().is_err());
        assert!("lu.".parse::<Topic>().is_err());
        assert!("abc.login".parse::<Topic>().is_err());
        assert!("unifi.bogus".parse::<Topic>().is_err());
    }

    #[test]
    fn group_topic_only_matches_its_events() {
        let topic = Topic::Group(EventGroup::Wu);
        assert!(topic.matches(&event("EVT_WU_Connected")));
        assert!(!topic.matches(&event("EVT_LU_Login")));
        assert!(!topic.matches(&Notification::Connected));
    }

    #[test]
    fn channel_topic_matches_events_and_lifecycle() {
        let login: Topic = "lu.login".parse().unwrap();
        assert!(login.matches(&event("EVT_LU_Login")));
        assert!(!login.matches(&event("EVT_LU_Logout")));

        let error: Topic = "unifi.error".parse().unwrap();
        assert!(error.matches(&Notification::Error(CoreError::ClientShutdown)));
        assert!(!error.matches(&Notification::Connected));
    }

    #[test]
    fn lifecycle_excludes_events() {
        assert!(Topic::Lifecycle.matches(&Notification::Disconnected));
        assert!(Topic::Lifecycle.matches(&Notification::Reconnecting { attempt: 1 }));
        assert!(!Topic::Lifecycle.matches(&event("EVT_AP_Lost_Contact")));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for raw in ["*", "unifi.*", "wg.*", "ap.lost_contact"] {
            assert_eq!(raw.parse::<Topic>().unwrap().to_string(), raw);
        }
    }
}
