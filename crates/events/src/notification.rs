use unitsvc_core::{ClassId, UnitId};

/// Fixed topic per mutation kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    UnitCreated,
    UnitRenamed,
    UnitDeleted,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::UnitCreated, Topic::UnitRenamed, Topic::UnitDeleted];

    pub fn as_str(self) -> &'static str {
        match self {
            Topic::UnitCreated => "units.create",
            Topic::UnitRenamed => "units.rename",
            Topic::UnitDeleted => "units.delete",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == raw)
    }
}

impl core::fmt::Display for Topic {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutation announcement published to the event sink.
///
/// The payload is the textual id of the affected resource: the class id for
/// `units.create`, the unit id for `units.rename` and `units.delete`. On the
/// wire the topic is the channel name and the payload is the whole body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    topic: Topic,
    payload: String,
}

impl Notification {
    pub fn new(topic: Topic, payload: impl Into<String>) -> Self {
        Self {
            topic,
            payload: payload.into(),
        }
    }

    /// Rebuild a notification from a channel name and message body.
    ///
    /// Returns `None` for channels outside the unit topics.
    pub fn from_wire(channel: &str, body: impl Into<String>) -> Option<Self> {
        Topic::parse(channel).map(|topic| Self::new(topic, body))
    }

    pub fn unit_created(class_id: ClassId) -> Self {
        Self::new(Topic::UnitCreated, class_id.to_string())
    }

    pub fn unit_renamed(unit_id: UnitId) -> Self {
        Self::new(Topic::UnitRenamed, unit_id.to_string())
    }

    pub fn unit_deleted(unit_id: UnitId) -> Self {
        Self::new(Topic::UnitDeleted, unit_id.to_string())
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}
