use std::fmt;

/// Edge highlight used by the replay pipeline. Snapshot-mode edges carry no
/// fixed color and are assigned one from the palette at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeColor {
    Blue,
    Green,
}

impl EdgeColor {
    pub fn as_svg(&self) -> &'static str {
        match self {
            EdgeColor::Blue => "blue",
            EdgeColor::Green => "green",
        }
    }
}

impl fmt::Display for EdgeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_svg())
    }
}

/// BGP event classification from the bgplay feed's `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Announcement,
    Withdrawal,
    Other(String),
}

impl EventKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "A" => EventKind::Announcement,
            "W" => EventKind::Withdrawal,
            other => EventKind::Other(other.to_string()),
        }
    }

    pub fn tag(&self) -> &str {
        match self {
            EventKind::Announcement => "A",
            EventKind::Withdrawal => "W",
            EventKind::Other(tag) => tag,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}
