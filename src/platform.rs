// Subway platform selection for Gates Av (J/Z)
//
// The GTFS-RT stop ids at this station are wired the opposite way round from
// the signage: the Manhattan-bound platform (shown as J30N) is published as
// J30S in the feed, and the other direction as J30N. Keep the swap here.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    /// Manhattan-bound.
    #[default]
    North,
    South,
}

impl Platform {
    pub fn label(self) -> &'static str {
        match self {
            Platform::North => "J30N",
            Platform::South => "J30S",
        }
    }

    /// Stop id the upstream feed uses for this platform.
    pub fn wire_stop_id(self) -> &'static str {
        match self {
            Platform::North => "J30S",
            Platform::South => "J30N",
        }
    }

    /// Exact label match only. "auto" and anything unknown are `None`.
    pub fn parse(value: &str) -> Option<Platform> {
        match value {
            "J30N" => Some(Platform::North),
            "J30S" => Some(Platform::South),
            _ => None,
        }
    }

    /// Caller override, then configured default, then North.
    pub fn resolve(requested: Option<&str>, configured: Option<&str>) -> Platform {
        requested
            .and_then(Platform::parse)
            .or_else(|| configured.and_then(Platform::parse))
            .unwrap_or_default()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
