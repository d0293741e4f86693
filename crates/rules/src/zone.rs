//! Timezone resolution against the IANA database.
//!
//! An unknown or empty identifier is not an error: the user is evaluated in
//! UTC and the substitution is kept as a value so callers and tests can see
//! that it happened.

use chrono_tz::Tz;

/// Outcome of resolving a user's timezone identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneResolution {
    /// The identifier named a known IANA zone.
    Resolved(Tz),
    /// The identifier was empty or unknown; UTC is used instead.
    FellBackToUtc { requested: String },
}

impl ZoneResolution {
    /// Resolve an IANA zone name, substituting UTC on failure.
    ///
    /// The fallback is logged at `warn` level.
    pub fn resolve(timezone: &str) -> Self {
        let trimmed = timezone.trim();
        if !trimmed.is_empty() {
            if let Ok(tz) = trimmed.parse::<Tz>() {
                return Self::Resolved(tz);
            }
        }

        tracing::warn!(
            timezone = %timezone,
            "Unknown or empty timezone, evaluating in UTC"
        );
        Self::FellBackToUtc {
            requested: timezone.to_string(),
        }
    }

    /// The zone to evaluate in.
    pub fn zone(&self) -> Tz {
        match self {
            Self::Resolved(tz) => *tz,
            Self::FellBackToUtc { .. } => Tz::UTC,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::FellBackToUtc { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_zone_resolves() {
        let resolution = ZoneResolution::resolve("Europe/Berlin");
        assert_eq!(resolution, ZoneResolution::Resolved(chrono_tz::Europe::Berlin));
        assert!(!resolution.is_fallback());
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let resolution = ZoneResolution::resolve("  Asia/Tokyo ");
        assert_eq!(resolution.zone(), chrono_tz::Asia::Tokyo);
    }

    #[test]
    fn unknown_zone_falls_back_to_utc() {
        let resolution = ZoneResolution::resolve("Mars/Olympus_Mons");
        assert!(resolution.is_fallback());
        assert_eq!(resolution.zone(), Tz::UTC);
        assert_eq!(
            resolution,
            ZoneResolution::FellBackToUtc {
                requested: "Mars/Olympus_Mons".to_string()
            }
        );
    }

    #[test]
    fn empty_zone_falls_back_to_utc() {
        assert!(ZoneResolution::resolve("").is_fallback());
        assert!(ZoneResolution::resolve("   ").is_fallback());
    }

    #[test]
    fn explicit_utc_is_not_a_fallback() {
        let resolution = ZoneResolution::resolve("UTC");
        assert!(!resolution.is_fallback());
        assert_eq!(resolution.zone(), Tz::UTC);
    }
}
