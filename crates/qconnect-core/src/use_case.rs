//! Public-health use cases and the query strategy each one implies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// How the clinical query for a use case is issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    /// One social-history lookup, issued as a single call
    Social,
    /// One observation lookup, issued as a single call
    ObservationOnly,
    /// One path per non-empty code partition, issued as one batch
    General,
}

/// A named public-health investigation scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum UseCase {
    Chlamydia,
    Gonorrhea,
    Syphilis,
    Cancer,
    NewbornScreening,
    SocialDeterminants,
}

impl UseCase {
    pub const ALL: [UseCase; 6] = [
        UseCase::Chlamydia,
        UseCase::Gonorrhea,
        UseCase::Syphilis,
        UseCase::Cancer,
        UseCase::NewbornScreening,
        UseCase::SocialDeterminants,
    ];

    /// Stable identifier used on the wire and on the command line
    pub fn id(&self) -> &'static str {
        match self {
            UseCase::Chlamydia => "chlamydia",
            UseCase::Gonorrhea => "gonorrhea",
            UseCase::Syphilis => "syphilis",
            UseCase::Cancer => "cancer",
            UseCase::NewbornScreening => "newborn-screening",
            UseCase::SocialDeterminants => "social-determinants",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            UseCase::Chlamydia => "Chlamydia case investigation",
            UseCase::Gonorrhea => "Gonorrhea case investigation",
            UseCase::Syphilis => "Syphilis case investigation",
            UseCase::Cancer => "Cancer case investigation",
            UseCase::NewbornScreening => "Newborn screening follow-up",
            UseCase::SocialDeterminants => "Gather social determinants of health",
        }
    }

    pub fn query_shape(&self) -> QueryShape {
        match self {
            UseCase::SocialDeterminants => QueryShape::Social,
            UseCase::NewbornScreening => QueryShape::ObservationOnly,
            UseCase::Chlamydia | UseCase::Gonorrhea | UseCase::Syphilis | UseCase::Cancer => {
                QueryShape::General
            }
        }
    }

    /// Whether Encounters keyed on a pass-one Condition must be fetched afterwards
    pub fn has_second_pass_query(&self) -> bool {
        matches!(
            self,
            UseCase::Chlamydia | UseCase::Gonorrhea | UseCase::Syphilis
        )
    }
}

impl fmt::Display for UseCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for UseCase {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        UseCase::ALL
            .into_iter()
            .find(|uc| uc.id() == normalized || uc.display_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::invalid_use_case(s))
    }
}

impl TryFrom<String> for UseCase {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<UseCase> for String {
    fn from(value: UseCase) -> Self {
        value.id().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_use_case_forms() {
        assert_eq!("gonorrhea".parse::<UseCase>().unwrap(), UseCase::Gonorrhea);
        assert_eq!("Newborn-Screening".parse::<UseCase>().unwrap(), UseCase::NewbornScreening);
        assert_eq!("social_determinants".parse::<UseCase>().unwrap(), UseCase::SocialDeterminants);
        assert_eq!(
            "Syphilis case investigation".parse::<UseCase>().unwrap(),
            UseCase::Syphilis
        );
        assert!("measles".parse::<UseCase>().is_err());
    }

    #[test]
    fn test_query_shapes() {
        assert_eq!(UseCase::SocialDeterminants.query_shape(), QueryShape::Social);
        assert_eq!(UseCase::NewbornScreening.query_shape(), QueryShape::ObservationOnly);
        assert_eq!(UseCase::Cancer.query_shape(), QueryShape::General);
        assert_eq!(UseCase::Chlamydia.query_shape(), QueryShape::General);
    }

    #[test]
    fn test_second_pass_only_for_sti_investigations() {
        let with_second_pass: Vec<UseCase> = UseCase::ALL
            .into_iter()
            .filter(UseCase::has_second_pass_query)
            .collect();
        assert_eq!(
            with_second_pass,
            vec![UseCase::Chlamydia, UseCase::Gonorrhea, UseCase::Syphilis]
        );
    }

    #[test]
    fn test_serde_uses_id() {
        let json = serde_json::to_string(&UseCase::NewbornScreening).unwrap();
        assert_eq!(json, "\"newborn-screening\"");
        let parsed: UseCase = serde_json::from_str("\"social_determinants\"").unwrap();
        assert_eq!(parsed, UseCase::SocialDeterminants);
        assert!(serde_json::from_str::<UseCase>("\"measles\"").is_err());
    }
}
