//! GDPR Article 6 legal bases.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The lawful justification recorded for a processing activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegalBasis {
    /// The subject consented.
    Consent,
    /// Processing is needed to perform a contract with the subject.
    Contract,
    /// The controller's legitimate interest.
    LegitimateInterest,
    /// A legal obligation of the controller.
    LegalObligation,
}

impl LegalBasis {
    /// All legal bases, in declaration order.
    pub const ALL: [LegalBasis; 4] = [
        Self::Consent,
        Self::Contract,
        Self::LegitimateInterest,
        Self::LegalObligation,
    ];

    /// Return the stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Consent => "consent",
            Self::Contract => "contract",
            Self::LegitimateInterest => "legitimate_interest",
            Self::LegalObligation => "legal_obligation",
        }
    }
}

impl fmt::Display for LegalBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LegalBasis {
    type Err = compliance_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|basis| basis.as_str() == s)
            .ok_or_else(|| {
                compliance_core::AppError::validation(format!(
                    "Invalid legal basis: '{s}'. Expected one of: consent, contract, legitimate_interest, legal_obligation"
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compliance_core::error::ErrorKind;

    #[test]
    fn test_round_trips_every_basis() {
        for basis in LegalBasis::ALL {
            assert_eq!(basis.as_str().parse::<LegalBasis>().unwrap(), basis);
        }
    }

    #[test]
    fn test_rejects_unknown_basis() {
        let err = "vital_interest".parse::<LegalBasis>().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert!(err.message.contains("vital_interest"));
    }
}
