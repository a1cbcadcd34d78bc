use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid value '{value}' for {field}")]
pub struct InvalidEnumValue {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnumValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnumValue {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

str_enum!(Severity {
    Error => "ERROR",
    Warning => "WARNING",
    Info => "INFO",
});

str_enum!(EntityKind {
    Diagnosis => "diagnosis",
    Procedure => "procedure",
});

str_enum!(EntitySource {
    Model => "transformer-model",
    Heuristic => "heuristic",
});

// Which pipeline stage produced a clinical field. Deterministic label
// matching is preferred; the fallback tags record that the NLP extractor
// filled the gap instead.
str_enum!(FieldProvenance {
    Deterministic => "deterministic",
    HeuristicFallback => "heuristic-fallback",
    ModelFallback => "model-fallback",
});

str_enum!(RecordSource {
    Annex => "annex",
    History => "history",
    Invoice => "invoice",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn severity_round_trips() {
        for severity in [Severity::Error, Severity::Warning, Severity::Info] {
            assert_eq!(Severity::from_str(severity.as_str()).unwrap(), severity);
        }
    }

    #[test]
    fn unknown_value_is_rejected() {
        let err = RecordSource::from_str("chatbot").unwrap_err();
        assert_eq!(err.field, "RecordSource");
        assert_eq!(err.value, "chatbot");
    }

    #[test]
    fn fallback_provenance_strings() {
        assert_eq!(FieldProvenance::HeuristicFallback.as_str(), "heuristic-fallback");
        assert_eq!(FieldProvenance::ModelFallback.as_str(), "model-fallback");
    }
}
