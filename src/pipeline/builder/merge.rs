//! Multi-source field resolution with an audit trail.
//!
//! Precedence is positional: candidates arrive ordered best-first and the
//! first present value wins. Losing values that conflict with the winner
//! are preserved as discarded alternatives, never dropped silently.

use crate::models::{DiscardedValue, RecordSource, Sourced};

/// Resolve one field from precedence-ordered candidates.
pub fn resolve_field<T: PartialEq>(candidates: Vec<(Option<T>, RecordSource)>) -> Sourced<T> {
    let mut resolved: Sourced<T> = Sourced {
        value: None,
        source: None,
        discarded: vec![],
    };

    for (candidate, source) in candidates {
        let Some(candidate) = candidate else { continue };
        if resolved.value.is_none() {
            resolved.value = Some(candidate);
            resolved.source = Some(source);
        } else if resolved.value.as_ref() != Some(&candidate) {
            resolved.discarded.push(DiscardedValue {
                value: candidate,
                source,
            });
        }
        // An agreeing lower-precedence value is not a conflict.
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_present_candidate_wins() {
        let resolved = resolve_field(vec![
            (None, RecordSource::Annex),
            (Some("CC"), RecordSource::History),
            (Some("TI"), RecordSource::Invoice),
        ]);
        assert_eq!(resolved.value, Some("CC"));
        assert_eq!(resolved.source, Some(RecordSource::History));
        assert_eq!(resolved.discarded.len(), 1);
        assert_eq!(resolved.discarded[0].value, "TI");
    }

    #[test]
    fn conflicting_loser_is_retained() {
        let resolved = resolve_field(vec![
            (Some("1232835680"), RecordSource::Annex),
            (Some("99999"), RecordSource::History),
        ]);
        assert_eq!(resolved.value, Some("1232835680"));
        assert_eq!(resolved.source, Some(RecordSource::Annex));
        assert_eq!(resolved.discarded[0].source, RecordSource::History);
    }

    #[test]
    fn agreeing_sources_leave_no_audit_noise() {
        let resolved = resolve_field(vec![
            (Some("CC"), RecordSource::Annex),
            (Some("CC"), RecordSource::History),
        ]);
        assert_eq!(resolved.value, Some("CC"));
        assert!(resolved.discarded.is_empty());
    }

    #[test]
    fn all_absent_resolves_to_none() {
        let resolved: Sourced<String> = resolve_field(vec![
            (None, RecordSource::Annex),
            (None, RecordSource::History),
        ]);
        assert!(resolved.value.is_none());
        assert!(resolved.source.is_none());
    }
}
