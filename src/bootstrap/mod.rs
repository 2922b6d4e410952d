//! Founder election for new registrations.
//!
//! The first profile ever created claims the Patriarche title and the
//! elevated flag; everyone after that starts as a plain Membre. The election
//! itself is a pure function over a snapshot ("does any member exist?").
//! The race between two simultaneous first registrations is settled by the
//! database, whose unique index admits a single patriarch row.

use crate::models::FamilyTitle;

/// Outcome of the founder election for one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FounderDecision {
    pub title: FamilyTitle,
    pub is_patriarch: bool,
}

/// Decide the role of a new registrant.
///
/// `has_existing_members` must come from a successful repository read. When
/// that read fails there is no decision to make: callers propagate the
/// failure instead of assuming an empty roster.
pub fn decide(has_existing_members: bool) -> FounderDecision {
    if has_existing_members {
        FounderDecision {
            title: FamilyTitle::Membre,
            is_patriarch: false,
        }
    } else {
        FounderDecision {
            title: FamilyTitle::Patriarche,
            is_patriarch: true,
        }
    }
}
