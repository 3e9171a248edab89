use comedor_shared::user::GroupRestriction;

/// Alternative set annotated with the ids the user's group may not
/// choose. `restricted` is always a subset of `available`: the UI keeps
/// restricted options visible and explains why they are disallowed.
#[derive(Debug, Clone, PartialEq)]
pub struct RestrictionView {
    pub available: Vec<String>,
    pub restricted: Vec<String>,
}

/// Flags restricted alternatives without removing any. Enforcement of
/// "cannot select a restricted alternative" is a write-time rule outside
/// this engine.
pub fn flag_restricted(
    alternatives: &[String],
    restriction: Option<&GroupRestriction>,
) -> RestrictionView {
    let available = alternatives.to_vec();
    let restricted = match restriction {
        Some(r) if r.restrict_alternatives => available
            .iter()
            .filter(|id| r.alternative_ids.contains(id))
            .cloned()
            .collect(),
        _ => Vec::new(),
    };

    RestrictionView {
        available,
        restricted,
    }
}
