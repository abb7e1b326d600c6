pub(crate) mod check;
pub(crate) mod completions;
pub(crate) mod rollup;

/// Exit code when violations are present and the caller asked to gate on
/// them. Distinct from 1 (fatal error) so CI can tell the cases apart.
pub(crate) const EXIT_VIOLATIONS: i32 = 3;
