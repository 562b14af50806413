use crate::types::{Coordinate, HospitalCandidate, MatchResult};

/// Rank candidates within `radius_km` of `origin`, nearest first.
///
/// Candidates without a usable coordinate are skipped, not rejected. Equal
/// distances keep the order the candidates arrived in. The full list is
/// returned; paging is up to the caller.
pub fn match_within_radius<P, I>(
    origin: Coordinate,
    candidates: I,
    radius_km: f64,
) -> Vec<MatchResult<P>>
where
    I: IntoIterator<Item = HospitalCandidate<P>>,
{
    // Also catches a NaN radius
    if !(radius_km > 0.0) || !origin.is_valid() {
        return Vec::new();
    }

    let mut matches: Vec<MatchResult<P>> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let coordinate = candidate.coordinate.filter(Coordinate::is_valid)?;
            let distance_km = origin.distance_km(&coordinate);
            (distance_km <= radius_km).then_some(MatchResult {
                candidate,
                distance_km,
            })
        })
        .collect();

    // sort_by is stable, so ties stay in input order
    matches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    tracing::debug!(
        "Matched {} candidate(s) within {} km of ({})",
        matches.len(),
        radius_km,
        origin
    );

    matches
}
