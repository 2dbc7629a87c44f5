//! Fixed replies served on the debug path outside production.
//!
//! Each is wrapped in the same envelope shape the model API returns, so the
//! frontend exercises its normal parsing code against them.

use crate::ai::reply::text_envelope;
use crate::Result;
use serde_json::Value;

const PROFILE: &str = include_str!("../data/canned/profile.json");
const COMPATIBILITY: &str = include_str!("../data/canned/compatibility.json");

fn envelope(document: &str) -> Result<Value> {
    let parsed: Value = serde_json::from_str(document)?;
    Ok(text_envelope(serde_json::to_string(&parsed)?))
}

pub fn profile_envelope() -> Result<Value> {
    envelope(PROFILE)
}

pub fn compatibility_envelope() -> Result<Value> {
    envelope(COMPATIBILITY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::reply::parse_envelope_json;

    #[test]
    fn test_canned_profile_is_a_valid_envelope() {
        let envelope = profile_envelope().unwrap();
        let profile: Value = parse_envelope_json(&envelope).unwrap();
        assert!(profile["main_character"]["name"].is_string());
        assert_eq!(profile["red_flags"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_canned_compatibility_is_a_valid_envelope() {
        let envelope = compatibility_envelope().unwrap();
        let report: Value = parse_envelope_json(&envelope).unwrap();

        let score = report["compatibility_percentage"].as_u64().unwrap();
        assert!((1..=99).contains(&score));
        assert_eq!(report["verdict"]["category"], "Situationship Territory 🎭");
    }

    #[test]
    fn test_canned_replies_are_stable() {
        assert_eq!(profile_envelope().unwrap(), profile_envelope().unwrap());
        assert_eq!(
            compatibility_envelope().unwrap(),
            compatibility_envelope().unwrap()
        );
    }
}
