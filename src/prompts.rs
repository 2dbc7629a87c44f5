use crate::models::ParsedMovieInfo;

pub const EXTRACT_MOVIES: &str = include_str!("../data/prompts/extract_movies.txt");
pub const STANDARD_PROFILE: &str = include_str!("../data/prompts/standard_profile.txt");
pub const QUICK_PROFILE: &str = include_str!("../data/prompts/quick_profile.txt");
pub const COMPATIBILITY: &str = include_str!("../data/prompts/compatibility.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

fn join_or_na(items: &[String]) -> String {
    if items.is_empty() {
        "N/A".to_string()
    } else {
        items.join(", ")
    }
}

/// Second-step instruction embedding the facts read off the screenshot.
pub fn standard_profile(info: &ParsedMovieInfo) -> String {
    let favorites = join_or_na(&info.favorites);
    let favorite_ratings = join_or_na(info.favorite_ratings());
    let recent = join_or_na(&info.recent);
    let recent_ratings = join_or_na(info.recent_ratings());
    let stats = info
        .stats
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or("N/A");

    render(
        STANDARD_PROFILE,
        &[
            ("favorites", &favorites),
            ("favorite_ratings", &favorite_ratings),
            ("recent", &recent),
            ("recent_ratings", &recent_ratings),
            ("stats", stats),
        ],
    )
}

/// Comparison instruction embedding both profiles as pretty-printed JSON.
pub fn compatibility(user_profile: &serde_json::Value, crush_profile: &serde_json::Value) -> String {
    let user = serde_json::to_string_pretty(user_profile).unwrap_or_else(|_| user_profile.to_string());
    let crush =
        serde_json::to_string_pretty(crush_profile).unwrap_or_else(|_| crush_profile.to_string());

    render(
        COMPATIBILITY,
        &[("user_profile", &user), ("crush_profile", &crush)],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MovieRatings;

    #[test]
    fn test_render_single_var() {
        assert_eq!(
            render("Hello {{name}}!", &[("name", "world")]),
            "Hello world!"
        );
    }

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_prompts_are_non_empty() {
        assert!(!EXTRACT_MOVIES.is_empty());
        assert!(!STANDARD_PROFILE.is_empty());
        assert!(!QUICK_PROFILE.is_empty());
        assert!(!COMPATIBILITY.is_empty());
    }

    #[test]
    fn test_templates_have_placeholders() {
        for key in ["favorites", "favorite_ratings", "recent", "recent_ratings", "stats"] {
            assert!(STANDARD_PROFILE.contains(&format!("{{{{{}}}}}", key)));
        }
        assert!(COMPATIBILITY.contains("{{user_profile}}"));
        assert!(COMPATIBILITY.contains("{{crush_profile}}"));
    }

    #[test]
    fn test_standard_profile_embeds_titles_and_ratings() {
        let info = ParsedMovieInfo {
            favorites: vec!["Heat".to_string(), "Ratatouille".to_string()],
            recent: vec!["Dune: Part Two".to_string()],
            ratings: Some(MovieRatings {
                favorites: vec!["5/5".to_string(), "4.5/5".to_string()],
                recent: vec![],
            }),
            stats: Some("1,204 films".to_string()),
        };

        let prompt = standard_profile(&info);
        assert!(prompt.contains("Favorite films: Heat, Ratatouille"));
        assert!(prompt.contains("Favorite ratings: 5/5, 4.5/5"));
        assert!(prompt.contains("Recently watched: Dune: Part Two"));
        assert!(prompt.contains("Recent ratings: N/A"));
        assert!(prompt.contains("1,204 films"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_compatibility_embeds_both_profiles() {
        let prompt = compatibility(
            &serde_json::json!({ "main_character": { "name": "Amélie" } }),
            &serde_json::json!({ "main_character": { "name": "Travis Bickle" } }),
        );
        assert!(prompt.contains("Amélie"));
        assert!(prompt.contains("Travis Bickle"));
        assert!(!prompt.contains("{{"));
    }
}
