//! Companion profiles: persona text, presentation fields and gallery.
//!
//! A set of bundled defaults seeds an empty store. Once an admin edits
//! profiles, the stored records win.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::gallery::{validate_gallery, GalleryItem};

/// Bundled default profiles.
const DEFAULT_PROFILES_JSON: &str = include_str!("../defaults/companions.json");

pub const MAX_PERSONA_CHARS: usize = 8000;

/// Profile fields authored by admins (no id, no timestamps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileContent {
    pub slug: String,
    pub name: String,
    pub age: i32,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    pub persona_prompt: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub voice_name: Option<String>,
    #[serde(default)]
    pub gallery: Vec<GalleryItem>,
    #[serde(default = "default_published")]
    pub is_published: bool,
    #[serde(default)]
    pub sort_order: i32,
}

fn default_published() -> bool {
    true
}

/// Profile skeleton returned by the AI drafting endpoint.
///
/// Admins review and complete it (gallery, avatar) before saving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileDraft {
    pub name: String,
    pub age: i32,
    pub tagline: String,
    pub bio: String,
    pub persona_prompt: String,
    #[serde(default)]
    pub interests: Vec<String>,
}

/// Check authored profile content.
pub fn validate_profile(profile: &ProfileContent) -> Result<(), CoreError> {
    if profile.name.trim().is_empty() {
        return Err(CoreError::Validation("Profile name must not be empty".into()));
    }
    if profile.slug.is_empty()
        || !profile
            .slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(CoreError::Validation(
            "Slug may only contain lowercase letters, digits and '-'".into(),
        ));
    }
    if profile.age < 18 {
        return Err(CoreError::Validation(
            "Companions must be at least 18 years old".into(),
        ));
    }
    if profile.persona_prompt.trim().is_empty() {
        return Err(CoreError::Validation("Persona prompt must not be empty".into()));
    }
    if profile.persona_prompt.chars().count() > MAX_PERSONA_CHARS {
        return Err(CoreError::Validation(format!(
            "Persona prompt exceeds {MAX_PERSONA_CHARS} characters"
        )));
    }
    validate_gallery(&profile.gallery)
}

/// Load and validate the bundled default profiles.
pub fn default_profiles() -> Result<Vec<ProfileContent>, CoreError> {
    let profiles: Vec<ProfileContent> = serde_json::from_str(DEFAULT_PROFILES_JSON)
        .map_err(|e| CoreError::Internal(format!("Bundled profiles are malformed: {e}")))?;
    for profile in &profiles {
        validate_profile(profile)?;
    }
    Ok(profiles)
}

/// System prompt sent to the model for every turn with this companion.
pub fn build_system_prompt(name: &str, age: i32, persona_prompt: &str, user_name: Option<&str>) -> String {
    let mut prompt = format!(
        "You are {name}, a {age}-year-old companion. Stay in character at all times.\n\n{persona_prompt}"
    );
    if let Some(user) = user_name.filter(|u| !u.trim().is_empty()) {
        prompt.push_str(&format!("\n\nThe person you are talking to is called {user}."));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_defaults_are_valid() {
        let profiles = default_profiles().expect("defaults should parse and validate");
        assert!(!profiles.is_empty());
        let mut slugs: Vec<_> = profiles.iter().map(|p| p.slug.as_str()).collect();
        slugs.sort_unstable();
        slugs.dedup();
        assert_eq!(slugs.len(), profiles.len(), "default slugs must be unique");
    }

    #[test]
    fn minors_are_rejected() {
        let mut profile = default_profiles().unwrap().remove(0);
        profile.age = 17;
        assert!(validate_profile(&profile).is_err());
    }

    #[test]
    fn bad_slug_is_rejected() {
        let mut profile = default_profiles().unwrap().remove(0);
        profile.slug = "Has Spaces".into();
        assert!(validate_profile(&profile).is_err());
    }

    #[test]
    fn system_prompt_mentions_user_when_known() {
        let prompt = build_system_prompt("Ayesha", 24, "Warm and curious.", Some("Tanvir"));
        assert!(prompt.contains("Ayesha"));
        assert!(prompt.contains("Warm and curious."));
        assert!(prompt.contains("Tanvir"));

        let anonymous = build_system_prompt("Ayesha", 24, "Warm.", Some("  "));
        assert!(!anonymous.contains("talking to"));
    }
}
