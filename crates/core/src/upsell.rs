//! Post-turn upsell detection.
//!
//! After a reply completes the user's raw text is scanned for words that
//! suggest they want to see media. A hit offers one locked exclusive item.
//! Nothing suppresses repeat offers across turns.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::gallery::{is_locked, GalleryItem};
use crate::types::{Credits, DbId};

/// Generic media-request phrases that trigger an offer.
pub const STATIC_KEYWORDS: &[&str] = &[
    "photo", "pic", "picture", "selfie", "show me", "video", "send me",
];

/// A one-time upsell card for the current turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpsellOffer {
    pub companion_id: DbId,
    pub item_id: String,
    pub credit_cost: Credits,
    pub caption: Option<String>,
}

fn mentions(haystack: &str, keyword: &str) -> bool {
    let keyword = keyword.trim().to_lowercase();
    !keyword.is_empty() && haystack.contains(&keyword)
}

/// Pick at most one locked exclusive item to offer for `user_text`.
///
/// An item whose own keywords match wins; otherwise a match on
/// [`STATIC_KEYWORDS`] offers the first locked exclusive item.
pub fn find_upsell(
    user_text: &str,
    companion_id: DbId,
    gallery: &[GalleryItem],
    unlocked: &BTreeSet<String>,
) -> Option<UpsellOffer> {
    let text = user_text.to_lowercase();
    let mut locked = gallery
        .iter()
        .filter(|item| is_locked(companion_id, item, unlocked));

    let own_match = locked
        .clone()
        .find(|item| item.keywords.iter().any(|k| mentions(&text, k)));

    let chosen = match own_match {
        Some(item) => Some(item),
        None if STATIC_KEYWORDS.iter().any(|k| mentions(&text, k)) => locked.next(),
        None => None,
    }?;

    Some(UpsellOffer {
        companion_id,
        item_id: chosen.id.clone(),
        credit_cost: chosen.unlock_cost(),
        caption: chosen.caption.clone(),
    })
}
