//! Companion gallery items and the content keys used to unlock them.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{Credits, DbId};

/// Media type of a gallery entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// One entry in a companion's gallery.
///
/// `credit_cost` is present iff `exclusive` is set; see [`validate_gallery`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    pub id: String,
    pub kind: MediaKind,
    pub url: String,
    #[serde(default)]
    pub exclusive: bool,
    #[serde(default)]
    pub credit_cost: Option<Credits>,
    /// Words in a user message that make this item a good upsell.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub caption: Option<String>,
}

impl GalleryItem {
    /// Cost to unlock, `0` for non-exclusive items.
    pub fn unlock_cost(&self) -> Credits {
        if self.exclusive {
            self.credit_cost.unwrap_or(0)
        } else {
            0
        }
    }
}

/// Gallery entry as shown to a particular viewer.
///
/// `url` is withheld while an exclusive item is still locked for the viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItemView {
    pub id: String,
    pub kind: MediaKind,
    pub url: Option<String>,
    pub exclusive: bool,
    pub credit_cost: Option<Credits>,
    pub locked: bool,
    pub caption: Option<String>,
}

/// Identifies one unlockable item across all companions.
///
/// Gallery item ids are only unique within a profile, so the account's
/// unlocked set stores `"{companion_id}:{item_id}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentKey {
    pub companion_id: DbId,
    pub item_id: String,
}

impl ContentKey {
    pub fn new(companion_id: DbId, item_id: impl Into<String>) -> Self {
        Self {
            companion_id,
            item_id: item_id.into(),
        }
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.companion_id, self.item_id)
    }
}

impl FromStr for ContentKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (companion, item) = s
            .split_once(':')
            .ok_or_else(|| CoreError::Validation(format!("Malformed content key '{s}'")))?;
        let companion_id = companion
            .parse::<DbId>()
            .map_err(|_| CoreError::Validation(format!("Malformed content key '{s}'")))?;
        if item.is_empty() {
            return Err(CoreError::Validation(format!("Malformed content key '{s}'")));
        }
        Ok(Self::new(companion_id, item))
    }
}

/// Check gallery rules: unique item ids, cost present iff exclusive,
/// costs non-negative, no blank ids or URLs.
pub fn validate_gallery(items: &[GalleryItem]) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for item in items {
        if item.id.trim().is_empty() {
            return Err(CoreError::Validation("Gallery item id must not be empty".into()));
        }
        if item.id.contains(':') {
            return Err(CoreError::Validation(format!(
                "Gallery item id '{}' must not contain ':'",
                item.id
            )));
        }
        if !seen.insert(item.id.as_str()) {
            return Err(CoreError::Validation(format!(
                "Duplicate gallery item id '{}'",
                item.id
            )));
        }
        if item.url.trim().is_empty() {
            return Err(CoreError::Validation(format!(
                "Gallery item '{}' has no url",
                item.id
            )));
        }
        match (item.exclusive, item.credit_cost) {
            (true, None) => {
                return Err(CoreError::Validation(format!(
                    "Exclusive item '{}' needs a credit_cost",
                    item.id
                )))
            }
            (false, Some(_)) => {
                return Err(CoreError::Validation(format!(
                    "Item '{}' is not exclusive and must not carry a credit_cost",
                    item.id
                )))
            }
            (true, Some(cost)) if cost < 0 => {
                return Err(CoreError::Validation(format!(
                    "Item '{}' has a negative credit_cost",
                    item.id
                )))
            }
            _ => {}
        }
    }
    Ok(())
}

/// Whether `item` of `companion_id` is still locked for a viewer owning `unlocked`.
pub fn is_locked(companion_id: DbId, item: &GalleryItem, unlocked: &BTreeSet<String>) -> bool {
    item.exclusive && !unlocked.contains(&ContentKey::new(companion_id, &item.id).to_string())
}

/// Build the viewer-specific gallery, withholding URLs of locked items.
pub fn redact_for_viewer(
    companion_id: DbId,
    items: &[GalleryItem],
    unlocked: &BTreeSet<String>,
) -> Vec<GalleryItemView> {
    items
        .iter()
        .map(|item| {
            let locked = is_locked(companion_id, item, unlocked);
            GalleryItemView {
                id: item.id.clone(),
                kind: item.kind,
                url: (!locked).then(|| item.url.clone()),
                exclusive: item.exclusive,
                credit_cost: item.credit_cost,
                locked,
                caption: item.caption.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, exclusive: bool, cost: Option<Credits>) -> GalleryItem {
        GalleryItem {
            id: id.to_string(),
            kind: MediaKind::Image,
            url: format!("https://cdn.example.com/{id}.jpg"),
            exclusive,
            credit_cost: cost,
            keywords: vec![],
            caption: None,
        }
    }

    #[test]
    fn content_key_round_trips() {
        let key = ContentKey::new(7, "beach-01");
        assert_eq!(key.to_string(), "7:beach-01");
        assert_eq!("7:beach-01".parse::<ContentKey>().unwrap(), key);
    }

    #[test]
    fn malformed_content_keys_are_rejected() {
        assert!("beach-01".parse::<ContentKey>().is_err());
        assert!("x:beach".parse::<ContentKey>().is_err());
        assert!("7:".parse::<ContentKey>().is_err());
    }

    #[test]
    fn duplicate_ids_fail_validation() {
        let items = vec![item("a", false, None), item("a", true, Some(10))];
        let err = validate_gallery(&items).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn exclusive_requires_cost_and_free_forbids_it() {
        assert!(validate_gallery(&[item("a", true, None)]).is_err());
        assert!(validate_gallery(&[item("a", false, Some(5))]).is_err());
        assert!(validate_gallery(&[item("a", true, Some(-1))]).is_err());
        assert!(validate_gallery(&[item("a", true, Some(50)), item("b", false, None)]).is_ok());
    }

    #[test]
    fn redaction_hides_only_locked_exclusive_urls() {
        let items = vec![item("free", false, None), item("vip", true, Some(50))];
        let none = BTreeSet::new();
        let views = redact_for_viewer(3, &items, &none);
        assert!(views[0].url.is_some());
        assert!(!views[0].locked);
        assert!(views[1].url.is_none());
        assert!(views[1].locked);

        let owned: BTreeSet<String> = ["3:vip".to_string()].into_iter().collect();
        let views = redact_for_viewer(3, &items, &owned);
        assert!(views[1].url.is_some());
        assert!(!views[1].locked);
    }

    #[test]
    fn unlock_cost_is_zero_for_free_items() {
        assert_eq!(item("a", false, None).unlock_cost(), 0);
        assert_eq!(item("b", true, Some(50)).unlock_cost(), 50);
    }
}
