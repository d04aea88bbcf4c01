//! Screen navigation for the client session.
//!
//! A flat set of views with explicit transitions. Sign-in and sign-out
//! callbacks force a view from anywhere. "Back" goes to a fixed target per
//! view; there is no history stack. Overlays sit on top of whatever view is
//! current and are tracked independently.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Landing,
    Auth,
    AgeVerification,
    ProfileSelection,
    ProfileDetail,
    Chat,
    Subscription,
    Account,
    AdminPanel,
}

impl View {
    /// Hard-coded target of the back button on this view.
    pub fn back_target(self) -> View {
        match self {
            View::Landing => View::Landing,
            View::Auth => View::Landing,
            View::AgeVerification => View::Landing,
            View::ProfileSelection => View::ProfileSelection,
            View::ProfileDetail => View::ProfileSelection,
            View::Chat => View::ProfileSelection,
            View::Subscription => View::ProfileSelection,
            View::Account => View::ProfileSelection,
            View::AdminPanel => View::Account,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overlay {
    NameEntry,
    CreditPurchase,
}

/// Overlays currently layered over the view.
pub type Overlays = BTreeSet<Overlay>;

/// Explicit user actions that move between views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavAction {
    GetStarted,
    ContinueToAgeCheck,
    ConfirmAge,
    DeclineAge,
    OpenProfile,
    StartChat,
    OpenSubscription,
    OpenAccount,
    OpenAdmin,
    Back,
}

/// Callbacks from the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    #[error("Action {action:?} is not available from {from:?}")]
    InvalidTransition { from: View, action: NavAction },

    #[error("Admin panel requires the admin role")]
    NotAdmin,
}

/// Compute the view after `action` on `from`.
pub fn next_view(from: View, action: NavAction, is_admin: bool) -> Result<View, NavError> {
    use NavAction::*;
    use View::*;

    let to = match (from, action) {
        (_, Back) => from.back_target(),
        (Landing, GetStarted) => Auth,
        (Auth, ContinueToAgeCheck) => AgeVerification,
        (AgeVerification, ConfirmAge) => ProfileSelection,
        (AgeVerification, DeclineAge) => Landing,
        (ProfileSelection, OpenProfile) | (Chat, OpenProfile) => ProfileDetail,
        (ProfileDetail, StartChat) | (ProfileSelection, StartChat) => Chat,
        (ProfileSelection | ProfileDetail | Chat | Account, OpenSubscription) => Subscription,
        (ProfileSelection | Chat | Subscription, OpenAccount) => Account,
        (Account, OpenAdmin) => {
            if !is_admin {
                return Err(NavError::NotAdmin);
            }
            AdminPanel
        }
        _ => return Err(NavError::InvalidTransition { from, action }),
    };
    Ok(to)
}

/// View forced by an identity callback, regardless of the current view.
pub fn on_auth_event(event: AuthEvent) -> View {
    match event {
        AuthEvent::SignedIn => View::ProfileSelection,
        AuthEvent::SignedOut => View::Landing,
    }
}
