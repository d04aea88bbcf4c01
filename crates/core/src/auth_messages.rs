//! Fixed, user-facing messages for authentication failures.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Bn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailure {
    InvalidCredentials,
    AccountLocked,
    AccountDisabled,
    EmailInUse,
    WeakPassword,
    SessionExpired,
}

impl AuthFailure {
    /// Machine-readable code carried in API error bodies.
    pub fn code(self) -> &'static str {
        match self {
            AuthFailure::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthFailure::AccountLocked => "ACCOUNT_LOCKED",
            AuthFailure::AccountDisabled => "ACCOUNT_DISABLED",
            AuthFailure::EmailInUse => "EMAIL_IN_USE",
            AuthFailure::WeakPassword => "WEAK_PASSWORD",
            AuthFailure::SessionExpired => "SESSION_EXPIRED",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        [
            AuthFailure::InvalidCredentials,
            AuthFailure::AccountLocked,
            AuthFailure::AccountDisabled,
            AuthFailure::EmailInUse,
            AuthFailure::WeakPassword,
            AuthFailure::SessionExpired,
        ]
        .into_iter()
        .find(|f| f.code() == code)
    }

    pub fn message(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (AuthFailure::InvalidCredentials, Locale::En) => "Incorrect email or password.",
            (AuthFailure::InvalidCredentials, Locale::Bn) => "ইমেইল বা পাসওয়ার্ড ভুল।",
            (AuthFailure::AccountLocked, Locale::En) => {
                "Too many failed attempts. Try again in a few minutes."
            }
            (AuthFailure::AccountLocked, Locale::Bn) => {
                "অনেকবার ভুল চেষ্টা হয়েছে। কয়েক মিনিট পরে আবার চেষ্টা করুন।"
            }
            (AuthFailure::AccountDisabled, Locale::En) => "This account has been disabled.",
            (AuthFailure::AccountDisabled, Locale::Bn) => "এই অ্যাকাউন্টটি নিষ্ক্রিয় করা হয়েছে।",
            (AuthFailure::EmailInUse, Locale::En) => "An account with this email already exists.",
            (AuthFailure::EmailInUse, Locale::Bn) => "এই ইমেইল দিয়ে ইতিমধ্যে একটি অ্যাকাউন্ট আছে।",
            (AuthFailure::WeakPassword, Locale::En) => {
                "Password must be at least 8 characters long."
            }
            (AuthFailure::WeakPassword, Locale::Bn) => {
                "পাসওয়ার্ড কমপক্ষে ৮ অক্ষরের হতে হবে।"
            }
            (AuthFailure::SessionExpired, Locale::En) => {
                "Your session has expired. Please sign in again."
            }
            (AuthFailure::SessionExpired, Locale::Bn) => {
                "আপনার সেশনের মেয়াদ শেষ। আবার সাইন ইন করুন।"
            }
        }
    }
}
