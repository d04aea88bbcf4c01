//! Event type names. Dot-separated `entity.action`.

pub const ACCOUNT_CREATED: &str = "account.created";
pub const ACCOUNT_APPROVAL_CHANGED: &str = "account.approval_changed";
pub const ACCOUNT_CREDITS_GRANTED: &str = "account.credits_granted";
pub const CONTENT_UNLOCKED: &str = "content.unlocked";
pub const VOICE_REPLY_PURCHASED: &str = "voice.reply_purchased";
pub const PAYMENT_SUBMITTED: &str = "payment.submitted";
pub const PAYMENT_APPROVED: &str = "payment.approved";
pub const PAYMENT_REJECTED: &str = "payment.rejected";
pub const COMPANION_CREATED: &str = "companion.created";
pub const COMPANION_UPDATED: &str = "companion.updated";
pub const COMPANION_DELETED: &str = "companion.deleted";
pub const REFERRAL_CREATED: &str = "referral.created";
pub const REFERRAL_DEACTIVATED: &str = "referral.deactivated";
pub const SUBSCRIPTIONS_EXPIRED: &str = "subscriptions.expired";
