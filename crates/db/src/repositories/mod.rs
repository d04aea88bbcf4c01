pub mod account_repo;
pub mod chat_history_repo;
pub mod companion_repo;
pub mod event_repo;
pub mod payment_repo;
pub mod referral_repo;
pub mod session_repo;

pub use account_repo::AccountRepo;
pub use chat_history_repo::ChatHistoryRepo;
pub use companion_repo::CompanionRepo;
pub use event_repo::EventRepo;
pub use payment_repo::PaymentRepo;
pub use referral_repo::ReferralRepo;
pub use session_repo::SessionRepo;
