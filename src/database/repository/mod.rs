//! Cache-first repositories over the MongoDB collections.

mod accounts;
mod settings;
mod users;

pub use accounts::AccountRepository;
pub use settings::SettingsRepository;
pub use users::UserRepository;
