/// Domain services orchestrating the credential store, token issuer,
/// mailer and unit of work
pub mod auth;
pub mod platform;
pub mod profile;

pub use auth::AuthService;
pub use platform::PlatformService;
pub use profile::ProfileService;
