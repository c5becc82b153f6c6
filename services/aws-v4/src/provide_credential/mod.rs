mod assume_role;
pub use assume_role::AssumeRoleCredentialProvider;

mod default;
pub use default::DefaultCredentialProvider;

mod env;
pub use env::EnvCredentialProvider;

mod profile;
pub(crate) use profile::load_profile_region;
pub use profile::ProfileCredentialProvider;

mod r#static;
pub use r#static::StaticCredentialProvider;

mod utils;
