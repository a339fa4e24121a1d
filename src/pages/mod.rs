pub mod asset;
pub mod custody;
pub mod home;
pub mod import_token;

pub use asset::AssetPage;
pub use custody::CustodyPage;
pub use home::HomePage;
pub use import_token::ImportTokenPage;
