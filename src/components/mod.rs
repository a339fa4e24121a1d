pub mod asset_list;
pub mod balance_overview;
pub mod detected_tokens;
pub mod import_token_link;
pub mod popover;
pub mod token_list;
pub mod token_list_placeholder;

pub use asset_list::AssetList;
pub use popover::{Popover, PopoverLayer, PopoverPortal};
pub use token_list::TokenListItem;
pub use token_list_placeholder::TokenListPlaceholder;
