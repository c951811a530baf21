pub mod chain;
pub mod nft;
