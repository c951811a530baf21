pub use super::nfts::Entity as Nfts;
