// Entity Models
//
// The service owns a single entity: Account.

pub mod account;

pub use account::{Account, AccountPatch, NewAccount};
