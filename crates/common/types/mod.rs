mod action;
mod balance;
mod genesis;
mod ledger_update;
mod token;
mod vault;
mod withdraw;

pub use action::*;
pub use balance::*;
pub use genesis::*;
pub use ledger_update::*;
pub use token::*;
pub use vault::*;
pub use withdraw::*;
