//! Redemption Repositories

mod balances;
mod transactions;

pub(crate) use balances::PgBalancesRepository;
pub(crate) use transactions::PgTransactionsRepository;
