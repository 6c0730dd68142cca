//! Balance ledger boundary
//!
//! The engine never owns balances. Every debit and credit goes through a
//! [`Ledger`]; credits carry a transaction id so a replay is recognised and
//! applied at most once. Credits that fail are parked in the [`Cashier`]
//! queue and retried later instead of being dropped.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{LedgerError, LedgerResult};
use crate::money::Money;

// ═══════════════════════════════════════════════════════════════════════════════
// ACCOUNTS & TRANSACTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Settlement currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Currency {
    Ton,
    Stars,
}

impl Currency {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ton => "TON",
            Self::Stars => "STARS",
        }
    }
}

/// One user's balance in one currency
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    pub user_id: String,
    pub currency: Currency,
}

impl Account {
    pub fn new(user_id: impl Into<String>, currency: Currency) -> Self {
        Self {
            user_id: user_id.into(),
            currency,
        }
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.user_id, self.currency.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Bet,
    LineWin,
    BonusWin,
    BonusBuy,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bet => "bet",
            Self::LineWin => "line_win",
            Self::BonusWin => "bonus_win",
            Self::BonusBuy => "bonus_buy",
        }
    }

    /// Debits carry negative amounts
    pub fn is_debit(&self) -> bool {
        matches!(self, Self::Bet | Self::BonusBuy)
    }
}

/// A signed balance movement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Idempotency key, `"{round_id}:{kind}"`
    pub id: String,
    pub account: Account,
    pub amount: Money,
    pub kind: TransactionKind,
}

impl Transaction {
    /// Transaction for a round; debit kinds are negated
    pub fn for_round(round_id: Uuid, account: &Account, kind: TransactionKind, amount: Money) -> Self {
        let amount = if kind.is_debit() { -amount } else { amount };
        Self {
            id: format!("{}:{}", round_id, kind.as_str()),
            account: account.clone(),
            amount,
            kind,
        }
    }
}

/// Outcome of logging a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Accepted,
    /// Id already seen; nothing applied
    Duplicate,
}

// ═══════════════════════════════════════════════════════════════════════════════
// LEDGER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// External balance store
pub trait Ledger: Send + Sync {
    fn balance(&self, account: &Account) -> LedgerResult<Money>;

    /// Apply a signed delta; returns the new balance
    fn adjust_balance(&self, account: &Account, delta: Money) -> LedgerResult<Money>;

    /// Record a transaction id; a repeated id reports `Duplicate`
    fn log_transaction(&self, tx: &Transaction) -> LedgerResult<TxStatus>;

    /// Apply then log; a duplicate is a no-op.
    ///
    /// The id is only recorded once the balance change went through, so a
    /// failed adjustment leaves the credit retryable. If logging fails or
    /// reports a duplicate, the adjustment is reversed.
    fn post(&self, tx: &Transaction) -> LedgerResult<TxStatus> {
        self.adjust_balance(&tx.account, tx.amount)?;
        match self.log_transaction(tx) {
            Ok(TxStatus::Accepted) => Ok(TxStatus::Accepted),
            Ok(TxStatus::Duplicate) => {
                self.adjust_balance(&tx.account, -tx.amount)?;
                Ok(TxStatus::Duplicate)
            }
            Err(err) => {
                if let Err(undo) = self.adjust_balance(&tx.account, -tx.amount) {
                    log::error!("could not reverse {} after failed log: {}", tx.id, undo);
                }
                Err(err)
            }
        }
    }
}

#[derive(Debug, Default)]
struct Book {
    balances: HashMap<Account, Money>,
    seen: HashSet<String>,
    journal: Vec<Transaction>,
}

/// Process-local ledger used by tests, the simulator and the CLI
#[derive(Debug)]
pub struct InMemoryLedger {
    book: Mutex<Book>,
    available: AtomicBool,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            book: Mutex::new(Book::default()),
            available: AtomicBool::new(true),
        }
    }

    /// Ledger seeded with one funded account
    pub fn with_balance(account: &Account, amount: Money) -> Self {
        let ledger = Self::new();
        ledger.deposit(account, amount);
        ledger
    }

    pub fn deposit(&self, account: &Account, amount: Money) {
        *self.book.lock().balances.entry(account.clone()).or_default() += amount;
    }

    /// Simulate an outage: every call fails with `Unavailable` while false
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Accepted transactions in posting order
    pub fn journal(&self) -> Vec<Transaction> {
        self.book.lock().journal.clone()
    }

    fn check_available(&self) -> LedgerResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(LedgerError::Unavailable("ledger offline".into()))
        }
    }
}

impl Ledger for InMemoryLedger {
    fn balance(&self, account: &Account) -> LedgerResult<Money> {
        self.check_available()?;
        Ok(self
            .book
            .lock()
            .balances
            .get(account)
            .copied()
            .unwrap_or_default())
    }

    fn adjust_balance(&self, account: &Account, delta: Money) -> LedgerResult<Money> {
        self.check_available()?;
        let mut book = self.book.lock();
        let balance = book.balances.entry(account.clone()).or_default();
        let next = *balance + delta;
        if next < Money::ZERO {
            return Err(LedgerError::InsufficientFunds {
                balance: *balance,
                requested: -delta,
            });
        }
        *balance = next;
        Ok(next)
    }

    fn log_transaction(&self, tx: &Transaction) -> LedgerResult<TxStatus> {
        self.check_available()?;
        let mut book = self.book.lock();
        if !book.seen.insert(tx.id.clone()) {
            return Ok(TxStatus::Duplicate);
        }
        book.journal.push(tx.clone());
        Ok(TxStatus::Accepted)
    }

    /// Check, log and apply under one lock
    fn post(&self, tx: &Transaction) -> LedgerResult<TxStatus> {
        self.check_available()?;
        let mut book = self.book.lock();
        if book.seen.contains(&tx.id) {
            return Ok(TxStatus::Duplicate);
        }
        let current = book.balances.get(&tx.account).copied().unwrap_or_default();
        let next = current + tx.amount;
        if next < Money::ZERO {
            return Err(LedgerError::InsufficientFunds {
                balance: current,
                requested: -tx.amount,
            });
        }
        book.balances.insert(tx.account.clone(), next);
        book.seen.insert(tx.id.clone());
        book.journal.push(tx.clone());
        Ok(TxStatus::Accepted)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CASHIER
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of handing a credit to the cashier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    Applied,
    /// Already applied earlier under the same id
    Duplicate,
    /// Ledger failed; parked for retry
    Queued,
}

/// Credit path with a retry queue for failed postings
#[derive(Debug, Default)]
pub struct Cashier {
    pending: VecDeque<Transaction>,
}

impl Cashier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a credit; on failure it is queued, never dropped
    pub fn credit(&mut self, ledger: &dyn Ledger, tx: Transaction) -> CreditStatus {
        match ledger.post(&tx) {
            Ok(TxStatus::Accepted) => CreditStatus::Applied,
            Ok(TxStatus::Duplicate) => CreditStatus::Duplicate,
            Err(err) => {
                log::warn!("credit {} of {} queued: {}", tx.id, tx.amount, err);
                self.pending.push_back(tx);
                CreditStatus::Queued
            }
        }
    }

    /// Retry queued credits in order; stops at the first failure.
    /// Returns how many left the queue. `post` only reports `Duplicate`
    /// for an id whose amount was already applied, so it leaves too.
    pub fn retry_pending(&mut self, ledger: &dyn Ledger) -> usize {
        let mut cleared = 0;
        while let Some(tx) = self.pending.front() {
            match ledger.post(tx) {
                Ok(_) => {
                    self.pending.pop_front();
                    cleared += 1;
                }
                Err(err) => {
                    log::debug!("retry of {} failed: {}", tx.id, err);
                    break;
                }
            }
        }
        if cleared > 0 {
            log::info!("{} queued credits applied, {} pending", cleared, self.pending.len());
        }
        cleared
    }

    pub fn pending(&self) -> impl Iterator<Item = &Transaction> {
        self.pending.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_total(&self) -> Money {
        self.pending.iter().map(|tx| tx.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new("u1", Currency::Ton)
    }

    #[test]
    fn test_transaction_ids_and_signs() {
        let round = Uuid::new_v4();
        let bet = Transaction::for_round(round, &account(), TransactionKind::Bet, Money::from_minor(100));
        assert_eq!(bet.amount, Money::from_minor(-100));
        assert_eq!(bet.id, format!("{round}:bet"));

        let win = Transaction::for_round(round, &account(), TransactionKind::BonusWin, Money::from_minor(40));
        assert_eq!(win.amount, Money::from_minor(40));
        assert_ne!(bet.id, win.id);
    }

    #[test]
    fn test_post_is_idempotent() {
        let ledger = InMemoryLedger::with_balance(&account(), Money::from_minor(500));
        let tx = Transaction::for_round(Uuid::new_v4(), &account(), TransactionKind::LineWin, Money::from_minor(250));

        assert_eq!(ledger.post(&tx), Ok(TxStatus::Accepted));
        assert_eq!(ledger.post(&tx), Ok(TxStatus::Duplicate));
        assert_eq!(ledger.balance(&account()), Ok(Money::from_minor(750)));
        assert_eq!(ledger.journal().len(), 1);
    }

    #[test]
    fn test_post_rejects_overdraft() {
        let ledger = InMemoryLedger::with_balance(&account(), Money::from_minor(50));
        let tx = Transaction::for_round(Uuid::new_v4(), &account(), TransactionKind::Bet, Money::from_minor(100));
        assert!(matches!(ledger.post(&tx), Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(ledger.balance(&account()), Ok(Money::from_minor(50)));
        // a rejected debit does not burn its id
        ledger.deposit(&account(), Money::from_minor(50));
        assert_eq!(ledger.post(&tx), Ok(TxStatus::Accepted));
    }

    #[test]
    fn test_currencies_are_separate() {
        let ton = account();
        let stars = Account::new("u1", Currency::Stars);
        let ledger = InMemoryLedger::with_balance(&ton, Money::from_minor(100));
        assert_eq!(ledger.balance(&stars), Ok(Money::ZERO));
        assert_eq!(stars.to_string(), "u1/STARS");
    }

    #[test]
    fn test_cashier_queues_and_retries() {
        let ledger = InMemoryLedger::with_balance(&account(), Money::ZERO);
        let mut cashier = Cashier::new();
        let tx = Transaction::for_round(Uuid::new_v4(), &account(), TransactionKind::BonusWin, Money::from_minor(900));

        ledger.set_available(false);
        assert_eq!(cashier.credit(&ledger, tx.clone()), CreditStatus::Queued);
        assert_eq!(cashier.retry_pending(&ledger), 0);
        assert_eq!(cashier.pending_total(), Money::from_minor(900));

        ledger.set_available(true);
        assert_eq!(cashier.retry_pending(&ledger), 1);
        assert_eq!(cashier.pending_count(), 0);
        assert_eq!(ledger.balance(&account()), Ok(Money::from_minor(900)));

        // replaying the same credit is recognised
        assert_eq!(cashier.credit(&ledger, tx), CreditStatus::Duplicate);
        assert_eq!(ledger.balance(&account()), Ok(Money::from_minor(900)));
    }

    /// Ledger relying on the default `post`; the first credit adjustment fails
    #[derive(Default)]
    struct RemoteLedger {
        balance: Mutex<Money>,
        seen: Mutex<HashSet<String>>,
        credit_failed: AtomicBool,
    }

    impl Ledger for RemoteLedger {
        fn balance(&self, _account: &Account) -> LedgerResult<Money> {
            Ok(*self.balance.lock())
        }

        fn adjust_balance(&self, _account: &Account, delta: Money) -> LedgerResult<Money> {
            if delta.is_positive() && !self.credit_failed.swap(true, Ordering::SeqCst) {
                return Err(LedgerError::Unavailable("timeout".into()));
            }
            let mut balance = self.balance.lock();
            *balance += delta;
            Ok(*balance)
        }

        fn log_transaction(&self, tx: &Transaction) -> LedgerResult<TxStatus> {
            if self.seen.lock().insert(tx.id.clone()) {
                Ok(TxStatus::Accepted)
            } else {
                Ok(TxStatus::Duplicate)
            }
        }
    }

    #[test]
    fn test_default_post_keeps_failed_credit_retryable() {
        let ledger = RemoteLedger::default();
        let mut cashier = Cashier::new();
        let tx = Transaction::for_round(Uuid::new_v4(), &account(), TransactionKind::LineWin, Money::from_minor(900));

        assert_eq!(cashier.credit(&ledger, tx.clone()), CreditStatus::Queued);
        assert_eq!(ledger.balance(&account()), Ok(Money::ZERO));

        assert_eq!(cashier.retry_pending(&ledger), 1);
        assert_eq!(cashier.pending_count(), 0);
        assert_eq!(ledger.balance(&account()), Ok(Money::from_minor(900)));

        assert_eq!(cashier.credit(&ledger, tx), CreditStatus::Duplicate);
        assert_eq!(ledger.balance(&account()), Ok(Money::from_minor(900)));
    }

    #[test]
    fn test_default_post_reverses_duplicate() {
        let ledger = RemoteLedger::default();
        ledger.credit_failed.store(true, Ordering::SeqCst);
        let tx = Transaction::for_round(Uuid::new_v4(), &account(), TransactionKind::BonusWin, Money::from_minor(300));

        assert_eq!(ledger.post(&tx), Ok(TxStatus::Accepted));
        assert_eq!(ledger.post(&tx), Ok(TxStatus::Duplicate));
        assert_eq!(ledger.balance(&account()), Ok(Money::from_minor(300)));
    }
}
