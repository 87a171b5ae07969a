//! The saved ticker list, kept in a session store as comma-separated text.

use crate::store::{SessionStore, StoreError};
use crate::ticker::{canonical_code, parse_tickers};

/// Session key holding the watchlist.
pub const WATCHLIST_KEY: &str = "saved_tickers";

/// Watchlist used when nothing has been saved yet.
pub const DEFAULT_WATCHLIST: &str = "005930, 000660, 035720, 042700";

/// Current watchlist, falling back to the default when unset.
pub fn load_watchlist(store: &dyn SessionStore) -> Vec<String> {
    let raw = store
        .get(WATCHLIST_KEY)
        .unwrap_or_else(|| DEFAULT_WATCHLIST.to_string());
    parse_tickers(&raw)
}

/// Replace the watchlist. Input is normalized before it is stored.
pub fn save_watchlist(store: &mut dyn SessionStore, tickers: &[String]) -> Result<(), StoreError> {
    let joined = parse_tickers(&tickers.join(",")).join(", ");
    store.set(WATCHLIST_KEY, &joined)
}

/// Append a ticker unless already present. Returns whether it was added.
pub fn add_ticker(store: &mut dyn SessionStore, ticker: &str) -> Result<bool, StoreError> {
    let code = canonical_code(ticker);
    let mut list = load_watchlist(store);
    if code.is_empty() || list.contains(&code) {
        return Ok(false);
    }
    list.push(code);
    save_watchlist(store, &list)?;
    Ok(true)
}

/// Remove a ticker. Returns whether it was present.
pub fn remove_ticker(store: &mut dyn SessionStore, ticker: &str) -> Result<bool, StoreError> {
    let code = canonical_code(ticker);
    let mut list = load_watchlist(store);
    let before = list.len();
    list.retain(|t| *t != code);
    if list.len() == before {
        return Ok(false);
    }
    save_watchlist(store, &list)?;
    Ok(true)
}
