/// Exchanges scanned when none are given, as (display name, exchange id)
pub const EXCHANGES: [(&str, &str); 16] = [
    ("Binance", "binanceus"),
    ("OKX", "okx"),
    ("Kucoin", "kucoin"),
    ("Bybit", "bybit"),
    ("Crypto.com", "cryptocom"),
    ("HTX", "huobi"),
    ("Bitget", "bitget"),
    ("BingX", "bingx"),
    ("MEXC", "mexc"),
    ("CoinEx", "coinex"),
    ("BitMart", "bitmart"),
    ("HollaEx", "hollaex"),
    ("Phemex", "phemex"),
    ("GateIO", "gate"),
    ("Ascendex", "ascendex"),
    ("Okcoin", "okcoin"),
];

/// Looks up the display name of an exchange id.
#[must_use]
pub fn exchange_name(id: &str) -> Option<&'static str> {
    EXCHANGES
        .iter()
        .find(|(_, known)| *known == id)
        .map(|(name, _)| *name)
}
