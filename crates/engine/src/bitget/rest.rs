use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use base64::Engine as _;
use chrono::DateTime;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use sha2::Sha256;
use tracing::debug;

use common::{
    AssetBalance, Candle, Error, ExchangeGateway, Market, OrderAck, OrderRequest,
    PositionSide, PositionSnapshot, Result,
};

const BASE_URL: &str = "https://api.bitget.com";
const PRODUCT_TYPE: &str = "USDT-FUTURES";
const MARGIN_COIN: &str = "USDT";

/// REST API client for Bitget USDT-margined perpetuals (v2 mix API).
pub struct BitgetClient {
    api_key: String,
    secret: String,
    passphrase: String,
    http: Client,
}

impl BitgetClient {
    pub fn new(
        api_key: impl Into<String>,
        secret: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
            passphrase: passphrase.into(),
            http: Client::builder()
                .use_rustls_tls()
                .build()
                .expect("Failed to build HTTP client"),
        }
    }

    fn timestamp_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_millis() as u64
    }

    /// Bitget signs `timestamp + METHOD + path(+query) + body` and
    /// base64-encodes the HMAC-SHA256 digest.
    fn sign(&self, prehash: &str) -> String {
        type HmacSha256 = Hmac<Sha256>;
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(prehash.as_bytes());
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }

    async fn public_get(&self, path_and_query: &str) -> Result<String> {
        let url = format!("{BASE_URL}{path_and_query}");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Exchange(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }

    async fn signed_get(&self, path_and_query: &str) -> Result<String> {
        let ts = Self::timestamp_ms();
        let prehash = format!("{ts}GET{path_and_query}");
        let signature = self.sign(&prehash);
        let url = format!("{BASE_URL}{path_and_query}");

        let resp = self
            .http
            .get(&url)
            .header("ACCESS-KEY", &self.api_key)
            .header("ACCESS-SIGN", signature)
            .header("ACCESS-TIMESTAMP", ts.to_string())
            .header("ACCESS-PASSPHRASE", &self.passphrase)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Exchange(format!("HTTP {status}: {body}")));
        }
        Ok(body)
    }

    async fn signed_post(&self, path: &str, body: String) -> Result<String> {
        let ts = Self::timestamp_ms();
        let prehash = format!("{ts}POST{path}{body}");
        let signature = self.sign(&prehash);
        let url = format!("{BASE_URL}{path}");

        let resp = self
            .http
            .post(&url)
            .header("ACCESS-KEY", &self.api_key)
            .header("ACCESS-SIGN", signature)
            .header("ACCESS-TIMESTAMP", ts.to_string())
            .header("ACCESS-PASSPHRASE", &self.passphrase)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| Error::Http(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Exchange(format!("HTTP {status}: {text}")));
        }
        Ok(text)
    }

    /// Unwrap the `{code, msg, data}` envelope every v2 endpoint uses.
    fn unwrap_data<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
        let resp: ApiResponse<T> =
            serde_json::from_str(body).map_err(|e| Error::Exchange(e.to_string()))?;
        if resp.code != "00000" {
            return Err(Error::Exchange(format!("{}: {}", resp.code, resp.msg)));
        }
        Ok(resp.data)
    }
}

fn parse_f64(raw: &str, field: &str) -> Result<f64> {
    raw.parse::<f64>()
        .map_err(|_| Error::Exchange(format!("non-numeric {field}: '{raw}'")))
}

#[async_trait]
impl ExchangeGateway for BitgetClient {
    async fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let body = self
            .public_get(&format!(
                "/api/v2/mix/market/candles?symbol={symbol}&productType={PRODUCT_TYPE}\
                 &granularity={timeframe}&limit={limit}"
            ))
            .await?;

        // Rows arrive oldest-first: [ts, open, high, low, close, baseVol, quoteVol]
        let rows: Vec<Vec<String>> = Self::unwrap_data(&body)?;
        let mut candles = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() < 6 {
                return Err(Error::Exchange(format!("short candle row: {row:?}")));
            }
            let ts_ms = row[0]
                .parse::<i64>()
                .map_err(|_| Error::Exchange(format!("non-numeric timestamp: '{}'", row[0])))?;
            let timestamp = DateTime::from_timestamp_millis(ts_ms)
                .ok_or_else(|| Error::Exchange(format!("timestamp out of range: {ts_ms}")))?;
            candles.push(Candle {
                timestamp,
                open: parse_f64(&row[1], "open")?,
                high: parse_f64(&row[2], "high")?,
                low: parse_f64(&row[3], "low")?,
                close: parse_f64(&row[4], "close")?,
                volume: parse_f64(&row[5], "volume")?,
            });
        }
        Ok(candles)
    }

    async fn fetch_positions(&self, symbol: &str) -> Result<Vec<PositionSnapshot>> {
        let body = self
            .signed_get(&format!(
                "/api/v2/mix/position/single-position?symbol={symbol}\
                 &productType={PRODUCT_TYPE}&marginCoin={MARGIN_COIN}"
            ))
            .await?;

        let rows: Vec<PositionData> = Self::unwrap_data(&body)?;
        let mut positions = Vec::with_capacity(rows.len());
        for row in rows {
            let side = match row.hold_side.as_str() {
                "long" => PositionSide::Long,
                "short" => PositionSide::Short,
                _ => PositionSide::Flat,
            };
            positions.push(PositionSnapshot {
                symbol: row.symbol,
                side,
                contracts: parse_f64(&row.total, "position total")?,
            });
        }
        Ok(positions)
    }

    async fn fetch_balance(&self) -> Result<HashMap<String, AssetBalance>> {
        let body = self
            .signed_get(&format!("/api/v2/mix/account/accounts?productType={PRODUCT_TYPE}"))
            .await?;

        let rows: Vec<AccountData> = Self::unwrap_data(&body)?;
        let mut balances = HashMap::with_capacity(rows.len());
        for row in rows {
            balances.insert(
                row.margin_coin,
                AssetBalance {
                    free: parse_f64(&row.available, "available balance")?,
                    total: parse_f64(&row.account_equity, "account equity")?,
                },
            );
        }
        Ok(balances)
    }

    async fn set_leverage(&self, leverage: u32, symbol: &str) -> Result<()> {
        let body = serde_json::json!({
            "symbol": symbol,
            "productType": PRODUCT_TYPE,
            "marginCoin": MARGIN_COIN,
            "leverage": leverage.to_string(),
        })
        .to_string();

        debug!(pair = %symbol, leverage = leverage, "Setting leverage");
        let text = self
            .signed_post("/api/v2/mix/account/set-leverage", body)
            .await?;
        Self::unwrap_data::<serde_json::Value>(&text)?;
        Ok(())
    }

    async fn load_markets(&self) -> Result<HashMap<String, Market>> {
        let body = self
            .public_get(&format!("/api/v2/mix/market/contracts?productType={PRODUCT_TYPE}"))
            .await?;

        let rows: Vec<ContractData> = Self::unwrap_data(&body)?;
        let mut markets = HashMap::with_capacity(rows.len());
        for row in rows {
            let contract_size = parse_f64(&row.size_multiplier, "sizeMultiplier")?;
            markets.insert(
                row.symbol.clone(),
                Market {
                    symbol: row.symbol,
                    contract_size,
                },
            );
        }
        Ok(markets)
    }

    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderAck> {
        let mut payload = serde_json::json!({
            "symbol": order.symbol,
            "productType": PRODUCT_TYPE,
            "marginCoin": MARGIN_COIN,
            "marginMode": "crossed",
            "side": order.side.to_string(),
            "orderType": "market",
            "size": order.contracts.to_string(),
            "clientOid": order.client_order_id,
        });
        if let Some(tp) = order.take_profit {
            payload["presetStopSurplusPrice"] = serde_json::Value::String(tp.to_string());
        }

        debug!(pair = %order.symbol, side = %order.side, size = order.contracts, "Submitting order to Bitget");
        let text = self
            .signed_post("/api/v2/mix/order/place-order", payload.to_string())
            .await?;

        let data: OrderData = Self::unwrap_data(&text)?;
        Ok(OrderAck {
            order_id: data.order_id,
            client_order_id: data.client_oid,
        })
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ApiResponse<T> {
    code: String,
    msg: String,
    data: T,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PositionData {
    symbol: String,
    hold_side: String,
    total: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountData {
    margin_coin: String,
    available: String,
    account_equity: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContractData {
    symbol: String,
    size_multiplier: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderData {
    order_id: String,
    client_oid: String,
}
