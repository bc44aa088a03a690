//! LBank response parsing
//!
//! Depth: GET /v1/depth.do?symbol=btc_usdt&size=20
//! Symbols: GET /v1/currencyPairs.do
//!
//! LBank responses come in two shapes: a bare depth object, or a wrapper with
//! a "result" flag and the depth under "data". Numeric fields may arrive as
//! JSON numbers or strings. Both variants are handled here.

use serde::Deserialize;
use std::collections::HashSet;

/// A price or quantity that may arrive as a number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Num(f64),
    Text(String),
}

impl RawNumber {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawNumber::Num(n) => Some(*n),
            RawNumber::Text(s) => s.parse().ok(),
        }
    }

    /// String form used for empirical precision counting.
    pub fn as_display_string(&self) -> String {
        match self {
            RawNumber::Num(n) => format!("{}", n),
            RawNumber::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LbankDepthData {
    #[serde(default)]
    pub bids: Vec<[RawNumber; 2]>,
    #[serde(default)]
    pub asks: Vec<[RawNumber; 2]>,
}

/// Either `{"result":"true","data":{...}}` or a bare `{"bids":..,"asks":..}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LbankDepthResponse {
    Wrapped {
        result: String,
        #[serde(default)]
        data: Option<LbankDepthData>,
    },
    Bare(LbankDepthData),
}

impl LbankDepthResponse {
    /// Unwrap the depth payload, treating `result != "true"` as an API error
    /// carrying the raw flag.
    pub fn into_data(self) -> Result<LbankDepthData, String> {
        match self {
            LbankDepthResponse::Wrapped { result, data } => {
                if result != "true" {
                    return Err(format!("result = {:?}", result));
                }
                data.ok_or_else(|| "missing data field".to_string())
            }
            LbankDepthResponse::Bare(data) => Ok(data),
        }
    }
}

/// Currency pair list: either a bare array or wrapped under "data".
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum LbankPairsResponse {
    Bare(Vec<String>),
    Wrapped {
        #[serde(default)]
        data: Vec<String>,
    },
}

/// Extract USDT pairs in canonical form ("btc_usdt" -> "BTC/USDT").
pub fn parse_symbols(response: LbankPairsResponse) -> HashSet<String> {
    let pairs = match response {
        LbankPairsResponse::Bare(pairs) => pairs,
        LbankPairsResponse::Wrapped { data } => data,
    };

    pairs
        .into_iter()
        .filter(|p| p.to_lowercase().ends_with("_usdt"))
        .filter_map(|p| {
            let upper = p.to_uppercase();
            match upper.split('_').collect::<Vec<_>>().as_slice() {
                [base, quote] if !base.is_empty() => Some(format!("{}/{}", base, quote)),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_depth_deserialize() {
        let json = r#"{
            "result": "true",
            "data": {
                "bids": [[100.5, 2.0], ["100.4", "1.5"]],
                "asks": [["100.6", 3.0]]
            }
        }"#;
        let response: LbankDepthResponse = serde_json::from_str(json).unwrap();
        let data = response.into_data().unwrap();
        assert_eq!(data.bids.len(), 2);
        assert_eq!(data.bids[0][0].as_f64(), Some(100.5));
        assert_eq!(data.bids[1][1].as_f64(), Some(1.5));
    }

    #[test]
    fn test_bare_depth_deserialize() {
        let json = r#"{"bids": [["100.5", "2"]], "asks": [["100.6", "3"]]}"#;
        let response: LbankDepthResponse = serde_json::from_str(json).unwrap();
        let data = response.into_data().unwrap();
        assert_eq!(data.asks[0][0].as_f64(), Some(100.6));
    }

    #[test]
    fn test_error_result_rejected() {
        let json = r#"{"result": "false", "error_code": 10020}"#;
        let response: LbankDepthResponse = serde_json::from_str(json).unwrap();
        assert!(response.into_data().is_err());
    }

    #[test]
    fn test_raw_number_display_string() {
        assert_eq!(RawNumber::Num(100.5).as_display_string(), "100.5");
        assert_eq!(
            RawNumber::Text("0.00012300".to_string()).as_display_string(),
            "0.00012300"
        );
    }

    #[test]
    fn test_parse_symbols_both_shapes() {
        let bare: LbankPairsResponse =
            serde_json::from_str(r#"["btc_usdt", "eth_usdt", "btc_eth"]"#).unwrap();
        let symbols = parse_symbols(bare);
        assert!(symbols.contains("BTC/USDT"));
        assert!(symbols.contains("ETH/USDT"));
        assert_eq!(symbols.len(), 2);

        let wrapped: LbankPairsResponse =
            serde_json::from_str(r#"{"data": ["sol_usdt"]}"#).unwrap();
        assert!(parse_symbols(wrapped).contains("SOL/USDT"));
    }
}
