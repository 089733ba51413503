use std::fmt;
use std::str::FromStr;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderSide {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(OrderSide::Buy),
            "sell" => Ok(OrderSide::Sell),
            other => Err(format!("unknown order side '{}', expected buy or sell", other)),
        }
    }
}

/// Market order placed through `/api/trade/place`.
#[derive(Debug, Clone, Serialize)]
pub struct OrderRequest {
    pub symbol: String,
    #[serde(rename = "type")]
    pub side: OrderSide,
    pub qty: u32,
    pub price: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopLossRequest {
    pub symbol: String,
    pub stop_loss_price: f64,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopLossUpdate {
    pub stop_loss_price: f64,
    pub quantity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_side_from_str() {
        assert_eq!("buy".parse::<OrderSide>().unwrap(), OrderSide::Buy);
        assert_eq!(" SELL ".parse::<OrderSide>().unwrap(), OrderSide::Sell);
        assert!("hold".parse::<OrderSide>().is_err());
    }

    #[test]
    fn test_order_body_uses_type_field() {
        let order = OrderRequest {
            symbol: "TCS".to_string(),
            side: OrderSide::Sell,
            qty: 5,
            price: 3520.5,
        };
        assert_eq!(
            serde_json::to_value(&order).unwrap(),
            json!({"symbol": "TCS", "type": "sell", "qty": 5, "price": 3520.5})
        );
    }

    #[test]
    fn test_stop_loss_field_names() {
        let body = StopLossRequest {
            symbol: "INFY".to_string(),
            stop_loss_price: 1400.0,
            quantity: 10,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"symbol": "INFY", "stopLossPrice": 1400.0, "quantity": 10})
        );
    }
}
