use serde::{Deserialize, Serialize};

/// Scheme-specific options carried in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementsExtra {
    #[serde(default)]
    pub sponsored: bool,
}

/// What the merchant asks to be paid. Addresses stay as the merchant wrote
/// them; they are parsed only when compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequirements {
    pub scheme: String,
    pub network: String,
    /// Fungible-asset metadata address.
    pub asset: String,
    pub pay_to: String,
    /// Base-10 `u64`, compared as an exact string.
    pub amount: String,
    #[serde(default)]
    pub sponsored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_timeout_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<RequirementsExtra>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl PaymentRequirements {
    /// Whether the operator covers gas, via either the top-level flag or `extra.sponsored`.
    pub fn is_sponsored(&self) -> bool {
        self.sponsored || self.extra.as_ref().is_some_and(|e| e.sponsored)
    }
}

/// The requirements entry a payer chose, echoed back in the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedRequirements {
    pub scheme: String,
    pub network: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactAptosPayload {
    /// Base64 of the JSON `{transaction, senderAuthenticator}` byte-array pair.
    pub transaction: String,
}

/// Wire-format payment payload sent by the payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub x402_version: u32,
    pub accepted: AcceptedRequirements,
    pub payload: ExactAptosPayload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sponsored_defaults_false() {
        let req: PaymentRequirements = serde_json::from_value(serde_json::json!({
            "scheme": "exact",
            "network": "aptos:2",
            "asset": "0xa",
            "payTo": "0xb0b",
            "amount": "100",
        }))
        .unwrap();
        assert!(!req.is_sponsored());
    }

    #[test]
    fn test_sponsored_from_extra() {
        let req: PaymentRequirements = serde_json::from_value(serde_json::json!({
            "scheme": "exact",
            "network": "aptos:2",
            "asset": "0xa",
            "payTo": "0xb0b",
            "amount": "100",
            "extra": { "sponsored": true },
        }))
        .unwrap();
        assert!(req.is_sponsored());
    }

    #[test]
    fn test_payload_wire_names() {
        let payload: PaymentPayload = serde_json::from_value(serde_json::json!({
            "x402Version": 2,
            "accepted": { "scheme": "exact", "network": "aptos:2", "amount": "1" },
            "payload": { "transaction": "e30=" },
        }))
        .unwrap();
        assert_eq!(payload.accepted.network, "aptos:2");
        assert_eq!(payload.payload.transaction, "e30=");
    }
}
