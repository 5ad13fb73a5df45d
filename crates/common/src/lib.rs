use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Header carrying the caller's API key on protected routes.
pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineStatus {
    Active,
    Free,
    Unknown,
}

impl MachineStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineStatus::Active => "active",
            MachineStatus::Free => "free",
            MachineStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid status '{}', expected active, free or unknown", self.0)
    }
}

impl std::error::Error for InvalidStatus {}

impl FromStr for MachineStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MachineStatus::Active),
            "free" => Ok(MachineStatus::Free),
            "unknown" => Ok(MachineStatus::Unknown),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// Latest known status of one machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: MachineStatus,
    /// Unix epoch seconds.
    pub timestamp: i64,
}

pub type StatusMap = HashMap<String, StatusEntry>;

// `status` stays a plain string so the daemon can answer unknown values itself.
// `machineId` and `device_id` name the same field; a body may carry only one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetStatusRequest {
    #[serde(rename = "machineId", alias = "device_id")]
    pub machine_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub device_id: String,
    pub status: MachineStatus,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_known_statuses() {
        assert_eq!("active".parse::<MachineStatus>(), Ok(MachineStatus::Active));
        assert_eq!("free".parse::<MachineStatus>(), Ok(MachineStatus::Free));
        assert_eq!("unknown".parse::<MachineStatus>(), Ok(MachineStatus::Unknown));
        assert!("banana".parse::<MachineStatus>().is_err());
        assert!("Active".parse::<MachineStatus>().is_err());
        assert!("".parse::<MachineStatus>().is_err());
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&MachineStatus::Free).unwrap();
        assert_eq!(json, "\"free\"");
        assert_eq!(MachineStatus::Active.to_string(), "active");
    }

    #[test]
    fn set_request_uses_camel_case_machine_id() {
        let req: SetStatusRequest =
            serde_json::from_str(r#"{"machineId":"m1","status":"active"}"#).unwrap();
        assert_eq!(req.machine_id, "m1");
        assert_eq!(req.timestamp, None);

        let out = serde_json::to_value(&req).unwrap();
        assert_eq!(out, serde_json::json!({"machineId": "m1", "status": "active"}));
    }

    #[test]
    fn set_request_accepts_legacy_device_id() {
        let req: SetStatusRequest =
            serde_json::from_str(r#"{"device_id":"washer-3","status":"free","timestamp":42}"#)
                .unwrap();
        assert_eq!(req.machine_id, "washer-3");
        assert_eq!(req.timestamp, Some(42));
    }

    #[test]
    fn set_request_rejects_both_id_fields() {
        let res = serde_json::from_str::<SetStatusRequest>(
            r#"{"machineId":"m1","device_id":"m2","status":"free"}"#,
        );
        assert!(res.is_err());
    }
}
