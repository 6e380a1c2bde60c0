//! Mock tool-call stage.
//!
//! Recognised tools return canned, randomly-filled records; any other name
//! gets a generic acknowledgement echoing its parameters.  Never fails.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::Rng;
use serde_json::{json, Value};

use crate::stages::stage::{StageError, ToolStage};
use crate::stages::timing::{DelayRange, Jitter, StageTiming};
use crate::stages::types::{ToolCall, ToolResult};

pub const ORDER_STATUSES: [&str; 4] = ["pending", "processing", "shipped", "delivered"];

const MOCK_ACCOUNT_ID: &str = "acc_12345";
const DAY_MS: i64 = 24 * 60 * 60 * 1000;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const APPOINTMENT_ID_LEN: usize = 6;

fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub struct MockTool {
    delay: DelayRange,
    jitter: Arc<Jitter>,
}

impl MockTool {
    pub fn new(timing: &StageTiming, jitter: Arc<Jitter>) -> Self {
        Self {
            delay: timing.tool,
            jitter,
        }
    }

    /// A random instant up to `days` away from now (negative `days` = past).
    fn offset_from_now(&self, days: i64) -> DateTime<Utc> {
        let span = days.abs() * DAY_MS;
        let ms = self.jitter.rng().gen_range(0..span);
        let offset = Duration::milliseconds(ms);
        if days < 0 {
            Utc::now() - offset
        } else {
            Utc::now() + offset
        }
    }

    fn appointment_id(&self) -> String {
        let mut rng = self.jitter.rng();
        let suffix: String = (0..APPOINTMENT_ID_LEN)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect();
        format!("apt_{suffix}")
    }

    fn order_status(&self) -> &'static str {
        ORDER_STATUSES[self.jitter.rng().gen_range(0..ORDER_STATUSES.len())]
    }

    fn run(&self, call: &ToolCall) -> Value {
        match call.name.as_str() {
            "schedule_appointment" => json!({
                "appointmentId": self.appointment_id(),
                "date": iso(self.offset_from_now(7)),
                "status": "confirmed",
            }),
            "check_order_status" => json!({
                "orderId": order_id(call),
                "status": self.order_status(),
                "estimatedDelivery": iso(self.offset_from_now(5)),
            }),
            "get_account_info" => json!({
                "accountId": MOCK_ACCOUNT_ID,
                "status": "active",
                "lastLogin": iso(self.offset_from_now(-7)),
            }),
            other => json!({
                "message": format!("Tool {other} executed successfully"),
                "parameters": Value::Object(call.parameters.clone()),
                "timestamp": iso(Utc::now()),
            }),
        }
    }
}

/// The caller's `orderId`, or `"unknown"` when absent, null or empty.
fn order_id(call: &ToolCall) -> Value {
    match call.parameters.get("orderId") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Value::from("unknown"),
        Some(Value::String(s)) if s.is_empty() => Value::from("unknown"),
        Some(id) => id.clone(),
    }
}

#[async_trait]
impl ToolStage for MockTool {
    async fn call(&self, call: &ToolCall) -> Result<ToolResult, StageError> {
        self.jitter.pause(self.delay).await;
        log::debug!("mock tool: {}", call.name);
        Ok(ToolResult {
            result: self.run(call),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
