//! Structural validation for candidate event batches.
//!
//! Pure and store-free: the validator inspects raw JSON so it can tell a
//! missing key apart from an explicit null, collects every violation in the
//! batch rather than bailing on the first, and tallies actions for the
//! operator summary.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::events::REQUIRED_FIELDS;

/// How strict the shape check is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    /// Authored ingest files: every required key must be spelled out and
    /// `event_order` must be an integer.
    Authored,
    /// Runtime submissions: keys may be omitted and `event_order` is
    /// ignored (the allocator assigns one).
    Runtime,
}

/// A single structural problem with a candidate batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    MissingField { index: usize, field: &'static str },
    WrongType {
        index: usize,
        field: &'static str,
        expected: &'static str,
    },
    DuplicateOrder { index: usize, order: i64 },
}

impl Violation {
    /// Stable machine-readable discriminator, mirrored in the serde tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Violation::MissingField { .. } => "missing_field",
            Violation::WrongType { .. } => "wrong_type",
            Violation::DuplicateOrder { .. } => "duplicate_order",
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingField { index, field } => {
                write!(f, "event[{index}]: missing key '{field}'")
            }
            Violation::WrongType { index, field, expected } => {
                write!(f, "event[{index}]: '{field}' must be {expected}")
            }
            Violation::DuplicateOrder { index, order } => {
                write!(f, "event[{index}]: duplicate event_order {order}")
            }
        }
    }
}

/// Aggregate result of validating one batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub violations: Vec<Violation>,
    /// Events seen per `action` value, for the operator summary.
    pub action_counts: BTreeMap<String, usize>,
    pub event_count: usize,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            write!(f, "{} events ok", self.event_count)
        } else {
            let lines: Vec<String> = self.violations.iter().map(|v| v.to_string()).collect();
            write!(f, "{}", lines.join("; "))
        }
    }
}

/// Validate a candidate batch of raw JSON events.
///
/// Never touches the store; intra-batch `event_order` uniqueness is checked
/// here, cross-batch uniqueness is the store's unique index.
pub fn validate_batch(batch: &[Value], strictness: Strictness) -> ValidationReport {
    let mut report = ValidationReport {
        event_count: batch.len(),
        ..Default::default()
    };
    // first index at which each authored order appeared
    let mut seen_orders: HashMap<i64, usize> = HashMap::new();

    for (index, raw) in batch.iter().enumerate() {
        let Some(obj) = raw.as_object() else {
            report.violations.push(Violation::WrongType {
                index,
                field: "event",
                expected: "a JSON object",
            });
            continue;
        };

        if strictness == Strictness::Authored {
            for field in REQUIRED_FIELDS {
                if !obj.contains_key(field) {
                    report.violations.push(Violation::MissingField { index, field });
                }
            }
        }

        // `action` is opaque to the pipeline but must be a string: it is the
        // only NOT NULL text column and the key every consumer switches on.
        match obj.get("action") {
            Some(Value::String(action)) => {
                *report.action_counts.entry(action.clone()).or_default() += 1;
            }
            Some(_) => {
                report.violations.push(Violation::WrongType {
                    index,
                    field: "action",
                    expected: "a string",
                });
            }
            None if strictness == Strictness::Runtime => {
                report.violations.push(Violation::MissingField { index, field: "action" });
            }
            None => {} // missing key already reported above in Authored mode
        }

        // A null order means "allocate for me" in either mode; intra-batch
        // uniqueness only matters where authored orders are honored.
        match obj.get("event_order") {
            Some(Value::Number(n)) if n.is_i64() => {
                let order = n.as_i64().unwrap();
                if strictness == Strictness::Authored {
                    if seen_orders.contains_key(&order) {
                        report.violations.push(Violation::DuplicateOrder { index, order });
                    } else {
                        seen_orders.insert(order, index);
                    }
                }
            }
            Some(Value::Null) | None => {} // missing key already reported above
            Some(_) => {
                report.violations.push(Violation::WrongType {
                    index,
                    field: "event_order",
                    expected: "an integer or null",
                });
            }
        }

        match obj.get("delay") {
            Some(Value::Number(n)) if n.is_i64() && n.as_i64().unwrap() >= 0 => {}
            None => {} // missing key already reported above; runtime defaults to 0
            Some(_) => {
                report.violations.push(Violation::WrongType {
                    index,
                    field: "delay",
                    expected: "a non-negative integer",
                });
            }
        }

        match obj.get("misc_data") {
            // Null means "no metadata"; anything else must be an object.
            Some(Value::Object(_)) | Some(Value::Null) | None => {}
            Some(_) => {
                report.violations.push(Violation::WrongType {
                    index,
                    field: "misc_data",
                    expected: "a JSON object",
                });
            }
        }
    }

    report
}
