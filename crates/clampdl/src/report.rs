//! Per-input results of a `fetch` run.
//!
//! Inputs that fail to parse never reach the pipeline, but still get a line
//! in the output, in the order they were given.

use serde::Serialize;

use clampcore::download::pipeline::DeliverySummary;
use clampcore::download::MediaRequest;

/// One line of `fetch --json` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchReport {
    pub input: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliverySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FetchReport {
    pub fn delivered(input: &str, summary: DeliverySummary, message: String) -> Self {
        Self {
            input: input.to_string(),
            status: "delivered",
            delivery: Some(summary),
            message: Some(message),
        }
    }

    pub fn failed(input: &str, status: &'static str, message: String) -> Self {
        Self {
            input: input.to_string(),
            status,
            delivery: None,
            message: Some(message),
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.status == "delivered"
    }
}

/// Parsed inputs, plus a slot per input for its eventual report.
#[derive(Debug)]
pub struct FetchPlan {
    inputs: Vec<String>,
    slots: Vec<Option<FetchReport>>,
    requests: Vec<MediaRequest>,
    /// Input index of each entry in `requests`
    positions: Vec<usize>,
}

impl FetchPlan {
    /// Parse every input. With `text`, each input is searched for a URL
    /// instead of being taken as one.
    pub fn new(inputs: Vec<String>, text: bool) -> Self {
        let mut slots = Vec::with_capacity(inputs.len());
        let mut requests = Vec::new();
        let mut positions = Vec::new();

        for (index, input) in inputs.iter().enumerate() {
            let parsed = if text {
                MediaRequest::from_text(input)
            } else {
                MediaRequest::parse(input)
            };
            match parsed {
                Ok(request) => {
                    slots.push(None);
                    requests.push(request);
                    positions.push(index);
                }
                Err(e) => {
                    log::warn!("Skipping {:?}: {}", input, e);
                    slots.push(Some(FetchReport::failed(input, "invalid", e.to_string())));
                }
            }
        }

        Self {
            inputs,
            slots,
            requests,
            positions,
        }
    }

    /// Requests to hand to the pipeline. The n-th result belongs to the
    /// n-th request.
    pub fn take_requests(&mut self) -> Vec<MediaRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Input index of every request, in request order.
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn input(&self, index: usize) -> &str {
        &self.inputs[index]
    }

    /// Record the report for the input at `index`.
    pub fn fill(&mut self, index: usize, report: FetchReport) {
        self.slots[index] = Some(report);
    }

    /// Reports in input order. Requests that never got a result are
    /// reported as internal failures.
    pub fn finish(self) -> Vec<FetchReport> {
        let inputs = self.inputs;
        self.slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| FetchReport::failed(&inputs[index], "internal", "no result".to_string()))
            })
            .collect()
    }
}
