//! Task expander use case
//!
//! Joins every order with the machines capable of producing its subseries
//! and emits one candidate task per eligible (order, machine, IML) triple.
//! Orders without an eligible machine are dropped with a feedback entry;
//! information about applied defaults rides along on the candidates so it
//! surfaces on the planning board.

use chrono::TimeDelta;

use crate::domain::entities::{CandidateTask, MachineCapability, Order};
use crate::domain::value_objects::RunClock;
use crate::infrastructure::logging::RunLog;

/// Expands orders into candidate tasks
pub struct TaskExpander {
    clock: RunClock,
}

impl TaskExpander {
    pub fn new(clock: RunClock) -> Self {
        Self { clock }
    }

    /// One order expands to zero (rejected) or many candidates.
    pub fn expand(
        &self,
        orders: &[Order],
        capabilities: &[MachineCapability],
        log: &mut RunLog,
    ) -> Vec<CandidateTask> {
        log.push_context("Splitting Orders Into Tasks");
        log.info("Started looking up every possible machine for an order");

        let mut candidates = Vec::new();
        for order in orders {
            log.scoped(
                &format!("Processing order for subserie ID: {}", order.subseries),
                |log| {
                    self.expand_order(order, capabilities, &mut candidates, log);
                },
            );
        }

        log.info("Finished looping through all of the orders");
        log.pop_context();
        candidates
    }

    fn expand_order(
        &self,
        order: &Order,
        capabilities: &[MachineCapability],
        candidates: &mut Vec<CandidateTask>,
        log: &mut RunLog,
    ) {
        let capable: Vec<&MachineCapability> = capabilities
            .iter()
            .filter(|cap| cap.subseries == order.subseries)
            .collect();
        if capable.is_empty() {
            log.info(format!(
                "No machines capable of making subserie with ID: {}",
                order.subseries
            ));
            log.feedback(format!(
                "No machines capable of making subserie with ID: {}",
                order.subseries
            ));
            return;
        }

        let iml_machines_exist = capable.iter().any(|cap| cap.iml_capable);
        if order.iml_requested && !iml_machines_exist {
            log.info(format!(
                "IML was requested however no machines are capable of making subserie with ID: {} with an IML",
                order.subseries
            ));
            log.feedback(format!(
                "IML was requested however no machines are capable of making subserie with ID: {} with an IML",
                order.subseries
            ));
            return;
        }

        let eligible: Vec<&&MachineCapability> = if order.iml_requested {
            log.info("IML was requested, keeping only machines that support it");
            capable.iter().filter(|cap| cap.iml_capable).collect()
        } else {
            capable.iter().collect()
        };

        for capability in eligible {
            candidates.push(self.build_candidate(order, capability, &capable, log));
        }
    }

    fn build_candidate(
        &self,
        order: &Order,
        capability: &MachineCapability,
        capable: &[&MachineCapability],
        log: &mut RunLog,
    ) -> CandidateTask {
        let duration = capability.production_seconds(order.quantity);
        let (_, default_cavity) = capability.effective_cavity();
        let (_, default_cycle) = capability.effective_cycle_avg();

        let mut messages: Vec<String> = Vec::new();
        let earliest_finish = self.clock.now() + TimeDelta::seconds(duration);
        if order.due_date < earliest_finish {
            messages.push(format!(
                "Due date {} cannot be met, scheduler will prioritize this task",
                order.due_date.format("%Y-%m-%d")
            ));
        }
        if default_cycle {
            messages.push("No data... A cycle average of 10 seconds was used...".to_string());
        }
        if default_cavity && !default_cycle {
            messages.push("No cavity amount... used default cavity amount of 4...".to_string());
        }

        // Cycle data measured without IML on this machine, with a real value.
        let non_iml_data_exists = capable.iter().any(|cap| {
            cap.machine_id == capability.machine_id
                && !cap.iml_capable
                && cap.cycle_avg != Some(MachineCapability::DEFAULT_CYCLE_AVG)
        });
        if !order.iml_requested && capability.iml_capable && !non_iml_data_exists {
            messages.push(
                "Production might be faster... no IML requested but the IML cycle average was used, no non-IML data available"
                    .to_string(),
            );
        }
        if default_cycle && order.iml_requested {
            messages.push(format!(
                "No data... for subserie {} on machine {} with IML... 10s used.",
                order.subseries, capability.machine_id
            ));
            if non_iml_data_exists {
                messages.push("However, non-IML data exists for this machine.".to_string());
            }
        }

        let now = self.clock.now();
        let is_past_due = order.due_date <= now;
        let impossible_deadline = !is_past_due && order.due_date <= earliest_finish;

        let task = CandidateTask {
            id: CandidateTask::task_id(
                &order.document_id,
                order.subseries,
                capability.machine_id,
                capability.iml_capable,
            ),
            order_id: order.document_id.clone(),
            document_id: order.document_id.clone(),
            subseries: order.subseries,
            machine_id: capability.machine_id,
            iml: capability.iml_capable,
            duration_seconds: duration,
            due_date: order.due_date,
            is_past_due,
            impossible_deadline,
            priority: order.priority,
            info: messages.join(" "),
            description: order.description.clone(),
            mold_name: order.mold_name.clone(),
            hot_runner: order.hot_runner_label(),
        };
        log.info(format!(
            "Created task {} taking {} seconds",
            task.id, task.duration_seconds
        ));
        task
    }
}
