// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent-facing operations: registration, the can-schedule gate,
//! event ingestion, and command polling.
//!
//! Every operation is idempotent under redelivery: transitions are
//! conditioned on current state, and a losing version-stamped write
//! aborts in favor of the next delivery.

use crate::cloud::CloudAdapter;
use crate::context::Collaborators;
use crate::error::EngineError;
use crate::processors::node::check_free_node;
use fg_core::{
    Fault, JobId, MachineId, Node, NodeMessage, NodeState, NodeTaskState, Os, PoolName,
    ScalesetId, StateUpdateEvent, TaskId, TaskState, WorkerEvent,
};
use fg_storage::{QueueClient, QueueHandle};

/// Outcome of a registration: the fresh node plus everything the agent
/// needs to reach us and its pool queue.
#[derive(Debug, Clone)]
pub struct Registration {
    pub node: Node,
    pub events_url: String,
    pub commands_url: String,
    pub work_queue: QueueHandle,
}

/// Verdict of the can-schedule gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleDecision {
    /// Take the task; the instance is protected from scale-in.
    Allowed,
    /// The node cannot take work right now.
    Denied(String),
    /// The task no longer exists or is shutting down.
    WorkStopped(String),
}

/// Parameters of a registration request after wire parsing.
#[derive(Debug, Clone)]
pub struct RegisterParams {
    pub machine_id: MachineId,
    pub pool_name: PoolName,
    pub scaleset_id: Option<ScalesetId>,
    pub instance_id: Option<String>,
    pub version: Option<String>,
    pub os: Option<Os>,
}

/// Register (or re-register) a node against its pool.
///
/// An existing record for the machine id is deleted first: the agent
/// restarting from a reimage is a brand new node.
pub async fn register(
    ctx: &Collaborators,
    params: RegisterParams,
) -> Result<Registration, EngineError> {
    let pool = ctx
        .pools()
        .get_by_name(&params.pool_name)
        .await?
        .ok_or_else(|| Fault::unable_to_find(format_args!("pool '{}'", params.pool_name)))?;

    if let Some(os) = params.os {
        if os != pool.os {
            return Err(Fault::invalid_request(format!(
                "os mismatch: pool '{}' is {}, agent reports {}",
                pool.name, pool.os, os
            ))
            .into());
        }
    }

    if let Some(existing) = ctx.nodes().get_by_machine_id(params.machine_id).await? {
        tracing::info!(machine_id = %params.machine_id, "re-registration, deleting old node");
        ctx.nodes().delete(&existing).await?;
    }

    let mut node = Node {
        pool_name: pool.name.clone(),
        machine_id: params.machine_id,
        pool_id: pool.pool_id,
        agent_version: params.version.unwrap_or_else(|| "1.0.0".to_string()),
        os: pool.os,
        state: NodeState::Init,
        scaleset_id: params.scaleset_id,
        instance_id: params.instance_id,
        heartbeat: None,
        initialized_at: None,
        managed: pool.managed,
        reimage_requested: false,
        delete_requested: false,
        debug_keep_node: false,
        version: 0,
    };
    ctx.nodes().insert(&mut node).await?;

    let work_queue =
        ctx.queues.grant_consumer(&pool.queue_name(), ctx.config.queue_credential).await?;

    let base = ctx.config.base_url.trim_end_matches('/');
    Ok(Registration {
        node,
        events_url: format!("{}/agents/events", base),
        commands_url: format!("{}/agents/commands", base),
        work_queue,
    })
}

/// The can-schedule gate, consulted by an agent before it starts a
/// popped work unit.
pub async fn can_schedule(
    ctx: &Collaborators,
    machine_id: MachineId,
    job_id: JobId,
    task_id: TaskId,
) -> Result<ScheduleDecision, EngineError> {
    let task = ctx.tasks().get(job_id, task_id).await?;
    match task {
        None => return Ok(ScheduleDecision::WorkStopped(format!("task {} not found", task_id))),
        Some(task) if task.state.shutting_down() => {
            return Ok(ScheduleDecision::WorkStopped(format!(
                "task {} is {}",
                task_id, task.state
            )));
        }
        Some(_) => {}
    }

    let Some(mut node) = ctx.nodes().get_by_machine_id(machine_id).await? else {
        return Ok(ScheduleDecision::Denied(format!("node {} not found", machine_id)));
    };
    if !node.state.can_process_new_work() {
        return Ok(ScheduleDecision::Denied(format!("node is {}", node.state)));
    }
    if node.reset_requested() {
        return Ok(ScheduleDecision::Denied("node is marked for reset".to_string()));
    }

    // Scaleset nodes must be protected from scale-in before they take
    // work, or the provider may evict them mid-task.
    if let Some(scaleset_id) = node.scaleset_id {
        let instance_id = match resolve_instance_id(ctx, &mut node).await? {
            Some(id) => id,
            None => {
                return Ok(ScheduleDecision::Denied(format!(
                    "no cloud instance for machine {}",
                    machine_id
                )));
            }
        };
        if let Err(err) = ctx.cloud.protect_from_scale_in(scaleset_id, &instance_id).await {
            return Ok(ScheduleDecision::Denied(format!(
                "unable to acquire scale-in protection: {}",
                err
            )));
        }
    }

    Ok(ScheduleDecision::Allowed)
}

/// Look up (and cache on the node) the cloud instance id.
async fn resolve_instance_id(
    ctx: &Collaborators,
    node: &mut Node,
) -> Result<Option<String>, EngineError> {
    if node.instance_id.is_some() {
        return Ok(node.instance_id.clone());
    }
    let Some(scaleset_id) = node.scaleset_id else {
        return Ok(None);
    };
    let instances = ctx.cloud.list_instances(scaleset_id).await?;
    let Some(instance_id) = instances.get(&node.machine_id).cloned() else {
        return Ok(None);
    };
    node.instance_id = Some(instance_id.clone());
    // Cache is best-effort; a losing write just resolves again next time.
    if let Err(err) = ctx.nodes().save(node).await {
        if !err.is_conflict() {
            return Err(err);
        }
    }
    Ok(Some(instance_id))
}

/// Dispatch an agent's node state update.
pub async fn on_state_update(
    ctx: &Collaborators,
    machine_id: MachineId,
    update: StateUpdateEvent,
) -> Result<(), EngineError> {
    let Some(mut node) = ctx.nodes().get_by_machine_id(machine_id).await? else {
        return Err(Fault::unable_to_find(format_args!("node {}", machine_id)).into());
    };

    match update {
        StateUpdateEvent::Init => {
            node.reimage_requested = false;
            if node.initialized_at.is_none() {
                node.initialized_at = Some(ctx.now());
            }
            if node.state == NodeState::Init {
                ctx.nodes().save(&mut node).await?;
            } else {
                ctx.nodes().set_state(&mut node, NodeState::Init).await?;
            }
        }

        StateUpdateEvent::Free => {
            if node.state != NodeState::Free {
                ctx.nodes().set_state(&mut node, NodeState::Free).await?;
            }
            check_free_node(ctx, &mut node).await?;
        }

        StateUpdateEvent::SettingUp { tasks } => {
            for task_ref in &tasks {
                let Some(mut task) = ctx.tasks().get(task_ref.job_id, task_ref.task_id).await?
                else {
                    tracing::warn!(
                        task_id = %task_ref.task_id,
                        "setting_up references unknown task"
                    );
                    continue;
                };
                if !task.state.has_started() {
                    ctx.tasks().set_state(&mut task, TaskState::SettingUp).await?;
                }
                ctx.node_tasks()
                    .upsert(
                        machine_id,
                        task_ref.task_id,
                        task_ref.job_id,
                        NodeTaskState::SettingUp,
                    )
                    .await?;
            }
            ctx.nodes().set_state(&mut node, NodeState::SettingUp).await?;
        }

        StateUpdateEvent::Rebooting => {
            ctx.nodes().set_state(&mut node, NodeState::Rebooting).await?;
        }

        StateUpdateEvent::Ready => {
            ctx.nodes().set_state(&mut node, NodeState::Ready).await?;
        }

        StateUpdateEvent::Busy => {
            ctx.nodes().set_state(&mut node, NodeState::Busy).await?;
        }

        StateUpdateEvent::Done { .. } => {
            let fault = update.fault().unwrap_or_else(|| {
                Fault::task_failed("node reported done before the task completed")
            });
            stop_early_tasks(ctx, &node, fault).await?;
            if !node.debug_keep_node {
                node.reimage_requested = true;
            }
            if node.state == NodeState::Done {
                ctx.nodes().save(&mut node).await?;
            } else {
                ctx.nodes().set_state(&mut node, NodeState::Done).await?;
            }
        }
    }
    Ok(())
}

/// Tasks still attached to a node that went Done exited early; fail
/// them and release the association rows.
async fn stop_early_tasks(
    ctx: &Collaborators,
    node: &Node,
    fault: Fault,
) -> Result<(), EngineError> {
    for row in ctx.node_tasks().get_by_machine(node.machine_id).await? {
        if let Some(mut task) = ctx.tasks().get(row.job_id, row.task_id).await? {
            ctx.tasks().mark_failed(&mut task, fault.clone()).await?;
        }
        if !node.debug_keep_node {
            ctx.node_tasks().delete(&row).await?;
        }
    }
    Ok(())
}

/// Dispatch an agent's worker event for one task.
pub async fn on_worker_event(
    ctx: &Collaborators,
    machine_id: MachineId,
    event: WorkerEvent,
) -> Result<(), EngineError> {
    let Some(mut node) = ctx.nodes().get_by_machine_id(machine_id).await? else {
        return Err(Fault::unable_to_find(format_args!("node {}", machine_id)).into());
    };
    let job_id = event.job_id();
    let task_id = event.task_id();
    let Some(mut task) = ctx.tasks().get(job_id, task_id).await? else {
        return Err(Fault::unable_to_find(format_args!("task {}", task_id)).into());
    };

    match event {
        WorkerEvent::Running(running) => {
            if !task.state.has_started() {
                ctx.tasks().set_state(&mut task, TaskState::Running).await?;
            }
            if node.state != NodeState::Busy {
                ctx.nodes().set_state(&mut node, NodeState::Busy).await?;
            }
            ctx.node_tasks()
                .upsert(machine_id, task_id, job_id, NodeTaskState::Running)
                .await?;
            ctx.task_events().record(task_id, machine_id, WorkerEvent::Running(running)).await?;
        }

        WorkerEvent::Done(mut done) => {
            done.trim_streams();
            if done.exit_status.success {
                if task.config.keep_node_on_completion() {
                    pin_node(ctx, &mut node).await?;
                }
                ctx.tasks().mark_stopping(&mut task).await?;
            } else {
                if task.config.keep_node_on_failure() {
                    pin_node(ctx, &mut node).await?;
                }
                let fault = Fault::new(
                    fg_core::ErrorCode::TaskFailed,
                    vec![
                        format!(
                            "task failed. exit_status: code={:?} signal={:?}",
                            done.exit_status.code, done.exit_status.signal
                        ),
                        done.stdout.clone(),
                        done.stderr.clone(),
                    ],
                );
                ctx.tasks().mark_failed(&mut task, fault).await?;
            }

            if !node.debug_keep_node {
                if let Some(row) = ctx.node_tasks().get(machine_id, task_id).await? {
                    ctx.node_tasks().delete(&row).await?;
                }
            }
            ctx.task_events().record(task_id, machine_id, WorkerEvent::Done(done)).await?;
        }
    }
    Ok(())
}

/// Pin a node for debugging: it skips reimage and release until a user
/// unpins it.
async fn pin_node(ctx: &Collaborators, node: &mut Node) -> Result<(), EngineError> {
    if node.debug_keep_node {
        return Ok(());
    }
    tracing::info!(machine_id = %node.machine_id, "pinning node for debugging");
    node.debug_keep_node = true;
    ctx.nodes().save(node).await
}

/// The oldest pending command for a machine.
pub async fn get_command(
    ctx: &Collaborators,
    machine_id: MachineId,
) -> Result<Option<NodeMessage>, EngineError> {
    ctx.messages().get_pending(machine_id).await
}

/// Consume a delivered command. Returns false if it was already gone.
pub async fn delete_command(
    ctx: &Collaborators,
    machine_id: MachineId,
    message_id: &str,
) -> Result<bool, EngineError> {
    ctx.messages().delete(machine_id, message_id).await
}

#[cfg(test)]
#[path = "agents_tests.rs"]
mod tests;
