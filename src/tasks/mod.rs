//! Task model.
//!
//! Every instruction from the control endpoint decodes into exactly one
//! [`Task`] variant. Variants own their parameters, run once, and produce a
//! [`TaskResult`] carrying the task's id. Running a task never fails at the
//! type level: errors become unsuccessful results.

mod configure;
mod decode;
mod execute;
mod get;
mod list;
mod put;
mod result;

pub use configure::ConfigureTask;
pub use decode::decode_task;
pub use execute::{DEFAULT_MAX_OUTPUT_BYTES, ExecuteTask};
pub use get::GetTask;
pub use list::ListTask;
pub use put::PutTask;
pub use result::TaskResult;

use uuid::Uuid;

use crate::agent::AgentControl;
use crate::system::System;

/// The closed set of task variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    Get(GetTask),
    Put(PutTask),
    List(ListTask),
    Execute(ExecuteTask),
    Configure(ConfigureTask),
}

/// Everything a task may touch while it runs.
pub struct TaskContext<'a> {
    /// Host capabilities for file and process access.
    pub system: &'a dyn System,
    /// Cap on captured command output.
    pub max_output_bytes: usize,
    /// The agent, borrowed for configure tasks.
    pub agent: &'a mut dyn AgentControl,
}

impl Task {
    /// Id of the task. Carried through to its result.
    pub fn id(&self) -> Uuid {
        match self {
            Self::Get(t) => t.id(),
            Self::Put(t) => t.id(),
            Self::List(t) => t.id(),
            Self::Execute(t) => t.id(),
            Self::Configure(t) => t.id(),
        }
    }

    /// Discriminator key of the variant.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Get(_) => GetTask::KEY,
            Self::Put(_) => PutTask::KEY,
            Self::List(_) => ListTask::KEY,
            Self::Execute(_) => ExecuteTask::KEY,
            Self::Configure(_) => ConfigureTask::KEY,
        }
    }

    /// Run the task to completion.
    pub async fn run(&self, ctx: &mut TaskContext<'_>) -> TaskResult {
        match self {
            Self::Get(t) => t.run(ctx.system).await,
            Self::Put(t) => t.run(ctx.system).await,
            Self::List(t) => t.run(ctx.system).await,
            Self::Execute(t) => t.run(ctx.system, ctx.max_output_bytes).await,
            Self::Configure(t) => t.run(&mut *ctx.agent),
        }
    }
}

impl From<GetTask> for Task {
    fn from(task: GetTask) -> Self {
        Self::Get(task)
    }
}

impl From<PutTask> for Task {
    fn from(task: PutTask) -> Self {
        Self::Put(task)
    }
}

impl From<ListTask> for Task {
    fn from(task: ListTask) -> Self {
        Self::List(task)
    }
}

impl From<ExecuteTask> for Task {
    fn from(task: ExecuteTask) -> Self {
        Self::Execute(task)
    }
}

impl From<ConfigureTask> for Task {
    fn from(task: ConfigureTask) -> Self {
        Self::Configure(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::MeanDwell;
    use crate::system::LocalSystem;

    struct NoopAgent;

    impl AgentControl for NoopAgent {
        fn set_mean_dwell(&mut self, _mean_dwell: MeanDwell) {}
        fn set_running(&mut self, _is_running: bool) {}
    }

    #[tokio::test]
    async fn test_result_id_matches_task_id_for_every_variant() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "data").unwrap();

        let tasks: Vec<Task> = vec![
            GetTask::new(Uuid::new_v4(), &file).into(),
            PutTask::new(Uuid::new_v4(), dir.path().join("g.txt"), "x").into(),
            ListTask::new(Uuid::new_v4(), dir.path(), 0).into(),
            ExecuteTask::new(Uuid::new_v4(), "exit 0").into(),
            ConfigureTask::new(Uuid::new_v4(), MeanDwell::default(), true).into(),
        ];

        let mut agent = NoopAgent;
        let mut ctx = TaskContext {
            system: &LocalSystem,
            max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
            agent: &mut agent,
        };

        for task in &tasks {
            let result = task.run(&mut ctx).await;
            assert_eq!(result.id(), task.id(), "id mismatch for {}", task.key());
        }
    }

    #[test]
    fn test_keys() {
        let id = Uuid::nil();
        assert_eq!(Task::from(GetTask::new(id, "/")).key(), "get");
        assert_eq!(Task::from(PutTask::new(id, "/", "")).key(), "put");
        assert_eq!(Task::from(ListTask::new(id, "/", 0)).key(), "list");
        assert_eq!(Task::from(ExecuteTask::new(id, "true")).key(), "execute");
        assert_eq!(
            Task::from(ConfigureTask::new(id, MeanDwell::default(), true)).key(),
            "configure"
        );
    }
}
