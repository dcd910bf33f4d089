//! Remote reconfiguration of the agent.

use uuid::Uuid;

use crate::agent::{AgentControl, MeanDwell};
use crate::tasks::TaskResult;

/// Apply a new mean dwell and run flag to the agent.
///
/// This is the only task whose effect reaches past its own result. The agent
/// is borrowed for the duration of [`ConfigureTask::run`] and never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigureTask {
    id: Uuid,
    mean_dwell: MeanDwell,
    is_running: bool,
}

impl ConfigureTask {
    pub const KEY: &'static str = "configure";

    pub fn new(id: Uuid, mean_dwell: MeanDwell, is_running: bool) -> Self {
        Self {
            id,
            mean_dwell,
            is_running,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mean_dwell(&self) -> MeanDwell {
        self.mean_dwell
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn run(&self, agent: &mut dyn AgentControl) -> TaskResult {
        agent.apply_configuration(self.mean_dwell, self.is_running);
        TaskResult::success(
            self.id,
            format!(
                "mean_dwell={}, is_running={}",
                self.mean_dwell, self.is_running
            ),
        )
    }
}
