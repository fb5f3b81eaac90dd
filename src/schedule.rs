//! Duration and earliest-finish computations over the task graph.
//!
//! Every walk carries a visiting set so a cyclic graph (only reachable through
//! a hand-edited snapshot or a prerequisite change) fails with
//! `CyclicDependency` instead of overflowing the stack.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::{Error, Result};
use crate::task::Task;

pub struct Schedule<'a> {
    tasks: &'a BTreeMap<String, Task>,
}

impl<'a> Schedule<'a> {
    pub fn new(tasks: &'a BTreeMap<String, Task>) -> Self {
        Self { tasks }
    }

    /// Duration of a task.
    ///
    /// A primitive reports its own duration. A composite is flattened into its
    /// primitive members and reports the longest prerequisite chain that stays
    /// inside that member set. An empty composite lasts 0.
    pub fn duration(&self, name: &str) -> Result<f64> {
        match self.get(name)? {
            Task::Primitive(task) => Ok(task.duration),
            Task::Composite(_) => {
                let members = self.flatten(name)?;
                let mut memo = HashMap::new();
                let mut visiting = HashSet::new();
                let mut longest = 0.0_f64;
                for member in &members {
                    let chain = self.chain(member, &members, &mut memo, &mut visiting)?;
                    longest = longest.max(chain);
                }
                Ok(longest)
            }
        }
    }

    /// Earliest finish time of a task.
    ///
    /// Primitive: own duration plus the latest prerequisite finish. Composite:
    /// latest finish among its direct subtasks.
    pub fn earliest_finish_time(&self, name: &str) -> Result<f64> {
        let mut memo = HashMap::new();
        let mut visiting = HashSet::new();
        self.eft(name, &mut memo, &mut visiting)
    }

    fn eft(
        &self,
        name: &str,
        memo: &mut HashMap<String, f64>,
        visiting: &mut HashSet<String>,
    ) -> Result<f64> {
        if let Some(value) = memo.get(name) {
            return Ok(*value);
        }
        let task = self.get(name)?;
        if !visiting.insert(name.to_string()) {
            return Err(Error::CyclicDependency(name.to_string()));
        }

        let mut latest = 0.0_f64;
        for dependency in task.references() {
            latest = latest.max(self.eft(dependency, memo, visiting)?);
        }
        let finish = match task {
            Task::Primitive(primitive) => primitive.duration + latest,
            Task::Composite(_) => latest,
        };

        visiting.remove(name);
        memo.insert(name.to_string(), finish);
        Ok(finish)
    }

    /// Longest chain ending at `name`, following prerequisites inside `members`.
    fn chain(
        &self,
        name: &str,
        members: &[String],
        memo: &mut HashMap<String, f64>,
        visiting: &mut HashSet<String>,
    ) -> Result<f64> {
        if let Some(value) = memo.get(name) {
            return Ok(*value);
        }
        let Task::Primitive(task) = self.get(name)? else {
            return Ok(0.0);
        };
        if !visiting.insert(name.to_string()) {
            return Err(Error::CyclicDependency(name.to_string()));
        }

        let mut longest = 0.0_f64;
        for prerequisite in &task.prerequisites {
            for member in self.flatten(prerequisite)? {
                if members.contains(&member) {
                    longest = longest.max(self.chain(&member, members, memo, visiting)?);
                }
            }
        }

        visiting.remove(name);
        let total = task.duration + longest;
        memo.insert(name.to_string(), total);
        Ok(total)
    }

    /// Primitive members of a task, depth-first, without duplicates.
    pub fn flatten(&self, name: &str) -> Result<Vec<String>> {
        let mut out = Vec::new();
        let mut visiting = HashSet::new();
        self.flatten_into(name, &mut out, &mut visiting)?;
        Ok(out)
    }

    fn flatten_into(
        &self,
        name: &str,
        out: &mut Vec<String>,
        visiting: &mut HashSet<String>,
    ) -> Result<()> {
        match self.get(name)? {
            Task::Primitive(_) => {
                if !out.iter().any(|existing| existing == name) {
                    out.push(name.to_string());
                }
            }
            Task::Composite(composite) => {
                if !visiting.insert(name.to_string()) {
                    return Err(Error::CyclicDependency(name.to_string()));
                }
                for subtask in &composite.subtasks {
                    self.flatten_into(subtask, out, visiting)?;
                }
                visiting.remove(name);
            }
        }
        Ok(())
    }

    fn get(&self, name: &str) -> Result<&'a Task> {
        self.tasks
            .get(name)
            .ok_or_else(|| Error::TaskNotFound(name.to_string()))
    }
}
