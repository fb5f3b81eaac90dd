//! Entity store for tms
//!
//! Owns every task and criterion plus the command log. Public operations take
//! the textual arguments of the command surface, validate them, and run the
//! resulting [`Command`] through [`TaskStore::execute`], which records the
//! inverse for undo.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::Config;
use crate::criteria::{self, negate_op, Criterion, Evaluator, LogicOp, IS_COMPOSITE, IS_PRIMITIVE};
use crate::error::{Error, Result};
use crate::history::{Command, History, TaskChange};
use crate::schedule::Schedule;
use crate::task::{
    parse_duration, parse_name_list, validate_description, validate_duration, validate_name,
    CompositeTask, PrimitiveTask, Task, TaskProperty,
};

#[derive(Debug, Clone)]
pub struct TaskStore {
    tasks: BTreeMap<String, Task>,
    criteria: BTreeMap<String, Criterion>,
    history: History,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::with_history(History::default())
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_history(History::with_limit(config.history.limit))
    }

    fn with_history(history: History) -> Self {
        let mut store = Self {
            tasks: BTreeMap::new(),
            criteria: BTreeMap::new(),
            history,
        };
        store.insert_builtins();
        store
    }

    fn insert_builtins(&mut self) {
        for (name, criterion) in criteria::builtins() {
            self.criteria.insert(name.to_string(), criterion);
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    pub fn task(&self, name: &str) -> Result<&Task> {
        self.tasks
            .get(name)
            .ok_or_else(|| Error::TaskNotFound(name.to_string()))
    }

    pub fn contains_task(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn primitive_tasks(&self) -> impl Iterator<Item = &PrimitiveTask> {
        self.tasks.values().filter_map(Task::as_primitive)
    }

    pub fn composite_tasks(&self) -> impl Iterator<Item = &CompositeTask> {
        self.tasks.values().filter_map(Task::as_composite)
    }

    pub fn criterion(&self, name: &str) -> Result<&Criterion> {
        self.criteria
            .get(name)
            .ok_or_else(|| Error::CriterionNotFound(name.to_string()))
    }

    pub fn criteria(&self) -> impl Iterator<Item = (&str, &Criterion)> {
        self.criteria
            .iter()
            .map(|(name, criterion)| (name.as_str(), criterion))
    }

    pub fn duration(&self, name: &str) -> Result<f64> {
        Schedule::new(&self.tasks).duration(name)
    }

    pub fn earliest_finish_time(&self, name: &str) -> Result<f64> {
        Schedule::new(&self.tasks).earliest_finish_time(name)
    }

    /// Names of tasks matching the named criterion.
    pub fn search(&self, name: &str) -> Result<BTreeSet<String>> {
        Evaluator::new(&self.tasks, &self.criteria).search(name)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub(crate) fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    // ---------------------------------------------------------------------
    // Task mutations
    // ---------------------------------------------------------------------

    pub fn create_primitive_task(
        &mut self,
        name: &str,
        description: &str,
        duration: &str,
        prerequisites: &str,
    ) -> Result<()> {
        self.ensure_available(name)?;
        validate_name(name)?;
        validate_description(description)?;
        let duration = parse_duration(duration)?;

        self.execute(Command::CreatePrimitiveTask {
            name: name.to_string(),
            description: description.to_string(),
            duration,
            prerequisites: parse_name_list(prerequisites),
        })
    }

    pub fn create_composite_task(
        &mut self,
        name: &str,
        description: &str,
        subtasks: &str,
    ) -> Result<()> {
        self.execute(Command::CreateCompositeTask {
            name: name.to_string(),
            description: description.to_string(),
            subtasks: parse_name_list(subtasks),
        })
    }

    pub fn delete_task(&mut self, name: &str) -> Result<()> {
        self.execute(Command::DeleteTask {
            name: name.to_string(),
        })
    }

    pub fn change_task(&mut self, name: &str, property: &str, value: &str) -> Result<()> {
        let kind = self.task(name)?.kind();
        let property = TaskProperty::parse(property)
            .filter(|property| property.applies_to(kind))
            .ok_or_else(|| Error::UnknownProperty {
                property: property.to_string(),
                target: name.to_string(),
            })?;

        let change = match property {
            TaskProperty::Name => TaskChange::Name(value.to_string()),
            TaskProperty::Description => TaskChange::Description(value.to_string()),
            TaskProperty::Duration => TaskChange::Duration(parse_duration(value)?),
            TaskProperty::Prerequisites => TaskChange::Prerequisites(parse_name_list(value)),
            TaskProperty::Subtasks => TaskChange::Subtasks(parse_name_list(value)),
        };

        self.execute(Command::ChangeTask {
            name: name.to_string(),
            change,
        })
    }

    // ---------------------------------------------------------------------
    // Criterion mutations
    // ---------------------------------------------------------------------

    pub fn define_basic_criterion(
        &mut self,
        name: &str,
        property: &str,
        op: &str,
        value: &str,
    ) -> Result<()> {
        self.ensure_available(name)?;
        validate_name(name)?;
        let (property, op) = criteria::parse_basic(property, op, value)?;

        self.execute(Command::DefineBasicCriterion {
            name: name.to_string(),
            property,
            op,
            value: value.to_string(),
        })
    }

    /// Define the negation of `base` under `name`.
    ///
    /// Negating a built-in resolves to the other built-in and defines nothing.
    /// Returns the name the negation is available under.
    pub fn define_negated_criterion(&mut self, name: &str, base: &str) -> Result<String> {
        match self.criterion(base)? {
            Criterion::IsPrimitive => return Ok(IS_COMPOSITE.to_string()),
            Criterion::IsComposite => return Ok(IS_PRIMITIVE.to_string()),
            _ => {}
        }
        self.ensure_available(name)?;
        validate_name(name)?;

        self.execute(Command::DefineNegatedCriterion {
            name: name.to_string(),
            base: base.to_string(),
        })?;
        Ok(name.to_string())
    }

    pub fn define_binary_criterion(
        &mut self,
        name: &str,
        left: &str,
        op: &str,
        right: &str,
    ) -> Result<()> {
        let op = LogicOp::parse(op).ok_or_else(|| Error::InvalidOperator {
            op: op.to_string(),
            property: "binary criterion".to_string(),
            expected: "&& or ||",
        })?;

        self.execute(Command::DefineBinaryCriterion {
            name: name.to_string(),
            left: left.to_string(),
            op,
            right: right.to_string(),
        })
    }

    // ---------------------------------------------------------------------
    // Command application
    // ---------------------------------------------------------------------

    /// Apply a fresh mutation and record its inverse.
    pub fn execute(&mut self, command: Command) -> Result<()> {
        tracing::debug!(command = %command, "executing");
        let inverse = self.apply(command)?;
        self.history.record(inverse);
        Ok(())
    }

    /// Apply a command without touching the log. Returns the exact inverse.
    ///
    /// On error the store is left unchanged.
    pub fn apply(&mut self, command: Command) -> Result<Command> {
        match command {
            Command::CreatePrimitiveTask {
                name,
                description,
                duration,
                prerequisites,
            } => self.insert_primitive(PrimitiveTask {
                name,
                description,
                duration,
                prerequisites,
            }),
            Command::CreateCompositeTask {
                name,
                description,
                subtasks,
            } => self.insert_composite(CompositeTask {
                name,
                description,
                subtasks,
            }),
            Command::DeleteTask { name } => self.remove_task(&name),
            Command::RemoveTask { name } => self.remove_single(&name),
            Command::ChangeTask { name, change } => self.change(&name, change),
            Command::DefineBasicCriterion {
                name,
                property,
                op,
                value,
            } => self.insert_criterion(
                name,
                Criterion::Basic {
                    property,
                    op,
                    value,
                },
            ),
            Command::DefineNegatedCriterion { name, base } => {
                let op = negate_op(self.criterion(&base)?.op_text());
                self.insert_criterion(name, Criterion::Negated { base, op })
            }
            Command::DefineBinaryCriterion {
                name,
                left,
                op,
                right,
            } => {
                if left == right {
                    return Err(Error::SameOperand(left));
                }
                self.criterion(&left)?;
                self.criterion(&right)?;
                self.insert_criterion(name, Criterion::Binary { left, op, right })
            }
            Command::DeleteCriterion { name } => self.remove_criterion(&name),
            Command::Batch { commands } => self.apply_batch(commands),
        }
    }

    fn apply_batch(&mut self, commands: Vec<Command>) -> Result<Command> {
        let saved_tasks = self.tasks.clone();
        let saved_criteria = self.criteria.clone();

        let mut inverses = Vec::with_capacity(commands.len());
        for command in commands {
            match self.apply(command) {
                Ok(inverse) => inverses.push(inverse),
                Err(err) => {
                    self.tasks = saved_tasks;
                    self.criteria = saved_criteria;
                    return Err(err);
                }
            }
        }

        inverses.reverse();
        Ok(Command::batch(inverses))
    }

    fn ensure_available(&self, name: &str) -> Result<()> {
        if self.tasks.contains_key(name) || self.criteria.contains_key(name) {
            return Err(Error::DuplicateName(name.to_string()));
        }
        Ok(())
    }

    fn check_new_entity(&self, name: &str, description: &str) -> Result<()> {
        self.ensure_available(name)?;
        validate_name(name)?;
        validate_description(description)
    }

    fn check_references(&self, names: &[String], unknown: fn(String) -> Error) -> Result<()> {
        match names.iter().find(|name| !self.tasks.contains_key(name.as_str())) {
            Some(missing) => Err(unknown(missing.clone())),
            None => Ok(()),
        }
    }

    fn insert_primitive(&mut self, task: PrimitiveTask) -> Result<Command> {
        self.check_new_entity(&task.name, &task.description)?;
        validate_duration(task.duration)?;
        self.check_references(&task.prerequisites, Error::UnknownPrerequisite)?;

        tracing::debug!(task = %task.name, "created primitive task");
        let inverse = Command::RemoveTask {
            name: task.name.clone(),
        };
        self.tasks.insert(task.name.clone(), Task::Primitive(task));
        Ok(inverse)
    }

    fn insert_composite(&mut self, task: CompositeTask) -> Result<Command> {
        self.check_new_entity(&task.name, &task.description)?;
        self.check_references(&task.subtasks, Error::UnknownSubtask)?;

        tracing::debug!(task = %task.name, "created composite task");
        let inverse = Command::RemoveTask {
            name: task.name.clone(),
        };
        self.tasks.insert(task.name.clone(), Task::Composite(task));
        Ok(inverse)
    }

    /// Delete a task, recursing into composite subtasks. All or nothing.
    fn remove_task(&mut self, name: &str) -> Result<Command> {
        if !self.tasks.contains_key(name) {
            return Err(Error::TaskNotFound(name.to_string()));
        }

        let saved = self.tasks.clone();
        let mut removed = Vec::new();
        if let Err(err) = self.remove_recursive(name, None, &mut removed) {
            self.tasks = saved;
            return Err(err);
        }
        tracing::debug!(task = name, removed = removed.len(), "deleted task");

        Ok(self.restore_command(&saved, &removed))
    }

    /// Remove one task, leaving its subtasks in place. Other composites lose
    /// it from their subtask lists.
    fn remove_single(&mut self, name: &str) -> Result<Command> {
        if !self.tasks.contains_key(name) {
            return Err(Error::TaskNotFound(name.to_string()));
        }
        if let Some(dependent) = self.prerequisite_dependent(name) {
            return Err(Error::TaskInUse {
                name: name.to_string(),
                dependent,
            });
        }

        let saved = self.tasks.clone();
        self.tasks.remove(name);
        self.detach(name);
        tracing::debug!(task = name, "removed task");

        Ok(self.restore_command(&saved, &[name.to_string()]))
    }

    fn remove_recursive(
        &mut self,
        name: &str,
        root: Option<&str>,
        removed: &mut Vec<String>,
    ) -> Result<()> {
        let Some(task) = self.tasks.get(name) else {
            // Listed twice, or removed earlier in this walk.
            return Ok(());
        };

        if let Some(dependent) = self.prerequisite_dependent(name) {
            return Err(match root {
                Some(root) => Error::SubtaskInUse {
                    name: root.to_string(),
                    subtask: name.to_string(),
                },
                None => Error::TaskInUse {
                    name: name.to_string(),
                    dependent,
                },
            });
        }

        if let Task::Composite(composite) = task {
            let subtasks = composite.subtasks.clone();
            let root = root.unwrap_or(name).to_string();
            // Detach first so a composite listing itself cannot recurse forever.
            self.tasks.remove(name);
            for subtask in &subtasks {
                self.remove_recursive(subtask, Some(root.as_str()), removed)?;
            }
        } else {
            self.tasks.remove(name);
        }

        self.detach(name);
        removed.push(name.to_string());
        Ok(())
    }

    /// Drop `name` from every composite's subtask list.
    fn detach(&mut self, name: &str) {
        let names: Vec<String> = self.tasks.keys().cloned().collect();
        for other in names {
            if let Some(Task::Composite(composite)) = self.tasks.get_mut(&other) {
                composite.subtasks.retain(|subtask| subtask != name);
            }
        }
    }

    /// First other primitive listing `name` as a prerequisite.
    fn prerequisite_dependent(&self, name: &str) -> Option<String> {
        self.primitive_tasks()
            .filter(|task| task.name != name)
            .find(|task| task.prerequisites.iter().any(|p| p == name))
            .map(|task| task.name.clone())
    }

    /// Inverse of a deletion: recreate removed tasks in reverse removal order,
    /// then put back every list that changed. A task naming itself gets that
    /// reference back once it exists again.
    fn restore_command(&self, saved: &BTreeMap<String, Task>, removed: &[String]) -> Command {
        let mut commands = Vec::new();
        let mut self_references = Vec::new();

        for name in removed.iter().rev() {
            match saved.get(name) {
                Some(Task::Primitive(task)) => {
                    let prerequisites: Vec<String> = task
                        .prerequisites
                        .iter()
                        .filter(|prerequisite| *prerequisite != name)
                        .cloned()
                        .collect();
                    if prerequisites.len() != task.prerequisites.len() {
                        self_references.push(Command::ChangeTask {
                            name: name.clone(),
                            change: TaskChange::Prerequisites(task.prerequisites.clone()),
                        });
                    }
                    commands.push(Command::CreatePrimitiveTask {
                        name: task.name.clone(),
                        description: task.description.clone(),
                        duration: task.duration,
                        prerequisites,
                    });
                }
                Some(Task::Composite(task)) => commands.push(Command::CreateCompositeTask {
                    name: task.name.clone(),
                    description: task.description.clone(),
                    subtasks: Vec::new(),
                }),
                None => {}
            }
        }
        commands.extend(self_references);

        for (name, task) in saved {
            let Task::Composite(original) = task else {
                continue;
            };
            let current = self
                .tasks
                .get(name)
                .and_then(Task::as_composite)
                .map(|composite| composite.subtasks.as_slice())
                .unwrap_or_default();
            if current != original.subtasks.as_slice() {
                commands.push(Command::ChangeTask {
                    name: name.clone(),
                    change: TaskChange::Subtasks(original.subtasks.clone()),
                });
            }
        }

        Command::batch(commands)
    }

    fn change(&mut self, name: &str, change: TaskChange) -> Result<Command> {
        let task = self.task(name)?;
        let property = change.property();
        if !property.applies_to(task.kind()) {
            return Err(Error::UnknownProperty {
                property: property.to_string(),
                target: name.to_string(),
            });
        }

        let previous = match (&change, task) {
            (TaskChange::Name(_), _) => TaskChange::Name(name.to_string()),
            (TaskChange::Description(_), task) => {
                TaskChange::Description(task.description().to_string())
            }
            (TaskChange::Duration(_), Task::Primitive(task)) => TaskChange::Duration(task.duration),
            (TaskChange::Prerequisites(_), Task::Primitive(task)) => {
                TaskChange::Prerequisites(task.prerequisites.clone())
            }
            (TaskChange::Subtasks(_), Task::Composite(task)) => {
                TaskChange::Subtasks(task.subtasks.clone())
            }
            _ => {
                return Err(Error::UnknownProperty {
                    property: property.to_string(),
                    target: name.to_string(),
                })
            }
        };

        let target = match change {
            TaskChange::Name(new_name) => {
                self.rename(name, &new_name)?;
                new_name
            }
            TaskChange::Description(description) => {
                validate_description(&description)?;
                self.task_mut(name)?.set_description(description);
                name.to_string()
            }
            TaskChange::Duration(duration) => {
                validate_duration(duration)?;
                if let Some(Task::Primitive(task)) = self.tasks.get_mut(name) {
                    task.duration = duration;
                }
                name.to_string()
            }
            TaskChange::Prerequisites(names) => {
                self.check_references(&names, Error::UnknownPrerequisite)?;
                *self.task_mut(name)?.references_mut() = names;
                name.to_string()
            }
            TaskChange::Subtasks(names) => {
                self.check_references(&names, Error::UnknownSubtask)?;
                *self.task_mut(name)?.references_mut() = names;
                name.to_string()
            }
        };

        tracing::debug!(task = %target, property = %property, "changed task");
        Ok(Command::ChangeTask {
            name: target,
            change: previous,
        })
    }

    /// Rename a task and rewrite every prerequisite and subtask list naming it.
    fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        self.ensure_available(new)?;
        validate_name(new)?;

        let Some(mut task) = self.tasks.remove(old) else {
            return Err(Error::TaskNotFound(old.to_string()));
        };
        task.set_name(new.to_string());
        self.tasks.insert(new.to_string(), task);

        let names: Vec<String> = self.tasks.keys().cloned().collect();
        for other in names {
            if let Some(task) = self.tasks.get_mut(&other) {
                for reference in task.references_mut().iter_mut() {
                    if reference == old {
                        *reference = new.to_string();
                    }
                }
            }
        }
        Ok(())
    }

    fn task_mut(&mut self, name: &str) -> Result<&mut Task> {
        self.tasks
            .get_mut(name)
            .ok_or_else(|| Error::TaskNotFound(name.to_string()))
    }

    fn insert_criterion(&mut self, name: String, criterion: Criterion) -> Result<Command> {
        self.ensure_available(&name)?;
        validate_name(&name)?;

        tracing::debug!(criterion = %name, op = criterion.op_text(), "defined criterion");
        self.criteria.insert(name.clone(), criterion);
        Ok(Command::DeleteCriterion { name })
    }

    fn remove_criterion(&mut self, name: &str) -> Result<Command> {
        let criterion = self.criterion(name)?;
        if criterion.is_builtin() {
            return Err(Error::BuiltinCriterion(name.to_string()));
        }
        if let Some((dependent, _)) = self
            .criteria
            .iter()
            .find(|(_, other)| other.operands().contains(&name))
        {
            return Err(Error::CriterionInUse {
                name: name.to_string(),
                dependent: dependent.clone(),
            });
        }

        let inverse = match criterion.clone() {
            Criterion::Basic {
                property,
                op,
                value,
            } => Command::DefineBasicCriterion {
                name: name.to_string(),
                property,
                op,
                value,
            },
            Criterion::Negated { base, .. } => Command::DefineNegatedCriterion {
                name: name.to_string(),
                base,
            },
            Criterion::Binary { left, op, right } => Command::DefineBinaryCriterion {
                name: name.to_string(),
                left,
                op,
                right,
            },
            Criterion::IsPrimitive | Criterion::IsComposite => {
                return Err(Error::BuiltinCriterion(name.to_string()))
            }
        };

        self.criteria.remove(name);
        tracing::debug!(criterion = name, "removed criterion");
        Ok(inverse)
    }

    // ---------------------------------------------------------------------
    // Snapshot support
    // ---------------------------------------------------------------------

    /// Swap in freshly loaded contents. Built-ins are re-inserted and the log
    /// is cleared.
    pub(crate) fn replace_contents(
        &mut self,
        tasks: BTreeMap<String, Task>,
        criteria: BTreeMap<String, Criterion>,
    ) {
        self.tasks = tasks;
        self.criteria = criteria;
        self.insert_builtins();
        self.history.clear();
    }

    pub(crate) fn task_map(&self) -> &BTreeMap<String, Task> {
        &self.tasks
    }

    pub(crate) fn criterion_map(&self) -> &BTreeMap<String, Criterion> {
        &self.criteria
    }
}
