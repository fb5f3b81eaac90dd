//! Criteria model and search evaluation.
//!
//! A criterion is one of:
//! - the built-ins `IsPrimitive` / `IsCompos`
//! - `Basic`: property, operator and value, e.g. `duration > 5`
//! - `Negated`: complement of another criterion over primitive tasks
//! - `Binary`: `&&` / `||` of two other criteria
//!
//! Evaluation turns a criterion into the sorted set of matching task names.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::task::{Task, TaskKind};

/// Name of the built-in criterion matching every primitive task
pub const IS_PRIMITIVE: &str = "IsPrimitive";

/// Name of the built-in criterion matching every composite task
pub const IS_COMPOSITE: &str = "IsCompos";

pub const NULL_FIELD: &str = "null";
pub const NEGATION_PROPERTY: &str = "negation";
pub const BINARY_PROPERTY: &str = "binary";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Criterion {
    IsPrimitive,
    IsComposite,
    Basic {
        property: Property,
        op: BasicOp,
        value: String,
    },
    Negated {
        base: String,
        op: String,
    },
    Binary {
        left: String,
        op: LogicOp,
        right: String,
    },
}

/// Task property a basic criterion inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Name,
    Description,
    Prerequisites,
    Subtasks,
    Duration,
}

impl Property {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Property::Name),
            "description" => Some(Property::Description),
            "prerequisites" => Some(Property::Prerequisites),
            "subtasks" => Some(Property::Subtasks),
            "duration" => Some(Property::Duration),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Property::Name => "name",
            Property::Description => "description",
            Property::Prerequisites => "prerequisites",
            Property::Subtasks => "subtasks",
            Property::Duration => "duration",
        }
    }

    pub fn is_numeric(self) -> bool {
        self == Property::Duration
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BasicOp {
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

impl BasicOp {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "contains" => Some(BasicOp::Contains),
            "<" => Some(BasicOp::Lt),
            ">" => Some(BasicOp::Gt),
            "<=" => Some(BasicOp::Le),
            ">=" => Some(BasicOp::Ge),
            "==" => Some(BasicOp::Eq),
            "!=" => Some(BasicOp::Ne),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BasicOp::Contains => "contains",
            BasicOp::Lt => "<",
            BasicOp::Gt => ">",
            BasicOp::Le => "<=",
            BasicOp::Ge => ">=",
            BasicOp::Eq => "==",
            BasicOp::Ne => "!=",
        }
    }

    /// Whether the operator may be combined with `property`.
    pub fn fits(self, property: Property) -> bool {
        (self == BasicOp::Contains) != property.is_numeric()
    }

    fn compare(self, lhs: f64, rhs: f64) -> bool {
        match self {
            BasicOp::Lt => lhs < rhs,
            BasicOp::Gt => lhs > rhs,
            BasicOp::Le => lhs <= rhs,
            BasicOp::Ge => lhs >= rhs,
            BasicOp::Eq => lhs == rhs,
            BasicOp::Ne => lhs != rhs,
            BasicOp::Contains => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicOp {
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
}

impl LogicOp {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "&&" => Some(LogicOp::And),
            "||" => Some(LogicOp::Or),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogicOp::And => "&&",
            LogicOp::Or => "||",
        }
    }
}

impl Criterion {
    /// Build a basic criterion, checking that operator and value fit the property.
    pub fn basic(property: &str, op: &str, value: &str) -> Result<Self> {
        let (property, op) = parse_basic(property, op, value)?;
        Ok(Criterion::Basic {
            property,
            op,
            value: value.to_string(),
        })
    }

    /// Operator text shown for this criterion and fed to negation.
    pub fn op_text(&self) -> &str {
        match self {
            Criterion::IsPrimitive => "IsPrimitive",
            Criterion::IsComposite => "IsComposite",
            Criterion::Basic { op, .. } => op.as_str(),
            Criterion::Negated { op, .. } => op,
            Criterion::Binary { op, .. } => op.as_str(),
        }
    }

    /// Property, operator and value columns as printed and stored.
    pub fn fields(&self) -> (String, String, String) {
        match self {
            Criterion::IsPrimitive | Criterion::IsComposite => (
                NULL_FIELD.to_string(),
                self.op_text().to_string(),
                NULL_FIELD.to_string(),
            ),
            Criterion::Basic {
                property,
                op,
                value,
            } => (
                property.as_str().to_string(),
                op.as_str().to_string(),
                value.clone(),
            ),
            Criterion::Negated { base, op } => {
                (NEGATION_PROPERTY.to_string(), op.clone(), base.clone())
            }
            Criterion::Binary { left, op, right } => (
                BINARY_PROPERTY.to_string(),
                op.as_str().to_string(),
                format!("{left},{right}"),
            ),
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, Criterion::IsPrimitive | Criterion::IsComposite)
    }

    /// Names of other criteria this one is built from.
    pub fn operands(&self) -> Vec<&str> {
        match self {
            Criterion::Negated { base, .. } => vec![base.as_str()],
            Criterion::Binary { left, right, .. } => vec![left.as_str(), right.as_str()],
            _ => Vec::new(),
        }
    }
}

/// Validate the parts of a basic criterion.
pub fn parse_basic(property: &str, op: &str, value: &str) -> Result<(Property, BasicOp)> {
    let property_kind = Property::parse(property).ok_or_else(|| Error::UnknownProperty {
        property: property.to_string(),
        target: "criterion".to_string(),
    })?;

    let expected = if property_kind.is_numeric() {
        "one of <, >, <=, >=, ==, !="
    } else {
        "contains"
    };
    let op_kind = BasicOp::parse(op)
        .filter(|op| op.fits(property_kind))
        .ok_or_else(|| Error::InvalidOperator {
            op: op.to_string(),
            property: property.to_string(),
            expected,
        })?;

    if property_kind.is_numeric() {
        parse_number(value)?;
    }
    Ok((property_kind, op_kind))
}

/// Map an operator to its structural negation.
pub fn negate_op(op: &str) -> String {
    op.split_whitespace()
        .map(|token| match token {
            ">" => "<=",
            "<=" => ">",
            "<" => ">=",
            ">=" => "<",
            "==" => "!=",
            "!=" => "==",
            "&&" => "||",
            "||" => "&&",
            "contains" => "not-contains",
            "not-contains" => "contains",
            "IsPrimitive" => "IsComposite",
            "IsComposite" => "IsPrimitive",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The built-in criteria, in insertion order.
pub fn builtins() -> [(&'static str, Criterion); 2] {
    [
        (IS_PRIMITIVE, Criterion::IsPrimitive),
        (IS_COMPOSITE, Criterion::IsComposite),
    ]
}

pub(crate) fn parse_number(value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
        .ok_or_else(|| Error::InvalidValue(value.to_string()))
}

/// Evaluation context over a task map and a criterion map.
pub struct Evaluator<'a> {
    tasks: &'a BTreeMap<String, Task>,
    criteria: &'a BTreeMap<String, Criterion>,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        tasks: &'a BTreeMap<String, Task>,
        criteria: &'a BTreeMap<String, Criterion>,
    ) -> Self {
        Self { tasks, criteria }
    }

    /// Evaluate the named criterion against every task.
    pub fn search(&self, name: &str) -> Result<BTreeSet<String>> {
        let mut visiting = HashSet::new();
        self.eval_named(name, &mut visiting)
    }

    fn eval_named(&self, name: &str, visiting: &mut HashSet<String>) -> Result<BTreeSet<String>> {
        let criterion = self
            .criteria
            .get(name)
            .ok_or_else(|| Error::CriterionNotFound(name.to_string()))?;

        if !visiting.insert(name.to_string()) {
            return Err(Error::CyclicDependency(name.to_string()));
        }
        let result = self.eval(criterion, visiting);
        visiting.remove(name);
        result
    }

    fn eval(&self, criterion: &Criterion, visiting: &mut HashSet<String>) -> Result<BTreeSet<String>> {
        match criterion {
            Criterion::IsPrimitive => Ok(self.names_of(TaskKind::Primitive)),
            Criterion::IsComposite => Ok(self.names_of(TaskKind::Composite)),
            Criterion::Basic {
                property,
                op,
                value,
            } => self.eval_basic(*property, *op, value),
            Criterion::Negated { base, .. } => {
                let excluded = self.eval_named(base, visiting)?;
                Ok(self
                    .names_of(TaskKind::Primitive)
                    .into_iter()
                    .filter(|name| !excluded.contains(name))
                    .collect())
            }
            Criterion::Binary { left, op, right } => {
                let left_set = self.eval_named(left, visiting)?;
                let right_set = self.eval_named(right, visiting)?;
                Ok(match op {
                    LogicOp::And => left_set.intersection(&right_set).cloned().collect(),
                    LogicOp::Or => left_set.union(&right_set).cloned().collect(),
                })
            }
        }
    }

    fn eval_basic(&self, property: Property, op: BasicOp, value: &str) -> Result<BTreeSet<String>> {
        let tokens: Vec<&str> = value.split(',').filter(|token| !token.is_empty()).collect();

        let matches = |task: &Task| -> Result<bool> {
            Ok(match property {
                Property::Name => task.name().contains(value),
                Property::Description => task.description().contains(value),
                Property::Prerequisites => task.as_primitive().is_some_and(|primitive| {
                    primitive
                        .prerequisites
                        .iter()
                        .any(|prerequisite| tokens.contains(&prerequisite.as_str()))
                }),
                Property::Subtasks => task.as_composite().is_some_and(|composite| {
                    tokens
                        .iter()
                        .all(|token| composite.subtasks.iter().any(|subtask| subtask == token))
                }),
                Property::Duration => match task.as_primitive() {
                    Some(primitive) => op.compare(primitive.duration, parse_number(value)?),
                    None => false,
                },
            })
        };

        let mut out = BTreeSet::new();
        for task in self.tasks.values() {
            if matches(task)? {
                out.insert(task.name().to_string());
            }
        }
        Ok(out)
    }

    fn names_of(&self, kind: TaskKind) -> BTreeSet<String> {
        self.tasks
            .values()
            .filter(|task| task.kind() == kind)
            .map(|task| task.name().to_string())
            .collect()
    }
}
