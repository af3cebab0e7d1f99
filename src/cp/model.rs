//! Constraint model: variables, intervals, constraints and objective.
//!
//! The model is a plain data structure. Variables are referenced by typed
//! indices handed out by the `new_*` methods, so a model built through its
//! own API is well-formed by construction; [`CpModel::validate`] exists for
//! models assembled or mutated by other means.

use crate::models::MinuteWindow;

/// Integer variable handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntVarId(pub usize);

/// Boolean variable handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoolVarId(pub usize);

/// Interval variable handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntervalId(pub usize);

/// A boolean variable or its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Literal {
    pub var: BoolVarId,
    pub positive: bool,
}

impl Literal {
    /// The literal `var`.
    pub fn pos(var: BoolVarId) -> Self {
        Self { var, positive: true }
    }

    /// The literal `!var`.
    pub fn neg(var: BoolVarId) -> Self {
        Self {
            var,
            positive: false,
        }
    }

    /// The opposite literal.
    pub fn negated(self) -> Self {
        Self {
            var: self.var,
            positive: !self.positive,
        }
    }

    /// Truth value of the literal given its variable's value.
    #[inline]
    pub fn eval(self, value: bool) -> bool {
        value == self.positive
    }
}

/// Integer variable with domain `[min, max]`.
#[derive(Debug, Clone)]
pub struct IntVar {
    pub name: String,
    pub min: i64,
    pub max: i64,
}

/// Boolean variable.
#[derive(Debug, Clone)]
pub struct BoolVar {
    pub name: String,
}

/// Fixed-size interval anchored on an integer variable.
///
/// Occupies `[start + offset, start + offset + size)`. Several intervals may
/// share one start variable, which is how a task's staff occupancy and its
/// (possibly shorter, delayed) resource occupancy move together.
#[derive(Debug, Clone)]
pub struct IntervalVar {
    pub name: String,
    pub start: IntVarId,
    pub offset: i64,
    pub size: i64,
    /// `None` = always present.
    pub presence: Option<Literal>,
}

/// A model constraint.
#[derive(Debug, Clone)]
pub enum CpConstraint {
    /// Exactly one literal is true.
    ExactlyOne(Vec<Literal>),

    /// Present intervals are pairwise disjoint.
    NoOverlap(Vec<IntervalId>),

    /// `after` starts no earlier than `before` ends plus `min_delay`.
    /// Enforced only when both intervals are present.
    Precedence {
        before: IntervalId,
        after: IntervalId,
        min_delay: i64,
    },

    /// A present interval lies inside one of the windows.
    WithinWindows {
        interval: IntervalId,
        windows: Vec<MinuteWindow>,
    },
}

/// Makespan term: `weight * max(end of present listed intervals)`.
#[derive(Debug, Clone)]
pub struct MakespanTerm {
    pub intervals: Vec<IntervalId>,
    pub weight: i64,
}

/// Minimization objective: `sum(coef * literal) + makespan term`.
#[derive(Debug, Clone, Default)]
pub struct Objective {
    pub terms: Vec<(Literal, i64)>,
    pub makespan: Option<MakespanTerm>,
}

impl Objective {
    /// Whether the objective is constant.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.makespan.is_none()
    }
}

/// A constraint model over a finite horizon.
#[derive(Debug, Clone)]
pub struct CpModel {
    pub name: String,
    pub horizon: i64,
    pub int_vars: Vec<IntVar>,
    pub bool_vars: Vec<BoolVar>,
    pub intervals: Vec<IntervalVar>,
    pub constraints: Vec<CpConstraint>,
    pub objective: Objective,
}

impl CpModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>, horizon: i64) -> Self {
        Self {
            name: name.into(),
            horizon,
            int_vars: Vec::new(),
            bool_vars: Vec::new(),
            intervals: Vec::new(),
            constraints: Vec::new(),
            objective: Objective::default(),
        }
    }

    pub fn new_int_var(&mut self, min: i64, max: i64, name: impl Into<String>) -> IntVarId {
        self.int_vars.push(IntVar {
            name: name.into(),
            min,
            max,
        });
        IntVarId(self.int_vars.len() - 1)
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> BoolVarId {
        self.bool_vars.push(BoolVar { name: name.into() });
        BoolVarId(self.bool_vars.len() - 1)
    }

    /// Adds an always-present interval.
    pub fn new_interval(
        &mut self,
        start: IntVarId,
        offset: i64,
        size: i64,
        name: impl Into<String>,
    ) -> IntervalId {
        self.push_interval(start, offset, size, None, name.into())
    }

    /// Adds an interval present only when `presence` is true.
    pub fn new_optional_interval(
        &mut self,
        start: IntVarId,
        offset: i64,
        size: i64,
        presence: Literal,
        name: impl Into<String>,
    ) -> IntervalId {
        self.push_interval(start, offset, size, Some(presence), name.into())
    }

    fn push_interval(
        &mut self,
        start: IntVarId,
        offset: i64,
        size: i64,
        presence: Option<Literal>,
        name: String,
    ) -> IntervalId {
        self.intervals.push(IntervalVar {
            name,
            start,
            offset,
            size,
            presence,
        });
        IntervalId(self.intervals.len() - 1)
    }

    pub fn add_exactly_one(&mut self, literals: Vec<Literal>) {
        self.constraints.push(CpConstraint::ExactlyOne(literals));
    }

    pub fn add_no_overlap(&mut self, intervals: Vec<IntervalId>) {
        self.constraints.push(CpConstraint::NoOverlap(intervals));
    }

    pub fn add_precedence(&mut self, before: IntervalId, after: IntervalId, min_delay: i64) {
        self.constraints.push(CpConstraint::Precedence {
            before,
            after,
            min_delay,
        });
    }

    pub fn add_within_windows(&mut self, interval: IntervalId, windows: Vec<MinuteWindow>) {
        self.constraints
            .push(CpConstraint::WithinWindows { interval, windows });
    }

    /// Adds `coef` to the objective whenever `literal` is true.
    pub fn add_objective_term(&mut self, literal: Literal, coef: i64) {
        if coef != 0 {
            self.objective.terms.push((literal, coef));
        }
    }

    /// Sets the makespan term of the objective.
    pub fn set_makespan_objective(&mut self, intervals: Vec<IntervalId>, weight: i64) {
        self.objective.makespan = (weight != 0 && !intervals.is_empty())
            .then_some(MakespanTerm { intervals, weight });
    }

    pub fn int_var_count(&self) -> usize {
        self.int_vars.len()
    }

    pub fn bool_var_count(&self) -> usize {
        self.bool_vars.len()
    }

    pub fn interval_count(&self) -> usize {
        self.intervals.len()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value of a complete assignment.
    pub fn objective_value(&self, int_values: &[i64], bool_values: &[bool]) -> i64 {
        let present = |iv: &IntervalVar| {
            iv.presence
                .map_or(true, |lit| lit.eval(bool_values[lit.var.0]))
        };
        let linear: i64 = self
            .objective
            .terms
            .iter()
            .filter(|(lit, _)| lit.eval(bool_values[lit.var.0]))
            .map(|(_, coef)| coef)
            .sum();
        let makespan = self.objective.makespan.as_ref().map_or(0, |term| {
            let end = term
                .intervals
                .iter()
                .map(|id| &self.intervals[id.0])
                .filter(|iv| present(*iv))
                .map(|iv| int_values[iv.start.0] + iv.offset + iv.size)
                .max()
                .unwrap_or(0);
            term.weight * end
        });
        linear + makespan
    }

    /// Checks the model for structural defects.
    ///
    /// Reports dangling references, negative interval sizes and negative
    /// objective coefficients. An empty integer domain is not a defect; the
    /// solver reports it as infeasible.
    pub fn validate(&self) -> Result<(), String> {
        let bool_ok = |lit: &Literal| lit.var.0 < self.bool_vars.len();
        let interval_ok = |id: &IntervalId| id.0 < self.intervals.len();

        for iv in &self.intervals {
            if iv.start.0 >= self.int_vars.len() {
                return Err(format!("interval '{}' references unknown start variable", iv.name));
            }
            if iv.size < 0 {
                return Err(format!("interval '{}' has negative size {}", iv.name, iv.size));
            }
            if let Some(lit) = &iv.presence {
                if !bool_ok(lit) {
                    return Err(format!("interval '{}' references unknown literal", iv.name));
                }
            }
        }

        for (i, c) in self.constraints.iter().enumerate() {
            let ok = match c {
                CpConstraint::ExactlyOne(lits) => lits.iter().all(bool_ok),
                CpConstraint::NoOverlap(ids) => ids.iter().all(interval_ok),
                CpConstraint::Precedence { before, after, .. } => {
                    interval_ok(before) && interval_ok(after)
                }
                CpConstraint::WithinWindows { interval, windows } => {
                    interval_ok(interval) && windows.iter().all(|w| w.start <= w.end)
                }
            };
            if !ok {
                return Err(format!("constraint #{i} is malformed: {c:?}"));
            }
        }

        for (lit, coef) in &self.objective.terms {
            if !bool_ok(lit) {
                return Err("objective references unknown literal".to_string());
            }
            if *coef < 0 {
                return Err(format!("objective coefficient {coef} is negative"));
            }
        }
        if let Some(m) = &self.objective.makespan {
            if !m.intervals.iter().all(interval_ok) {
                return Err("makespan term references unknown interval".to_string());
            }
            if m.weight < 0 {
                return Err(format!("makespan weight {} is negative", m.weight));
            }
        }

        Ok(())
    }
}
