//! [`CpSolver`] backed by the Pumpkin lazy clause generation solver.
//!
//! # Encoding
//!
//! Every model variable becomes a Pumpkin integer; booleans are `[0, 1]`
//! integers. Constraints are posted as linear inequalities:
//!
//! | Model | Pumpkin |
//! |-------|---------|
//! | `ExactlyOne(l)` | `sum(l) >= 1` and `-sum(l) >= -1` |
//! | `Precedence` | `start(after) - end(before) >= delay`, relaxed while either is absent |
//! | `WithinWindows` | one selector per window; the selected window bounds the interval |
//! | `NoOverlap` | one order variable per pair of intervals |
//!
//! Relaxation adds `M` per absent interval or unselected option, where `M`
//! exceeds any distance between interval endpoints. The objective is an
//! integer bounded below by the weighted sum of literals and a makespan
//! variable, minimised by linear SAT-UNSAT search under a [`TimeBudget`].
//!
//! # Reference
//! - Stuckey (2010), "Lazy Clause Generation: Combining the Power of SAT and
//!   CP (and MIP?) Solving"
//! - Hooker (2007), "Integrated Methods for Optimization", ch. 7 (big-M disjunctions)

use std::collections::BTreeMap;
use std::time::Instant;

use pumpkin_solver::constraints as cp;
use pumpkin_solver::optimisation::linear_sat_unsat::LinearSatUnsat;
use pumpkin_solver::optimisation::OptimisationDirection;
use pumpkin_solver::results::{OptimisationResult, ProblemSolution, SolutionReference};
use pumpkin_solver::termination::TimeBudget;
use pumpkin_solver::variables::{DomainId, TransformableVariable};
use pumpkin_solver::Solver;
use tracing::debug;

use super::model::{CpConstraint, CpModel, IntervalId, IntervalVar, Literal};
use super::solver::{CpSolution, CpSolver, CpStatus, SolverConfig};
use crate::models::MinuteWindow;

/// Exact solver over `pumpkin_solver`.
#[derive(Debug, Clone, Default)]
pub struct PumpkinCpSolver;

impl PumpkinCpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl CpSolver for PumpkinCpSolver {
    fn solve(&self, model: &CpModel, config: &SolverConfig) -> CpSolution {
        let started = Instant::now();

        if let Err(msg) = model.validate() {
            return CpSolution::empty(CpStatus::ModelInvalid, started.elapsed(), Some(msg));
        }
        if let Some(var) = model.int_vars.iter().find(|v| v.min > v.max) {
            return CpSolution::empty(
                CpStatus::Infeasible,
                started.elapsed(),
                Some(format!("variable '{}' has an empty domain", var.name)),
            );
        }

        let Encoded {
            mut solver,
            vars,
            objective,
        } = match Encoder::encode(model) {
            Ok(encoded) => encoded,
            Err(Halt::Invalid(msg)) => {
                return CpSolution::empty(CpStatus::ModelInvalid, started.elapsed(), Some(msg));
            }
            Err(Halt::Infeasible(msg)) => {
                debug!(model = %model.name, %msg, "infeasible while posting");
                return CpSolution::empty(CpStatus::Infeasible, started.elapsed(), Some(msg));
            }
        };

        debug!(
            model = %model.name,
            int_vars = model.int_var_count(),
            bool_vars = model.bool_var_count(),
            intervals = model.interval_count(),
            constraints = model.constraint_count(),
            encoded_vars = vars.len(),
            "starting search"
        );

        let mut brancher = solver.default_brancher();
        let mut termination = TimeBudget::starting_now(config.time_limit());
        fn ignore_solution<B>(_: &Solver, _: SolutionReference, _: &B) {}
        let result = solver.optimise(
            &mut brancher,
            &mut termination,
            LinearSatUnsat::new(OptimisationDirection::Minimise, objective, ignore_solution),
        );

        let (n_int, n_bool) = (model.int_var_count(), model.bool_var_count());
        let (status, values) = match result {
            OptimisationResult::Optimal(solution) => (
                CpStatus::Optimal,
                Some(read_values(&solution, &vars, n_int, n_bool)),
            ),
            OptimisationResult::Satisfiable(solution) => (
                CpStatus::Feasible,
                Some(read_values(&solution, &vars, n_int, n_bool)),
            ),
            OptimisationResult::Unsatisfiable => (CpStatus::Infeasible, None),
            OptimisationResult::Unknown => (CpStatus::Unknown, None),
        };
        debug!(model = %model.name, ?status, "search finished");

        match values {
            Some((int_values, bool_values)) => CpSolution {
                status,
                objective: Some(model.objective_value(&int_values, &bool_values)),
                int_values,
                bool_values,
                wall_time: started.elapsed(),
                message: None,
            },
            None => CpSolution::empty(status, started.elapsed(), None),
        }
    }
}

fn read_values<S: ProblemSolution>(
    solution: &S,
    vars: &[DomainId],
    n_int: usize,
    n_bool: usize,
) -> (Vec<i64>, Vec<bool>) {
    let ints = vars[..n_int]
        .iter()
        .map(|&var| i64::from(solution.get_integer_value(var)))
        .collect();
    let bools = vars[n_int..n_int + n_bool]
        .iter()
        .map(|&var| solution.get_integer_value(var) == 1)
        .collect();
    (ints, bools)
}

/// Why encoding stopped early.
enum Halt {
    /// A bound or coefficient does not fit the solver's integer range.
    Invalid(String),
    /// A constraint failed at the root.
    Infeasible(String),
}

/// `sum(coef * var) + constant` over encoded variable indices.
#[derive(Debug, Clone, Default)]
struct Linear {
    coefs: BTreeMap<usize, i64>,
    constant: i64,
}

impl Linear {
    fn term(mut self, var: usize, coef: i64) -> Self {
        *self.coefs.entry(var).or_insert(0) += coef;
        self
    }

    fn constant(mut self, value: i64) -> Self {
        self.constant += value;
        self
    }

    fn scaled(mut self, factor: i64) -> Self {
        for coef in self.coefs.values_mut() {
            *coef *= factor;
        }
        self.constant *= factor;
        self
    }
}

struct Encoded {
    solver: Solver,
    /// Int vars, then bool vars, then auxiliaries.
    vars: Vec<DomainId>,
    objective: DomainId,
}

struct Encoder<'m> {
    model: &'m CpModel,
    solver: Solver,
    vars: Vec<DomainId>,
    big_m: i64,
}

impl<'m> Encoder<'m> {
    fn encode(model: &'m CpModel) -> Result<Encoded, Halt> {
        let mut enc = Self {
            model,
            solver: Solver::default(),
            vars: Vec::with_capacity(model.int_var_count() + model.bool_var_count()),
            big_m: big_m(model),
        };
        narrow(enc.big_m)?;

        for var in &model.int_vars {
            enc.new_var(var.min, var.max)?;
        }
        for _ in &model.bool_vars {
            enc.new_var(0, 1)?;
        }

        for constraint in &model.constraints {
            match constraint {
                CpConstraint::ExactlyOne(lits) => enc.exactly_one(lits)?,
                CpConstraint::NoOverlap(ids) => enc.no_overlap(ids)?,
                CpConstraint::Precedence {
                    before,
                    after,
                    min_delay,
                } => enc.precedence(*before, *after, *min_delay)?,
                CpConstraint::WithinWindows { interval, windows } => {
                    enc.within_windows(*interval, windows)?
                }
            }
        }

        let objective = enc.objective()?;
        Ok(Encoded {
            solver: enc.solver,
            vars: enc.vars,
            objective,
        })
    }

    fn new_var(&mut self, min: i64, max: i64) -> Result<usize, Halt> {
        let var = self.solver.new_bounded_integer(narrow(min)?, narrow(max)?);
        self.vars.push(var);
        Ok(self.vars.len() - 1)
    }

    /// Adds `coef * value(lit)`.
    fn literal(&self, expr: Linear, lit: Literal, coef: i64) -> Linear {
        let var = self.model.int_var_count() + lit.var.0;
        if lit.positive {
            expr.term(var, coef)
        } else {
            expr.constant(coef).term(var, -coef)
        }
    }

    /// Adds `coef` when the interval is absent.
    fn absent(&self, expr: Linear, iv: &IntervalVar, coef: i64) -> Linear {
        match iv.presence {
            None => expr,
            Some(lit) => self.literal(expr, lit.negated(), coef),
        }
    }

    /// Adds `coef * (start + offset)`.
    fn begin(&self, expr: Linear, iv: &IntervalVar, coef: i64) -> Linear {
        expr.term(iv.start.0, coef).constant(coef * iv.offset)
    }

    /// Posts `expr >= 0`.
    fn post(&mut self, expr: Linear, what: impl FnOnce() -> String) -> Result<(), Halt> {
        let mut terms = Vec::with_capacity(expr.coefs.len());
        for (&var, &coef) in expr.coefs.iter().filter(|(_, c)| **c != 0) {
            terms.push(self.vars[var].scaled(narrow(coef)?));
        }
        if terms.is_empty() {
            return if expr.constant >= 0 {
                Ok(())
            } else {
                Err(Halt::Infeasible(what()))
            };
        }

        let rhs = narrow(-expr.constant)?;
        let tag = self.solver.new_constraint_tag();
        self.solver
            .add_constraint(cp::greater_than_or_equals(terms, rhs, tag))
            .post()
            .map_err(|_| Halt::Infeasible(what()))
    }

    fn exactly_one(&mut self, lits: &[Literal]) -> Result<(), Halt> {
        let sum = lits
            .iter()
            .fold(Linear::default(), |expr, &lit| self.literal(expr, lit, 1));
        let describe = || format!("exactly one of {} options must hold", lits.len());
        self.post(sum.clone().constant(-1), describe)?;
        self.post(sum.scaled(-1).constant(1), describe)
    }

    fn precedence(&mut self, before: IntervalId, after: IntervalId, delay: i64) -> Result<(), Halt> {
        let model = self.model;
        let (b, a) = (&model.intervals[before.0], &model.intervals[after.0]);
        let m = self.big_m;
        let expr = self.begin(Linear::default(), a, 1);
        let expr = self.begin(expr, b, -1).constant(-b.size - delay);
        let expr = self.absent(self.absent(expr, a, m), b, m);
        self.post(expr, || format!("'{}' cannot follow '{}'", a.name, b.name))
    }

    fn within_windows(&mut self, interval: IntervalId, windows: &[MinuteWindow]) -> Result<(), Halt> {
        let model = self.model;
        let iv = &model.intervals[interval.0];
        let m = self.big_m;
        let fitting: Vec<&MinuteWindow> = windows.iter().filter(|w| w.length() >= iv.size).collect();

        match fitting.as_slice() {
            [] => {
                let expr = self.absent(Linear::default(), iv, 1).constant(-1);
                self.post(expr, || format!("'{}' fits none of its windows", iv.name))
            }
            [window] => {
                let relax = self.absent(Linear::default(), iv, m);
                self.bound_within(iv, window, relax)
            }
            _ => {
                // At least one selected window while present.
                let mut chosen = self.absent(Linear::default(), iv, 1).constant(-1);
                for window in fitting.iter() {
                    let selector = self.new_var(0, 1)?;
                    let relax = Linear::default().term(selector, -m).constant(m);
                    self.bound_within(iv, window, relax)?;
                    chosen = chosen.term(selector, 1);
                }
                self.post(chosen, || format!("'{}' fits none of its windows", iv.name))
            }
        }
    }

    /// `window.start <= start + offset` and `start + offset + size <= window.end`, plus `relax`.
    fn bound_within(&mut self, iv: &IntervalVar, window: &MinuteWindow, relax: Linear) -> Result<(), Halt> {
        let lower = self.begin(relax.clone(), iv, 1).constant(-window.start);
        let upper = self.begin(relax, iv, -1).constant(window.end - iv.size);
        let describe = || {
            format!(
                "'{}' cannot lie within [{}, {})",
                iv.name, window.start, window.end
            )
        };
        self.post(lower, describe)?;
        self.post(upper, describe)
    }

    fn no_overlap(&mut self, ids: &[IntervalId]) -> Result<(), Halt> {
        let (model, m) = (self.model, self.big_m);
        for (k, x) in ids.iter().enumerate() {
            for y in &ids[k + 1..] {
                let (ix, iy) = (&model.intervals[x.0], &model.intervals[y.0]);
                if ix.size == 0 || iy.size == 0 {
                    continue;
                }
                // order = 1: x runs first.
                let order = self.new_var(0, 1)?;
                let slack = self.absent(self.absent(Linear::default(), ix, m), iy, m);

                let x_first = self.begin(slack.clone(), iy, 1);
                let x_first = self
                    .begin(x_first, ix, -1)
                    .constant(-ix.size + m)
                    .term(order, -m);
                let y_first = self.begin(slack, ix, 1);
                let y_first = self.begin(y_first, iy, -1).constant(-iy.size).term(order, m);

                let describe = || format!("'{}' and '{}' overlap", ix.name, iy.name);
                self.post(x_first, describe)?;
                self.post(y_first, describe)?;
            }
        }
        Ok(())
    }

    /// Objective variable bounded below by the model's objective.
    fn objective(&mut self) -> Result<DomainId, Halt> {
        let model = self.model;
        let mut cost = Linear::default();
        let mut upper = 0i64;
        for &(lit, coef) in &model.objective.terms {
            cost = self.literal(cost, lit, coef);
            upper = upper.saturating_add(coef);
        }

        if let Some(term) = &model.objective.makespan {
            let latest = term
                .intervals
                .iter()
                .map(|id| {
                    let iv = &model.intervals[id.0];
                    model.int_vars[iv.start.0].max + iv.offset + iv.size
                })
                .max()
                .unwrap_or(0)
                .max(0);
            let makespan = self.new_var(0, latest)?;
            for id in &term.intervals {
                let iv = &model.intervals[id.0];
                let expr = Linear::default().term(makespan, 1);
                let expr = self.begin(expr, iv, -1).constant(-iv.size);
                let expr = self.absent(expr, iv, self.big_m);
                self.post(expr, || format!("'{}' ends after the makespan bound", iv.name))?;
            }
            cost = cost.term(makespan, term.weight);
            upper = upper.saturating_add(term.weight.saturating_mul(latest));
        }

        let objective = self.new_var(0, upper)?;
        self.post(cost.scaled(-1).term(objective, 1), || {
            "objective has no value within its bounds".to_string()
        })?;
        Ok(self.vars[objective])
    }
}

/// A constant larger than any distance between interval endpoints,
/// window bounds and precedence delays in `model`.
fn big_m(model: &CpModel) -> i64 {
    let windows = model.constraints.iter().filter_map(|c| match c {
        CpConstraint::WithinWindows { windows, .. } => Some(windows),
        _ => None,
    });
    let (mut lo, mut hi) = (0i64, model.horizon.max(0));
    for var in &model.int_vars {
        lo = lo.min(var.min);
        hi = hi.max(var.max);
    }
    for w in windows.flatten() {
        lo = lo.min(w.start);
        hi = hi.max(w.end);
    }
    let reach = model
        .intervals
        .iter()
        .map(|iv| iv.offset.abs().saturating_add(iv.size))
        .max()
        .unwrap_or(0);
    let delay = model
        .constraints
        .iter()
        .filter_map(|c| match c {
            CpConstraint::Precedence { min_delay, .. } => Some(min_delay.abs()),
            _ => None,
        })
        .max()
        .unwrap_or(0);
    hi.saturating_sub(lo)
        .saturating_add(reach)
        .saturating_add(delay)
        .saturating_mul(2)
        .saturating_add(1)
}

fn narrow(value: i64) -> Result<i32, Halt> {
    i32::try_from(value)
        .map_err(|_| Halt::Invalid(format!("value {value} exceeds the solver's 32-bit range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cp::model::IntVarId;

    fn config() -> SolverConfig {
        SolverConfig::default().with_timeout_seconds(5)
    }

    fn solve(m: &CpModel) -> CpSolution {
        PumpkinCpSolver::new().solve(m, &config())
    }

    /// Two jobs on one machine, job B must follow job A.
    fn chain_model(horizon: i64) -> (CpModel, IntVarId, IntVarId) {
        let mut m = CpModel::new("chain", horizon);
        let a = m.new_int_var(0, horizon - 20, "a");
        let b = m.new_int_var(0, horizon - 30, "b");
        let ia = m.new_interval(a, 0, 20, "ia");
        let ib = m.new_interval(b, 0, 30, "ib");
        m.add_no_overlap(vec![ia, ib]);
        m.add_precedence(ia, ib, 0);
        m.set_makespan_objective(vec![ia, ib], 1);
        (m, a, b)
    }

    #[test]
    fn test_solve_chain() {
        let (m, a, b) = chain_model(100);
        let sol = solve(&m);
        assert_eq!(sol.status, CpStatus::Optimal);
        assert_eq!(sol.value(a), 0);
        assert_eq!(sol.value(b), 20);
        assert_eq!(sol.objective, Some(50));
    }

    #[test]
    fn test_chain_too_long_is_infeasible() {
        let (m, _, _) = chain_model(40);
        let sol = solve(&m);
        assert_eq!(sol.status, CpStatus::Infeasible);
        assert!(!sol.is_solution_found());
    }

    #[test]
    fn test_empty_domain_is_infeasible() {
        let mut m = CpModel::new("m", 10);
        m.new_int_var(8, 2, "s");
        let sol = solve(&m);
        assert_eq!(sol.status, CpStatus::Infeasible);
        assert!(sol.message.unwrap().contains("empty domain"));
    }

    #[test]
    fn test_malformed_model() {
        let mut m = CpModel::new("m", 10);
        m.add_no_overlap(vec![IntervalId(0)]);
        let sol = solve(&m);
        assert_eq!(sol.status, CpStatus::ModelInvalid);
        assert!(!sol.is_solution_found());
    }

    #[test]
    fn test_out_of_range_bound_is_invalid() {
        let mut m = CpModel::new("m", 10);
        m.new_int_var(0, 1 << 40, "s");
        let sol = solve(&m);
        assert_eq!(sol.status, CpStatus::ModelInvalid);
        assert!(sol.message.unwrap().contains("32-bit"));
    }

    /// One job, two machines; machine choice is an exactly-one group.
    #[test]
    fn test_optional_intervals_and_costs() {
        let mut m = CpModel::new("choice", 60);
        let s = m.new_int_var(0, 30, "s");
        let on_m1 = m.new_bool_var("m1");
        let on_m2 = m.new_bool_var("m2");
        let i1 = m.new_optional_interval(s, 0, 30, Literal::pos(on_m1), "i1");
        let i2 = m.new_optional_interval(s, 0, 30, Literal::pos(on_m2), "i2");
        m.add_exactly_one(vec![Literal::pos(on_m1), Literal::pos(on_m2)]);
        m.add_no_overlap(vec![i1]);
        m.add_no_overlap(vec![i2]);
        m.add_objective_term(Literal::neg(on_m2), 5);

        let sol = solve(&m);
        assert_eq!(sol.status, CpStatus::Optimal);
        assert!(sol.bool_value(on_m2));
        assert!(!sol.bool_value(on_m1));
        assert!(sol.literal_value(Literal::neg(on_m1)));
        assert_eq!(sol.objective, Some(0));
    }

    #[test]
    fn test_windows_push_start() {
        let mut m = CpModel::new("windows", 100);
        let s = m.new_int_var(0, 80, "s");
        let iv = m.new_interval(s, 0, 20, "iv");
        m.add_within_windows(iv, vec![MinuteWindow::new(0, 10), MinuteWindow::new(35, 60)]);
        m.set_makespan_objective(vec![iv], 1);

        let sol = solve(&m);
        assert_eq!(sol.status, CpStatus::Optimal);
        assert_eq!(sol.value(s), 35);
    }

    #[test]
    fn test_window_selected_among_several() {
        let mut m = CpModel::new("windows", 100);
        let s = m.new_int_var(20, 80, "s");
        let iv = m.new_interval(s, 0, 20, "iv");
        m.add_within_windows(
            iv,
            vec![
                MinuteWindow::new(0, 30),
                MinuteWindow::new(35, 60),
                MinuteWindow::new(70, 100),
            ],
        );
        m.set_makespan_objective(vec![iv], 1);

        let sol = solve(&m);
        assert_eq!(sol.status, CpStatus::Optimal);
        assert_eq!(sol.value(s), 35);
        assert_eq!(sol.objective, Some(55));
    }

    #[test]
    fn test_unavailable_choice_is_excluded() {
        let mut m = CpModel::new("avail", 60);
        let s = m.new_int_var(0, 30, "s");
        let x = m.new_bool_var("x");
        let y = m.new_bool_var("y");
        let ix = m.new_optional_interval(s, 0, 30, Literal::pos(x), "ix");
        let iy = m.new_optional_interval(s, 0, 30, Literal::pos(y), "iy");
        m.add_exactly_one(vec![Literal::pos(x), Literal::pos(y)]);
        m.add_within_windows(ix, vec![]);
        m.add_within_windows(iy, vec![MinuteWindow::new(0, 60)]);
        // x is cheaper, but has no availability.
        m.add_objective_term(Literal::pos(y), 3);

        let sol = solve(&m);
        assert_eq!(sol.status, CpStatus::Optimal);
        assert!(sol.bool_value(y));
        assert_eq!(sol.objective, Some(3));
    }

    #[test]
    fn test_no_overlap_orders_independent_jobs() {
        let mut m = CpModel::new("machine", 100);
        let a = m.new_int_var(0, 90, "a");
        let b = m.new_int_var(0, 50, "b");
        let ia = m.new_interval(a, 0, 10, "ia");
        let ib = m.new_interval(b, 0, 50, "ib");
        m.add_no_overlap(vec![ia, ib]);
        m.set_makespan_objective(vec![ia, ib], 1);

        let sol = solve(&m);
        assert_eq!(sol.status, CpStatus::Optimal);
        assert_eq!(sol.objective, Some(60));
        let (sa, sb) = (sol.value(a), sol.value(b));
        assert!(sa + 10 <= sb || sb + 50 <= sa);
    }

    #[test]
    fn test_absent_intervals_may_overlap() {
        let mut m = CpModel::new("absent", 60);
        let s = m.new_int_var(0, 30, "s");
        let t = m.new_int_var(0, 30, "t");
        let b = m.new_bool_var("b");
        let is = m.new_interval(s, 0, 30, "is");
        let it = m.new_optional_interval(t, 0, 30, Literal::pos(b), "it");
        m.add_no_overlap(vec![is, it]);
        m.add_objective_term(Literal::pos(b), 1);
        m.set_makespan_objective(vec![is], 1);

        let sol = solve(&m);
        assert_eq!(sol.status, CpStatus::Optimal);
        assert!(!sol.bool_value(b));
        assert_eq!(sol.value(s), 0);
        assert_eq!(sol.objective, Some(30));
    }

    /// Six chained 10-minute jobs fill a 60-minute horizon exactly, so the
    /// first must start at 0, but every machine opens at 5.
    #[test]
    fn test_search_proves_late_opening_infeasible() {
        let mut m = CpModel::new("late-open", 60);
        let mut jobs = Vec::new();
        let mut choices = Vec::new();
        for j in 0..6 {
            let s = m.new_int_var(0, 50, format!("s{j}"));
            jobs.push(m.new_interval(s, 0, 10, format!("job{j}")));
            choices.push(Vec::new());
        }
        for pair in jobs.windows(2) {
            m.add_precedence(pair[0], pair[1], 0);
        }
        for k in 0..8 {
            let mut on_machine = Vec::new();
            for (j, job) in jobs.iter().enumerate() {
                let b = m.new_bool_var(format!("m{k}_j{j}"));
                let start = m.intervals[job.0].start;
                let iv = m.new_optional_interval(start, 0, 10, Literal::pos(b), format!("m{k}_j{j}"));
                m.add_within_windows(iv, vec![MinuteWindow::new(5, 60)]);
                on_machine.push(iv);
                choices[j].push(Literal::pos(b));
            }
            m.add_no_overlap(on_machine);
        }
        for lits in choices {
            m.add_exactly_one(lits);
        }
        m.set_makespan_objective(jobs, 1);

        let sol = solve(&m);
        assert_eq!(sol.status, CpStatus::Infeasible);
        assert!(sol.wall_time < config().time_limit());
    }
}
