//! Dependency-respecting linearization of core terms.
//!
//! A timeline is a flat instruction stream analogous to the SSA form of an
//! expression tree: every identifier is defined before any use, function
//! operands are sequenced before argument operands, and each nested scope is
//! one atomic step carrying its own private sub-timeline.

use std::fmt;

use fxhash::FxHashSet;

use crate::core::{ScopeArg, ScopeGroup, Term};
use crate::env::TermId;

/// A single scheduling step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Apply `function` to `argument`, producing `id`.
    Call {
        id: TermId,
        function: TermId,
        argument: TermId,
    },
    /// Enter a scope: bind each argument as a fresh input, run `body`, and
    /// expose `output` as the scope's externally visible result, bound to
    /// `id`.
    Nested {
        id: TermId,
        args: Vec<ScopeArg>,
        output: TermId,
        body: Timeline,
    },
}

impl Step {
    /// The identifier this step produces.
    pub fn produces(&self) -> TermId {
        match self {
            Step::Call { id, .. } | Step::Nested { id, .. } => *id,
        }
    }

    /// Whether this step mentions `id`, looking through nested sub-timelines.
    /// Used by the layout synthesizer's liveness checks.
    pub fn mentions(&self, id: TermId) -> bool {
        match self {
            Step::Call {
                function, argument, ..
            } => *function == id || *argument == id,
            Step::Nested {
                args, output, body, ..
            } => {
                *output == id
                    || args.iter().any(|arg| arg.id == id)
                    || body.steps().iter().any(|step| step.mentions(id))
            }
        }
    }
}

/// An ordered sequence of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    steps: Vec<Step>,
}

impl Timeline {
    pub fn new() -> Timeline {
        Timeline { steps: Vec::new() }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    fn push(&mut self, step: Step) {
        self.steps.push(step);
    }

    fn append(&mut self, mut other: Timeline) {
        self.steps.append(&mut other.steps);
    }

    /// Identifiers this timeline references without producing them: uses of
    /// enclosing-scope bindings. `args` are the scope's own inputs and
    /// `output` its result, which counts as a final reference. First-reference
    /// order.
    pub fn free_ids(&self, args: &[ScopeArg], output: TermId) -> Vec<TermId> {
        let mut bound: FxHashSet<TermId> = args.iter().map(|arg| arg.id).collect();
        let mut seen = FxHashSet::default();
        let mut free = Vec::new();

        let mut record = |id: TermId, bound: &FxHashSet<TermId>| {
            if !bound.contains(&id) && seen.insert(id) {
                free.push(id);
            }
        };

        for step in &self.steps {
            match step {
                Step::Call {
                    id,
                    function,
                    argument,
                } => {
                    record(*function, &bound);
                    record(*argument, &bound);
                    bound.insert(*id);
                }
                Step::Nested {
                    id,
                    args,
                    output,
                    body,
                } => {
                    for free_id in body.free_ids(args, *output) {
                        record(free_id, &bound);
                    }
                    bound.insert(*id);
                }
            }
        }
        record(output, &bound);

        free
    }

    /// Check the definition-before-use invariant: every referenced identifier
    /// was produced by an earlier step of this or an enclosing scope, or is
    /// one of the declared `inputs`.
    pub fn check_scoped(&self, inputs: &[TermId]) -> Result<(), ScopeViolation> {
        let defined: FxHashSet<TermId> = inputs.iter().copied().collect();
        self.check_steps(defined).map(|_| ())
    }

    fn check_steps(
        &self,
        mut defined: FxHashSet<TermId>,
    ) -> Result<FxHashSet<TermId>, ScopeViolation> {
        for step in &self.steps {
            match step {
                Step::Call {
                    id,
                    function,
                    argument,
                } => {
                    for reference in [*function, *argument] {
                        if !defined.contains(&reference) {
                            return Err(ScopeViolation {
                                step: *id,
                                reference,
                            });
                        }
                    }
                    defined.insert(*id);
                }
                Step::Nested {
                    id,
                    args,
                    output,
                    body,
                } => {
                    let mut inner = defined.clone();
                    inner.extend(args.iter().map(|arg| arg.id));
                    let inner = body.check_steps(inner)?;
                    if !inner.contains(output) {
                        return Err(ScopeViolation {
                            step: *id,
                            reference: *output,
                        });
                    }
                    defined.insert(*id);
                }
            }
        }
        Ok(defined)
    }
}

impl FromIterator<Step> for Timeline {
    fn from_iter<I: IntoIterator<Item = Step>>(iter: I) -> Timeline {
        Timeline {
            steps: iter.into_iter().collect(),
        }
    }
}

/// A step referenced an identifier that was not defined before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeViolation {
    /// The offending step's produced identifier.
    pub step: TermId,
    /// The identifier it referenced too early.
    pub reference: TermId,
}

impl fmt::Display for ScopeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {} references {} before it is defined",
            self.step, self.reference
        )
    }
}

/// Linearize a core term into a timeline, returning the identifier of the
/// term's overall result.
pub fn linearize(term: &Term<'_>) -> (Timeline, TermId) {
    match term {
        Term::Var(id) => (Timeline::new(), *id),
        Term::Abs { .. } => {
            let group = ScopeGroup::of(term).expect("abstractions always group");
            let (body, output) = linearize(group.body);

            let mut timeline = Timeline::new();
            timeline.push(Step::Nested {
                id: group.id,
                args: group.args,
                output,
                body,
            });
            (timeline, group.id)
        }
        Term::App {
            id,
            function,
            argument,
        } => {
            // Function operands are sequenced before argument operands.
            let (mut timeline, function) = linearize(function);
            let (argument_timeline, argument) = linearize(argument);
            timeline.append(argument_timeline);
            timeline.push(Step::Call {
                id: *id,
                function,
                argument,
            });
            (timeline, *id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{self, indexing};
    use scoped_arena::Scope;

    fn linearized(source: &str) -> (Timeline, TermId) {
        let scope = Scope::new();
        let mut files = crate::files::Files::new();
        let file_id = files.add("<test>".to_owned(), source.to_owned());
        let term = surface::parse_term(&scope, file_id, source).unwrap();
        let term = indexing::Context::new(&scope).index(term).unwrap();
        linearize(term)
    }

    #[test]
    fn first_combinator_is_a_single_nested_step() {
        // λx.λy. x groups into one scope over [x, y] whose output is x and
        // whose body does nothing.
        let (timeline, result) = linearized(r"\x y. x");

        assert_eq!(timeline.steps().len(), 1);
        match &timeline.steps()[0] {
            Step::Nested {
                id,
                args,
                output,
                body,
            } => {
                assert_eq!(*id, result);
                assert_eq!(args.len(), 2);
                assert_eq!(args[0].name.resolve(), "x");
                assert_eq!(args[1].name.resolve(), "y");
                assert_eq!(*output, args[0].id);
                assert!(body.is_empty());
            }
            step => panic!("expected nested step, got {step:?}"),
        }
    }

    #[test]
    fn apply_combinator_nests_a_single_call() {
        let (timeline, _) = linearized(r"\f x. f x");

        match &timeline.steps()[0] {
            Step::Nested {
                args, output, body, ..
            } => {
                assert_eq!(body.steps().len(), 1);
                match &body.steps()[0] {
                    Step::Call {
                        id,
                        function,
                        argument,
                    } => {
                        assert_eq!(*function, args[0].id);
                        assert_eq!(*argument, args[1].id);
                        assert_eq!(output, id);
                    }
                    step => panic!("expected call step, got {step:?}"),
                }
            }
            step => panic!("expected nested step, got {step:?}"),
        }
    }

    #[test]
    fn function_operands_are_sequenced_before_arguments() {
        // c (a b) must emit the `a b` call before the outer call, and the
        // outer call's function operand is c.
        let (timeline, _) = linearized(r"\a b c. c (a b)");

        match &timeline.steps()[0] {
            Step::Nested { args, body, .. } => {
                let steps = body.steps();
                assert_eq!(steps.len(), 2);
                let inner = match &steps[0] {
                    Step::Call { id, function, argument } => {
                        assert_eq!(*function, args[0].id);
                        assert_eq!(*argument, args[1].id);
                        *id
                    }
                    step => panic!("expected call step, got {step:?}"),
                };
                match &steps[1] {
                    Step::Call { function, argument, .. } => {
                        assert_eq!(*function, args[2].id);
                        assert_eq!(*argument, inner);
                    }
                    step => panic!("expected call step, got {step:?}"),
                }
            }
            step => panic!("expected nested step, got {step:?}"),
        }
    }

    #[test]
    fn linearization_is_deterministic() {
        let source = r"\f x. f (f x)";
        assert_eq!(linearized(source), linearized(source));
    }

    #[test]
    fn timelines_define_before_use() {
        for source in [r"\x y. x", r"\f x. f x", r"\a b c. c (a b)", r"\x. x (\y. x y)"] {
            let (timeline, _) = linearized(source);
            timeline.check_scoped(&[]).unwrap();
        }
    }

    #[test]
    fn check_scoped_rejects_forward_references() {
        let (timeline, _) = linearized(r"\f x. f x");
        let nested = match &timeline.steps()[0] {
            Step::Nested { body, .. } => body.clone(),
            step => panic!("expected nested step, got {step:?}"),
        };
        // The inner call's operands are the scope's arguments, which are not
        // declared when the body is checked on its own.
        assert!(nested.check_scoped(&[]).is_err());
    }

    #[test]
    fn inner_scopes_report_captured_ids_as_free() {
        let (timeline, _) = linearized(r"\x. x (\y. x y)");

        match &timeline.steps()[0] {
            Step::Nested { args, output, body, .. } => {
                let x = args[0].id;
                // The outer scope closes over nothing.
                assert_eq!(body.free_ids(args, *output), Vec::new());

                match &body.steps()[0] {
                    Step::Nested { args, output, body, .. } => {
                        // The inner scope references x from the enclosing
                        // scope.
                        assert_eq!(body.free_ids(args, *output), vec![x]);
                    }
                    step => panic!("expected nested step, got {step:?}"),
                }
            }
            step => panic!("expected nested step, got {step:?}"),
        }
    }
}
