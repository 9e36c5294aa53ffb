mod axis;
mod predicate;

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexSet;
use regex::Regex;
use spelunk_path::ast::Anchor;
use spelunk_path::ast::PathExpr;
use spelunk_path::ast::PredExpr;
use spelunk_path::ast::Step;

use crate::error::EvalError;
use crate::error::EvalWarning;
use crate::host::DocumentOrder;
use crate::host::SyntaxHost;
use crate::Cancellation;

/// The outcome of a successful evaluation: matched nodes in document order,
/// no duplicates, plus any warnings raised along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation<N> {
    pub nodes: Vec<N>,
    pub warnings: Vec<EvalWarning>,
}

/// Evaluates `path` against `host` with default settings, starting at the
/// host root.
pub fn evaluate<H: SyntaxHost>(
    path: &PathExpr,
    host: &H,
) -> Result<Evaluation<H::Node>, EvalError<H::Node>> {
    Evaluator::new(host).evaluate(path)
}

/// Executes parsed paths against a [`SyntaxHost`].
///
/// The evaluator holds nothing but configuration between runs; one instance
/// can serve any number of paths and trees, from any number of threads when
/// the host is `Sync`.
pub struct Evaluator<'a, H: SyntaxHost> {
    host: &'a H,
    cancellation: Option<Cancellation>,
}

impl<'a, H: SyntaxHost> Evaluator<'a, H> {
    pub fn new(host: &'a H) -> Self {
        Evaluator {
            host,
            cancellation: None,
        }
    }

    /// Configure a cancellation token, checked between steps.
    pub fn cancellation(mut self, token: Cancellation) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Evaluate with the host root as context node.
    pub fn evaluate(&self, path: &PathExpr) -> Result<Evaluation<H::Node>, EvalError<H::Node>> {
        let root = self.host.root().map_err(|e| host_error(0, e))?;
        self.evaluate_from(path, root)
    }

    /// Evaluate with an explicit context node; relative paths start there,
    /// absolute paths still start at the root.
    pub fn evaluate_from(
        &self,
        path: &PathExpr,
        context: H::Node,
    ) -> Result<Evaluation<H::Node>, EvalError<H::Node>> {
        let mut run = Run {
            host: self.host,
            cancellation: self.cancellation.clone(),
            warnings: Vec::new(),
            regexes: HashMap::new(),
        };
        let nodes = run.eval_path(path, vec![context])?;
        tracing::debug!(
            matches = nodes.len(),
            warnings = run.warnings.len(),
            "path evaluated"
        );
        Ok(Evaluation {
            nodes,
            warnings: run.warnings,
        })
    }
}

/// Mutable state of one evaluation: accumulated warnings and the regex
/// cache shared by every `@matches` in the query.
pub(crate) struct Run<'a, H: SyntaxHost> {
    pub(crate) host: &'a H,
    cancellation: Option<Cancellation>,
    pub(crate) warnings: Vec<EvalWarning>,
    regexes: HashMap<String, Option<Regex>>,
}

impl<'a, H: SyntaxHost> Run<'a, H> {
    pub(crate) fn eval_path(
        &mut self,
        path: &PathExpr,
        context: Vec<H::Node>,
    ) -> Result<Vec<H::Node>, EvalError<H::Node>> {
        let mut frontier = match path.anchor {
            Anchor::Absolute => vec![self.host.root().map_err(|e| host_error(0, e))?],
            Anchor::Relative => context,
        };
        for (index, step) in path.steps.iter().enumerate() {
            self.check_cancelled(&frontier)?;
            frontier = self.eval_step(step, index, &frontier)?;
            tracing::trace!(step = index, frontier = frontier.len(), "step applied");
        }
        Ok(frontier)
    }

    /// One step: per origin, expand the axis, filter by node test, run the
    /// predicates over the per-origin candidate collection; then merge,
    /// dedupe and restore document order across origins.
    fn eval_step(
        &mut self,
        step: &Step,
        index: usize,
        frontier: &[H::Node],
    ) -> Result<Vec<H::Node>, EvalError<H::Node>> {
        let mut merged: IndexSet<H::Node> = IndexSet::new();
        for origin in frontier {
            let mut candidates = self.candidates(step, index, origin)?;
            for predicate in &step.predicates {
                candidates = self.apply_predicate(predicate, index, candidates)?;
            }
            merged.extend(candidates);
        }
        self.in_document_order(index, merged)
    }

    fn candidates(
        &mut self,
        step: &Step,
        index: usize,
        origin: &H::Node,
    ) -> Result<Vec<H::Node>, EvalError<H::Node>> {
        let expanded =
            axis::expand(self.host, step.axis, origin).map_err(|e| host_error(index, e))?;
        let mut kept = Vec::with_capacity(expanded.len());
        for node in expanded {
            if predicate::node_test_matches(self.host, &step.node_test, index, &node)? {
                kept.push(node);
            }
        }
        Ok(kept)
    }

    fn apply_predicate(
        &mut self,
        predicate: &PredExpr,
        step: usize,
        candidates: Vec<H::Node>,
    ) -> Result<Vec<H::Node>, EvalError<H::Node>> {
        // a lone positional predicate selects within the collection; any
        // other predicate filters node by node
        if let PredExpr::Position(test) = predicate {
            return Ok(predicate::select_position(*test, candidates));
        }
        let len = candidates.len();
        let mut kept = Vec::with_capacity(len);
        for (index, node) in candidates.into_iter().enumerate() {
            let ctx = predicate::PredContext { index, len };
            if predicate::eval(self, predicate, step, &node, ctx)? {
                kept.push(node);
            }
        }
        Ok(kept)
    }

    fn in_document_order(
        &self,
        step: usize,
        nodes: IndexSet<H::Node>,
    ) -> Result<Vec<H::Node>, EvalError<H::Node>> {
        let mut keyed: Vec<(DocumentOrder, H::Node)> = Vec::with_capacity(nodes.len());
        for node in nodes {
            let key = self
                .host
                .document_order(&node)
                .map_err(|e| host_error(step, e))?;
            keyed.push((key, node));
        }
        keyed.sort_by_key(|(key, _)| *key);
        Ok(keyed.into_iter().map(|(_, node)| node).collect())
    }

    /// Compiles and caches a `@matches` pattern; a failure warns once per
    /// pattern and pins the predicate to false.
    pub(crate) fn regex(&mut self, step: usize, pattern: &str) -> Option<Regex> {
        if let Some(cached) = self.regexes.get(pattern) {
            return cached.clone();
        }
        let compiled = match Regex::new(pattern) {
            Ok(regex) => Some(regex),
            Err(error) => {
                tracing::debug!(pattern, %error, "regex rejected");
                self.warnings.push(EvalWarning::BadRegex {
                    step,
                    pattern: pattern.to_string(),
                    message: error.to_string(),
                });
                None
            }
        };
        self.regexes.insert(pattern.to_string(), compiled.clone());
        compiled
    }

    fn check_cancelled(&self, frontier: &[H::Node]) -> Result<(), EvalError<H::Node>> {
        if self
            .cancellation
            .as_ref()
            .is_some_and(Cancellation::is_cancelled)
        {
            return Err(EvalError::Cancelled {
                partial: frontier.to_vec(),
            });
        }
        Ok(())
    }
}

pub(crate) fn host_error<N: fmt::Debug>(step: usize, error: impl fmt::Display) -> EvalError<N> {
    EvalError::Host {
        step,
        message: error.to_string(),
    }
}
