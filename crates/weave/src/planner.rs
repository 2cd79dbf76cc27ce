//! Weaving planner.
//!
//! Decides which rules of a member are injected and in what order. Steps run
//! by ascending priority; equal priorities keep declaration order, which is
//! parameters left to right (each in attribute order) followed by member
//! rules. When any member rule is planned, one snapshot capture is scheduled
//! ahead of every other step.

use warden_rules::RuleKind;

use crate::diagnostics::{Diagnostic, DiagnosticSink, Location, MessageId};
use crate::resolver::{ResolvedMember, RuleDecl};

/// One injected call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannedStep {
    /// Build the parameter snapshot.
    CaptureSnapshot,
    /// Run `member.parameters[parameter].rules[rule]`.
    Parameter { parameter: usize, rule: usize },
    /// Run `member.member_rules[rule]`.
    Member { rule: usize },
}

/// A step with the keys it was ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub step: PlannedStep,
    pub priority: i64,
    /// Position in declaration order.
    pub order: usize,
}

/// Ordered steps for one member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeavePlan {
    steps: Vec<Scheduled>,
}

impl WeavePlan {
    pub fn steps(&self) -> impl Iterator<Item = PlannedStep> + '_ {
        self.steps.iter().map(|scheduled| scheduled.step)
    }

    pub fn scheduled(&self) -> &[Scheduled] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn needs_snapshot(&self) -> bool {
        self.steps
            .first()
            .is_some_and(|scheduled| scheduled.step == PlannedStep::CaptureSnapshot)
    }

    /// Number of rule calls, snapshot excluded.
    pub fn rule_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|scheduled| scheduled.step != PlannedStep::CaptureSnapshot)
            .count()
    }
}

/// Whether `rule` must be injected into `member`.
pub fn requires_weave(member: &ResolvedMember, rule: &RuleDecl) -> bool {
    !rule.rejected && !member.readonly && member.has_body
}

/// Builds the plan for `member`, reporting rules that are skipped.
pub fn plan(member: &ResolvedMember, sink: &mut dyn DiagnosticSink) -> WeavePlan {
    let location = |rule: &RuleDecl| Location::new(member.path.clone(), rule.span);
    let accepted = member.rules().filter(|rule| !rule.rejected).count();

    if accepted > 0 && member.readonly {
        for rule in member.rules().filter(|rule| !rule.rejected) {
            sink.report(Diagnostic::verbose(
                MessageId::ReadOnlySkipped,
                format!("`{}` skipped: `{}` is read-only", rule.kind, member.path),
                location(rule),
            ));
        }
    } else if accepted > 0 && !member.has_body {
        sink.report(Diagnostic::error(
            MessageId::MissingBody,
            format!("`{}` has validation rules but no body to weave them into", member.path),
            Location::new(member.path.clone(), member.span),
        ));
    }

    let mut order = 0_usize;
    let mut steps = Vec::new();

    for (p, parameter) in member.parameters.iter().enumerate() {
        for (r, rule) in parameter.rules.iter().enumerate() {
            if requires_weave(member, rule) {
                steps.push(Scheduled {
                    step: PlannedStep::Parameter { parameter: p, rule: r },
                    priority: rule.priority,
                    order,
                });
            }
            order += 1;
        }
    }

    for (r, rule) in member.member_rules.iter().enumerate() {
        if requires_weave(member, rule) {
            steps.push(Scheduled {
                step: PlannedStep::Member { rule: r },
                priority: rule.priority,
                order,
            });
        }
        order += 1;
    }

    steps.sort_by_key(|scheduled| (scheduled.priority, scheduled.order));

    if steps.iter().any(|scheduled| matches!(scheduled.step, PlannedStep::Member { .. })) {
        let first = steps.first().map_or(0, |scheduled| scheduled.priority);
        steps.insert(
            0,
            Scheduled {
                step: PlannedStep::CaptureSnapshot,
                priority: first,
                order: 0,
            },
        );
    }

    tracing::debug!(
        member = %member.path,
        steps = steps.len(),
        snapshot = steps.first().is_some_and(|s| s.step == PlannedStep::CaptureSnapshot),
        "planned weave"
    );

    WeavePlan { steps }
}

/// The kind of rule a step runs; `None` for the snapshot.
pub fn step_kind(member: &ResolvedMember, step: PlannedStep) -> Option<RuleKind> {
    match step {
        PlannedStep::CaptureSnapshot => None,
        PlannedStep::Parameter { parameter, rule } => member
            .parameters
            .get(parameter)
            .and_then(|parameter| parameter.rules.get(rule))
            .map(|rule| rule.kind),
        PlannedStep::Member { rule } => member.member_rules.get(rule).map(|rule| rule.kind),
    }
}
