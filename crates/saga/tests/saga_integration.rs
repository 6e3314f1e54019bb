//! Integration tests for the compensation trigger.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use common::InstanceId;
use saga::{
    CompensableStatesPolicy, CompensationPolicy, CompensationTrigger, CompletionListener,
    ExecutionFailure, ExecutionStatus, InMemoryStateLogStore, ProcessContext, SagaError,
    StateInstance, StateLogStore, StateMachineInstance, StateMachineTerminator, TriggerOutcome,
};

type TestTrigger = CompensationTrigger<
    InMemoryStateLogStore,
    CompensableStatesPolicy,
    StateMachineTerminator<InMemoryStateLogStore>,
>;

#[derive(Default)]
struct FinishedCounter(AtomicUsize);

impl CompletionListener for FinishedCounter {
    fn on_finished(&self, _instance: &StateMachineInstance) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

struct TestHarness {
    trigger: TestTrigger,
    store: InMemoryStateLogStore,
    finished: Arc<FinishedCounter>,
}

impl TestHarness {
    fn new() -> Self {
        let store = InMemoryStateLogStore::new();
        let finished = Arc::new(FinishedCounter::default());
        let mut terminator = StateMachineTerminator::new(store.clone());
        terminator.register(finished.clone());

        let trigger = CompensationTrigger::new(store.clone(), CompensableStatesPolicy, terminator);

        Self {
            trigger,
            store,
            finished,
        }
    }

    /// Runs a transfer saga forward: debit, deposit, notify. Every step is
    /// logged to the store as well as kept on the instance.
    async fn run_transfer(&self) -> ProcessContext {
        let mut inst = StateMachineInstance::new(InstanceId::new(), "transfer")
            .with_business_key("transfer-001")
            .with_status(ExecutionStatus::Running);

        for (id, name, undo) in [
            ("s1", "Debit", "Credit"),
            ("s2", "Deposit", "Withdraw"),
            ("s3", "Notify", "Retract"),
        ] {
            let step = StateInstance::compensable(id, name, undo);
            self.store.record_state(inst.id(), step.clone()).await;
            inst.push_state(step);
        }

        let mut ctx = ProcessContext::new(inst);
        ctx.set_current_state("CompensationTrigger");
        ctx.capture_exception(ExecutionFailure::in_state("Audit", "audit service down"));
        ctx
    }

    fn finished_count(&self) -> usize {
        self.finished.0.load(Ordering::SeqCst)
    }
}

fn drain_names(ctx: &mut ProcessContext) -> Vec<String> {
    let holder = ctx.compensation_holder_mut();
    std::iter::from_fn(|| holder.pop())
        .map(|s| s.name().to_string())
        .collect()
}

#[tokio::test]
async fn test_live_failure_starts_compensation() {
    let h = TestHarness::new();
    let mut ctx = h.run_transfer().await;

    let outcome = h.trigger.trigger_compensation(&mut ctx).await.unwrap();

    assert_eq!(outcome, TriggerOutcome::Compensating { queued: 3 });
    assert_eq!(ctx.instance().status(), Some(ExecutionStatus::Unknown));
    assert_eq!(
        ctx.instance().compensation_status(),
        Some(ExecutionStatus::Running)
    );
    assert_eq!(
        ctx.instance().exception().map(|e| e.message.as_str()),
        Some("audit service down")
    );
    assert_eq!(ctx.compensation_trigger_state(), Some("CompensationTrigger"));
    assert_eq!(drain_names(&mut ctx), ["Notify", "Deposit", "Debit"]);
    assert_eq!(h.finished_count(), 0);
}

#[tokio::test]
async fn test_recovery_sweep_rebuilds_plan_from_store() {
    let h = TestHarness::new();
    let live = h.run_transfer().await;
    let id = live.instance().id();
    drop(live);

    // The recovery sweep only has the instance header, with the forward
    // outcome it recorded before the crash.
    let recovered = StateMachineInstance::new(id, "transfer").with_status(ExecutionStatus::Failed);
    let mut ctx = ProcessContext::new(recovered);

    h.trigger.trigger_compensation(&mut ctx).await.unwrap();

    assert_eq!(ctx.instance().status(), Some(ExecutionStatus::Failed));
    assert_eq!(
        ctx.instance().compensation_status(),
        Some(ExecutionStatus::Running)
    );
    assert_eq!(drain_names(&mut ctx), ["Notify", "Deposit", "Debit"]);
}

#[tokio::test]
async fn test_repeated_recovery_reaches_same_decision() {
    let h = TestHarness::new();
    let id = h.run_transfer().await.instance().id();

    let mut plans = Vec::new();
    for _ in 0..3 {
        let inst = StateMachineInstance::new(id, "transfer").with_status(ExecutionStatus::Unknown);
        let mut ctx = ProcessContext::new(inst);
        let outcome = h.trigger.trigger_compensation(&mut ctx).await.unwrap();
        plans.push((outcome, ctx.instance().status(), drain_names(&mut ctx)));
    }

    assert!(plans.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn test_fully_compensated_history_ends_once() {
    let h = TestHarness::new();
    let mut inst = StateMachineInstance::new(InstanceId::new(), "transfer")
        .with_status(ExecutionStatus::Running);
    for id in ["s1", "s2"] {
        let mut step = StateInstance::compensable(id, format!("Step{id}"), "Undo");
        step.set_compensation_status(ExecutionStatus::Succeed);
        inst.push_state(step);
    }
    let mut ctx = ProcessContext::new(inst);

    let outcome = h.trigger.trigger_compensation(&mut ctx).await.unwrap();

    assert_eq!(outcome, TriggerOutcome::Ended);
    assert_eq!(h.finished_count(), 1);
    assert!(ctx.instance().compensation_status().is_none());
    assert_eq!(ctx.instance().status(), Some(ExecutionStatus::Succeed));

    let again = h.trigger.trigger_compensation(&mut ctx).await;
    assert!(matches!(again, Err(SagaError::AlreadyEnded(_))));
    assert_eq!(h.finished_count(), 1);
    assert_eq!(h.store.finished_count().await, 1);
}

#[tokio::test]
async fn test_contexts_compensate_in_parallel() {
    let h = Arc::new(TestHarness::new());

    let mut handles = Vec::new();
    for _ in 0..16 {
        let h = h.clone();
        handles.push(tokio::spawn(async move {
            let mut ctx = h.run_transfer().await;
            h.trigger.trigger_compensation(&mut ctx).await.unwrap();
            drain_names(&mut ctx)
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), ["Notify", "Deposit", "Debit"]);
    }
}

/// Only compensates steps whose name starts with the scope prefix, the way
/// a sub-process compensates only its own steps.
struct ScopedPolicy(&'static str);

impl CompensationPolicy for ScopedPolicy {
    fn states_to_compensate(
        &self,
        _context: &ProcessContext,
        history: &[StateInstance],
    ) -> Vec<StateInstance> {
        history
            .iter()
            .filter(|s| s.name().starts_with(self.0))
            .filter(|s| CompensableStatesPolicy::needs_compensation(s))
            .cloned()
            .collect()
    }
}

#[tokio::test]
async fn test_custom_policy_controls_scope() {
    let store = InMemoryStateLogStore::new();
    let trigger = CompensationTrigger::new(
        store.clone(),
        ScopedPolicy("Sub"),
        StateMachineTerminator::new(store),
    );

    let mut inst = StateMachineInstance::new(InstanceId::new(), "parent")
        .with_status(ExecutionStatus::Running);
    inst.push_state(StateInstance::compensable("p1", "Reserve", "Release"));
    inst.push_state(StateInstance::compensable("c1", "SubCharge", "SubRefund"));
    inst.push_state(StateInstance::compensable("c2", "SubShip", "SubRecall"));
    let mut ctx = ProcessContext::new(inst);

    let outcome = trigger.trigger_compensation(&mut ctx).await.unwrap();

    assert_eq!(outcome, TriggerOutcome::Compensating { queued: 2 });
    assert_eq!(drain_names(&mut ctx), ["SubShip", "SubCharge"]);
}

struct BrokenStore;

#[async_trait]
impl StateLogStore for BrokenStore {
    async fn query_state_instances(&self, _id: InstanceId) -> saga::Result<Vec<StateInstance>> {
        Err(SagaError::Store("connection refused".to_string()))
    }

    async fn record_state_machine_finished(
        &self,
        _instance: &StateMachineInstance,
    ) -> saga::Result<()> {
        Err(SagaError::Store("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_store_failure_leaves_context_untouched() {
    let trigger = CompensationTrigger::new(
        BrokenStore,
        CompensableStatesPolicy,
        StateMachineTerminator::new(BrokenStore),
    );
    let inst = StateMachineInstance::new(InstanceId::new(), "transfer")
        .with_status(ExecutionStatus::Running);
    let mut ctx = ProcessContext::new(inst);
    ctx.capture_exception(ExecutionFailure::new("forward failure"));

    let err = trigger.trigger_compensation(&mut ctx).await.unwrap_err();

    assert!(matches!(err, SagaError::Store(_)));
    assert_eq!(ctx.instance().status(), Some(ExecutionStatus::Running));
    assert!(ctx.current_exception().is_some());
    assert!(!ctx.is_ended());
}
