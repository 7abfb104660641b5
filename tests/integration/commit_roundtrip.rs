use std::sync::Arc;

use proxy_order::graph::vocab;
use proxy_order::{
    BareMember, BareResolver, CounterMetrics, GraphDelta, MemberContext, MemberId, MemoryStore,
    OrderError, OrderOptions, OrderedList, Persister, Statement, Term, UriTranslator,
};

const BASE: &str = "http://example.org/objects";
const AGG: &str = "http://example.org/agg/1";

fn translator() -> UriTranslator {
    UriTranslator::new(BASE)
}

fn member(id: &str) -> BareMember {
    BareMember::new(&translator(), id)
}

fn ctx() -> MemberContext<BareMember> {
    MemberContext::<BareMember>::new(Arc::new(BareResolver::new(translator())))
}

fn id_list(ids: &[&str]) -> Vec<MemberId> {
    ids.iter().map(|id| MemberId::new(*id)).collect()
}

fn load(store: &Arc<MemoryStore>) -> OrderedList<BareMember> {
    OrderedList::load(store.clone(), Term::iri(AGG), ctx(), OrderOptions::new()).unwrap()
}

fn seeded(ids: &[&str]) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    let mut list = load(&store);
    list.sequence()
        .concat(ids.iter().map(|id| member(id)))
        .unwrap();
    list.commit(store.as_ref()).unwrap();
    store
}

struct Unavailable;

impl Persister for Unavailable {
    fn commit(&self, _delta: &GraphDelta) -> proxy_order::Result<()> {
        Err(OrderError::Commit("store unavailable".into()))
    }
}

#[test]
fn graph_form_reopens_to_the_same_order() {
    let store = Arc::new(MemoryStore::new());
    let mut list =
        OrderedList::open(store.clone(), None, None, ctx(), OrderOptions::new()).unwrap();
    for id in ["a", "b", "c", "b"] {
        list.append_target(member(id), None).unwrap();
    }
    let graph = list.to_graph().unwrap();
    assert_eq!(graph.len(), 4 + 3 * 2);

    let copy = Arc::new(MemoryStore::from_graph(graph));
    let reopened = OrderedList::open(
        copy,
        list.head_subject().cloned(),
        list.tail_subject().cloned(),
        ctx(),
        OrderOptions::new(),
    )
    .unwrap();
    assert_eq!(reopened.target_ids().unwrap(), id_list(&["a", "b", "c", "b"]));
    assert!(!reopened.is_changed());
}

#[test]
fn anchored_list_rewrites_first_and_last() {
    let store = seeded(&["a", "b", "c"]);
    let anchor = Term::iri(AGG);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.objects(&anchor, &vocab::first()).count(), 1);
    assert_eq!(snapshot.objects(&anchor, &vocab::last()).count(), 1);

    let mut list = load(&store);
    assert_eq!(list.target_ids().unwrap(), id_list(&["a", "b", "c"]));
    assert_eq!(list.anchor(), Some(&anchor));

    list.delete_at(0).unwrap();
    list.delete_at(1).unwrap();
    let delta = list.commit(store.as_ref()).unwrap();
    assert!(!delta.is_empty());
    assert!(!list.is_changed());

    let reloaded = load(&store);
    assert_eq!(reloaded.target_ids().unwrap(), id_list(&["b"]));
    assert_eq!(reloaded.head_subject(), reloaded.tail_subject());
    let only = reloaded.head_subject().cloned().unwrap();
    assert!(store
        .snapshot()
        .contains(&Statement::new(anchor.clone(), vocab::first(), only.clone())));
    assert!(store
        .snapshot()
        .contains(&Statement::new(anchor, vocab::last(), only)));
}

#[test]
fn removed_nodes_leave_the_store() {
    let store = seeded(&["a", "b", "c"]);
    let mut list = load(&store);
    let middle = list.get(1).unwrap().unwrap();
    let middle_subject = list.subject_of(middle).unwrap();
    list.delete_node(middle).unwrap();
    list.commit(store.as_ref()).unwrap();

    let snapshot = store.snapshot();
    assert!(snapshot.matching(&middle_subject, &vocab::proxy_for()).next().is_none());
    assert!(snapshot.matching(&middle_subject, &vocab::next()).next().is_none());
    assert_eq!(load(&store).target_ids().unwrap(), id_list(&["a", "c"]));
}

#[test]
fn failed_commit_keeps_pending_state() {
    let store = seeded(&["a"]);
    let before = store.snapshot();
    let mut list = load(&store);
    list.append_target(member("b"), None).unwrap();
    let pending = list.delta().unwrap();
    assert!(!pending.is_empty());

    let err = list.commit(&Unavailable).unwrap_err();
    assert!(matches!(err, OrderError::Commit(_)));
    assert!(list.is_changed());
    assert_eq!(list.delta().unwrap(), pending);
    assert_eq!(store.snapshot(), before);

    let applied = list.commit(store.as_ref()).unwrap();
    assert_eq!(applied, pending);
    assert!(list.delta().unwrap().is_empty());
    assert_eq!(load(&store).target_ids().unwrap(), id_list(&["a", "b"]));
}

#[test]
fn unchanged_list_commits_nothing() {
    let store = seeded(&["a", "b"]);
    let before = store.snapshot();
    let mut list = load(&store);
    list.target_ids().unwrap();
    let delta = list.commit(&Unavailable).unwrap();
    assert!(delta.is_empty());
    assert_eq!(store.snapshot(), before);
}

#[test]
fn concurrent_writers_are_not_reconciled() {
    let store = seeded(&["a", "b"]);
    let mut first = load(&store);
    let mut second = load(&store);

    first.append_target(member("c"), None).unwrap();
    second.append_target(member("d"), None).unwrap();
    first.commit(store.as_ref()).unwrap();
    second.commit(store.as_ref()).unwrap();

    // Both tails were asserted; nothing detected the overlap.
    let err = OrderedList::<BareMember>::load(
        store.clone(),
        Term::iri(AGG),
        ctx(),
        OrderOptions::new(),
    )
    .err()
    .expect("anchor now has two last nodes");
    assert!(matches!(err, OrderError::Corruption(_)));
}

#[test]
fn metrics_count_loads_and_flushes() {
    let store = seeded(&["a", "b", "c"]);
    let metrics = Arc::new(CounterMetrics::default());
    let mut list = OrderedList::load(
        store.clone(),
        Term::iri(AGG),
        ctx(),
        OrderOptions::new().metrics(metrics.clone()),
    )
    .unwrap();
    assert_eq!(list.target_ids().unwrap().len(), 3);
    assert_eq!(metrics.nodes_loaded(), 3);
    assert_eq!(metrics.targets_resolved(), 0);

    list.targets().unwrap();
    assert_eq!(metrics.targets_resolved(), 3);
    list.targets().unwrap();
    assert_eq!(metrics.targets_resolved(), 3);
}

#[test]
fn seeded_reload_appends_after_stored_nodes() {
    let seeded_load = |store: &Arc<MemoryStore>| {
        OrderedList::load(
            store.clone(),
            Term::iri(AGG),
            ctx(),
            OrderOptions::new().seed(7),
        )
        .unwrap()
    };
    let store = Arc::new(MemoryStore::new());
    let mut list = seeded_load(&store);
    list.sequence()
        .concat(["a", "b", "c"].map(member))
        .unwrap();
    list.commit(store.as_ref()).unwrap();

    let mut reloaded = seeded_load(&store);
    reloaded.append_target(member("d"), None).unwrap();
    reloaded.insert_at(1, member("e"), None).unwrap();
    assert_eq!(reloaded.target_ids().unwrap(), id_list(&["a", "e", "b", "c", "d"]));
    reloaded.commit(store.as_ref()).unwrap();

    assert_eq!(
        load(&store).target_ids().unwrap(),
        id_list(&["a", "e", "b", "c", "d"])
    );
}
