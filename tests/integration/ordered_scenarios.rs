use std::sync::Arc;

use proxy_order::{
    BareMember, BareResolver, MemberContext, MemberId, MemoryMembership, MemoryStore,
    OrderError, OrderOptions, OrderedList, Term, UriTranslator,
};

const BASE: &str = "http://example.org/objects";

fn translator() -> UriTranslator {
    UriTranslator::new(BASE)
}

fn member(id: &str) -> BareMember {
    BareMember::new(&translator(), id)
}

fn members(ids: &[&str]) -> Vec<BareMember> {
    ids.iter().map(|id| member(id)).collect()
}

fn ctx() -> MemberContext<BareMember> {
    MemberContext::<BareMember>::new(Arc::new(BareResolver::new(translator())))
}

fn empty_list() -> (Arc<MemoryStore>, OrderedList<BareMember>) {
    let store = Arc::new(MemoryStore::new());
    let list = OrderedList::open(store.clone(), None, None, ctx(), OrderOptions::new()).unwrap();
    (store, list)
}

fn list_with_membership(
    known: &[&str],
) -> (Arc<MemoryMembership>, OrderedList<BareMember>) {
    let membership = Arc::new(MemoryMembership::with_ids(
        known.iter().map(|id| MemberId::new(*id)),
    ));
    let context = ctx().with_membership(membership.clone());
    let store = Arc::new(MemoryStore::new());
    let list = OrderedList::open(store, None, None, context, OrderOptions::new()).unwrap();
    (membership, list)
}

#[test]
fn append_then_delete_in_the_middle() {
    let (_, mut list) = empty_list();
    for value in members(&["a", "b", "c"]) {
        list.append_target(value, None).unwrap();
    }
    assert_eq!(list.targets().unwrap(), members(&["a", "b", "c"]));

    let removed = list.delete_at(1).unwrap().expect("index 1 exists");
    assert_eq!(list.target(removed).unwrap(), Some(member("b")));
    assert_eq!(list.targets().unwrap(), members(&["a", "c"]));
    assert_eq!(list.len().unwrap(), 2);
}

#[test]
fn insert_at_front_of_empty_list() {
    let (_, mut list) = empty_list();
    list.insert_at(0, member("d"), None).unwrap();
    assert_eq!(list.targets().unwrap(), members(&["d"]));
    list.insert_at(0, member("e"), None).unwrap();
    assert_eq!(list.targets().unwrap(), members(&["e", "d"]));
    assert_eq!(list.first().unwrap().map(|k| list.target(k).unwrap()), Some(Some(member("e"))));
    assert_eq!(list.last().unwrap().map(|k| list.target(k).unwrap()), Some(Some(member("d"))));
}

#[test]
fn insert_past_the_end_appends() {
    let (_, mut list) = empty_list();
    list.append_target(member("a"), None).unwrap();
    list.insert_at(10, member("b"), None).unwrap();
    assert_eq!(list.targets().unwrap(), members(&["a", "b"]));
}

#[test]
fn delete_target_removes_every_occurrence() {
    let (_, mut list) = empty_list();
    for value in members(&["x", "y", "x"]) {
        list.append_target(value, None).unwrap();
    }
    let removed = list.delete_target(&member("x")).unwrap();
    assert_eq!(removed, Some(member("x")));
    assert_eq!(list.targets().unwrap(), members(&["y"]));
    assert_eq!(list.delete_target(&member("x")).unwrap(), None);
}

#[test]
fn out_of_range_delete_keeps_changed_flag() {
    let (store, mut list) = empty_list();
    list.append_target(member("a"), None).unwrap();
    list.append_target(member("b"), None).unwrap();
    list.commit(store.as_ref()).unwrap();
    assert!(!list.is_changed());

    assert_eq!(list.delete_at(5).unwrap(), None);
    assert!(!list.is_changed());
    assert_eq!(list.delete_at(None).unwrap(), None);
    assert!(!list.is_changed());

    list.order_will_change();
    assert_eq!(list.delete_at(5).unwrap(), None);
    assert!(list.is_changed());
    assert_eq!(list.targets().unwrap(), members(&["a", "b"]));
}

#[test]
fn repeated_fetch_returns_the_same_node() {
    let (store, mut list) = empty_list();
    list.append_target(member("a"), None).unwrap();
    list.append_target(member("b"), None).unwrap();
    list.commit(store.as_ref()).unwrap();
    let head = list.head_subject().cloned();
    let tail = list.tail_subject().cloned();

    let reopened = OrderedList::open(store, head.clone(), tail, ctx(), OrderOptions::new()).unwrap();
    let subject = head.unwrap();
    let first = reopened.fetch(&subject).unwrap();
    let second = reopened.fetch(&subject).unwrap();
    assert_eq!(first, second);
    assert_eq!(reopened.first().unwrap(), Some(first));
}

#[test]
fn empty_exactly_when_len_is_zero() {
    let (_, mut list) = empty_list();
    assert!(list.is_empty());
    assert_eq!(list.len().unwrap(), 0);
    assert_eq!(list.first().unwrap(), None);
    assert_eq!(list.last().unwrap(), None);

    let key = list.append_target(member("a"), None).unwrap();
    assert!(!list.is_empty());
    assert_eq!(list.len().unwrap(), 1);
    assert_eq!(list.first().unwrap(), Some(key));
    assert_eq!(list.last().unwrap(), Some(key));

    list.delete_node(key).unwrap();
    assert!(list.is_empty());
    assert_eq!(list.len().unwrap(), 0);
    assert!(list.head_subject().is_none());
    assert!(list.tail_subject().is_none());
}

#[test]
fn insert_proxy_for_requires_a_known_member() {
    let (_, mut list) = list_with_membership(&["a"]);

    let err = list.insert_proxy_for_at(0, None, None).unwrap_err();
    assert!(matches!(err, OrderError::InvalidArgument(_)));

    let stranger = translator().ref_of(&MemberId::new("zzz"));
    let err = list.insert_proxy_for_at(0, Some(stranger), None).unwrap_err();
    assert!(matches!(err, OrderError::NotMember { ref id } if id.as_str() == "zzz"));
    assert!(list.is_empty());
    assert!(!list.is_changed());

    let known = translator().ref_of(&MemberId::new("a"));
    list.insert_proxy_for_at(0, Some(known), None).unwrap();
    assert_eq!(list.target_ids().unwrap(), vec![MemberId::new("a")]);
    assert!(list.is_changed());
}

#[test]
fn appending_adds_membership_but_deleting_keeps_it() {
    let (membership, mut list) = list_with_membership(&[]);
    list.append_target(member("b"), None).unwrap();
    assert_eq!(membership.ids(), vec![MemberId::new("b")]);

    list.delete_target(&member("b")).unwrap();
    assert!(list.is_empty());
    assert_eq!(membership.ids(), vec![MemberId::new("b")]);
}

#[test]
fn sequence_view_forwards_to_the_list() {
    let (membership, mut list) = list_with_membership(&["k"]);
    {
        let mut seq = list.sequence();
        seq.push(member("a")).unwrap().push(member("b")).unwrap();
        seq.concat(members(&["c", "d"])).unwrap();
        assert!(seq == members(&["a", "b", "c", "d"]));
        assert_eq!(seq.len().unwrap(), 4);
        assert_eq!(seq.first().unwrap(), Some(member("a")));
        assert_eq!(seq.last().unwrap(), Some(member("d")));

        let err = seq.insert_target_id_at(1, None).unwrap_err();
        assert!(matches!(err, OrderError::InvalidArgument(ref msg) if msg == "ID can not be nil"));
        seq.insert_target_id_at(1, Some(&MemberId::new("k"))).unwrap();
        assert_eq!(
            seq.ids().unwrap(),
            ["a", "k", "b", "c", "d"].map(MemberId::new).to_vec()
        );

        assert_eq!(seq.delete_at(0).unwrap(), Some(member("a")));
        assert_eq!(seq.delete_at(9).unwrap(), None);
        assert_eq!(seq.delete(&member("c")).unwrap(), Some(member("c")));
        assert!(seq.eq_values(&members(&["k", "b", "d"])).unwrap());

        seq.clear().unwrap();
        assert!(seq.is_empty());
        assert!(seq == Vec::<BareMember>::new());
    }
    assert!(list.is_changed());
    assert_eq!(
        membership.ids(),
        ["a", "b", "c", "d", "k"].map(MemberId::new).to_vec()
    );
}

#[test]
fn sequence_nodes_proxy_within_the_anchor() {
    let store = Arc::new(MemoryStore::new());
    let anchor = Term::iri("http://example.org/agg/1");
    let mut list =
        OrderedList::load(store, anchor.clone(), ctx(), OrderOptions::new()).unwrap();
    assert!(list.is_empty());
    list.sequence().concat(members(&["a", "b"])).unwrap();
    assert_eq!(list.proxy_in().unwrap(), Some(anchor));
}

#[test]
fn changes_committed_is_idempotent() {
    let (_, mut list) = empty_list();
    list.append_target(member("a"), None).unwrap();
    assert!(list.is_changed());
    list.changes_committed();
    list.changes_committed();
    assert!(!list.is_changed());
    assert_eq!(list.targets().unwrap(), members(&["a"]));
}
