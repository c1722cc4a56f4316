//! Property tests over the parse session and the tree iterator.

use marktree_core::{IterEvent, ParseOptions};
use marktree_parser::Session;
use proptest::prelude::*;

/// Markdown-ish documents: plain words mixed with structural markers.
fn doc_strategy() -> impl Strategy<Value = String> {
    let line = prop_oneof![
        "[a-z ]{0,20}",
        "# [a-z ]{1,12}",
        "- [a-z ]{1,12}",
        "> [a-z ]{1,12}",
        "[a-z]{1,6} \\*\\*[a-z]{1,6}\\*\\* [a-z]{1,6}",
        Just(String::new()),
    ];
    proptest::collection::vec(line, 0..12).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn chunk_splits_never_change_the_tree(
        doc in doc_strategy(),
        cut in any::<prop::sample::Index>(),
    ) {
        let whole = Session::parse_document(&doc, ParseOptions::default()).unwrap();

        let bytes = doc.as_bytes();
        let mid = if bytes.is_empty() { 0 } else { cut.index(bytes.len()) };
        let mut session = Session::new(ParseOptions::default());
        session.feed(&bytes[..mid]);
        session.feed(&bytes[mid..]);
        let split = session.finish().unwrap();

        prop_assert_eq!(split, whole);
    }

    #[test]
    fn byte_at_a_time_never_changes_the_tree(doc in doc_strategy()) {
        let whole = Session::parse_document(&doc, ParseOptions::default()).unwrap();
        let mut session = Session::new(ParseOptions::default());
        for b in doc.as_bytes() {
            session.feed(std::slice::from_ref(b));
        }
        prop_assert_eq!(session.finish().unwrap(), whole);
    }

    #[test]
    fn every_node_enters_and_exits_exactly_once(doc in doc_strategy()) {
        let tree = Session::parse_document(&doc, ParseOptions::default()).unwrap();
        let mut enters = vec![0usize; tree.len()];
        let mut exits = vec![0usize; tree.len()];
        let mut open = Vec::new();

        for (event, id) in tree.iter() {
            match event {
                IterEvent::Enter => {
                    enters[id.index()] += 1;
                    open.push(id);
                }
                IterEvent::Exit => {
                    exits[id.index()] += 1;
                    // exits come in strict nesting order
                    prop_assert_eq!(open.pop(), Some(id));
                }
            }
        }

        prop_assert!(open.is_empty());
        prop_assert!(enters.iter().all(|&n| n == 1));
        prop_assert!(exits.iter().all(|&n| n == 1));
    }

    #[test]
    fn leaf_exit_follows_its_enter_immediately(doc in doc_strategy()) {
        let tree = Session::parse_document(&doc, ParseOptions::default()).unwrap();
        let events: Vec<_> = tree.iter().collect();
        for window in events.windows(2) {
            if let [(IterEvent::Enter, id), (next_event, next_id)] = window {
                if tree[*id].first_child().is_none() {
                    prop_assert_eq!(*next_event, IterEvent::Exit);
                    prop_assert_eq!(*next_id, *id);
                }
            }
        }
    }
}
