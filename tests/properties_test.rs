//! Property tests for filter composition, page bounds and merging

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use memento::filter::{CursorFilter, GroupFilter, MessageFilter, ParticipantFilter};
use memento::paginate::collect_page;
use memento::{ContactMerger, Contact, FilterPipeline, Message, MessageTarget, Platform, PlatformIdentity};

const USERS: [&str; 4] = ["ann", "ben", "cat", "dan"];

fn arb_message() -> impl Strategy<Value = Message> {
    (0i64..500, 0usize..4, 0usize..4, any::<bool>()).prop_map(|(secs, from, to, group)| Message {
        platform: Platform::Irc,
        timestamp: Utc.timestamp_opt(1_000_000 + secs, 0).unwrap().fixed_offset(),
        from: USERS[from].to_string(),
        to: if group {
            MessageTarget::group(USERS[to])
        } else {
            MessageTarget::user(USERS[to])
        },
        text: String::new(),
        raw: None,
        attachments: None,
        meta: None,
    })
}

#[derive(Debug, Clone)]
enum FilterKind {
    Participant(usize),
    Group(usize),
    After(i64),
}

fn arb_filter() -> impl Strategy<Value = FilterKind> {
    prop_oneof![
        (0usize..4).prop_map(FilterKind::Participant),
        (0usize..4).prop_map(FilterKind::Group),
        (0i64..500).prop_map(FilterKind::After),
    ]
}

fn build(kind: &FilterKind) -> Box<dyn MessageFilter> {
    match kind {
        FilterKind::Participant(i) => Box::new(ParticipantFilter::new(USERS[*i])),
        FilterKind::Group(i) => Box::new(GroupFilter::new(USERS[*i])),
        FilterKind::After(secs) => Box::new(CursorFilter::new(Utc.timestamp_opt(1_000_000 + secs, 0).unwrap())),
    }
}

fn pipeline(kinds: &[FilterKind]) -> FilterPipeline {
    let mut pipeline = FilterPipeline::new();
    for kind in kinds {
        let filter = build(kind);
        pipeline.push(move |m: &Message| filter.matches(m));
    }
    pipeline
}

fn contact(name: &str, ids: &[usize]) -> Contact {
    Contact {
        name: name.to_string(),
        platforms: ids
            .iter()
            .map(|id| PlatformIdentity {
                id: id.to_string(),
                platform: Platform::Sms,
                name: None,
                avatar: None,
                meta: Default::default(),
            })
            .collect(),
    }
}

fn arb_source() -> impl Strategy<Value = Vec<Contact>> {
    prop::collection::vec((0usize..4, prop::collection::vec(0usize..100, 0..3)), 0..5)
        .prop_map(|entries| entries.iter().map(|(n, ids)| contact(USERS[*n], ids)).collect())
}

proptest! {
    #[test]
    fn accepted_subsequence_is_and_of_filters(
        messages in prop::collection::vec(arb_message(), 0..60),
        kinds in prop::collection::vec(arb_filter(), 0..4),
    ) {
        let pipeline = pipeline(&kinds);
        let filters: Vec<Box<dyn MessageFilter>> = kinds.iter().map(build).collect();

        let expected: Vec<&Message> = messages
            .iter()
            .filter(|m| filters.iter().all(|f| f.matches(m)))
            .collect();
        let accepted: Vec<&Message> = messages.iter().filter(|m| pipeline.accepts(m)).collect();

        prop_assert_eq!(&accepted, &expected);
        if kinds.is_empty() {
            prop_assert_eq!(accepted.len(), messages.len());
        }
    }

    #[test]
    fn page_is_bounded_and_full_only_when_more_matched(
        messages in prop::collection::vec(arb_message(), 0..80),
        participant in 0usize..4,
        limit in 1usize..=30,
    ) {
        let pipeline = FilterPipeline::new().with(ParticipantFilter::new(USERS[participant]));
        let matching = messages.iter().filter(|m| pipeline.accepts(m)).count();

        let page = collect_page(messages.clone().into_iter().map(Ok), &pipeline, limit).unwrap();

        prop_assert!(page.messages.len() <= limit);
        prop_assert_eq!(page.messages.len(), matching.min(limit));
        prop_assert_eq!(page.next_cursor().is_some(), matching >= limit);
    }

    #[test]
    fn next_page_never_repeats_with_distinct_timestamps(
        count in 0usize..90,
        limit in 1usize..=30,
    ) {
        let messages: Vec<Message> = (0..count)
            .map(|i| Message {
                platform: Platform::Sms,
                timestamp: Utc.timestamp_opt(1_000_000 + i as i64, 0).unwrap().fixed_offset(),
                from: "ann".to_string(),
                to: MessageTarget::user("ben"),
                text: i.to_string(),
                raw: None,
                attachments: None,
                meta: None,
            })
            .collect();

        let mut seen = Vec::new();
        let mut cursor = None;
        loop {
            let mut pipeline = FilterPipeline::new();
            if let Some(c) = cursor {
                pipeline.push(CursorFilter::new(memento::Cursor::instant(&c)));
            }
            let page = collect_page(messages.clone().into_iter().map(Ok), &pipeline, limit).unwrap();
            for m in &page.messages {
                prop_assert!(!seen.contains(&m.text));
                seen.push(m.text.clone());
            }
            match page.next_cursor() {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }
        prop_assert_eq!(seen.len(), count);
    }

    #[test]
    fn merging_one_source_is_identity_up_to_name_folding(source in arb_source()) {
        let mut merger = ContactMerger::new();
        merger.merge(source.clone());
        let merged = merger.into_contacts();

        let mut names: Vec<&str> = Vec::new();
        for c in &source {
            if !names.contains(&c.name.as_str()) {
                names.push(&c.name);
            }
        }
        let merged_names: Vec<&str> = merged.iter().map(|c| c.name.as_str()).collect();
        prop_assert_eq!(merged_names, names);

        let total: usize = source.iter().map(|c| c.platforms.len()).sum();
        prop_assert_eq!(merged.iter().map(|c| c.platforms.len()).sum::<usize>(), total);
    }

    #[test]
    fn merge_is_associative(a in arb_source(), b in arb_source(), c in arb_source()) {
        let mut direct = ContactMerger::new();
        direct.merge(a.clone());
        direct.merge(b.clone());
        direct.merge(c.clone());

        let mut first = ContactMerger::new();
        first.merge(a);
        first.merge(b);
        let mut stepwise = ContactMerger::new();
        stepwise.merge(first.into_contacts());
        stepwise.merge(c);

        prop_assert_eq!(direct.into_contacts(), stepwise.into_contacts());
    }
}
