use scholar_resolve::normalize::{AuthorListingRecord, BulkRecord, ProfilePageRecord};
use scholar_resolve::sources::{InMemoryBulkDataset, InMemoryFetcher, InMemoryRegistry};
use scholar_resolve::{
    ExactSource, LiveProfileFetcher, PlatformId, ProfileDirectory, Query, ResolutionPath,
    ResolveRequest, ResolveRequestBuilder, Resolver, ResolverConfig, SourceError,
    StructuredProfile, ValidationError,
};
use serde_json::json;
use std::sync::{Arc, Mutex};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Live fetcher handle the test keeps a second reference to.
#[derive(Clone)]
struct SharedFetcher(Arc<Mutex<InMemoryFetcher>>);

impl SharedFetcher {
    fn new(inner: InMemoryFetcher) -> Self {
        Self(Arc::new(Mutex::new(inner)))
    }

    fn with<T>(&self, f: impl FnOnce(&InMemoryFetcher) -> T) -> T {
        let guard = self.0.lock().unwrap();
        f(&guard)
    }
}

fn poisoned() -> SourceError {
    SourceError::Backend("poisoned fetcher".to_string())
}

impl LiveProfileFetcher for SharedFetcher {
    fn name(&self) -> &str {
        "shared_fetcher"
    }

    fn open(&mut self) -> Result<(), SourceError> {
        self.0.lock().map_err(|_| poisoned())?.open()
    }

    fn fetch_profile_page(
        &mut self,
        url: &str,
        simple: bool,
    ) -> Result<Option<ProfilePageRecord>, SourceError> {
        self.0.lock().map_err(|_| poisoned())?.fetch_profile_page(url, simple)
    }

    fn fetch_search_results(
        &mut self,
        query_fragment: &str,
    ) -> Result<Vec<AuthorListingRecord>, SourceError> {
        self.0.lock().map_err(|_| poisoned())?.fetch_search_results(query_fragment)
    }

    fn close(&mut self) {
        if let Ok(mut inner) = self.0.lock() {
            inner.close();
        }
    }
}

fn bulk_record(name: &str, url: Option<&str>, labels: Option<&[&str]>) -> BulkRecord {
    BulkRecord {
        name: name.to_string(),
        url: url.map(str::to_string),
        platform_id: None,
        organization: None,
        domain_labels: labels.map(|l| l.iter().map(|s| s.to_string()).collect()),
        coauthors: None,
        citations: None,
        papers: None,
    }
}

fn scholar_url(id: &str) -> String {
    format!("https://scholar.google.com/citations?hl=en&user={id}")
}

fn resolver_with(bulk: InMemoryBulkDataset, registry: InMemoryRegistry) -> Resolver {
    init_tracing();
    Resolver::new(Arc::new(bulk), Arc::new(registry)).with_config(ResolverConfig::immediate())
}

#[test]
fn identifier_in_bulk_takes_the_fast_path() {
    let url = scholar_url("ABC123456789");
    let bulk = InMemoryBulkDataset::from_records([
        bulk_record("Jane Doe", Some(url.as_str()), Some(&["NLP"][..])),
        bulk_record("Jane Doe", Some("https://elsewhere"), None),
    ])
    .unwrap();
    let mut resolver = resolver_with(bulk, InMemoryRegistry::new());

    let request = ResolveRequestBuilder::new()
        .json_query(json!({"platform_id": "ABC123456789"}))
        .unwrap()
        .build()
        .unwrap();
    let shortlist = resolver.resolve(request).unwrap();

    assert_eq!(shortlist.len(), 1);
    assert_eq!(shortlist.resolved_via, ResolutionPath::Exact(ExactSource::BulkDataset));
    assert_eq!(
        shortlist.candidates[0].platform_id.as_ref().map(PlatformId::as_str),
        Some("ABC123456789")
    );
}

#[test]
fn jane_doe_identifier_match_first_then_tag_overlap() {
    let registry = InMemoryRegistry::new();
    registry
        .insert(
            "~Jane_Doe1",
            json!({"props": {"pageProps": {"profile": {
                "links": [{"name": "Google Scholar", "url": scholar_url("ABC123456789")}]
            }}}}),
        )
        .unwrap();
    registry
        .insert(
            "~Jane_Doe2",
            json!({"profile": {"content": {"expertise": [{"keywords": ["NLP", "Vision"]}]}}}),
        )
        .unwrap();

    let exact_url = scholar_url("ABC123456789");
    let bulk = InMemoryBulkDataset::from_records([
        bulk_record("Jane Doe", None, Some(&["nlp"][..])),
        bulk_record("Jane A. Doe", Some(exact_url.as_str()), None),
    ])
    .unwrap();
    let mut resolver = resolver_with(bulk, registry);

    let shortlist = resolver.resolve_query("Jane Doe", 2, true).unwrap();
    assert_eq!(shortlist.resolved_via, ResolutionPath::Ranked);
    assert_eq!(shortlist.names(), vec!["Jane A. Doe", "Jane Doe"]);

    let shortlist = resolver.resolve_query("Jane Doe", 1, true).unwrap();
    assert_eq!(shortlist.names(), vec!["Jane A. Doe"]);
}

#[test]
fn configured_top_n_applies_when_request_leaves_it_unset() {
    let bulk = InMemoryBulkDataset::from_records([
        bulk_record("Jane Doe", Some("https://a"), None),
        bulk_record("Jane Doe", Some("https://b"), None),
        bulk_record("Jane Doe", Some("https://c"), None),
    ])
    .unwrap();
    let config =
        ResolverConfig::from_json_str(r#"{"top_n": 2, "registry_delay_ms": 0, "page_delay_ms": 0}"#)
            .unwrap();
    let mut resolver = resolver_with(bulk, InMemoryRegistry::new()).with_config(config);

    let shortlist = resolver.resolve(ResolveRequest::new("Jane Doe")).unwrap();
    assert_eq!(shortlist.len(), 2);
}

#[test]
fn empty_bulk_runs_author_search_cascade() {
    let listing = AuthorListingRecord {
        url: scholar_url("CCCCCCCCCCCC"),
        name: "Jane Doe".to_string(),
        affiliation: Some("Professor, Example University".to_string()),
        email: Some("Verified email at example.edu".to_string()),
        cited_by: Some("Cited by 120".to_string()),
        domain_labels: vec!["NLP".to_string()],
    };
    let fetcher = SharedFetcher::new(
        InMemoryFetcher::new().with_listing("Jane Doe example.edu", vec![listing]),
    );
    let mut resolver = resolver_with(InMemoryBulkDataset::new(), InMemoryRegistry::new())
        .with_live_fetcher(Box::new(fetcher.clone()));

    let profile: StructuredProfile = serde_json::from_value(json!({
        "profile": {
            "id": "~Jane_Doe1",
            "content": {
                "expertise": [{"keywords": ["nlp"]}],
                "history": [{
                    "position": "Professor",
                    "institution": {"name": "Example University", "domain": "example.edu"}
                }]
            }
        }
    }))
    .unwrap();
    let shortlist = resolver.resolve_query(profile, 3, true).unwrap();

    assert_eq!(shortlist.names(), vec!["Jane Doe"]);
    let candidate = &shortlist.candidates[0];
    assert_eq!(candidate.email_domain.as_deref(), Some("example.edu"));
    assert_eq!(candidate.citations, Some(120));
    fetcher.with(|f| {
        assert_eq!(f.searches(), ["Jane Doe example.edu"]);
        assert_eq!((f.opened(), f.closed()), (1, 1));
    });
}

#[test]
fn registry_id_in_directory_is_resolved_locally() {
    let mut directory = ProfileDirectory::new();
    directory.insert(
        "~Jane_Doe1",
        serde_json::from_value(json!({
            "id": "~Jane_Doe1",
            "content": {"relations": [{"name": "Bob Roe", "relation": "Coauthor"}]}
        }))
        .unwrap(),
    );

    let mut with_coauthor = bulk_record("Jane Doe", Some("https://b"), None);
    with_coauthor.coauthors = Some(vec![serde_json::from_value(json!(["", "Bob Roe"])).unwrap()]);
    let bulk = InMemoryBulkDataset::from_records([
        bulk_record("Jane Doe", Some("https://a"), Some(&["biology"][..])),
        with_coauthor,
    ])
    .unwrap();

    let mut resolver = resolver_with(bulk, InMemoryRegistry::new()).with_directory(directory);
    let shortlist = resolver.resolve_query("~Jane_Doe1", 1, true).unwrap();
    assert_eq!(shortlist.candidates[0].url.as_deref(), Some("https://b"));
}

#[test]
fn invalid_json_queries_are_rejected() {
    for value in [json!(42), json!(null), json!([1, 2]), json!(true)] {
        assert!(matches!(
            ResolveRequestBuilder::new().json_query(value),
            Err(ValidationError::InvalidQueryType { .. })
        ));
    }
    assert!(matches!(
        ResolveRequestBuilder::new().json_query(json!({"platform_id": "short"})),
        Err(ValidationError::InvalidPlatformId { .. })
    ));
}

#[test]
fn session_is_closed_once_per_run_even_on_error() {
    let fetcher = SharedFetcher::new(InMemoryFetcher::new());
    let mut resolver = resolver_with(InMemoryBulkDataset::new(), InMemoryRegistry::new())
        .with_live_fetcher(Box::new(fetcher.clone()));

    let err = resolver.resolve(ResolveRequest::new("   ")).unwrap_err();
    assert!(err.is_validation());
    fetcher.with(|f| assert_eq!((f.opened(), f.closed()), (1, 1)));

    let shortlist = resolver.resolve_query("Jane Doe", 3, true).unwrap();
    assert!(shortlist.is_empty());
    fetcher.with(|f| {
        assert_eq!((f.opened(), f.closed()), (2, 2));
        assert_eq!(f.searches(), ["Jane Doe"]);
    });
}

#[test]
fn nothing_found_is_an_empty_shortlist() {
    let mut resolver = resolver_with(InMemoryBulkDataset::new(), InMemoryRegistry::new());
    assert!(resolver.resolve_query("Nobody Known", 3, true).unwrap().is_empty());

    let id = PlatformId::new("ZZZZZZZZZZZZ").unwrap();
    assert!(resolver.resolve_query(Query::Identifier(id), 3, true).unwrap().is_empty());
}

#[test]
fn identifier_missing_from_bulk_uses_live_page() {
    let page = ProfilePageRecord {
        url: scholar_url("ABC123456789"),
        name: "Jane Doe".to_string(),
        organization: Some("Example University".to_string()),
        domain_labels: vec!["NLP".to_string()],
        coauthors: None,
        citations: Some(42),
        papers: Some(vec![serde_json::from_value(json!({"title": "On Things"})).unwrap()]),
    };
    let fetcher = SharedFetcher::new(InMemoryFetcher::new().with_page(page));
    let mut resolver = resolver_with(InMemoryBulkDataset::new(), InMemoryRegistry::new())
        .with_live_fetcher(Box::new(fetcher));

    let id = PlatformId::new("ABC123456789").unwrap();
    let full = resolver.resolve_query(id.clone(), 3, false).unwrap();
    assert_eq!(full.resolved_via, ResolutionPath::Exact(ExactSource::LivePage));
    assert_eq!(full.candidates[0].papers.as_ref().map(Vec::len), Some(1));

    let simple = resolver.resolve_query(id, 3, true).unwrap();
    assert!(simple.candidates[0].papers.is_none());
}

#[test]
fn duplicate_identifiers_collapse_to_one_candidate() {
    let mut first = bulk_record("Jane Doe", Some("https://a"), None);
    first.platform_id = Some("ABC123456789".to_string());
    let mut second = bulk_record("Jane Doe", Some("https://b"), None);
    second.platform_id = Some("ABC123456789".to_string());
    let bulk = InMemoryBulkDataset::from_records([first, second]).unwrap();
    let mut resolver = resolver_with(bulk, InMemoryRegistry::new());

    let shortlist = resolver.resolve_query("Jane Doe", 3, true).unwrap();
    assert_eq!(shortlist.len(), 1);
    assert_eq!(shortlist.candidates[0].url.as_deref(), Some("https://a"));
}
